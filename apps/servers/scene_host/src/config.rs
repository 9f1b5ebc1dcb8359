use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives, e.g. `scene_host=debug`
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8080")]
	pub port: u16,

	/// File holding the last saved scene
	#[arg(long, env = "SCENE_FILE", default_value = "scene.json")]
	pub scene_file: PathBuf,

	/// Enable CORS for browser editors on other origins
	#[arg(long, env = "ENABLE_CORS")]
	pub enable_cors: bool,

	/// Per-request timeout in milliseconds
	#[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
	pub request_timeout_ms: u64,
}

impl Config {
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}
