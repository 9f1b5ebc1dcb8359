use clap::{Args, Parser, Subcommand};
use overlay_scene::{ColorKey, ComponentKind, ReorderDirection, SyncConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	#[command(flatten)]
	pub config: Config,

	#[command(subcommand)]
	pub command: Command,
}

/// Settings shared by every subcommand
#[derive(Args, Clone, Debug, Serialize, Deserialize)]
pub struct Config {
	/// Base URL of the scene host
	#[arg(long = "remote", global = true, env = "SCENE_REMOTE_URL", default_value = "http://127.0.0.1:8080")]
	pub remote_url: String,

	/// Directory of the local scene mirror
	#[arg(long, global = true, env = "SCENE_STORAGE_DIR", default_value = ".overlay")]
	pub storage_dir: PathBuf,

	/// How often the remote scene is polled
	#[arg(long, global = true, env = "SCENE_POLL_INTERVAL_MS", default_value = "2000")]
	pub poll_interval_ms: u64,

	/// Quiet period after a local edit before it is pushed
	#[arg(long, global = true, env = "SCENE_DEBOUNCE_MS", default_value = "1000")]
	pub debounce_ms: u64,

	/// Graceful shutdown timeout
	#[arg(long, global = true, env = "SHUTDOWN_TIMEOUT_SECS", default_value = "10")]
	pub shutdown_timeout_secs: u64,

	/// Use JSON formatting for tracing
	#[arg(long, global = true, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,
}

impl Config {
	pub const fn sync_config(&self) -> SyncConfig {
		SyncConfig {
			poll_interval: Duration::from_millis(self.poll_interval_ms),
			debounce: Duration::from_millis(self.debounce_ms),
		}
	}

	pub const fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			remote_url: "http://127.0.0.1:8080".to_string(),
			storage_dir: PathBuf::from(".overlay"),
			poll_interval_ms: 2000,
			debounce_ms: 1000,
			shutdown_timeout_secs: 10,
			log_json: false,
		}
	}
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
	/// Keep the local scene mirrored and in sync with the remote until Ctrl+C
	Run,

	/// Load a scene for display without editing it
	Preview(PreviewArgs),

	/// Write the current scene to a dated JSON file
	Export {
		/// Target directory
		#[arg(long, default_value = ".")]
		out: PathBuf,
	},

	/// Replace the scene with a previously exported file
	Import {
		file: PathBuf,
	},

	/// Apply one change to the scene and push it
	#[command(subcommand)]
	Edit(EditCommand),
}

#[derive(Args, Clone, Debug)]
pub struct PreviewArgs {
	/// Full preview page URL carrying `config` and `refresh` query parameters
	#[arg(long, conflicts_with = "config")]
	pub url: Option<String>,

	/// URL of the scene file to show
	#[arg(long)]
	pub config: Option<String>,

	/// Re-fetch interval in milliseconds
	#[arg(long, requires = "config")]
	pub refresh: Option<u64>,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum EditCommand {
	/// Add a component with type defaults
	Add {
		kind: ComponentKind,
		#[arg(long)]
		name: Option<String>,
	},

	Remove {
		id: String,
	},

	/// Copy a component with its props and size
	Duplicate {
		id: String,
	},

	/// Move a component in the paint order
	Reorder {
		id: String,
		direction: ReorderDirection,
	},

	/// Switch the active theme
	Theme {
		id: String,
	},

	/// Override one theme colour
	Override {
		key: ColorKey,
		value: String,
	},

	ResetOverrides,

	Canvas {
		width: f64,
		height: f64,
	},

	/// Merge a JSON patch into a component
	Patch {
		id: String,
		/// e.g. '{"x": 10, "props": {"text": "Live"}}'
		json: String,
	},
}
