use clap::Parser;
use scene_sync::{commands, Cli, Command, SceneSyncService};
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenv::dotenv().ok();
	let cli = Cli::parse();

	init_tracing(cli.config.log_json);

	let service = SceneSyncService::new(cli.config)?;

	match cli.command {
		Command::Run => {
			tracing::info!("🚀 Starting scene sync service");
			service.run().await?;
			tracing::info!("👋 Scene sync service shutdown complete");
		}
		Command::Preview(args) => service.preview(&args).await?,
		Command::Export { out } => commands::export(&service, &out).await?,
		Command::Import { file } => commands::import(&service, &file).await?,
		Command::Edit(edit) => commands::edit(&service, &edit).await?,
	}

	Ok(())
}

/// Logs go to stderr so command output on stdout stays scriptable
fn init_tracing(log_json: bool) {
	use tracing_subscriber::layer::SubscriberExt;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scene_sync=info,overlay_scene=info"));

	tracing_subscriber::registry()
		.with(if log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.with_writer(std::io::stderr)
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(filter))
		})
		.init();
}
