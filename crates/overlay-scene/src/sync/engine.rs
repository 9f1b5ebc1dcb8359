use super::debounce::Debouncer;
use super::remote::SceneRemote;
use crate::config::{normalize_config, now_millis, SceneConfig};
use crate::store::{ChangeOrigin, SceneSnapshot, SceneStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Source of epoch-millisecond timestamps
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
	pub poll_interval: Duration,
	/// Quiet period after the last local edit before it is pushed
	pub debounce: Duration,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_millis(2000),
			debounce: Duration::from_millis(1000),
		}
	}
}

/// What the engine knows about the remote copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCursor {
	/// Whether any remote scene has been applied yet
	pub loaded: bool,
	/// Newest `updatedAt` applied or pushed
	pub last_seen: i64,
	/// Store revision produced by the last applied remote scene
	pub last_received_epoch: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
	/// Nothing stored remotely yet
	Empty,
	Applied { updated_at: i64, revision: u64 },
	/// Remote copy is not newer than what we have
	Stale,
	/// Remote payload failed validation
	Rejected,
	Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
	Pushed { updated_at: i64 },
	/// Current state is exactly what the remote sent, nothing to send back
	SkippedEcho,
	Failed,
}

/// Keeps a [`SceneStore`] and a [`SceneRemote`] converged, last writer wins
pub struct SyncEngine {
	store: SceneStore,
	remote: Arc<dyn SceneRemote>,
	config: SyncConfig,
	clock: Clock,
	cursor_tx: watch::Sender<SyncCursor>,
}

impl SyncEngine {
	pub fn new(store: SceneStore, remote: Arc<dyn SceneRemote>, config: SyncConfig) -> Self {
		let (cursor_tx, _) = watch::channel(SyncCursor::default());
		Self {
			store,
			remote,
			config,
			clock: Arc::new(now_millis),
			cursor_tx,
		}
	}

	#[must_use]
	pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
		self.clock = Arc::new(clock);
		self
	}

	pub fn cursor(&self) -> SyncCursor {
		*self.cursor_tx.borrow()
	}

	pub fn subscribe_cursor(&self) -> watch::Receiver<SyncCursor> {
		self.cursor_tx.subscribe()
	}

	/// Fetch the remote scene once and apply it if it is newer
	pub async fn poll_once(&self) -> PollOutcome {
		let value = match self.remote.fetch().await {
			Ok(Some(value)) => value,
			Ok(None) => {
				debug!("No remote scene stored yet");
				return PollOutcome::Empty;
			}
			Err(e) => {
				warn!("⚠️ Failed to poll scene: {}", e);
				return PollOutcome::Failed;
			}
		};

		let config = match normalize_config(value) {
			Ok(config) => config,
			Err(e) => {
				warn!("⚠️ Remote scene rejected: {}", e);
				return PollOutcome::Rejected;
			}
		};

		let remote_time = config.timestamp();
		let cursor = self.cursor();
		if cursor.loaded && remote_time <= cursor.last_seen {
			debug!("Remote scene at {} is not newer than {}", remote_time, cursor.last_seen);
			return PollOutcome::Stale;
		}

		let components = config.components.len();
		let revision = self.store.apply_config(config, ChangeOrigin::Remote);
		self.cursor_tx.send_modify(|cursor| {
			cursor.loaded = true;
			cursor.last_seen = remote_time;
			cursor.last_received_epoch = Some(revision);
		});
		info!("📥 Applied remote scene ({} components, updatedAt {})", components, remote_time);

		PollOutcome::Applied { updated_at: remote_time, revision }
	}

	/// Send the current scene unless it is the one the remote just gave us
	pub async fn push_once(&self) -> PushOutcome {
		let snapshot = self.store.snapshot();
		if snapshot.origin == ChangeOrigin::Remote && Some(snapshot.revision) == self.cursor().last_received_epoch {
			debug!("Skipping push of unmodified remote revision {}", snapshot.revision);
			return PushOutcome::SkippedEcho;
		}

		let now = (self.clock)();
		let config = SceneConfig::from_state(&snapshot.state, now);
		// claimed before the request so our own write is not applied back on the next poll
		self.cursor_tx.send_modify(|cursor| cursor.last_seen = now);

		match self.remote.push(&config).await {
			Ok(()) => {
				info!("📤 Pushed scene revision {} (updatedAt {})", snapshot.revision, now);
				PushOutcome::Pushed { updated_at: now }
			}
			Err(e) => {
				warn!("⚠️ Failed to save scene: {}", e);
				PushOutcome::Failed
			}
		}
	}

	/// Start [`Self::run`] on its own task. Edits made after this call are
	/// seen even if the task has not been scheduled yet.
	pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
		let changes = self.store.subscribe();
		tokio::spawn(self.drive(changes, cancel))
	}

	/// Poll, watch local edits and push them until cancelled.
	/// An edit still waiting out its debounce is flushed on the way out.
	pub async fn run(self, cancel: CancellationToken) {
		let changes = self.store.subscribe();
		self.drive(changes, cancel).await;
	}

	async fn drive(self, mut changes: watch::Receiver<SceneSnapshot>, cancel: CancellationToken) {
		info!("🔄 Starting scene sync (poll every {:?}, debounce {:?})", self.config.poll_interval, self.config.debounce);

		let mut poll = interval(self.config.poll_interval);
		poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

		let mut debounce = Debouncer::new(self.config.debounce);

		loop {
			tokio::select! {
				() = cancel.cancelled() => break,
				_ = poll.tick() => {
					self.poll_once().await;
				}
				changed = changes.changed() => {
					if changed.is_err() {
						break;
					}
					let origin = changes.borrow_and_update().origin;
					if origin == ChangeOrigin::Local {
						debounce.arm();
					}
				}
				() = &mut debounce, if debounce.is_armed() => {
					self.push_once().await;
				}
			}
		}

		if debounce.is_armed() {
			info!("Flushing pending local edit before shutdown");
			self.push_once().await;
		}

		info!("✅ Scene sync stopped");
	}
}
