use super::{NextTransition, Visibility, VisibilityTiming};
use crate::error::{Result, SceneError};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// What the driver publishes to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilityState {
	pub visibility: Visibility,
	/// Increments every time the component comes back on screen
	pub cycle: u64,
}

impl Default for VisibilityState {
	fn default() -> Self {
		Self {
			visibility: Visibility::Visible,
			cycle: 0,
		}
	}
}

#[derive(Debug)]
enum Command {
	Retime(VisibilityTiming),
	Reset,
}

/// Async driver of one component's visibility state machine
pub struct VisibilityScheduler {
	timing: VisibilityTiming,
	state_tx: watch::Sender<VisibilityState>,
	commands: mpsc::Receiver<Command>,
	phase_started: Instant,
	cancel: CancellationToken,
}

/// Control surface of a running [`VisibilityScheduler`]
#[derive(Debug)]
pub struct VisibilityHandle {
	state_rx: watch::Receiver<VisibilityState>,
	commands: mpsc::Sender<Command>,
	task: JoinHandle<()>,
}

impl VisibilityHandle {
	pub fn subscribe(&self) -> watch::Receiver<VisibilityState> {
		self.state_rx.clone()
	}

	pub fn current(&self) -> VisibilityState {
		*self.state_rx.borrow()
	}

	/// Replace the timing and restart the current phase
	pub async fn retime(&self, timing: VisibilityTiming) -> Result<()> {
		self.commands.send(Command::Retime(timing)).await.map_err(|_| SceneError::SchedulerStopped)
	}

	/// Show the component again and restart its on-screen timer
	pub async fn reset(&self) -> Result<()> {
		self.commands.send(Command::Reset).await.map_err(|_| SceneError::SchedulerStopped)
	}

	/// Wait for the driver task to finish after cancellation
	pub async fn join(self) {
		if let Err(e) = self.task.await {
			tracing::warn!("⚠️ Visibility scheduler task failed: {}", e);
		}
	}
}

impl VisibilityScheduler {
	pub fn spawn(timing: VisibilityTiming, cancel: CancellationToken) -> VisibilityHandle {
		let (state_tx, state_rx) = watch::channel(VisibilityState::default());
		let (command_tx, command_rx) = mpsc::channel(8);

		let scheduler = Self {
			timing,
			state_tx,
			commands: command_rx,
			phase_started: Instant::now(),
			cancel,
		};
		let task = tokio::spawn(scheduler.run());

		VisibilityHandle {
			state_rx,
			commands: command_tx,
			task,
		}
	}

	fn current(&self) -> Visibility {
		self.state_tx.borrow().visibility
	}

	/// Deadline and target of the pending transition
	fn pending(&self) -> Option<(Instant, Visibility)> {
		match self.timing.next_transition(self.current()) {
			NextTransition::After(length, to) => Some((self.phase_started + length, to)),
			NextTransition::NextFrame(to) => Some((Instant::now(), to)),
			NextTransition::Never => None,
		}
	}

	fn publish(&mut self, visibility: Visibility) {
		self.phase_started = Instant::now();
		self.state_tx.send_modify(|state| {
			if visibility == Visibility::Visible {
				state.cycle += 1;
			}
			state.visibility = visibility;
		});
		trace!("Visibility now {:?}", visibility);
	}

	async fn transition(&mut self, to: Visibility) {
		if self.timing.skips_hidden() {
			// hidden lasts zero time: come back on the next frame without publishing it
			tokio::task::yield_now().await;
			self.publish(Visibility::Visible);
			return;
		}
		self.publish(to);
	}

	/// Restart the on-screen timer, coming back on screen if hidden
	fn reset(&mut self) {
		if self.current() == Visibility::Visible {
			self.phase_started = Instant::now();
		} else {
			self.publish(Visibility::Visible);
		}
	}

	async fn run(mut self) {
		debug!("Visibility scheduler started with {:?}", self.timing);

		loop {
			let pending = self.pending();
			let wake_at = pending.map_or_else(Instant::now, |(at, _)| at);

			tokio::select! {
				() = self.cancel.cancelled() => break,
				command = self.commands.recv() => match command {
					Some(Command::Retime(timing)) => {
						debug!("Retimed visibility to {:?}", timing);
						self.timing = timing;
						self.phase_started = Instant::now();
					}
					Some(Command::Reset) => self.reset(),
					None => break,
				},
				() = sleep_until(wake_at), if pending.is_some() => {
					if let Some((_, to)) = pending {
						self.transition(to).await;
					}
				}
			}
		}

		debug!("Visibility scheduler stopped");
	}
}
