use crate::SceneSyncService;
use overlay_scene::{ComponentId, OverlayComponent, SceneState, VisibilityHandle, VisibilityScheduler, VisibilityState, VisibilityTiming};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Width used for marquee cycles; nothing is rendered here, so content is never measured
const UNMEASURED_WIDTH: f64 = 0.0;

struct Tracked {
	timing: VisibilityTiming,
	handle: VisibilityHandle,
	cancel: CancellationToken,
}

/// One scheduler per animated component, kept in step with the scene
#[derive(Default)]
pub struct VisibilityBoard {
	tracked: HashMap<ComponentId, Tracked>,
}

impl VisibilityBoard {
	/// Start, retime or stop schedulers so they match `state`
	pub async fn reconcile(&mut self, state: &SceneState, parent: &CancellationToken) {
		let wanted: HashMap<&str, (&OverlayComponent, VisibilityTiming)> = state
			.components
			.iter()
			.filter_map(|c| VisibilityTiming::for_component(c, UNMEASURED_WIDTH).map(|timing| (c.id(), (c, timing))))
			.collect();

		self.tracked.retain(|id, tracked| {
			let keep = wanted.contains_key(id.as_str());
			if !keep {
				tracked.cancel.cancel();
			}
			keep
		});

		for (id, (component, timing)) in wanted {
			match self.tracked.get_mut(id) {
				Some(tracked) if tracked.timing == timing => {}
				Some(tracked) => {
					if tracked.handle.retime(timing).await.is_ok() {
						tracing::debug!("⏱️ Retimed {}", component.base().name);
						tracked.timing = timing;
					}
				}
				None => {
					let cancel = parent.child_token();
					let handle = VisibilityScheduler::spawn(timing, cancel.clone());
					spawn_transition_logger(component.base().name.clone(), handle.subscribe(), cancel.clone());
					self.tracked.insert(id.to_string(), Tracked { timing, handle, cancel });
				}
			}
		}
	}

	pub fn current(&self, id: &str) -> Option<VisibilityState> {
		self.tracked.get(id).map(|tracked| tracked.handle.current())
	}

	pub fn len(&self) -> usize {
		self.tracked.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tracked.is_empty()
	}

	pub async fn shutdown(&mut self) {
		for (_, tracked) in self.tracked.drain() {
			tracked.cancel.cancel();
			tracked.handle.join().await;
		}
	}
}

fn spawn_transition_logger(name: String, mut rx: watch::Receiver<VisibilityState>, cancel: CancellationToken) {
	tokio::spawn(async move {
		loop {
			tokio::select! {
				() = cancel.cancelled() => break,
				changed = rx.changed() => {
					if changed.is_err() {
						break;
					}
					let state = *rx.borrow_and_update();
					tracing::debug!("👁️ {} is now {:?} (cycle {})", name, state.visibility, state.cycle);
				}
			}
		}
	});
}

impl SceneSyncService {
	/// Spawn the task that drives show/hide cycles of every animated component
	pub fn spawn_visibility_supervisor(self: Arc<Self>) -> JoinHandle<()> {
		tokio::spawn(async move {
			tracing::info!("👁️ Starting visibility supervisor");

			let mut changes = self.store.subscribe();
			let mut board = VisibilityBoard::default();
			let initial = changes.borrow_and_update().state.clone();
			board.reconcile(&initial, &self.cancel_token).await;

			loop {
				tokio::select! {
					() = self.cancel_token.cancelled() => break,
					changed = changes.changed() => {
						if changed.is_err() {
							break;
						}
						let state = changes.borrow_and_update().state.clone();
						board.reconcile(&state, &self.cancel_token).await;
					}
				}
			}

			board.shutdown().await;
			tracing::info!("✅ Visibility supervisor stopped");
		})
	}
}
