use crate::SceneSyncService;
use std::sync::Arc;
use tokio::task::JoinHandle;

impl SceneSyncService {
	/// Spawn the poll/push loop against the remote scene host
	pub fn spawn_sync(self: Arc<Self>) -> JoinHandle<()> {
		self.sync_engine().spawn(self.cancel_token.clone())
	}

	/// Spawn the task writing every scene change to the local mirror
	pub fn spawn_mirror(self: Arc<Self>) -> JoinHandle<()> {
		self.persistence.spawn_mirror(&self.store, self.cancel_token.clone())
	}
}
