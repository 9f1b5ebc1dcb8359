use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};

/// Trailing-edge debounce timer. Each `arm` pushes the deadline out again;
/// awaiting it resolves once a full quiet period has passed since the last one.
#[derive(Debug)]
pub struct Debouncer {
	delay: Duration,
	sleep: Pin<Box<Sleep>>,
	armed: bool,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			sleep: Box::pin(sleep(delay)),
			armed: false,
		}
	}

	pub fn arm(&mut self) {
		self.sleep.as_mut().reset(Instant::now() + self.delay);
		self.armed = true;
	}

	pub fn disarm(&mut self) {
		self.armed = false;
	}

	pub const fn is_armed(&self) -> bool {
		self.armed
	}
}

/// Resolves when the armed deadline passes and disarms itself.
/// Stays pending while disarmed, so guard it with [`Debouncer::is_armed`] in `select!`.
impl Future for Debouncer {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if !self.armed {
			return Poll::Pending;
		}
		match self.sleep.as_mut().poll(cx) {
			Poll::Ready(()) => {
				self.armed = false;
				Poll::Ready(())
			}
			Poll::Pending => Poll::Pending,
		}
	}
}
