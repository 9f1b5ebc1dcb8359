use crate::model::{Millis, OverlayComponent};
use crate::velocity::scroll_cycle_millis;
use serde::Serialize;
use std::time::Duration;

mod scheduler;

pub use scheduler::{VisibilityHandle, VisibilityScheduler, VisibilityState};

/// Hidden phase length used when a component leaves it unset
pub const DEFAULT_OFFSCREEN: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	Visible,
	Hidden,
}

/// What happens after entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTransition {
	/// Switch to the given state once the duration has elapsed
	After(Duration, Visibility),
	/// Switch on the next frame boundary without the current state ever being shown
	NextFrame(Visibility),
	/// Stay put until reset or retimed
	Never,
}

/// Resolved show/hide timing of one animated component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityTiming {
	/// Zero means visible indefinitely
	pub onscreen: Duration,
	pub offscreen: Duration,
	pub looping: bool,
}

fn non_negative(ms: Millis) -> Duration {
	Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

impl VisibilityTiming {
	pub fn new(onscreen: Millis, offscreen: Option<Millis>, looping: bool) -> Self {
		Self {
			onscreen: non_negative(onscreen),
			offscreen: offscreen.map_or(DEFAULT_OFFSCREEN, non_negative),
			looping,
		}
	}

	/// Timing for a component, or `None` for kinds that are always shown.
	///
	/// A marquee without an explicit on-screen duration stays up for one
	/// scroll cycle of its measured content; a journal stays up indefinitely.
	pub fn for_component(component: &OverlayComponent, measured_width: f64) -> Option<Self> {
		let base = component.base();
		let (onscreen, offscreen) = match component {
			OverlayComponent::Marquee(marquee) => (
				marquee
					.timing
					.onscreen_duration
					.unwrap_or_else(|| scroll_cycle_millis(measured_width, marquee.props.speed, base.duration)),
				marquee.timing.offscreen_duration,
			),
			OverlayComponent::Journal(journal) => (journal.timing.onscreen_duration.unwrap_or(0), journal.timing.offscreen_duration),
			OverlayComponent::Media(_) => return None,
		};
		Some(Self::new(onscreen, offscreen, base.looping))
	}

	pub fn next_transition(&self, from: Visibility) -> NextTransition {
		match from {
			Visibility::Visible if self.onscreen.is_zero() => NextTransition::Never,
			Visibility::Visible => NextTransition::After(self.onscreen, Visibility::Hidden),
			Visibility::Hidden if !self.looping => NextTransition::Never,
			Visibility::Hidden if self.offscreen.is_zero() => NextTransition::NextFrame(Visibility::Visible),
			Visibility::Hidden => NextTransition::After(self.offscreen, Visibility::Visible),
		}
	}

	/// Whether hiding would be skipped straight back to visible
	pub(crate) fn skips_hidden(&self) -> bool {
		matches!(self.next_transition(Visibility::Hidden), NextTransition::NextFrame(_))
	}
}

/// Deterministic step-through of the visibility state machine.
///
/// Advancing by elapsed time visits every transition in order, so the same
/// sequence of calls always lands in the same state.
#[derive(Debug, Clone)]
pub struct VisibilityClock {
	timing: VisibilityTiming,
	visibility: Visibility,
	in_phase: Duration,
	cycle: u64,
}

impl VisibilityClock {
	pub const fn new(timing: VisibilityTiming) -> Self {
		Self {
			timing,
			visibility: Visibility::Visible,
			in_phase: Duration::ZERO,
			cycle: 0,
		}
	}

	pub const fn visibility(&self) -> Visibility {
		self.visibility
	}

	/// Number of times the component has come back on screen
	pub const fn cycle(&self) -> u64 {
		self.cycle
	}

	pub fn advance(&mut self, mut elapsed: Duration) -> Visibility {
		loop {
			match self.timing.next_transition(self.visibility) {
				NextTransition::Never => {
					self.in_phase = self.in_phase.saturating_add(elapsed);
					break;
				}
				NextTransition::NextFrame(to) => self.enter(to),
				NextTransition::After(length, to) => {
					let remaining = length.saturating_sub(self.in_phase);
					if elapsed < remaining {
						self.in_phase += elapsed;
						break;
					}
					elapsed -= remaining;
					self.enter(to);
				}
			}
		}
		self.visibility
	}

	/// Back to visible with the phase timer restarted.
	/// Only a hidden component counts as coming back on screen.
	pub fn reset(&mut self) {
		if self.visibility == Visibility::Visible {
			self.in_phase = Duration::ZERO;
		} else {
			self.enter(Visibility::Visible);
		}
	}

	/// Swap timings and restart the current phase
	pub fn retime(&mut self, timing: VisibilityTiming) {
		self.timing = timing;
		self.in_phase = Duration::ZERO;
	}

	fn enter(&mut self, to: Visibility) {
		if to == Visibility::Visible {
			self.cycle += 1;
		}
		self.visibility = to;
		self.in_phase = Duration::ZERO;
	}
}
