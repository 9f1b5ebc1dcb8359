use crate::model::Millis;

/// Floor applied to the configured speed so a zero or negative value still scrolls
const MIN_SPEED: f64 = 1.0;

/// Seconds one marquee scroll cycle takes.
///
/// A positive legacy fixed duration wins. Otherwise the cycle covers ten
/// times the measured content width at `speed` pixels per second, or a fixed
/// thousand pixels when nothing has been measured yet.
pub fn scroll_cycle_seconds(content_width: f64, speed: f64, legacy_duration: Option<Millis>) -> f64 {
	if let Some(duration) = legacy_duration.filter(|ms| *ms > 0) {
		#[allow(clippy::cast_precision_loss)]
		return duration as f64 / 1000.0;
	}

	let speed = speed.max(MIN_SPEED);
	if content_width > 0.0 {
		content_width * 10.0 / speed
	} else {
		1000.0 / speed
	}
}

/// Same as [`scroll_cycle_seconds`] in whole milliseconds
pub fn scroll_cycle_millis(content_width: f64, speed: f64, legacy_duration: Option<Millis>) -> Millis {
	#[allow(clippy::cast_possible_truncation)]
	let millis = (scroll_cycle_seconds(content_width, speed, legacy_duration) * 1000.0).round() as Millis;
	millis
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_legacy_duration_wins() {
		assert_eq!(scroll_cycle_seconds(500.0, 50.0, Some(12_000)), 12.0);
	}

	#[test]
	fn test_non_positive_legacy_duration_is_ignored() {
		assert_eq!(scroll_cycle_seconds(0.0, 50.0, Some(0)), 20.0);
		assert_eq!(scroll_cycle_seconds(500.0, 50.0, Some(-3000)), 100.0);
		assert_eq!(scroll_cycle_millis(0.0, 50.0, Some(0)), 20_000);
	}

	#[test]
	fn test_measured_width() {
		assert_eq!(scroll_cycle_seconds(500.0, 50.0, None), 100.0);
		assert_eq!(scroll_cycle_millis(500.0, 50.0, None), 100_000);
	}

	#[test]
	fn test_unmeasured_width_uses_fallback_distance() {
		assert_eq!(scroll_cycle_seconds(0.0, 50.0, None), 20.0);
	}

	#[test]
	fn test_speed_is_clamped() {
		assert_eq!(scroll_cycle_seconds(0.0, 0.0, None), 1000.0);
		assert_eq!(scroll_cycle_seconds(100.0, -5.0, None), 1000.0);
	}
}
