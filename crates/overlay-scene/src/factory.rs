use crate::model::{
	ComponentBase, ComponentKind, JournalComponent, JournalProps, JournalRow, MarqueeComponent, MarqueeProps, MediaComponent, MediaProps, ObjectFit,
	OverlayComponent, ScreenTiming,
};

/// Pixel offset applied per existing component of the same kind
pub const CASCADE_OFFSET: f64 = 20.0;

pub const MARQUEE_HEIGHT: f64 = 60.0;
pub const JOURNAL_SIZE: (f64, f64) = (300.0, 400.0);
pub const MEDIA_SIZE: (f64, f64) = (400.0, 300.0);

const WEEKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

fn default_size(kind: ComponentKind, canvas_width: f64) -> (f64, f64) {
	match kind {
		ComponentKind::Marquee => (canvas_width, MARQUEE_HEIGHT),
		ComponentKind::Journal => JOURNAL_SIZE,
		ComponentKind::Media => MEDIA_SIZE,
	}
}

/// Build a new component with type defaults, centred on the canvas and
/// cascaded diagonally away from earlier components of the same kind.
pub fn create_component(kind: ComponentKind, existing: &[OverlayComponent], canvas_width: f64, canvas_height: f64, name: Option<&str>) -> OverlayComponent {
	let same_kind = existing.iter().filter(|c| c.kind() == kind).count();
	#[allow(clippy::cast_precision_loss)]
	let offset = same_kind as f64 * CASCADE_OFFSET;

	let (width, height) = default_size(kind, canvas_width);
	let max_z = existing.iter().map(OverlayComponent::z_index).max().unwrap_or(0);

	let base = ComponentBase {
		id: uuid::Uuid::new_v4().to_string(),
		name: name.map_or_else(|| format!("{} {}", kind.label(), same_kind + 1), str::to_string),
		x: canvas_width / 2.0 - width / 2.0 + offset,
		y: canvas_height / 2.0 - height / 2.0 + offset,
		width,
		height,
		z_index: max_z + 1,
		looping: true,
		duration: None,
	};

	match kind {
		ComponentKind::Marquee => OverlayComponent::Marquee(MarqueeComponent {
			base,
			timing: ScreenTiming::new(20_000, 5_000),
			props: MarqueeProps {
				text: "New Marquee Text".to_string(),
				speed: 50.0,
				separator: Some(" • ".to_string()),
				font_family: Some("inherit".to_string()),
			},
		}),
		ComponentKind::Journal => OverlayComponent::Journal(JournalComponent {
			base,
			timing: ScreenTiming::new(10_000, 5_000),
			props: JournalProps {
				heading: Some("Weekly Journal".to_string()),
				sub_heading: Some(format!("Week {}", same_kind + 1)),
				data: WEEKDAYS.iter().map(|day| JournalRow::new(*day, 0.0)).collect(),
				show_total: Some(true),
				font_family: Some("inherit".to_string()),
			},
		}),
		ComponentKind::Media => OverlayComponent::Media(MediaComponent {
			base,
			props: MediaProps {
				src: Some(String::new()),
				file_name: None,
				object_fit: Some(ObjectFit::Contain),
			},
		}),
	}
}

/// Components every fresh scene starts with
pub fn initial_components() -> Vec<OverlayComponent> {
	vec![
		OverlayComponent::Marquee(MarqueeComponent {
			base: ComponentBase {
				id: "default-marquee".to_string(),
				name: "Disclaimer".to_string(),
				x: 0.0,
				y: 1020.0,
				width: 1920.0,
				height: MARQUEE_HEIGHT,
				z_index: 1,
				looping: true,
				duration: None,
			},
			timing: ScreenTiming::new(20_000, 5_000),
			props: MarqueeProps {
				text: "DISCLAIMER: Not financial advice. For educational purposes only.".to_string(),
				speed: 50.0,
				separator: Some(" • ".to_string()),
				font_family: Some("inherit".to_string()),
			},
		}),
		OverlayComponent::Journal(JournalComponent {
			base: ComponentBase {
				id: "default-journal".to_string(),
				name: "Weekly Journal".to_string(),
				x: 50.0,
				y: 50.0,
				width: JOURNAL_SIZE.0,
				height: JOURNAL_SIZE.1,
				z_index: 2,
				looping: true,
				duration: None,
			},
			timing: ScreenTiming::new(10_000, 5_000),
			props: JournalProps {
				heading: Some("Weekly Journal".to_string()),
				sub_heading: Some("Current Week".to_string()),
				data: WEEKDAYS.iter().zip([110.0, 913.0, 0.0, 0.0, 0.0]).map(|(day, profit)| JournalRow::new(*day, profit)).collect(),
				show_total: Some(true),
				font_family: Some("inherit".to_string()),
			},
		}),
	]
}
