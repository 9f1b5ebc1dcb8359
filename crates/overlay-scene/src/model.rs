use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier of an overlay component
pub type ComponentId = String;

/// Duration in milliseconds, as stored in scene files
pub type Millis = i64;

/// Discriminant of the overlay component union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
	Marquee,
	Journal,
	Media,
}

impl ComponentKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Marquee => "marquee",
			Self::Journal => "journal",
			Self::Media => "media",
		}
	}

	/// Capitalized label used for default component names
	pub const fn label(self) -> &'static str {
		match self {
			Self::Marquee => "Marquee",
			Self::Journal => "Journal",
			Self::Media => "Media",
		}
	}

	/// Whether components of this kind are driven by the visibility scheduler
	pub const fn is_animated(self) -> bool {
		matches!(self, Self::Marquee | Self::Journal)
	}
}

impl std::fmt::Display for ComponentKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for ComponentKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"marquee" => Ok(Self::Marquee),
			"journal" => Ok(Self::Journal),
			"media" => Ok(Self::Media),
			other => Err(format!("unknown component type: {other}")),
		}
	}
}

/// Fields shared by every component variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBase {
	pub id: ComponentId,
	pub name: String,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub z_index: i64,
	#[serde(rename = "loop")]
	pub looping: bool,
	/// Legacy single-shot animation length
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub duration: Option<Millis>,
}

/// On/off screen durations of animated widgets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenTiming {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub onscreen_duration: Option<Millis>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offscreen_duration: Option<Millis>,
}

impl ScreenTiming {
	pub const fn new(onscreen: Millis, offscreen: Millis) -> Self {
		Self {
			onscreen_duration: Some(onscreen),
			offscreen_duration: Some(offscreen),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeProps {
	pub text: String,
	/// Pixels per second
	pub speed: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub separator: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
	pub day: String,
	pub profit: f64,
}

impl JournalRow {
	pub fn new(day: impl Into<String>, profit: f64) -> Self {
		Self { day: day.into(), profit }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalProps {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub heading: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub_heading: Option<String>,
	pub data: Vec<JournalRow>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub show_total: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_family: Option<String>,
}

impl JournalProps {
	/// Sum of all profit rows
	pub fn total(&self) -> f64 {
		self.data.iter().map(|row| row.profit).sum()
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
	#[default]
	Contain,
	Cover,
	Fill,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProps {
	/// URL or embedded data URL
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_fit: Option<ObjectFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarqueeComponent {
	#[serde(flatten)]
	pub base: ComponentBase,
	#[serde(flatten)]
	pub timing: ScreenTiming,
	pub props: MarqueeProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalComponent {
	#[serde(flatten)]
	pub base: ComponentBase,
	#[serde(flatten)]
	pub timing: ScreenTiming,
	pub props: JournalProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaComponent {
	#[serde(flatten)]
	pub base: ComponentBase,
	pub props: MediaProps,
}

/// A positioned, typed overlay widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayComponent {
	Marquee(MarqueeComponent),
	Journal(JournalComponent),
	Media(MediaComponent),
}

impl OverlayComponent {
	pub const fn kind(&self) -> ComponentKind {
		match self {
			Self::Marquee(_) => ComponentKind::Marquee,
			Self::Journal(_) => ComponentKind::Journal,
			Self::Media(_) => ComponentKind::Media,
		}
	}

	pub const fn base(&self) -> &ComponentBase {
		match self {
			Self::Marquee(c) => &c.base,
			Self::Journal(c) => &c.base,
			Self::Media(c) => &c.base,
		}
	}

	pub fn base_mut(&mut self) -> &mut ComponentBase {
		match self {
			Self::Marquee(c) => &mut c.base,
			Self::Journal(c) => &mut c.base,
			Self::Media(c) => &mut c.base,
		}
	}

	pub fn id(&self) -> &str {
		&self.base().id
	}

	pub const fn z_index(&self) -> i64 {
		self.base().z_index
	}

	/// Screen timing, present only on animated variants
	pub const fn timing(&self) -> Option<&ScreenTiming> {
		match self {
			Self::Marquee(c) => Some(&c.timing),
			Self::Journal(c) => Some(&c.timing),
			Self::Media(_) => None,
		}
	}

	fn timing_mut(&mut self) -> Option<&mut ScreenTiming> {
		match self {
			Self::Marquee(c) => Some(&mut c.timing),
			Self::Journal(c) => Some(&mut c.timing),
			Self::Media(_) => None,
		}
	}

	/// Take over props and size from `source`. Does nothing across kinds.
	pub fn copy_content_from(&mut self, source: &Self) {
		match (&mut *self, source) {
			(Self::Marquee(c), Self::Marquee(s)) => c.props.clone_from(&s.props),
			(Self::Journal(c), Self::Journal(s)) => c.props.clone_from(&s.props),
			(Self::Media(c), Self::Media(s)) => c.props.clone_from(&s.props),
			_ => return,
		}
		let base = self.base_mut();
		base.width = source.base().width;
		base.height = source.base().height;
	}

	/// Apply a partial update, preserving the variant.
	///
	/// Top-level fields overwrite; `props` is merged key by key over the
	/// current props and must still decode as this variant's props.
	pub fn apply_patch(&mut self, patch: &ComponentPatch) -> Result<(), String> {
		let mut next = self.clone();

		let base = next.base_mut();
		if let Some(name) = &patch.name {
			base.name.clone_from(name);
		}
		if let Some(x) = patch.x {
			base.x = x;
		}
		if let Some(y) = patch.y {
			base.y = y;
		}
		if let Some(width) = patch.width {
			base.width = width;
		}
		if let Some(height) = patch.height {
			base.height = height;
		}
		if let Some(z_index) = patch.z_index {
			base.z_index = z_index;
		}
		if let Some(looping) = patch.looping {
			base.looping = looping;
		}
		if patch.duration.is_some() {
			base.duration = patch.duration;
		}

		if let Some(timing) = next.timing_mut() {
			if patch.onscreen_duration.is_some() {
				timing.onscreen_duration = patch.onscreen_duration;
			}
			if patch.offscreen_duration.is_some() {
				timing.offscreen_duration = patch.offscreen_duration;
			}
		}

		if let Some(props) = &patch.props {
			match &mut next {
				Self::Marquee(c) => c.props = merge_props(&c.props, props)?,
				Self::Journal(c) => c.props = merge_props(&c.props, props)?,
				Self::Media(c) => c.props = merge_props(&c.props, props)?,
			}
		}

		*self = next;
		Ok(())
	}
}

fn merge_props<P>(current: &P, patch: &Map<String, Value>) -> Result<P, String>
where
	P: Serialize + for<'de> Deserialize<'de>,
{
	let mut merged = match serde_json::to_value(current).map_err(|e| e.to_string())? {
		Value::Object(map) => map,
		_ => Map::new(),
	};
	for (key, value) in patch {
		merged.insert(key.clone(), value.clone());
	}
	serde_json::from_value(Value::Object(merged)).map_err(|e| format!("props no longer valid: {e}"))
}

/// Partial update for a single component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentPatch {
	pub name: Option<String>,
	pub x: Option<f64>,
	pub y: Option<f64>,
	pub width: Option<f64>,
	pub height: Option<f64>,
	pub z_index: Option<i64>,
	#[serde(rename = "loop")]
	pub looping: Option<bool>,
	pub duration: Option<Millis>,
	pub onscreen_duration: Option<Millis>,
	pub offscreen_duration: Option<Millis>,
	pub props: Option<Map<String, Value>>,
}

impl ComponentPatch {
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub const fn at(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}

	pub const fn sized(mut self, width: f64, height: f64) -> Self {
		self.width = Some(width);
		self.height = Some(height);
		self
	}

	pub const fn looping(mut self, looping: bool) -> Self {
		self.looping = Some(looping);
		self
	}

	pub const fn with_timing(mut self, onscreen: Millis, offscreen: Millis) -> Self {
		self.onscreen_duration = Some(onscreen);
		self.offscreen_duration = Some(offscreen);
		self
	}

	/// Merge the given JSON object into the component props.
	/// Non-object values are ignored.
	pub fn with_props(mut self, props: Value) -> Self {
		if let Value::Object(map) = props {
			self.props = Some(map);
		}
		self
	}
}
