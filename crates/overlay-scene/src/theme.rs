use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_THEME_ID: &str = "dark-modern";

/// Keys of the theme colour palette that can be overridden per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorKey {
	Background,
	Text,
	Accent,
	Secondary,
	Border,
	Surface,
	Positive,
	Negative,
}

impl ColorKey {
	pub const ALL: [Self; 8] = [
		Self::Background,
		Self::Text,
		Self::Accent,
		Self::Secondary,
		Self::Border,
		Self::Surface,
		Self::Positive,
		Self::Negative,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::Text => "text",
			Self::Accent => "accent",
			Self::Secondary => "secondary",
			Self::Border => "border",
			Self::Surface => "surface",
			Self::Positive => "positive",
			Self::Negative => "negative",
		}
	}
}

impl std::str::FromStr for ColorKey {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|key| key.as_str() == s).ok_or_else(|| format!("unknown colour key: {s}"))
	}
}

/// Partial colour map layered over the active theme
pub type ThemeOverrides = BTreeMap<ColorKey, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
	pub background: String,
	pub text: String,
	pub accent: String,
	pub secondary: String,
	pub border: String,
	pub surface: String,
	pub positive: String,
	pub negative: String,
}

impl ThemeColors {
	pub fn get(&self, key: ColorKey) -> &str {
		match key {
			ColorKey::Background => &self.background,
			ColorKey::Text => &self.text,
			ColorKey::Accent => &self.accent,
			ColorKey::Secondary => &self.secondary,
			ColorKey::Border => &self.border,
			ColorKey::Surface => &self.surface,
			ColorKey::Positive => &self.positive,
			ColorKey::Negative => &self.negative,
		}
	}

	fn slot_mut(&mut self, key: ColorKey) -> &mut String {
		match key {
			ColorKey::Background => &mut self.background,
			ColorKey::Text => &mut self.text,
			ColorKey::Accent => &mut self.accent,
			ColorKey::Secondary => &mut self.secondary,
			ColorKey::Border => &mut self.border,
			ColorKey::Surface => &mut self.surface,
			ColorKey::Positive => &mut self.positive,
			ColorKey::Negative => &mut self.negative,
		}
	}

	/// Copy of this palette with the overrides applied
	pub fn with_overrides(&self, overrides: &ThemeOverrides) -> Self {
		let mut colors = self.clone();
		for (key, value) in overrides {
			*colors.slot_mut(*key) = value.clone();
		}
		colors
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
	pub id: String,
	pub name: String,
	pub colors: ThemeColors,
	pub font_family: String,
}

/// Built-in palettes: id, name, font and colours in [`ColorKey::ALL`] order
const BUILT_IN: [(&str, &str, &str, [&str; 8]); 10] = [
	(
		DEFAULT_THEME_ID,
		"Dark Modern",
		"Inter, system-ui, sans-serif",
		["rgba(0, 0, 0, 0)", "#ffffff", "#8b5cf6", "#6b7280", "#374151", "#1f2937", "#10b981", "#ef4444"],
	),
	(
		"neon-cyber",
		"Neon Cyber",
		"\"Courier New\", monospace",
		["rgba(0, 0, 0, 0)", "#e0f2fe", "#0ea5e9", "#94a3b8", "#1e293b", "#0f172a", "#22d3ee", "#f43f5e"],
	),
	(
		"clean-light",
		"Clean Light",
		"Inter, system-ui, sans-serif",
		["rgba(0, 0, 0, 0)", "#111827", "#2563eb", "#4b5563", "#e5e7eb", "#ffffff", "#059669", "#dc2626"],
	),
	(
		"midnight-blue",
		"Midnight Blue",
		"\"Roboto Slab\", serif",
		["rgba(0, 0, 0, 0)", "#e2e8f0", "#fbbf24", "#1e293b", "#334155", "#0f172a", "#34d399", "#f87171"],
	),
	(
		"forest-glass",
		"Forest Glass",
		"Optima, Candara, sans-serif",
		["rgba(0, 0, 0, 0)", "#ecfdf5", "#34d399", "#064e3b", "#059669", "#022c22", "#6ee7b7", "#fca5a5"],
	),
	(
		"crimson-esports",
		"Crimson Esports",
		"Impact, Haettenschweiler, sans-serif",
		["rgba(0, 0, 0, 0)", "#ffffff", "#dc2626", "#1f2937", "#7f1d1d", "#000000", "#22c55e", "#ef4444"],
	),
	(
		"royal-gold",
		"Royal Gold",
		"\"Playfair Display\", serif",
		["rgba(0, 0, 0, 0)", "#faf5ff", "#fbbf24", "#581c87", "#7e22ce", "#3b0764", "#4ade80", "#f87171"],
	),
	(
		"slate-minimalist",
		"Slate Minimalist",
		"Helvetica, Arial, sans-serif",
		["rgba(0, 0, 0, 0)", "#f8fafc", "#94a3b8", "#334155", "#475569", "#1e293b", "#a3e635", "#fca5a5"],
	),
	(
		"retro-wave",
		"Retro Wave",
		"\"Comic Sans MS\", cursive, sans-serif",
		["rgba(0, 0, 0, 0)", "#fae8ff", "#f0abfc", "#0c4a6e", "#c026d3", "#2e1065", "#22d3ee", "#f43f5e"],
	),
	(
		"broadcast-sports",
		"Broadcast Sports",
		"Oswald, sans-serif",
		["rgba(0, 0, 0, 0)", "#ffffff", "#ea580c", "#0f172a", "#ffffff", "#1e293b", "#84cc16", "#ef4444"],
	),
];

impl Theme {
	fn from_palette(id: &str, name: &str, font_family: &str, colors: [&str; 8]) -> Self {
		let [background, text, accent, secondary, border, surface, positive, negative] = colors.map(str::to_string);
		Self {
			id: id.to_string(),
			name: name.to_string(),
			colors: ThemeColors {
				background,
				text,
				accent,
				secondary,
				border,
				surface,
				positive,
				negative,
			},
			font_family: font_family.to_string(),
		}
	}

	pub fn dark_modern() -> Self {
		let (id, name, font, colors) = BUILT_IN[0];
		Self::from_palette(id, name, font, colors)
	}

	/// Every palette shipped with the engine
	pub fn built_in() -> Vec<Self> {
		BUILT_IN.iter().map(|(id, name, font, colors)| Self::from_palette(id, name, font, *colors)).collect()
	}
}

/// Lookup of themes by id. Unknown ids resolve to the default theme.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
	themes: HashMap<String, Theme>,
	fallback: Theme,
}

impl ThemeRegistry {
	/// Registry holding the built-in palettes
	pub fn new() -> Self {
		let themes = Theme::built_in().into_iter().map(|theme| (theme.id.clone(), theme)).collect();
		Self {
			themes,
			fallback: Theme::dark_modern(),
		}
	}

	pub fn register(&mut self, theme: Theme) {
		self.themes.insert(theme.id.clone(), theme);
	}

	pub fn get(&self, id: &str) -> &Theme {
		self.themes.get(id).unwrap_or(&self.fallback)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.themes.contains_key(id)
	}

	/// All registered themes ordered by display name
	pub fn all(&self) -> Vec<&Theme> {
		let mut themes: Vec<&Theme> = self.themes.values().collect();
		themes.sort_by(|a, b| a.name.cmp(&b.name));
		themes
	}

	/// The theme for `id` with scene-level colour overrides applied
	pub fn resolve(&self, id: &str, overrides: &ThemeOverrides) -> Theme {
		let base = self.get(id);
		Theme {
			colors: base.colors.with_overrides(overrides),
			..base.clone()
		}
	}
}

impl Default for ThemeRegistry {
	fn default() -> Self {
		Self::new()
	}
}
