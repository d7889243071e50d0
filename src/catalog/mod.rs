//! Themed asset lookup
//!
//! The catalog is a collaborator: it owns asset storage and hands out
//! [`AssetRef`]s. Lookups never fail; an empty pool yields fewer results, an
//! emoji glyph, or [`AssetRef::Missing`]. Every random selection is driven by
//! the caller's RNG so synthesis stays reproducible.

pub mod fs;

pub use fs::FsAssetCatalog;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a picture in the catalog, or a textual stand-in for one
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AssetRef {
    /// Path rooted at the public static prefix (e.g. `/uploads/...`), an
    /// absolute URL, or a `data:` URI
    Image(String),
    /// Emoji or short text rendered inline
    Glyph(String),
    /// Nothing available; rendered as an empty placeholder region
    #[default]
    Missing,
}

impl AssetRef {
    /// Classify a raw catalog value the way the static server sees it.
    pub fn from_value(value: &str) -> Self {
        let v = value.trim();
        if v.is_empty() {
            AssetRef::Missing
        } else if v.starts_with('/') || v.starts_with("http://") || v.starts_with("https://") || v.starts_with("data:") {
            AssetRef::Image(v.to_string())
        } else {
            AssetRef::Glyph(v.to_string())
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, AssetRef::Image(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AssetRef::Missing)
    }

    /// The image path if this reference points at one
    pub fn image_path(&self) -> Option<&str> {
        match self {
            AssetRef::Image(p) => Some(p.as_str()),
            _ => None,
        }
    }
}

/// Supported worksheet themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dinosaur,
    Ocean,
    Space,
    Unicorn,
    Vehicles,
    Safari,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Dinosaur,
        Theme::Ocean,
        Theme::Space,
        Theme::Unicorn,
        Theme::Vehicles,
        Theme::Safari,
    ];

    /// Resolve a free-form theme name, accepting common aliases.
    /// Unknown or absent names fall back to [`Theme::Dinosaur`].
    pub fn resolve(name: Option<&str>) -> Theme {
        let Some(name) = name else {
            return Theme::Dinosaur;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "dinosaur" | "dinosaurs" | "dino" => Theme::Dinosaur,
            "ocean" | "sea" => Theme::Ocean,
            "space" | "astronaut" => Theme::Space,
            "unicorn" => Theme::Unicorn,
            "vehicles" | "vehicle" | "cars" | "car" => Theme::Vehicles,
            "safari" | "animals" => Theme::Safari,
            _ => Theme::Dinosaur,
        }
    }

    /// Directory name used by the asset tree
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dinosaur => "dinosaur",
            Theme::Ocean => "ocean",
            Theme::Space => "space",
            Theme::Unicorn => "unicorn",
            Theme::Vehicles => "vehicles",
            Theme::Safari => "safari",
        }
    }

    /// Emoji icons used when the theme has no pictures on disk
    pub fn glyphs(&self) -> &'static [&'static str] {
        match self {
            Theme::Dinosaur => &["🦕", "🦖", "🌋", "🥚", "🦴"],
            Theme::Ocean => &["🐠", "🐙", "🦈", "🐚", "🌊"],
            Theme::Space => &["🚀", "🌟", "🌙", "🪐", "👨‍🚀"],
            Theme::Unicorn => &["🦄", "🌈", "⭐", "✨", "🎀"],
            Theme::Vehicles => &["🚗", "🚙", "🚕", "🏎️", "🚓"],
            Theme::Safari => &["🦁", "🐘", "🦒", "🦓", "🌴"],
        }
    }

    /// The theme mascot glyph
    pub fn mascot(&self) -> &'static str {
        match self {
            Theme::Dinosaur => "🦖",
            Theme::Ocean => "🐋",
            Theme::Space => "🚀",
            Theme::Unicorn => "🦄",
            Theme::Vehicles => "🚗",
            Theme::Safari => "🦁",
        }
    }

    pub fn palette(&self) -> ThemePalette {
        let (primary, secondary, accent, light) = match self {
            Theme::Dinosaur => ("#4CAF50", "#81C784", "#2E7D32", "rgba(76, 175, 80, 0.1)"),
            Theme::Ocean => ("#2196F3", "#64B5F6", "#1565C0", "rgba(33, 150, 243, 0.1)"),
            Theme::Space => ("#673AB7", "#9575CD", "#4527A0", "rgba(103, 58, 183, 0.1)"),
            Theme::Unicorn => ("#E91E63", "#F48FB1", "#AD1457", "rgba(233, 30, 99, 0.1)"),
            Theme::Vehicles => ("#FF9800", "#FFB74D", "#E65100", "rgba(255, 152, 0, 0.1)"),
            Theme::Safari => ("#795548", "#A1887F", "#4E342E", "rgba(121, 85, 72, 0.1)"),
        };
        ThemePalette {
            primary: Color::from_static(primary),
            secondary: Color::from_static(secondary),
            accent: Color::from_static(accent),
            light: Color::from_static(light),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CSS color value; never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Accepts `#rgb`/`#rrggbb` hex and `rgb(...)`/`rgba(...)` functional notation.
    pub fn parse(value: &str) -> Option<Color> {
        let v = value.trim();
        let hex_ok = v
            .strip_prefix('#')
            .map(|h| (h.len() == 3 || h.len() == 6) && h.chars().all(|c| c.is_ascii_hexdigit()))
            .unwrap_or(false);
        let func_ok = (v.starts_with("rgb(") || v.starts_with("rgba(")) && v.ends_with(')');
        if hex_ok || func_ok {
            Some(Color(v.to_string()))
        } else {
            None
        }
    }

    fn from_static(value: &'static str) -> Color {
        Color(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("not a color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four colors resolved once per request from the theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub light: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Theme::Dinosaur.palette()
    }
}

/// A picture for a letter plus the word it illustrates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterAsset {
    pub picture: AssetRef,
    pub word: String,
}

/// Themed picture and color lookups consumed by the synthesizers.
///
/// Implementations must be synchronous and infallible. Methods that draw
/// more than one asset return at most `count` entries, fewer when the pool
/// is smaller.
pub trait AssetCatalog: Send + Sync {
    fn palette(&self, theme: Theme) -> ThemePalette {
        theme.palette()
    }

    /// Colored pictures for the theme
    fn theme_pictures(&self, theme: Theme, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef>;

    /// Pictures from the shared decoration library, any theme
    fn decor_pictures(&self, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef>;

    /// A line-art outline for coloring pages
    fn line_art(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef;

    /// The theme mascot, preferring a waving pose
    fn character(&self, theme: Theme) -> AssetRef;

    /// A small pose used next to the page title
    fn title_icon(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef;

    /// Stickers for the page border
    fn border_stickers(&self, theme: Theme, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef>;

    /// Reference picture and word for a letter
    fn letter_picture(&self, letter: char, rng: &mut dyn RngCore) -> LetterAsset;

    /// Prompt artwork for creative pages (`blank_sign`, `halfbody`)
    fn creative_prompt(&self, theme: Theme, prompt: &str, rng: &mut dyn RngCore) -> AssetRef;

    /// A cached spot-the-difference picture
    fn spot_difference(&self, theme: Theme, rng: &mut dyn RngCore) -> AssetRef;
}

/// Word illustrated by each letter when no picture name is available
pub fn default_letter_word(letter: char) -> &'static str {
    match letter.to_ascii_uppercase() {
        'A' => "Apple",
        'B' => "Ball",
        'C' => "Cat",
        'D' => "Dog",
        'E' => "Elephant",
        'F' => "Frog",
        'G' => "Giraffe",
        'H' => "Horse",
        'I' => "Ice Cream",
        'J' => "Jellyfish",
        'K' => "Kite",
        'L' => "Lion",
        'M' => "Monkey",
        'N' => "Nest",
        'O' => "Octopus",
        'P' => "Penguin",
        'Q' => "Queen",
        'R' => "Robot",
        'S' => "Sun",
        'T' => "Tiger",
        'U' => "Umbrella",
        'V' => "Violin",
        'W' => "Whale",
        'X' => "Xylophone",
        'Y' => "Yarn",
        'Z' => "Zebra",
        _ => "Letter",
    }
}

/// Emoji stand-in for each letter's picture
pub fn letter_glyph(letter: char) -> &'static str {
    match letter.to_ascii_uppercase() {
        'A' => "🍎",
        'B' => "🎈",
        'C' => "🐱",
        'D' => "🐕",
        'E' => "🐘",
        'F' => "🐸",
        'G' => "🦒",
        'H' => "🐴",
        'I' => "🍦",
        'J' => "🤹",
        'K' => "🔑",
        'L' => "🦁",
        'M' => "🐵",
        'N' => "🥜",
        'O' => "🐙",
        'P' => "🐧",
        'Q' => "👑",
        'R' => "🤖",
        'S' => "🌞",
        'T' => "🐯",
        'U' => "☂️",
        'V' => "🎻",
        'W' => "🍉",
        'X' => "❌",
        'Y' => "🧶",
        'Z' => "🦓",
        _ => "📝",
    }
}

/// Glyphs used when the decoration library is empty
pub const DECOR_GLYPHS: [&str; 10] = ["🌟", "🌈", "🍎", "🚗", "🐶", "🦄", "🍓", "🚀", "🦖", "🐱"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_values_are_classified() {
        assert_eq!(AssetRef::from_value(""), AssetRef::Missing);
        assert_eq!(AssetRef::from_value("   "), AssetRef::Missing);
        assert!(AssetRef::from_value("/uploads/assets/x.png").is_image());
        assert!(AssetRef::from_value("data:image/png;base64,AAAA").is_image());
        assert_eq!(AssetRef::from_value("🦖"), AssetRef::Glyph("🦖".into()));
    }

    #[test]
    fn unknown_themes_fall_back_to_dinosaur() {
        assert_eq!(Theme::resolve(None), Theme::Dinosaur);
        assert_eq!(Theme::resolve(Some("jungle")), Theme::Dinosaur);
        assert_eq!(Theme::resolve(Some("Sea")), Theme::Ocean);
        assert_eq!(Theme::resolve(Some("cars")), Theme::Vehicles);
    }

    #[test]
    fn every_palette_color_is_valid() {
        for theme in Theme::ALL {
            let p = theme.palette();
            for c in [&p.primary, &p.secondary, &p.accent, &p.light] {
                assert!(!c.as_str().is_empty());
                assert!(Color::parse(c.as_str()).is_some(), "{theme}: {c}");
            }
        }
    }

    #[test]
    fn color_rejects_garbage() {
        assert!(Color::parse("").is_none());
        assert!(Color::parse("#12").is_none());
        assert!(Color::parse("green").is_none());
        assert!(Color::parse("#a1e44d").is_some());
        let err = serde_json::from_str::<Color>("\"\"");
        assert!(err.is_err());
    }
}
