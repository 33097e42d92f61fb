//! Typed colors and the extension → color table.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fallback for unknown extensions and directories without a dominant type.
    pub const DEFAULT_GRAY: Color = Color::rgb(0xcc, 0xcc, 0xcc);

    /// Channel-wise linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

// Roughly the linguist colors for the languages most repositories are made of.
const BUILTIN_COLORS: &[(&str, &str)] = &[
    ("rs", "#dea584"),
    ("ts", "#3178c6"),
    ("tsx", "#3178c6"),
    ("js", "#f1e05a"),
    ("jsx", "#f1e05a"),
    ("mjs", "#f1e05a"),
    ("cjs", "#f1e05a"),
    ("py", "#3572a5"),
    ("ipynb", "#da5b0b"),
    ("go", "#00add8"),
    ("rb", "#701516"),
    ("java", "#b07219"),
    ("kt", "#a97bff"),
    ("scala", "#c22d40"),
    ("swift", "#f05138"),
    ("c", "#555555"),
    ("h", "#555555"),
    ("cpp", "#f34b7d"),
    ("cc", "#f34b7d"),
    ("hpp", "#f34b7d"),
    ("cs", "#178600"),
    ("php", "#4f5d95"),
    ("lua", "#000080"),
    ("ex", "#6e4a7e"),
    ("exs", "#6e4a7e"),
    ("hs", "#5e5086"),
    ("ml", "#3be133"),
    ("dart", "#00b4ab"),
    ("zig", "#ec915c"),
    ("jl", "#a270ba"),
    ("r", "#198ce7"),
    ("sql", "#e38c00"),
    ("sh", "#89e051"),
    ("bash", "#89e051"),
    ("html", "#e34c26"),
    ("css", "#563d7c"),
    ("scss", "#c6538c"),
    ("less", "#1d365d"),
    ("vue", "#41b883"),
    ("svelte", "#ff3e00"),
    ("json", "#292929"),
    ("yml", "#cb171e"),
    ("yaml", "#cb171e"),
    ("toml", "#9c4221"),
    ("xml", "#0060ac"),
    ("md", "#083fa1"),
    ("mdx", "#fcb32c"),
    ("txt", "#b7b7b7"),
    ("csv", "#237346"),
    ("lock", "#a5a5a5"),
    ("svg", "#ff9900"),
    ("png", "#a074c4"),
    ("jpg", "#a074c4"),
];

/// Extension → color map with a defined default.
///
/// Keys are lowercased extensions without the leading dot.
#[derive(Debug, Clone)]
pub struct ColorTable {
    colors: IndexMap<String, Color>,
    default: Color,
}

impl ColorTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let colors = BUILTIN_COLORS
            .iter()
            .filter_map(|(ext, hex)| Some(((*ext).to_string(), hex.parse().ok()?)))
            .collect();
        Self {
            colors,
            default: Color::DEFAULT_GRAY,
        }
    }

    /// The built-in table with `overrides` merged on top.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a String, &'a Color)>,
    ) -> Self {
        let mut table = Self::builtin();
        for (ext, color) in overrides {
            let key = ext.trim_start_matches('.').to_ascii_lowercase();
            table.colors.insert(key, *color);
        }
        table
    }

    pub fn get(&self, extension: &str) -> Option<Color> {
        self.colors.get(extension).copied()
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.colors.contains_key(extension)
    }

    pub fn color_or_default(&self, extension: Option<&str>) -> Color {
        extension.and_then(|e| self.get(e)).unwrap_or(self.default)
    }

    pub fn default_color(&self) -> Color {
        self.default
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::builtin()
    }
}
