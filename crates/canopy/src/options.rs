use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::palette::Color;

/// Which property of a node drives its fill color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorEncoding {
    /// File extension, via the color table.
    #[default]
    Type,
    /// Commit count (churn).
    NumberOfChanges,
    /// Timestamp of the newest commit.
    LastChange,
}

impl ColorEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorEncoding::Type => "type",
            ColorEncoding::NumberOfChanges => "number-of-changes",
            ColorEncoding::LastChange => "last-change",
        }
    }
}

impl fmt::Display for ColorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type" => Ok(Self::Type),
            "number-of-changes" => Ok(Self::NumberOfChanges),
            "last-change" => Ok(Self::LastChange),
            other => Err(Error::InvalidOptions {
                message: format!(
                    "unknown color encoding `{other}` (expected type, number-of-changes or last-change)"
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Canvas width in output units.
    pub width: f64,
    /// Canvas height in output units. Packing and reflow get 1.3x this as headroom.
    pub height: f64,
    /// Deepest level that is emitted and reflowed. Root is depth 0.
    pub max_depth: usize,
    pub color_encoding: ColorEncoding,
    /// Extension → color entries merged over the built-in table.
    pub color_overrides: IndexMap<String, Color>,
    /// Passed through to the renderer untouched.
    pub highlighted_paths: Vec<String>,
    /// Hard cap on emitted nodes; the depth-first tail beyond it is dropped.
    pub max_nodes: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            max_depth: 9,
            color_encoding: ColorEncoding::Type,
            color_overrides: IndexMap::new(),
            highlighted_paths: Vec::new(),
            max_nodes: 5000,
        }
    }
}

impl LayoutOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(Error::InvalidOptions { message }) };
        if self.max_depth < 1 {
            return invalid("maxDepth must be at least 1".to_string());
        }
        if self.max_nodes < 1 {
            return invalid("maxNodes must be at least 1".to_string());
        }
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if !(v.is_finite() && v > 0.0) {
                return invalid(format!("{name} must be a positive finite number, got {v}"));
            }
        }
        Ok(())
    }
}
