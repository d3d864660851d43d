// Graph rendering configuration
//
// Loaded from TOML, overridable from the command line. Renderer names are
// validated at parse time so a bad selection fails before any traversal.

use crate::error::{ProfileError, Result};
use crate::label::{FontConfig, LabelRenderer, PlainTextRenderer, StructuredTableRenderer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Available label rendering strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RendererKind {
    /// Single-line quoted text labels
    Simple,
    /// HTML-like table labels
    #[default]
    Table,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Simple => "simple",
            RendererKind::Table => "table",
        }
    }

    /// Instantiate the strategy for this kind
    pub fn renderer(&self) -> Box<dyn LabelRenderer> {
        match self {
            RendererKind::Simple => Box::new(PlainTextRenderer),
            RendererKind::Table => Box::new(StructuredTableRenderer),
        }
    }
}

impl FromStr for RendererKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(RendererKind::Simple),
            "table" => Ok(RendererKind::Table),
            other => Err(ProfileError::UnknownRenderer(other.to_string())),
        }
    }
}

impl TryFrom<String> for RendererKind {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RendererKind> for String {
    fn from(kind: RendererKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for DOT generation
///
/// # Example
/// ```
/// use dotprof::config::{DotConfig, RendererKind};
///
/// let config = DotConfig::from_toml_str("label_renderer = \"simple\"").unwrap();
/// assert_eq!(config.label_renderer, RendererKind::Simple);
/// assert_eq!(config.font_name, "Menlo");
/// assert_eq!(config.base_font_size, 14);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotConfig {
    /// Font used for nodes and edges
    pub font_name: String,

    /// Base font size in points; node sizes scale from it
    pub base_font_size: u32,

    /// Label strategy for every node of the run
    pub label_renderer: RendererKind,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            font_name: "Menlo".to_string(),
            base_font_size: 14,
            label_renderer: RendererKind::Table,
        }
    }
}

impl DotConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DotConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Select the renderer by name
    pub fn with_renderer(mut self, name: &str) -> Result<Self> {
        self.label_renderer = name.parse()?;
        Ok(self)
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    pub fn with_base_font_size(mut self, size: u32) -> Self {
        self.base_font_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_font_size == 0 {
            return Err(ProfileError::InvalidConfig(
                "base_font_size must be at least 1".to_string(),
            ));
        }
        if self.font_name.trim().is_empty() {
            return Err(ProfileError::InvalidConfig(
                "font_name must not be empty".to_string(),
            ));
        }
        if self.font_name.chars().any(char::is_control) {
            return Err(ProfileError::InvalidConfig(format!(
                "font_name must not contain control characters: {:?}",
                self.font_name
            )));
        }
        Ok(())
    }

    pub fn font(&self) -> FontConfig {
        FontConfig {
            name: self.font_name.clone(),
            base_size: self.base_font_size,
        }
    }
}
