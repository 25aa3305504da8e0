//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. A single file in
//! the content root is layered on top of stock defaults; it only needs the
//! keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml       # Overrides stock defaults
//! ├── posts/
//! └── projects/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "folio"
//! author = ""
//! description = ""
//! home_recent = 5              # Posts listed on the home page
//! default_theme = "system"     # light | dark | system
//!
//! [[collections]]
//! name = "writing"             # URL prefix
//! title = "Writing"
//! dir = "posts"                # Directory under the content root
//! navigation = "clamping"      # clamping | wrapping
//!
//! [[collections]]
//! name = "projects"
//! title = "Projects"
//! dir = "projects"
//! navigation = "wrapping"
//!
//! [content]
//! extensions = ["md", "markdown", "mdx"]
//! cache = false
//!
//! [render]
//! highlight = true
//! diagram_languages = ["mermaid", "dot", "graphviz", "plantuml"]
//! widgets = ["Callout", "Figure", "YouTube"]
//! # diagram_command = "mmdc -i - -o -"
//!
//! [toc]
//! reserved_titles = ["Subscribe"]
//! offset = 150.0
//! bottom_threshold = 100.0
//! throttle_ms = 100
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//!
//! [logging]
//! level = "info"
//! format = "compact"           # compact | json
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only override the light mode background
//! [colors.light]
//! background = "#fafafa"
//! ```
//!
//! Arrays (including `[[collections]]`) replace the default array as a
//! whole. Unknown keys are rejected to catch typos early.

use crate::index::NavigationPolicy;
use crate::store::DEFAULT_EXTENSIONS;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide identity shown in page shells.
    pub site: SiteInfo,
    /// Post collections, each a directory under the content root.
    pub collections: Vec<CollectionConfig>,
    /// Which files count as posts.
    pub content: ContentConfig,
    /// Markdown rendering collaborators.
    pub render: RenderConfig,
    /// Table-of-contents scroll tracking.
    pub toc: TocConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Log level and output format.
    pub logging: LoggingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            collections: default_collections(),
            content: ContentConfig::default(),
            render: RenderConfig::default(),
            toc: TocConfig::default(),
            colors: ColorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collections.is_empty() {
            return Err(ConfigError::Validation(
                "at least one collection is required".into(),
            ));
        }
        let mut names = HashSet::new();
        for collection in &self.collections {
            if collection.name.trim().is_empty() || collection.dir.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "collections need a non-empty name and dir".into(),
                ));
            }
            if !names.insert(collection.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate collection name '{}'",
                    collection.name
                )));
            }
        }
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        if self.toc.throttle_ms == 0 {
            return Err(ConfigError::Validation(
                "toc.throttle_ms must be greater than 0".into(),
            ));
        }
        if self.toc.offset < 0.0 || self.toc.bottom_threshold < 0.0 {
            return Err(ConfigError::Validation(
                "toc.offset and toc.bottom_threshold must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Look up a collection by name.
    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Number of recent posts per collection on the home page.
    pub home_recent: usize,
    /// Theme used before a visitor picks one.
    pub default_theme: Theme,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "folio".to_string(),
            author: String::new(),
            description: String::new(),
            home_recent: 5,
            default_theme: Theme::System,
        }
    }
}

/// One post collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// URL prefix and CLI name (`writing` → `/writing/<slug>/`).
    pub name: String,
    /// Heading shown on the collection index.
    #[serde(default)]
    pub title: String,
    /// Directory under the content root.
    pub dir: String,
    /// Prev/next rule on post pages.
    #[serde(default)]
    pub navigation: NavigationPolicy,
}

impl CollectionConfig {
    /// Title for display, falling back to the name.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

fn default_collections() -> Vec<CollectionConfig> {
    vec![
        CollectionConfig {
            name: "writing".to_string(),
            title: "Writing".to_string(),
            dir: "posts".to_string(),
            navigation: NavigationPolicy::Clamping,
        },
        CollectionConfig {
            name: "projects".to_string(),
            title: "Projects".to_string(),
            dir: "projects".to_string(),
            navigation: NavigationPolicy::Wrapping,
        },
    ]
}

/// Which files the store reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Recognized extensions, case-insensitive, without the dot.
    pub extensions: Vec<String>,
    /// Reuse parses of unchanged files (content-hashed).
    pub cache: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cache: false,
        }
    }
}

/// Markdown rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Run fenced code through the syntax highlighter.
    pub highlight: bool,
    /// Fenced-code language tags rendered as diagrams.
    pub diagram_languages: Vec<String>,
    /// Block-level custom tags recognized as widgets.
    pub widgets: Vec<String>,
    /// Command that reads diagram source on stdin and writes SVG to stdout.
    /// `{lang}` is replaced by the language tag. Unset: diagrams are left
    /// for client-side rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_command: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            diagram_languages: ["mermaid", "dot", "graphviz", "plantuml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            widgets: ["Callout", "Figure", "YouTube"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            diagram_command: None,
        }
    }
}

/// Scroll-sync parameters, passed to the page script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// Level-2 headings with exactly these texts are left out of the TOC.
    pub reserved_titles: Vec<String>,
    /// A heading is "reached" once its top is within this many pixels
    /// below the viewport top.
    pub offset: f64,
    /// Distance from the document bottom that activates the last entry.
    pub bottom_threshold: f64,
    /// Minimum interval between scroll recomputations.
    pub throttle_ms: u64,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            reserved_titles: vec!["Subscribe".to_string()],
            offset: 150.0,
            bottom_threshold: 100.0,
            throttle_ms: 100,
        }
    }
}

/// Log output settings. `RUST_LOG` overrides `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted text (dates, reading time, TOC entries).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Link color.
    pub link: String,
    /// Link hover color.
    pub link_hover: String,
    /// Background of code blocks.
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#2f5d9b".to_string(),
            link_hover: "#000000".to_string(),
            code_background: "#f5f5f5".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#8fb4e8".to_string(),
            link_hover: "#ffffff".to_string(),
            code_background: "#161616".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the content root (content/config.toml). Only the keys
# you want to change are needed. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "folio"
author = ""
description = ""

# Recent posts per collection listed on the home page.
home_recent = 5

# Theme before a visitor chooses one: "light", "dark" or "system".
default_theme = "system"

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Each collection is a directory of posts under the content root.
# `navigation` picks the prev/next rule on post pages:
#   "clamping" - no previous at the oldest post, no next at the newest
#   "wrapping" - neighbours cycle to the opposite end
# Declaring [[collections]] replaces this whole list.
[[collections]]
name = "writing"
title = "Writing"
dir = "posts"
navigation = "clamping"

[[collections]]
name = "projects"
title = "Projects"
dir = "projects"
navigation = "wrapping"

# ---------------------------------------------------------------------------
# Content files
# ---------------------------------------------------------------------------
[content]
# File extensions read as posts (case-insensitive).
extensions = ["md", "markdown", "mdx"]

# Reuse parses of files whose bytes have not changed.
cache = false

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Syntax-highlight fenced code blocks.
highlight = true

# Fenced code with one of these language tags becomes a diagram.
diagram_languages = ["mermaid", "dot", "graphviz", "plantuml"]

# Block-level tags rendered as widgets, e.g. <Callout kind="note" />.
widgets = ["Callout", "Figure", "YouTube"]

# Command that reads diagram source on stdin and prints SVG.
# {lang} is replaced by the language tag. Leave unset to render
# diagrams in the browser instead.
# diagram_command = "mmdc --input - --output - --outputFormat svg"

# ---------------------------------------------------------------------------
# Table of contents scroll tracking
# ---------------------------------------------------------------------------
[toc]
# Level-2 headings with exactly these texts are left out of the TOC.
reserved_titles = ["Subscribe"]

# Pixels below the viewport top at which a heading becomes active.
offset = 150.0

# Within this many pixels of the page bottom, the last heading is active.
bottom_threshold = 100.0

# Minimum milliseconds between scroll recomputations.
throttle_ms = 100

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Dates, reading time, TOC
border = "#e0e0e0"
link = "#2f5d9b"
link_hover = "#000000"
code_background = "#f5f5f5"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#8fb4e8"
link_hover = "#ffffff"
code_background = "#161616"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Default level; RUST_LOG takes precedence when set.
level = "info"

# "compact" for humans, "json" for log collectors.
format = "compact"
"##
}

/// Generate CSS custom properties from color config.
///
/// Light values apply by default and dark values under
/// `prefers-color-scheme: dark`. An explicit `data-theme` on the root
/// element wins over the media query in both directions.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let light = scheme_vars(&colors.light);
    let dark = scheme_vars(&colors.dark);
    format!(
        r#":root {{
{light}
}}

@media (prefers-color-scheme: dark) {{
    :root:not([data-theme="light"]) {{
{dark_nested}
    }}
}}

:root[data-theme="dark"] {{
{dark}
}}"#,
        dark_nested = indent(&dark),
    )
}

fn scheme_vars(scheme: &ColorScheme) -> String {
    format!(
        r#"    --color-bg: {};
    --color-text: {};
    --color-text-muted: {};
    --color-border: {};
    --color-link: {};
    --color-link-hover: {};
    --color-code-bg: {};"#,
        scheme.background,
        scheme.text,
        scheme.text_muted,
        scheme.border,
        scheme.link,
        scheme.link_hover,
        scheme.code_background,
    )
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
