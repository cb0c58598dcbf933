//! Site configuration (folio.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directories
    pub posts_dir: String,
    pub build_dir: String,
    /// Mirror of the build output served by the page layer; empty disables it
    pub public_dir: String,

    // Artifacts
    pub manifest: String,
    pub timestamp_file: String,

    /// URL prefix under which per-post assets are served
    pub asset_url_prefix: String,

    // Post layout
    pub index_names: Vec<String>,
    pub cover_names: Vec<String>,

    #[serde(default)]
    pub converter: ConverterConfig,

    pub duplicate_slugs: DuplicateSlugPolicy,

    #[serde(default)]
    pub hydration: HydrationConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_dir: "posts".to_string(),
            build_dir: ".posts-build".to_string(),
            public_dir: "public/.posts-build".to_string(),

            manifest: "posts.json".to_string(),
            timestamp_file: "lib/posts-timestamp.ts".to_string(),

            asset_url_prefix: "/.posts-build".to_string(),

            index_names: vec!["index.md".to_string(), "index.markdown".to_string()],
            cover_names: ["png", "jpg", "jpeg", "webp", "gif"]
                .iter()
                .map(|ext| format!("cover.{}", ext))
                .collect(),

            converter: ConverterConfig::default(),
            duplicate_slugs: DuplicateSlugPolicy::default(),
            hydration: HydrationConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }
}

/// Which Markdown converter turns post bodies into HTML fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// External pandoc process, MathML output
    #[default]
    Pandoc,
    /// In-process pulldown-cmark renderer
    Builtin,
}

/// External converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub kind: ConverterKind,
    pub program: String,
    /// Extra arguments appended after the standard ones
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            kind: ConverterKind::Pandoc,
            program: "pandoc".to_string(),
            args: Vec::new(),
        }
    }
}

/// What to do when two records resolve to the same slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateSlugPolicy {
    /// Keep the first record in manifest order, drop the rest
    #[default]
    Skip,
    /// Rename later records `<slug>-2`, `<slug>-3`, ...
    Suffix,
}

/// Content hydration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    pub marker_attr: String,
    pub props_attr: String,
    /// Heading element that receives the annotation wrapper
    pub heading: String,
    /// Fixed annotation colour; generated per heading when unset
    pub color: Option<String>,
    pub stroke_width: u32,
    pub animation_duration: u32,
    pub padding: u32,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            marker_attr: "data-component".to_string(),
            props_attr: "data-props".to_string(),
            heading: "h1".to_string(),
            color: None,
            stroke_width: 2,
            animation_duration: 800,
            padding: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.manifest, "posts.json");
        assert_eq!(config.converter.kind, ConverterKind::Pandoc);
        assert_eq!(config.duplicate_slugs, DuplicateSlugPolicy::Skip);
        assert_eq!(config.hydration.heading, "h1");
        assert!(config.cover_names.contains(&"cover.png".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r##"
posts_dir: content/posts
public_dir: ""
duplicate_slugs: suffix
converter:
  kind: builtin
hydration:
  color: "#f59e0b60"
"##;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.posts_dir, "content/posts");
        assert_eq!(config.public_dir, "");
        assert_eq!(config.duplicate_slugs, DuplicateSlugPolicy::Suffix);
        assert_eq!(config.converter.kind, ConverterKind::Builtin);
        assert_eq!(config.converter.program, "pandoc");
        assert_eq!(config.hydration.color.as_deref(), Some("#f59e0b60"));
        assert_eq!(config.hydration.marker_attr, "data-component");
    }
}
