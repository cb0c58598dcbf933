//! folio: Markdown post pipeline and content hydration for a portfolio blog
//!
//! The build side turns a directory of Markdown posts into HTML fragments
//! plus a date-sorted JSON manifest. The hydration side upgrades a rendered
//! fragment: component markers become mounted widgets and headings receive
//! an annotation wrapper.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod hydrate;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the site root
pub const CONFIG_FILE: &str = "folio.yml";

/// The main application handle: configuration plus resolved paths
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Posts root
    pub posts_dir: PathBuf,
    /// Fragment and asset output directory
    pub build_dir: PathBuf,
    /// Public mirror of the build output, if enabled
    pub public_dir: Option<PathBuf>,
    /// Manifest JSON file
    pub manifest_path: PathBuf,
    /// Live-reload timestamp artifact, if enabled
    pub timestamp_path: Option<PathBuf>,
}

impl Site {
    /// Create a site from a directory, reading `folio.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let optional = |p: &str| (!p.is_empty()).then(|| base_dir.join(p));

        Self {
            posts_dir: base_dir.join(&config.posts_dir),
            build_dir: base_dir.join(&config.build_dir),
            public_dir: optional(&config.public_dir),
            manifest_path: base_dir.join(&config.manifest),
            timestamp_path: optional(&config.timestamp_file),
            base_dir,
            config,
        }
    }

    /// Every directory fragments and assets are written to
    pub fn output_dirs(&self) -> Vec<&Path> {
        std::iter::once(self.build_dir.as_path())
            .chain(self.public_dir.as_deref())
            .collect()
    }

    /// Run the content pipeline
    pub fn build(&self) -> Result<generator::BuildReport> {
        generator::ManifestGenerator::new(self).generate_manifest()
    }

    /// Remove generated output
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
