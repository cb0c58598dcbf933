//! Generator module - turns the posts root into HTML fragments and a manifest

pub mod manifest;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::content::converter::{self, Converter};
use crate::content::loader::{discover_posts, find_cover, sibling_assets};
use crate::content::{FrontMatter, PostRecord, PostSource};
use crate::error::{AssetError, PostError};
use crate::helpers::now_iso;
use crate::Site;

pub use manifest::SlugConflict;

/// Result of converting one discovered post
#[derive(Debug)]
pub enum PostOutcome {
    Converted(PostRecord),
    Skipped(SkippedPost),
}

/// A post that produced no record, with the reason
#[derive(Debug)]
pub struct SkippedPost {
    pub identifier: String,
    pub error: PostError,
}

/// Everything one pipeline run produced
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Manifest records, in manifest order
    pub records: Vec<PostRecord>,
    pub skipped: Vec<SkippedPost>,
    pub asset_failures: Vec<AssetError>,
    pub slug_conflicts: Vec<SlugConflict>,
}

impl BuildReport {
    /// One-line summary for logging
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} post(s)", self.records.len())];
        if !self.skipped.is_empty() {
            parts.push(format!("{} skipped", self.skipped.len()));
        }
        if !self.asset_failures.is_empty() {
            parts.push(format!("{} asset copy failure(s)", self.asset_failures.len()));
        }
        if !self.slug_conflicts.is_empty() {
            parts.push(format!("{} slug conflict(s)", self.slug_conflicts.len()));
        }
        parts.join(", ")
    }
}

/// Content pipeline over one site
pub struct ManifestGenerator<'a> {
    site: &'a Site,
    converter: Box<dyn Converter>,
}

impl<'a> ManifestGenerator<'a> {
    /// Create a generator using the configured converter
    pub fn new(site: &'a Site) -> Self {
        Self::with_converter(site, converter::from_config(&site.config.converter))
    }

    /// Create a generator with an explicit converter
    pub fn with_converter(site: &'a Site, converter: Box<dyn Converter>) -> Self {
        Self { site, converter }
    }

    /// Run the whole pipeline
    ///
    /// Per-post failures are logged and collected in the report. Only failing
    /// to create the output directories or to write the manifest is fatal.
    pub fn generate_manifest(&self) -> Result<BuildReport> {
        let start = Instant::now();
        self.ensure_dirs()?;

        let sources = discover_posts(&self.site.posts_dir, &self.site.config.index_names);
        tracing::debug!("Discovered {} post(s)", sources.len());

        let mut report = BuildReport::default();

        for source in &sources {
            match self.process(source) {
                PostOutcome::Converted(record) => {
                    report.asset_failures.extend(self.copy_assets(source));
                    report.records.push(record);
                }
                PostOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }

        if report.records.is_empty() {
            tracing::info!("No publishable posts found in {:?}", self.site.posts_dir);
            manifest::write_manifest(&self.site.manifest_path, &[])?;
            return Ok(report);
        }

        manifest::sort_by_date(&mut report.records);
        report.slug_conflicts = manifest::resolve_duplicate_slugs(
            &mut report.records,
            self.site.config.duplicate_slugs,
        );
        for conflict in &report.slug_conflicts {
            if let SlugConflict::Dropped { post_folder, .. } = conflict {
                self.remove_outputs(post_folder);
            }
        }

        manifest::write_manifest(&self.site.manifest_path, &report.records)?;
        tracing::info!(
            "Generated {:?} with {} in {:.2}s",
            self.site.manifest_path,
            report.summary(),
            start.elapsed().as_secs_f64()
        );

        self.write_timestamp();

        Ok(report)
    }

    /// Convert one post, capturing success or failure with its diagnostic
    pub fn process(&self, source: &PostSource) -> PostOutcome {
        match self.convert_post(source) {
            Ok(record) => {
                tracing::info!("Converted {} -> {}", source.identifier, record.html_file);
                PostOutcome::Converted(record)
            }
            Err(error) => {
                if error.is_validation() {
                    tracing::warn!("Skipping {}: {}", source.identifier, error);
                } else {
                    tracing::error!("Error converting {}: {}", source.identifier, error);
                }
                PostOutcome::Skipped(SkippedPost {
                    identifier: source.identifier.clone(),
                    error,
                })
            }
        }
    }

    /// Read, validate and convert one post, writing its HTML fragment
    ///
    /// Frontmatter is validated before the converter runs, so a post missing
    /// required fields leaves no fragment behind.
    pub fn convert_post(&self, source: &PostSource) -> Result<PostRecord, PostError> {
        let raw = fs::read_to_string(&source.path).map_err(|e| PostError::Read {
            path: source.path.clone(),
            source: e,
        })?;
        let (fm, body) = FrontMatter::parse(&raw)?;
        fm.validate()?;

        let html = self.converter.convert(body)?;
        for dir in self.site.output_dirs() {
            let path = dir.join(source.html_file());
            fs::write(&path, &html).map_err(|e| PostError::Write { path, source: e })?;
        }

        let image = self.resolve_image(source, fm.image.as_deref());
        Ok(PostRecord::from_frontmatter(source, fm, image))
    }

    /// Served path of the post's cover image, if any
    fn resolve_image(&self, source: &PostSource, declared: Option<&str>) -> Option<String> {
        let dir = source.dir();
        let served = |file: &str| {
            format!(
                "{}/{}/{}",
                self.site.config.asset_url_prefix.trim_end_matches('/'),
                source.identifier,
                file
            )
        };

        match (declared, dir) {
            (Some(image), Some(dir)) if is_local_name(image) && dir.join(image).is_file() => {
                Some(served(image))
            }
            (Some(image), _) => Some(image.to_string()),
            (None, Some(dir)) => find_cover(dir, &self.site.config.cover_names).map(|f| served(&f)),
            (None, None) => None,
        }
    }

    /// Copy a folder post's sibling assets into `<output>/<identifier>/`
    fn copy_assets(&self, source: &PostSource) -> Vec<AssetError> {
        let mut failures = Vec::new();
        let assets = sibling_assets(source);
        if assets.is_empty() {
            return failures;
        }

        for dir in self.site.output_dirs() {
            let target_dir = dir.join(&source.identifier);
            if let Err(e) = fs::create_dir_all(&target_dir) {
                tracing::error!("Failed to create asset directory {:?}: {}", target_dir, e);
                failures.extend(assets.iter().map(|from| AssetError {
                    from: from.clone(),
                    to: target_dir.clone(),
                    source: std::io::Error::new(e.kind(), e.to_string()),
                }));
                continue;
            }

            for from in &assets {
                match copy_asset(from, &target_dir) {
                    Ok(to) => tracing::debug!("Copied {:?} -> {:?}", from, to),
                    Err(e) => {
                        tracing::error!("{}", e);
                        failures.push(e);
                    }
                }
            }
        }

        failures
    }

    /// Delete a dropped post's fragment and assets from every output dir
    fn remove_outputs(&self, identifier: &str) {
        for dir in self.site.output_dirs() {
            let fragment = dir.join(format!("{}.html", identifier));
            if fragment.is_file() {
                if let Err(e) = fs::remove_file(&fragment) {
                    tracing::warn!("Failed to remove {:?}: {}", fragment, e);
                }
            }
            let assets = dir.join(identifier);
            if assets.is_dir() {
                if let Err(e) = fs::remove_dir_all(&assets) {
                    tracing::warn!("Failed to remove {:?}: {}", assets, e);
                }
            }
        }
    }

    fn ensure_dirs(&self) -> Result<()> {
        if !self.site.posts_dir.exists() {
            fs::create_dir_all(&self.site.posts_dir).with_context(|| {
                format!("Failed to create posts directory {:?}", self.site.posts_dir)
            })?;
            tracing::info!("Created posts directory {:?}", self.site.posts_dir);
        }
        for dir in self.site.output_dirs() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        }
        Ok(())
    }

    /// Touch the live-reload signal file; failure here is not fatal
    fn write_timestamp(&self) {
        let Some(path) = &self.site.timestamp_path else {
            return;
        };
        if let Err(e) = write_timestamp_file(path, &now_iso()) {
            tracing::warn!("Failed to write timestamp {:?}: {:#}", path, e);
        }
    }
}

fn copy_asset(from: &Path, target_dir: &Path) -> Result<PathBuf, AssetError> {
    let to = target_dir.join(from.file_name().unwrap_or_default());
    fs::copy(from, &to).map_err(|source| AssetError {
        from: from.to_path_buf(),
        to: to.clone(),
        source,
    })?;
    Ok(to)
}

/// A bare file name, not a URL or an absolute path
fn is_local_name(image: &str) -> bool {
    !image.contains("://") && !image.starts_with('/') && !image.contains("..")
}

/// Write the generation timestamp in a form matching the file's extension
pub fn write_timestamp_file(path: &Path, timestamp: &str) -> Result<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("js") | Some("mjs") => format!(
            "// Auto-generated file - do not edit manually\n\
             // Updated whenever posts are converted so dev tooling reloads\n\n\
             export const POSTS_LAST_UPDATED = \"{}\";\n",
            timestamp
        ),
        Some("json") => format!("{}\n", serde_json::to_string(timestamp)?),
        _ => format!("{}\n", timestamp),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
