//! Remove generated output

use anyhow::{Context, Result};
use std::fs;

use crate::Site;

/// Delete the output directories, the manifest and the timestamp artifact
pub fn run(site: &Site) -> Result<()> {
    for dir in site.output_dirs() {
        if dir.exists() {
            fs::remove_dir_all(dir).with_context(|| format!("Failed to delete {:?}", dir))?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }

    let files = std::iter::once(site.manifest_path.as_path()).chain(site.timestamp_path.as_deref());
    for file in files {
        if file.exists() {
            fs::remove_file(file).with_context(|| format!("Failed to delete {:?}", file))?;
            tracing::info!("Deleted: {:?}", file);
        }
    }

    Ok(())
}
