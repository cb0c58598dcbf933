//! Print the hydrated HTML of one post

use anyhow::{bail, Context, Result};
use std::fs;

use crate::content::PostRecord;
use crate::generator::manifest::{find_post, read_manifest};
use crate::hydrate::{HydrationSession, Hydrator};
use crate::Site;

/// Look up a post by slug and read its fragment
///
/// `None` when there is no manifest yet or no record with that slug.
pub fn load_post(site: &Site, slug: &str) -> Result<Option<(PostRecord, String)>> {
    let Some(records) = read_manifest(&site.manifest_path)? else {
        return Ok(None);
    };
    let Some(record) = find_post(&records, slug) else {
        return Ok(None);
    };

    let path = site.build_dir.join(&record.html_file);
    let fragment =
        fs::read_to_string(&path).with_context(|| format!("Failed to read fragment {:?}", path))?;
    Ok(Some((record.clone(), fragment)))
}

pub fn run(site: &Site, slug: &str) -> Result<()> {
    let Some((record, fragment)) = load_post(site, slug)? else {
        bail!("Post {:?} not found", slug);
    };

    let hydrator = Hydrator::new(&site.config.hydration)?;
    let mut session = HydrationSession::new();
    let hydrated = hydrator.hydrate(&mut session, &record.slug, &fragment)?;

    tracing::info!(
        "Hydrated {}: {} mount(s), {} heading(s), {} warning(s)",
        record.slug,
        hydrated.mounts.len(),
        hydrated.headings.len(),
        hydrated.warnings.len()
    );
    println!("{}", hydrated.html);

    Ok(())
}
