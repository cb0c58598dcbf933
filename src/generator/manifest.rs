//! Manifest ordering, slug uniqueness and persistence

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::DuplicateSlugPolicy;
use crate::content::PostRecord;
use crate::helpers::parse_date;

/// How a duplicate slug was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugConflict {
    /// The later record was dropped from the manifest
    Dropped { slug: String, post_folder: String },
    /// The later record was renamed
    Renamed {
        from: String,
        to: String,
        post_folder: String,
    },
}

/// Sort records newest first
///
/// The sort is stable: equal dates keep discovery order. Dates that do not
/// parse sort after every parseable date.
pub fn sort_by_date(records: &mut [PostRecord]) {
    for record in records.iter() {
        if parse_date(&record.date).is_none() {
            tracing::warn!(
                "Unparseable date {:?} in {}, sorting it last",
                record.date,
                record.post_folder
            );
        }
    }

    records.sort_by_cached_key(|r| std::cmp::Reverse(DateKey(parse_date(&r.date))));
}

/// `None` orders below every parsed date
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct DateKey(Option<chrono::NaiveDateTime>);

/// Enforce manifest-wide slug uniqueness, first record in manifest order wins
pub fn resolve_duplicate_slugs(
    records: &mut Vec<PostRecord>,
    policy: DuplicateSlugPolicy,
) -> Vec<SlugConflict> {
    let mut conflicts = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    match policy {
        DuplicateSlugPolicy::Skip => {
            records.retain(|record| {
                if seen.insert(record.slug.clone()) {
                    return true;
                }
                tracing::warn!(
                    "Duplicate slug {:?} from {}, dropping it",
                    record.slug,
                    record.post_folder
                );
                conflicts.push(SlugConflict::Dropped {
                    slug: record.slug.clone(),
                    post_folder: record.post_folder.clone(),
                });
                false
            });
        }
        DuplicateSlugPolicy::Suffix => {
            let taken: HashSet<String> = records.iter().map(|r| r.slug.clone()).collect();
            for record in records.iter_mut() {
                if seen.insert(record.slug.clone()) {
                    continue;
                }
                let renamed = (2..)
                    .map(|n| format!("{}-{}", record.slug, n))
                    .find(|candidate| !taken.contains(candidate) && !seen.contains(candidate))
                    .unwrap_or_else(|| record.slug.clone());
                tracing::warn!(
                    "Duplicate slug {:?} from {}, renaming it to {:?}",
                    record.slug,
                    record.post_folder,
                    renamed
                );
                conflicts.push(SlugConflict::Renamed {
                    from: record.slug.clone(),
                    to: renamed.clone(),
                    post_folder: record.post_folder.clone(),
                });
                seen.insert(renamed.clone());
                record.slug = renamed;
            }
        }
    }

    conflicts
}

/// Write the manifest as a pretty-printed JSON array
pub fn write_manifest(path: &Path, records: &[PostRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create manifest directory {:?}", parent))?;
    }
    let mut content = serde_json::to_string_pretty(records)?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write manifest {:?}", path))?;
    Ok(())
}

/// Read a manifest; `None` when it has not been generated yet
pub fn read_manifest(path: &Path) -> Result<Option<Vec<PostRecord>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read manifest {:?}", path))?;
    let records = serde_json::from_str(&content)
        .with_context(|| format!("Invalid manifest {:?}", path))?;
    Ok(Some(records))
}

/// Look up a record by slug
pub fn find_post<'a>(records: &'a [PostRecord], slug: &str) -> Option<&'a PostRecord> {
    records.iter().find(|r| r.slug == slug)
}
