//! Build the manifest and fragments

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::BuildReport;
use crate::Site;

/// Run the pipeline once and report skipped posts on stdout
pub fn run(site: &Site) -> Result<BuildReport> {
    let report = site.build()?;
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.identifier, skipped.error);
    }
    println!("Built {}", report.summary());
    Ok(report)
}

/// Rebuild whenever something under the posts root changes
///
/// Blocks until the watcher channel closes. `on_rebuild` runs after every
/// successful rebuild.
pub fn watch<F>(site: &Site, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(&BuildReport),
{
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&site.posts_dir, RecursiveMode::Recursive)?;
    tracing::info!("Watching {:?} for changes...", site.posts_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<&DebouncedEvent> = events
                    .iter()
                    .filter(|e| is_relevant(site, &e.path))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("Changed: {}", event.path.display());
                }

                match run(site) {
                    Ok(report) => on_rebuild(&report),
                    Err(e) => tracing::error!("Rebuild failed: {:#}", e),
                }
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(_) => break,
        }
    }

    Ok(())
}

/// Ignore editor droppings and anything the pipeline writes itself
fn is_relevant(site: &Site, path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    if path_str.contains(".git") || path_str.contains(".DS_Store") || path_str.ends_with('~') {
        return false;
    }

    let generated = site
        .output_dirs()
        .into_iter()
        .chain(std::iter::once(site.manifest_path.as_path()))
        .chain(site.timestamp_path.as_deref());
    !generated.into_iter().any(|p| path.starts_with(p))
}
