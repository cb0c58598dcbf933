//! List manifest entries

use anyhow::{bail, Result};

use crate::generator::manifest::read_manifest;
use crate::Site;

/// Print the manifest, newest first
pub fn run(site: &Site) -> Result<()> {
    let Some(records) = read_manifest(&site.manifest_path)? else {
        bail!(
            "No manifest at {:?}, run `folio build` first",
            site.manifest_path
        );
    };

    println!("Posts ({}):", records.len());
    for record in &records {
        println!("  {}  {}  {}", record.date, record.slug, record.title);
    }

    Ok(())
}
