//! End-to-end: Markdown posts to manifest, fragment to hydrated HTML

use folio::config::{ConverterKind, DuplicateSlugPolicy, SiteConfig};
use folio::hydrate::{HydrationSession, Hydrator, MountState};
use folio::Site;
use std::fs;
use std::path::Path;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn site(root: &Path) -> Site {
    let mut config = SiteConfig::default();
    config.converter.kind = ConverterKind::Builtin;
    Site::with_config(root.to_path_buf(), config)
}

fn seed_posts(root: &Path) {
    write(
        &root.join("posts/charts/index.md"),
        r#"---
title: Charting in Rust
date: 2024-05-01
excerpt: Bars and more bars
tags: [rust, viz]
---

# Charting

Some text.

<div data-component="ExampleChart" data-props='{"title":"Quarterly"}'></div>

# Results

<div data-component="Missing"></div>
"#,
    );
    write(&root.join("posts/charts/cover.png"), "png");
    write(&root.join("posts/charts/README.md"), "notes");
    write(
        &root.join("posts/older/index.md"),
        "---\ntitle: Older\ndate: 2023-01-01\nexcerpt: Old news\n---\n\nHello.\n",
    );
    write(
        &root.join("posts/draft/index.md"),
        "---\ntitle: Draft\nexcerpt: No date yet\n---\n\nWIP\n",
    );
    write(
        &root.join("posts/legacy.md"),
        "---\ntitle: Legacy\ndate: 2022-06-01\nexcerpt: Flat file\nslug: old-days\n---\n\nFlat.\n",
    );
}

#[test]
fn test_build_then_hydrate() {
    let tmp = tempfile::tempdir().unwrap();
    seed_posts(tmp.path());
    let site = site(tmp.path());

    let report = site.build().unwrap();
    let slugs: Vec<&str> = report.records.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, vec!["charts", "older", "old-days"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].identifier, "draft");

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&site.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest[0]["htmlFile"], "charts.html");
    assert_eq!(manifest[0]["postFolder"], "charts");
    assert_eq!(manifest[0]["image"], "/.posts-build/charts/cover.png");
    assert_eq!(manifest[2]["postFolder"], "legacy");

    assert!(site.build_dir.join("charts/cover.png").exists());
    assert!(!site.build_dir.join("charts/README.md").exists());
    assert!(site
        .public_dir
        .as_ref()
        .unwrap()
        .join("charts.html")
        .exists());
    assert!(!site.build_dir.join("draft.html").exists());
    assert!(site.timestamp_path.as_ref().unwrap().exists());

    let fragment = fs::read_to_string(site.build_dir.join("charts.html")).unwrap();
    let hydrator = Hydrator::new(&site.config.hydration).unwrap();
    let mut session = HydrationSession::new();
    let hydrated = hydrator.hydrate(&mut session, "charts", &fragment).unwrap();

    assert_eq!(hydrated.mounts.len(), 1);
    assert_eq!(hydrated.mounts[0].state, MountState::Mounted);
    assert_eq!(hydrated.warnings.len(), 1);
    assert_eq!(hydrated.headings.len(), 2);
    assert_ne!(hydrated.headings[0].color, hydrated.headings[1].color);
    assert!(hydrated.html.contains("Quarterly"));
    assert!(hydrated.html.contains(r#"data-component="Missing""#));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    seed_posts(tmp.path());
    let site = site(tmp.path());

    site.build().unwrap();
    let first = fs::read(&site.manifest_path).unwrap();
    let first_fragment = fs::read(site.build_dir.join("charts.html")).unwrap();

    site.build().unwrap();
    assert_eq!(fs::read(&site.manifest_path).unwrap(), first);
    assert_eq!(
        fs::read(site.build_dir.join("charts.html")).unwrap(),
        first_fragment
    );
}

#[test]
fn test_duplicate_slug_policies() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        &tmp.path().join("posts/a/index.md"),
        "---\ntitle: A\ndate: 2024-02-01\nexcerpt: a\nslug: same\n---\nA\n",
    );
    write(
        &tmp.path().join("posts/b/index.md"),
        "---\ntitle: B\ndate: 2024-01-01\nexcerpt: b\nslug: same\n---\nB\n",
    );

    let skip = site(tmp.path()).build().unwrap();
    assert_eq!(skip.records.len(), 1);
    assert_eq!(skip.records[0].post_folder, "a");

    let mut config = SiteConfig::default();
    config.converter.kind = ConverterKind::Builtin;
    config.duplicate_slugs = DuplicateSlugPolicy::Suffix;
    let suffix = Site::with_config(tmp.path().to_path_buf(), config)
        .build()
        .unwrap();
    let slugs: Vec<&str> = suffix.records.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(slugs, vec!["same", "same-2"]);
}

#[test]
fn test_clean_after_build() {
    let tmp = tempfile::tempdir().unwrap();
    seed_posts(tmp.path());
    let site = site(tmp.path());

    site.build().unwrap();
    site.clean().unwrap();

    assert!(!site.build_dir.exists());
    assert!(!site.manifest_path.exists());
    assert!(tmp.path().join("posts/charts/index.md").exists());
}
