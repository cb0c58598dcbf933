//! Scaffold a new post folder

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create `<posts_dir>/<slug>/index.md` with the required frontmatter keys
///
/// The slug defaults to the slugified title. Existing posts are never
/// overwritten.
pub fn create_post(site: &Site, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = slug::slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        bail!("Cannot derive a slug from {:?}", title);
    }

    let dir = site.posts_dir.join(&slug);
    let standalone = site.posts_dir.join(format!("{}.md", slug));
    if dir.exists() || standalone.exists() {
        bail!("Post already exists: {:?}", dir);
    }

    let index_name = site
        .config
        .index_names
        .first()
        .map(String::as_str)
        .unwrap_or("index.md");
    let file_path = dir.join(index_name);

    // JSON strings are valid YAML scalars and take care of quoting
    let content = format!(
        "---\ntitle: {}\ndate: {}\nexcerpt: \"\"\n---\n\n# {}\n",
        serde_json::to_string(title)?,
        chrono::Local::now().format("%Y-%m-%d"),
        title
    );

    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FrontMatter;

    fn site(dir: &std::path::Path) -> Site {
        Site::with_config(dir.to_path_buf(), SiteConfig::default())
    }

    #[test]
    fn test_create_post() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site(tmp.path());

        let path = create_post(&site, "Hello: World", None).unwrap();
        assert_eq!(path, site.posts_dir.join("hello-world/index.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello: World"));
        assert!(fm.date.is_some());
        assert!(body.contains("# Hello: World"));
    }

    #[test]
    fn test_explicit_slug() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site(tmp.path());
        let path = create_post(&site, "Anything", Some("My Slug")).unwrap();
        assert!(path.ends_with("my-slug/index.md"));
    }

    #[test]
    fn test_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site(tmp.path());
        create_post(&site, "Once", None).unwrap();
        assert!(create_post(&site, "Once", None).is_err());

        fs::write(site.posts_dir.join("legacy.md"), "old").unwrap();
        assert!(create_post(&site, "Legacy", None).is_err());
    }

    #[test]
    fn test_empty_slug_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(create_post(&site(tmp.path()), "!!!", None).is_err());
    }
}
