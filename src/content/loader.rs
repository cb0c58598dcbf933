//! Content loader - discovers posts and their assets under the posts root

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::PostSource;

lazy_static! {
    static ref README_RE: Regex = Regex::new(r"(?i)readme").unwrap();
}

/// True for README-like names, matched case-insensitively anywhere in the name
pub fn is_readme(name: &str) -> bool {
    README_RE.is_match(name)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Enumerate the direct children of the posts root
///
/// Children are visited in file-name order so repeated runs over the same
/// tree produce the same discovery order. Identifiers name the output
/// fragment, so a later post reusing one (`a/` then `a.md`) is skipped.
pub fn discover_posts(posts_dir: &Path, index_names: &[String]) -> Vec<PostSource> {
    let mut posts: Vec<PostSource> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for entry in WalkDir::new(posts_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry in {:?}: {}", posts_dir, e);
                continue;
            }
        };

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if entry.file_type().is_dir() {
            match index_names.iter().map(|n| path.join(n)).find(|p| p.is_file()) {
                Some(index) => posts.push(PostSource::folder(name, path, &index)),
                None => tracing::debug!("Ignoring folder without index file: {:?}", path),
            }
        } else if entry.file_type().is_file() && is_markdown_file(path) && !is_readme(&name) {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&name)
                .to_string();
            posts.push(PostSource::standalone(stem, path));
        } else {
            tracing::debug!("Ignoring {:?}", path);
        }
    }

    posts.retain(|post| {
        if seen.insert(post.identifier.clone()) {
            return true;
        }
        tracing::warn!(
            "Skipping {:?}: identifier {:?} is already used by another post",
            post.path,
            post.identifier
        );
        false
    });

    posts
}

/// Files co-located with a folder post, excluding its body and README-like files
pub fn sibling_assets(source: &PostSource) -> Vec<PathBuf> {
    let Some(dir) = source.dir() else {
        return Vec::new();
    };

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p != &source.path)
        .filter(|p| {
            p.file_name()
                .map(|n| !is_readme(&n.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect()
}

/// First conventionally-named cover image present in a post folder
pub fn find_cover(dir: &Path, cover_names: &[String]) -> Option<String> {
    cover_names
        .iter()
        .find(|name| dir.join(name).is_file())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostKind;
    use std::fs;

    fn index_names() -> Vec<String> {
        vec!["index.md".to_string()]
    }

    #[test]
    fn test_is_readme() {
        assert!(is_readme("README.md"));
        assert!(is_readme("old-readme-notes.md"));
        assert!(!is_readme("ready.md"));
    }

    #[test]
    fn test_discover_posts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/index.md"), "---\ntitle: B\n---\n").unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("a/index.md"), "---\ntitle: A\n---\n").unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("legacy.md"), "---\ntitle: L\n---\n").unwrap();
        fs::write(root.join("README.md"), "# posts").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let posts = discover_posts(root, &index_names());
        let ids: Vec<_> = posts.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "legacy"]);
        assert!(matches!(posts[0].kind, PostKind::Folder { .. }));
        assert_eq!(posts[2].kind, PostKind::Standalone);
        assert_eq!(posts[0].path, root.join("a/index.md"));
    }

    #[test]
    fn test_discover_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_posts(&tmp.path().join("nope"), &index_names()).is_empty());
    }

    #[test]
    fn test_duplicate_identifier_keeps_first() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("a/index.md"), "---\ntitle: A\n---\n").unwrap();
        fs::write(root.join("a.md"), "---\ntitle: Legacy A\n---\n").unwrap();
        fs::write(root.join("a.markdown"), "---\ntitle: Other A\n---\n").unwrap();
        fs::write(root.join("b.md"), "---\ntitle: B\n---\n").unwrap();

        let posts = discover_posts(root, &index_names());
        let ids: Vec<_> = posts.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(posts[0].path, root.join("a/index.md"));
    }

    #[test]
    fn test_sibling_assets_and_cover() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("index.md"), "body").unwrap();
        fs::write(dir.join("cover.jpg"), [0u8, 1, 2]).unwrap();
        fs::write(dir.join("plot.svg"), "<svg/>").unwrap();
        fs::write(dir.join("Readme.txt"), "notes").unwrap();

        let source = PostSource::folder("a", &dir, &dir.join("index.md"));
        let assets: Vec<_> = sibling_assets(&source)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(assets, vec!["cover.jpg", "plot.svg"]);

        let covers = vec!["cover.png".to_string(), "cover.jpg".to_string()];
        assert_eq!(find_cover(&dir, &covers).as_deref(), Some("cover.jpg"));
    }
}
