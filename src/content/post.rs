//! Post source and manifest record models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::FrontMatter;

/// The two supported on-disk post layouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKind {
    /// `<posts>/<folder>/index.md` plus sibling assets
    Folder { dir: PathBuf },
    /// Legacy `<posts>/<name>.md`
    Standalone,
}

/// One authored post discovered under the posts root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSource {
    /// Folder name, or file stem for standalone posts
    pub identifier: String,
    /// The Markdown body file
    pub path: PathBuf,
    pub kind: PostKind,
}

impl PostSource {
    pub fn folder(identifier: impl Into<String>, dir: &Path, index: &Path) -> Self {
        Self {
            identifier: identifier.into(),
            path: index.to_path_buf(),
            kind: PostKind::Folder {
                dir: dir.to_path_buf(),
            },
        }
    }

    pub fn standalone(identifier: impl Into<String>, path: &Path) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.to_path_buf(),
            kind: PostKind::Standalone,
        }
    }

    /// The post folder, for folder posts
    pub fn dir(&self) -> Option<&Path> {
        match &self.kind {
            PostKind::Folder { dir } => Some(dir),
            PostKind::Standalone => None,
        }
    }

    /// Name of the generated HTML fragment
    pub fn html_file(&self) -> String {
        format!("{}.html", self.identifier)
    }
}

/// Serialized names of the typed record fields
const RECORD_KEYS: &[&str] = &[
    "title",
    "date",
    "excerpt",
    "category",
    "tags",
    "author",
    "image",
    "slug",
    "htmlFile",
    "postFolder",
];

/// A manifest entry, serialized into `posts.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Frontmatter fields outside the known schema, passed through
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,

    pub slug: String,
    pub html_file: String,
    pub post_folder: String,
}

impl PostRecord {
    /// Assemble a record from validated frontmatter
    ///
    /// `slug` falls back to the source identifier when the frontmatter has none.
    /// Computed fields win over frontmatter keys of the same name.
    pub fn from_frontmatter(source: &PostSource, fm: FrontMatter, image: Option<String>) -> Self {
        let mut extra = fm.extra;
        extra.retain(|key, _| {
            let reserved = RECORD_KEYS.contains(&key.as_str());
            if reserved {
                tracing::warn!(
                    "Ignoring frontmatter key {:?} in {}, it is computed",
                    key,
                    source.identifier
                );
            }
            !reserved
        });

        let slug = fm
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| source.identifier.clone());

        Self {
            title: fm.title.unwrap_or_default(),
            date: fm.date.unwrap_or_default(),
            excerpt: fm.excerpt.unwrap_or_default(),
            category: fm.category,
            tags: fm.tags,
            author: fm.author,
            image,
            extra,
            slug,
            html_file: source.html_file(),
            post_folder: source.identifier.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontmatter(slug: Option<&str>) -> FrontMatter {
        FrontMatter {
            title: Some("A".to_string()),
            date: Some("2024-01-01".to_string()),
            excerpt: Some("ex-A".to_string()),
            slug: slug.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_slug_defaults_to_identifier() {
        let source = PostSource::folder("a", Path::new("posts/a"), Path::new("posts/a/index.md"));
        let record = PostRecord::from_frontmatter(&source, frontmatter(None), None);
        assert_eq!(record.slug, "a");
        assert_eq!(record.html_file, "a.html");
        assert_eq!(record.post_folder, "a");
    }

    #[test]
    fn test_frontmatter_slug_overrides() {
        let source = PostSource::standalone("legacy", Path::new("posts/legacy.md"));
        let record = PostRecord::from_frontmatter(&source, frontmatter(Some("custom-slug")), None);
        assert_eq!(record.slug, "custom-slug");
        assert_eq!(record.html_file, "legacy.html");
        assert_eq!(record.post_folder, "legacy");
    }

    #[test]
    fn test_serialized_keys() {
        let source = PostSource::folder("a", Path::new("posts/a"), Path::new("posts/a/index.md"));
        let mut fm = frontmatter(None);
        fm.extra
            .insert("emoji".to_string(), serde_yaml::Value::from("📊"));
        let record = PostRecord::from_frontmatter(&source, fm, None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["htmlFile"], "a.html");
        assert_eq!(json["postFolder"], "a");
        assert_eq!(json["emoji"], "📊");
        assert!(json.get("image").is_none());
        assert!(json.get("tags").is_none());

        let back: PostRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_computed_fields_override_frontmatter() {
        let source = PostSource::folder("a", Path::new("posts/a"), Path::new("posts/a/index.md"));
        let mut fm = frontmatter(None);
        for (key, value) in [("htmlFile", "x.html"), ("postFolder", "elsewhere"), ("mood", "ok")] {
            fm.extra
                .insert(key.to_string(), serde_yaml::Value::from(value));
        }

        let record = PostRecord::from_frontmatter(&source, fm, None);
        assert_eq!(record.extra.keys().collect::<Vec<_>>(), vec!["mood"]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json.matches("\"htmlFile\"").count(), 1);
        let back: PostRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.html_file, "a.html");
        assert_eq!(back.post_folder, "a");
    }
}
