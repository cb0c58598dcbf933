//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PostError;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub image: Option<String>,

    /// Additional custom fields, in authoring order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), PostError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if !content.starts_with("---") {
            return Ok((FrontMatter::default(), content));
        }

        let rest = &content[3..];
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = match rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            Some(rest) => rest,
            // `----` or `--- text` is not a delimiter
            None => return Ok((FrontMatter::default(), content)),
        };

        let (yaml_content, remaining) = match split_closing_delimiter(rest) {
            Some(parts) => parts,
            None => return Ok((FrontMatter::default(), content)),
        };

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading thematic break followed by prose is not front-matter
        if !has_yaml_structure(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map_err(|e| PostError::Frontmatter(e.to_string()))?;
        Ok((fm, remaining))
    }

    /// Check that every required field is present and non-empty
    pub fn validate(&self) -> Result<(), PostError> {
        let required = [
            ("title", &self.title),
            ("date", &self.date),
            ("excerpt", &self.excerpt),
        ];
        for (name, value) in required {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(PostError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Find the closing `---` line, returning (yaml, body)
fn split_closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    None
}

/// At least one line must look like `key: value`
fn has_yaml_structure(yaml: &str) -> bool {
    yaml.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
excerpt: A first post
tags:
  - rust
  - blog
category: programming
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert_eq!(fm.category.as_deref(), Some("programming"));
        assert!(remaining.starts_with("This is the content."));
        assert!(fm.validate().is_ok());
    }

    #[test]
    fn test_single_string_tags() {
        let content = "---\ntitle: T\ntags: Notes\n---\nbody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_extra_fields_keep_order() {
        let content = "---\ntitle: T\nzeta: 1\nalpha: two\n---\nbody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<_> = fm.extra.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_missing_date_fails_validation() {
        let content = "---\ntitle: C\nexcerpt: ex-C\n---\nbody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(matches!(fm.validate(), Err(PostError::MissingField("date"))));
    }

    #[test]
    fn test_blank_excerpt_fails_validation() {
        let content = "---\ntitle: C\ndate: 2024-01-01\nexcerpt: \"  \"\n---\nbody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(matches!(
            fm.validate(),
            Err(PostError::MissingField("excerpt"))
        ));
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown\n").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "# Just markdown\n");
        assert!(matches!(fm.validate(), Err(PostError::MissingField("title"))));
    }

    #[test]
    fn test_unclosed_frontmatter_is_content() {
        let content = "---\ntitle: Oops\n\nNo closing delimiter.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert!(remaining.contains("No closing delimiter."));
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Check out https://example.com/path and http://test.com

---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nbody\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, PostError::Frontmatter(_)));
    }
}
