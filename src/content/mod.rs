//! Content module - post discovery, front-matter and Markdown conversion

pub mod converter;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use converter::{BuiltinConverter, Converter, PandocConverter};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{PostKind, PostRecord, PostSource};
