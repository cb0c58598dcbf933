//! Small shared helpers: dates, HTML escaping, content hashing

mod date;
mod html;

pub use date::*;
pub use html::*;

/// Calculate a hash for a content string
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
