//! Fragment parsing and stable serialization

use anyhow::Result;
use html5ever::serialize::{
    AttrRef, HtmlSerializer, Serialize, SerializeOpts, Serializer, TraversalScope,
};
use html5ever::tendril::StrTendril;
use html5ever::QualName;
use scraper::node::Comment;
use scraper::{ElementRef, Html, Node};
use std::io;

/// Serializer that sorts attributes by local name
///
/// Element attributes live in a hash map whose iteration order changes from
/// run to run; sorting them keeps the output byte-stable.
struct StableHtmlSerializer<S: Serializer>(S);

impl<S: Serializer> Serializer for StableHtmlSerializer<S> {
    fn start_elem<'a, AttrIter>(&mut self, name: QualName, attrs: AttrIter) -> io::Result<()>
    where
        AttrIter: Iterator<Item = AttrRef<'a>>,
    {
        let mut attrs = attrs.collect::<Vec<_>>();
        attrs.sort_by(|(a, _), (b, _)| a.local.cmp(&b.local));
        self.0.start_elem(name, attrs.into_iter())
    }

    fn end_elem(&mut self, name: QualName) -> io::Result<()> {
        self.0.end_elem(name)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.0.write_text(text)
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        self.0.write_comment(text)
    }

    fn write_doctype(&mut self, name: &str) -> io::Result<()> {
        self.0.write_doctype(name)
    }

    fn write_processing_instruction(&mut self, target: &str, data: &str) -> io::Result<()> {
        self.0.write_processing_instruction(target, data)
    }
}

/// Serialize the children of `element`, attributes sorted
pub fn inner_html(element: ElementRef<'_>) -> Result<String> {
    let opts = SerializeOpts {
        scripting_enabled: false,
        traversal_scope: TraversalScope::ChildrenOnly(None),
        create_missing_parent: false,
    };

    let mut buf = Vec::new();
    let mut ser = StableHtmlSerializer(HtmlSerializer::new(&mut buf, opts));
    element.serialize(&mut ser, TraversalScope::ChildrenOnly(None))?;

    Ok(String::from_utf8(buf)?)
}

/// Serialize a parsed fragment back to markup
pub fn fragment_html(doc: &Html) -> Result<String> {
    inner_html(doc.root_element())
}

/// Replace a node and its subtree with a comment holding `text`
pub fn replace_with_comment(doc: &mut Html, id: ego_tree::NodeId, text: &str) {
    clear_children(doc, id);
    if let Some(mut node) = doc.tree.get_mut(id) {
        *node.value() = Node::Comment(Comment {
            comment: StrTendril::from(text),
        });
    }
}

/// Replace the children of a node with a single comment holding `text`
pub fn replace_children_with_comment(doc: &mut Html, id: ego_tree::NodeId, text: &str) {
    clear_children(doc, id);
    if let Some(mut node) = doc.tree.get_mut(id) {
        node.append(Node::Comment(Comment {
            comment: StrTendril::from(text),
        }));
    }
}

fn clear_children(doc: &mut Html, id: ego_tree::NodeId) {
    let children = match doc.tree.get(id) {
        Some(node) => node.children().map(|c| c.id()).collect::<Vec<_>>(),
        None => return,
    };
    for child in children {
        if let Some(mut node) = doc.tree.get_mut(child) {
            node.detach();
        }
    }
}
