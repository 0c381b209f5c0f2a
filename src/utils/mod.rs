//! Project-specific utilities live here.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Tags whose text content is dropped along with the tag itself.
const NON_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "option", "noscript"];

/// Strip all markup tags from untrusted text, keeping literal text content,
/// then trim surrounding whitespace.
///
/// The stripped result is what gets persisted and echoed back; raw input never
/// reaches the store.
pub fn strip_markup(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut text = String::new();
    collect_text(*fragment.root_element(), &mut text);
    text.trim().to_string()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if NON_TEXT_TAGS.contains(&element.name()) => {}
            Node::Element(_) => collect_text(child, out),
            _ => {}
        }
    }
}
