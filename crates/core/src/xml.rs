//! Minimal lookups into the XML documents splunkd answers with.

/// Text of the first element reached by walking `path` from the root
/// element's children, e.g. `["messages", "msg"]` for `./messages/msg`.
///
/// Returns `None` for bodies that are not XML or lack the element.
pub(crate) fn find_text(body: &[u8], path: &[&str]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let doc = roxmltree::Document::parse(text).ok()?;

    let mut node = doc.root_element();
    for name in path {
        node = node
            .children()
            .find(|child| child.is_element() && child.has_tag_name(*name))?;
    }

    Some(node.text().unwrap_or_default().trim().to_string())
}
