//! HTML fragment parsing and serialization.
//!
//! A forgiving tokenizer: unknown constructs degrade to text, stray end tags
//! are ignored and unclosed elements are closed at the end of the input.

use super::node::{Dom, NodeId, NodeKind};
use super::DomError;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Decode character references.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            decode_entity(entity).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    consumed: usize,
}

/// Parse `<name attr="v" ...>` at the start of `input`.
fn parse_start_tag(input: &str) -> Option<StartTag> {
    let bytes = input.as_bytes();
    let mut pos = 1;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    let name = input[1..pos].to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    let mut attrs = Vec::new();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match bytes.get(pos)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    consumed: pos + 1,
                })
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    consumed: pos + 2,
                })
            }
            b'/' => pos += 1,
            _ => {
                let start = pos;
                while pos < bytes.len()
                    && !bytes[pos].is_ascii_whitespace()
                    && !matches!(bytes[pos], b'=' | b'>' | b'/')
                {
                    pos += 1;
                }
                let key = input[start..pos].to_ascii_lowercase();
                let mut value = String::new();
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    match bytes.get(pos)? {
                        quote @ (b'"' | b'\'') => {
                            let close = input[pos + 1..].find(*quote as char)? + pos + 1;
                            value = unescape(&input[pos + 1..close]);
                            pos = close + 1;
                        }
                        _ => {
                            let start = pos;
                            while pos < bytes.len()
                                && !bytes[pos].is_ascii_whitespace()
                                && bytes[pos] != b'>'
                            {
                                pos += 1;
                            }
                            value = unescape(&input[start..pos]);
                        }
                    }
                }
                if !key.is_empty() {
                    attrs.push((key, value));
                }
            }
        }
    }
}

impl Dom {
    /// Parse an HTML fragment into detached top-level nodes.
    pub fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let mut roots = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut rest = html;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("<!--") {
                rest = after.find("-->").map_or("", |end| &after[end + 3..]);
                continue;
            }

            if let Some(after) = rest.strip_prefix("</") {
                if let Some(end) = after.find('>') {
                    let name = after[..end].trim().to_ascii_lowercase();
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|&open| self.tag(open) == Some(name.as_str()))
                    {
                        stack.truncate(pos);
                    }
                    rest = &after[end + 1..];
                    continue;
                }
            }

            if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                if let Some(tag) = parse_start_tag(rest) {
                    let element = self.push_element(&tag.name, tag.attrs);
                    self.attach_parsed(&mut roots, &stack, element);
                    rest = &rest[tag.consumed..];
                    if RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
                        let close = format!("</{}", tag.name);
                        let end = rest.to_ascii_lowercase().find(&close).unwrap_or(rest.len());
                        if end > 0 {
                            let raw = self.create_text(&rest[..end]);
                            let _ = self.append_child(element, raw);
                        }
                        rest = &rest[end..];
                        if let Some(gt) = rest.find('>') {
                            rest = &rest[gt + 1..];
                        }
                    } else if !tag.self_closing && !is_void(&tag.name) {
                        stack.push(element);
                    }
                    continue;
                }
            }

            let end = rest
                .char_indices()
                .skip(1)
                .find(|&(_, ch)| ch == '<')
                .map_or(rest.len(), |(i, _)| i);
            let text = self.create_text(&unescape(&rest[..end]));
            self.attach_parsed(&mut roots, &stack, text);
            rest = &rest[end..];
        }

        roots
    }

    fn push_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        let element = self.create_element(tag);
        for (key, value) in attrs {
            let _ = self.set_attr(element, &key, &value);
        }
        element
    }

    fn attach_parsed(&mut self, roots: &mut Vec<NodeId>, stack: &[NodeId], node: NodeId) {
        match stack.last() {
            Some(&parent) => {
                let _ = self.append_child(parent, node);
            }
            None => roots.push(node),
        }
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.tag(parent))
                    .is_some_and(|tag| RAW_TEXT_TAGS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Replace the children of `id` with a parsed fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        if self.is_text(id) {
            return Err(DomError::NotContainer(id));
        }
        self.clear_children(id);
        for node in self.parse_fragment(html) {
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Parse `html` and append the resulting nodes to `id`.
    pub fn append_html(&mut self, id: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        let nodes = self.parse_fragment(html);
        for &node in &nodes {
            self.append_child(id, node)?;
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(html: &str) -> String {
        let mut dom = Dom::new();
        let body = dom.body();
        dom.set_inner_html(body, html).unwrap();
        dom.inner_html(body)
    }

    #[test]
    fn test_serializes_void_elements_without_close() {
        assert_eq!(round_trip("<p><br/></p>"), "<p><br></p>");
        assert_eq!(round_trip("<p><br></p>"), "<p><br></p>");
    }

    #[test]
    fn test_keeps_attributes_in_order() {
        assert_eq!(
            round_trip(r#"<a href="x.html" target='_blank'>go</a>"#),
            r#"<a href="x.html" target="_blank">go</a>"#
        );
    }

    #[test]
    fn test_drops_comments_and_closes_unclosed() {
        assert_eq!(round_trip("<p>a<!-- note -->b<b>c"), "<p>ab<b>c</b></p>");
    }

    #[test]
    fn test_decodes_entities_into_text_nodes() {
        let mut dom = Dom::new();
        let nodes = dom.parse_fragment("&#8203;&nbsp;&lt;x&gt;&unknown;");
        assert_eq!(nodes.len(), 1);
        assert_eq!(dom.text(nodes[0]), Some("\u{200b}\u{a0}<x>&unknown;"));
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(round_trip("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn test_script_content_is_raw() {
        assert_eq!(
            round_trip("<script>if (a < b) {}</script>"),
            "<script>if (a < b) {}</script>"
        );
    }
}
