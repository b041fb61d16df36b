//! Clipboard content cleaning for paste.

use std::sync::OnceLock;

use regex::Regex;

use crate::messages::ClipboardData;

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static paste-filter pattern"))
}

macro_rules! rule {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            cached(&CELL, $pattern)
        }
    };
}

rule!(raw_text_blocks, r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>");
rule!(metadata_tags, r"(?i)</?(meta|script|style|link)\b[^>]*>");
rule!(comments, r"(?s)<!--.*?-->");
rule!(data_attrs, r#"(?i)\s?data-[\w-]+=("[^"]*"|'[^']*')"#);
rule!(img_tags, r"(?i)<img\b[^>]*>");
rule!(class_attrs, r#"(?i)\s?class=("[^"]*"|'[^']*')"#);
rule!(class_style_attrs, r#"(?i)\s?(class|style)=("[^"]*"|'[^']*')"#);
rule!(digit_after_lt, r"<(\d)");
rule!(line_breaks, r"\r\n|\r|\n");

/// Escape markup-significant characters and turn line breaks into `<br>`.
pub fn text_to_html(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    line_breaks().replace_all(&escaped, "<br>").into_owned()
}

/// Strip clipboard HTML down to content markup.
///
/// Word and browsers wrap copied fragments in whole documents with
/// metadata, scripts and comments; all of that goes. `class` attributes
/// always go, `style` attributes only with `filter_style`.
pub fn clean_html(html: &str, filter_style: bool, ignore_img: bool) -> String {
    // Anything after the closing document tag is trailing clipboard noise.
    let html = match html.split_once("</html>") {
        Some((document, _)) => document,
        None => html,
    };

    let html = raw_text_blocks().replace_all(html, "");
    let html = metadata_tags().replace_all(&html, "");
    let html = comments().replace_all(&html, "");
    let html = data_attrs().replace_all(&html, "");
    let html = if ignore_img {
        img_tags().replace_all(&html, "")
    } else {
        html
    };
    let html = if filter_style {
        class_style_attrs().replace_all(&html, "")
    } else {
        class_attrs().replace_all(&html, "")
    };
    digit_after_lt().replace_all(&html, "&lt;$1").into_owned()
}

/// Markup to insert for a paste outside code blocks.
///
/// Falls back to the plain-text flavour wrapped in a paragraph when the
/// clipboard carries no HTML. `None` when there is nothing to paste.
pub fn paste_html(data: &ClipboardData, filter_style: bool, ignore_img: bool) -> Option<String> {
    let html = match (data.html.as_deref(), data.text.as_deref()) {
        (Some(html), _) if !html.is_empty() => html.to_string(),
        (_, Some(text)) if !text.is_empty() => format!("<p>{}</p>", text_to_html(text)),
        _ => return None,
    };
    let cleaned = clean_html(&html, filter_style, ignore_img);
    (!cleaned.trim().is_empty()).then_some(cleaned)
}

/// Plain-text flavour as literal markup.
pub fn paste_text(data: &ClipboardData) -> String {
    data.text.as_deref().map(text_to_html).unwrap_or_default()
}
