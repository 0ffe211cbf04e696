//! Plain-text extraction and normalization.
//!
//! The transform is deliberately lossy: tags are stripped, text fragments are
//! trimmed and run together without separators, then punctuation and
//! CR/TAB/LF are removed. What remains is what the search index gets.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static LINE_CONTROLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\t\n]").expect("static regex"));

/// Collapse an HTML document to its visible text. Script, style, and
/// noscript contents are dropped; each text node is trimmed.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    collect_text(doc.root_element(), &mut out);
    out
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text.trim());
        } else if let Some(child_el) = ElementRef::wrap(child) {
            match child_el.value().name() {
                "script" | "style" | "noscript" => {}
                _ => collect_text(child_el, out),
            }
        }
    }
}

/// Strip all punctuation, then all carriage returns, tabs, and newlines.
pub fn normalize(text: &str) -> String {
    let stripped = PUNCTUATION.replace_all(text, "");
    LINE_CONTROLS.replace_all(&stripped, "").into_owned()
}
