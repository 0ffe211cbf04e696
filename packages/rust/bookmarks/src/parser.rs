//! Netscape bookmark export parser.
//!
//! Browser "export bookmarks" files are the ancient Netscape format: a `<DL>`
//! definition list where each `<DT>` holds either an `<H3>` folder heading
//! followed by a nested `<DL>`, or an `<A HREF>` bookmark link. The markup is
//! tag soup (`<DL><p>`, unclosed `<DT>`), so it goes through the same
//! html5ever-backed parser used for page content.

use scraper::{ElementRef, Html, Selector};

use linkdex_shared::{BookmarkNode, LinkdexError, Result};

/// Parse a bookmark export document into its top-level nodes.
///
/// Fails if the document contains no `<DL>` list at all — an export without
/// one is not a bookmark file.
pub fn parse_str(html: &str) -> Result<Vec<BookmarkNode>> {
    let doc = Html::parse_document(html);
    let dl_sel = Selector::parse("dl").expect("static selector");

    // Document order puts the outermost list first.
    let root = doc
        .select(&dl_sel)
        .next()
        .ok_or_else(|| LinkdexError::parse("no <DL> list found in bookmark export"))?;

    Ok(parse_list(root))
}

/// Parse the entries of one `<DL>` list, in document order.
fn parse_list(dl: ElementRef<'_>) -> Vec<BookmarkNode> {
    let mut nodes: Vec<BookmarkNode> = Vec::new();

    for child in dl.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        match el.value().name() {
            "dt" => {
                if let Some(node) = parse_entry(el) {
                    nodes.push(node);
                }
            }
            // Some writers close </DT> before the nested list, leaving the
            // <DL> a sibling. Attach it to the folder it belongs to.
            "dl" => {
                if let Some(BookmarkNode::Folder { children, .. }) = nodes.last_mut() {
                    if children.is_empty() {
                        *children = parse_list(el);
                    }
                }
            }
            _ => {}
        }
    }

    nodes
}

/// Parse one `<DT>` entry: `<H3>` makes a folder, `<A HREF>` a bookmark.
fn parse_entry(dt: ElementRef<'_>) -> Option<BookmarkNode> {
    let mut folder_title: Option<String> = None;
    let mut is_folder = false;
    let mut link: Option<(Option<String>, String)> = None;
    let mut children: Vec<BookmarkNode> = Vec::new();

    for child in dt.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        match el.value().name() {
            "h3" => {
                is_folder = true;
                folder_title = element_text(el);
            }
            "a" => {
                if let Some(href) = el.value().attr("href") {
                    link = Some((element_text(el), href.to_string()));
                } else {
                    tracing::debug!("bookmark entry without href, skipping");
                }
            }
            // html5ever nests the folder's <DL> inside the unclosed <DT>.
            "dl" => children = parse_list(el),
            _ => {}
        }
    }

    if is_folder {
        Some(BookmarkNode::Folder {
            title: folder_title,
            children,
        })
    } else {
        link.map(|(title, url)| BookmarkNode::Bookmark { title, url })
    }
}

fn element_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}
