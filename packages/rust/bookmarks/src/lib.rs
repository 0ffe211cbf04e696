//! Bookmark export parsing and tree flattening.
//!
//! This crate provides:
//! - [`parser`] — Netscape bookmark HTML export parser
//! - [`flatten`] — depth-first expansion of a bookmark tree into its URL list

pub mod parser;

use std::path::Path;

use linkdex_shared::{BookmarkNode, LinkdexError, Result};

pub use parser::parse_str;

/// Read and parse a bookmark export file into its top-level nodes.
pub fn parse_file(path: &Path) -> Result<Vec<BookmarkNode>> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkdexError::io(path, e))?;
    parse_str(&content)
}

/// Flatten a bookmark tree into the flat URL list.
///
/// Depth-first, child-order traversal: a folder contributes the flattened
/// URLs of all its children in order, a bookmark contributes its own URL,
/// and empty folders contribute nothing.
pub fn flatten(nodes: &[BookmarkNode]) -> Vec<String> {
    let mut urls = Vec::new();
    collect_urls(nodes, &mut urls);
    urls
}

fn collect_urls(nodes: &[BookmarkNode], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            BookmarkNode::Folder { children, .. } => collect_urls(children, out),
            BookmarkNode::Bookmark { url, .. } => out.push(url.clone()),
        }
    }
}
