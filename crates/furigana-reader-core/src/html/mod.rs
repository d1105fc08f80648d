//! HTML helpers for annotated documents.
//!
//! Documents arrive as one HTML blob where every logical page is a
//! `<section class="page">` and every translatable block is a `<p>`, possibly
//! containing `<ruby>` furigana. Parsing goes through html5ever, which never
//! fails: malformed input produces a best-effort tree and, at worst, empty
//! results.

mod pages;
mod paragraphs;

pub use pages::{page_count, split_pages};
pub use paragraphs::{extract_paragraphs, paragraph_fragments};

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Class marking a page-boundary container
pub const PAGE_CLASS: &str = "page";

fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == tag)
}

fn has_class(handle: &Handle, class: &str) -> bool {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs.borrow().iter().any(|attr| {
            &*attr.name.local == "class"
                && attr.value.split_ascii_whitespace().any(|c| c == class)
        }),
        _ => false,
    }
}

/// Collect every element matching `pred` in document order without
/// descending into matches.
fn collect_outermost(handle: &Handle, pred: &dyn Fn(&Handle) -> bool, out: &mut Vec<Handle>) {
    if pred(handle) {
        out.push(handle.clone());
        return;
    }
    for child in handle.children.borrow().iter() {
        collect_outermost(child, pred, out);
    }
}

fn outer_html(handle: &Handle) -> String {
    let mut bytes = Vec::new();
    let node = SerializableHandle::from(handle.clone());
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    if let Err(e) = serialize(&mut bytes, &node, opts) {
        tracing::warn!("Failed to serialize HTML fragment: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
