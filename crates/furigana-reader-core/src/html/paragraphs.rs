use markup5ever_rcdom::{Handle, NodeData};

use super::{collect_outermost, is_element, outer_html, parse};

/// Elements whose text is a reading aid, not part of the sentence
const RUBY_ANNOTATIONS: [&str; 2] = ["rt", "rp"];

fn paragraph_nodes(html: &str) -> Vec<Handle> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let dom = parse(html);
    let mut nodes = Vec::new();
    collect_outermost(&dom.document, &|node| is_element(node, "p"), &mut nodes);
    nodes
}

/// Plain text of every `<p>` in a page fragment, in document order.
///
/// Markup is dropped, furigana readings (`<rt>`, `<rp>`) are skipped and
/// whitespace runs collapse to a single space. Empty paragraphs are kept so
/// indices line up with the rendered paragraphs.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    paragraph_nodes(html)
        .iter()
        .map(|node| {
            let mut text = String::new();
            collect_text(node, &mut text);
            normalize_whitespace(&text)
        })
        .collect()
}

/// Outer HTML of every `<p>` in a page fragment, markup included.
pub fn paragraph_fragments(html: &str) -> Vec<String> {
    paragraph_nodes(html).iter().map(outer_html).collect()
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if RUBY_ANNOTATIONS.contains(&&*name.local) => {}
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_order() {
        let html = r#"<section class="page"><h2>Page 1</h2><p>一つ目</p><p>二つ目</p></section>"#;
        assert_eq!(extract_paragraphs(html), vec!["一つ目", "二つ目"]);
    }

    #[test]
    fn test_ruby_readings_are_stripped() {
        let html = "<p><ruby>東京<rt>とうきょう</rt></ruby>へ<ruby>行<rp>(</rp><rt>い</rt><rp>)</rp></ruby>く</p>";
        assert_eq!(extract_paragraphs(html), vec!["東京へ行く"]);
    }

    #[test]
    fn test_inline_markup_and_whitespace() {
        let html = "<p>  Hello <b>bold</b>\n   <i>world</i>  </p>";
        assert_eq!(extract_paragraphs(html), vec!["Hello bold world"]);
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(extract_paragraphs("").is_empty());
        assert!(extract_paragraphs("<section class=\"page\"><h2>only heading</h2></section>").is_empty());
    }

    #[test]
    fn test_empty_paragraph_keeps_its_slot() {
        let html = "<p>a</p><p></p><p>c</p>";
        assert_eq!(extract_paragraphs(html), vec!["a", "", "c"]);
    }

    #[test]
    fn test_fragments_keep_markup() {
        let html = "<p><ruby>漢字<rt>かんじ</rt></ruby></p><p>次</p>";
        let fragments = paragraph_fragments(html);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "<p><ruby>漢字<rt>かんじ</rt></ruby></p>");
        assert_eq!(fragments[1], "<p>次</p>");
    }

    #[test]
    fn test_fragments_and_text_align() {
        let html = "<p>a</p><div><p>b</p></div><p>c</p>";
        assert_eq!(paragraph_fragments(html).len(), extract_paragraphs(html).len());
    }
}
