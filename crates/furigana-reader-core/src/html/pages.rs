use super::{PAGE_CLASS, collect_outermost, has_class, is_element, outer_html, parse};

/// Split a document into the outer HTML of its page sections.
///
/// Only outermost `<section class="page">` elements count; a page section
/// nested inside another stays part of its parent. Returns an empty vector for
/// empty input or when the document has no page markers.
pub fn split_pages(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let dom = parse(html);
    let mut sections = Vec::new();
    collect_outermost(
        &dom.document,
        &|node| is_element(node, "section") && has_class(node, PAGE_CLASS),
        &mut sections,
    );

    sections.iter().map(outer_html).collect()
}

/// Number of pages a document presents to the reader.
///
/// A document without page markers is shown as a single page.
pub fn page_count(html: &str) -> usize {
    split_pages(html).len().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_html(pages: usize) -> String {
        (1..=pages)
            .map(|i| format!(r#"<section class="page" data-page="{i}"><p>第 {i} 頁內容</p></section>"#))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_splits_in_document_order() {
        let pages = split_pages(&make_html(3));
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("第 1 頁內容"));
        assert!(pages[1].contains("第 2 頁內容"));
        assert!(pages[2].contains("第 3 頁內容"));
        assert!(pages[0].starts_with("<section"));
        assert!(pages[0].ends_with("</section>"));
    }

    #[test]
    fn test_empty_input() {
        assert!(split_pages("").is_empty());
        assert!(split_pages("   \n").is_empty());
    }

    #[test]
    fn test_no_markers() {
        assert!(split_pages("<p>no pages here</p>").is_empty());
        assert!(split_pages(r#"<section class="chapter"><p>x</p></section>"#).is_empty());
        assert_eq!(page_count("<p>no pages here</p>"), 1);
    }

    #[test]
    fn test_class_list_with_other_classes() {
        let pages = split_pages(r#"<section class="main page odd"><p>a</p></section>"#);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_nested_page_sections_stay_with_parent() {
        let html = r#"<section class="page"><p>outer</p><section class="page"><p>inner</p></section></section>"#;
        let pages = split_pages(html);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("inner"));
    }

    #[test]
    fn test_pages_inside_wrappers_are_found() {
        let html = r#"<html><body><div id="doc"><section class="page"><p>1</p></section></div><section class="page"><p>2</p></section></body></html>"#;
        assert_eq!(split_pages(html).len(), 2);
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let html = r#"<section class="page"><p>unclosed <ruby>漢<rt>かん</section><section class="page"><p>次"#;
        let pages = split_pages(html);
        assert!(!pages.is_empty());
        assert!(pages[0].contains("unclosed"));
    }

    #[test]
    fn test_ruby_markup_is_preserved() {
        let html = r#"<section class="page"><p><ruby>漢字<rt>かんじ</rt></ruby></p></section>"#;
        let pages = split_pages(html);
        assert!(pages[0].contains("<ruby>漢字<rt>かんじ</rt></ruby>"));
    }
}
