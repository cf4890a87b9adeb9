//! HTML envelope and plain-text rendering of message bodies

use scraper::Html;

const HTML_HEAD: &str =
    r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=utf-8" /></head><body>"#;
const HTML_TAIL: &str = "</body></html>";

/// Wrap a message body in a minimal UTF-8 HTML document
pub fn make_html(message: &str) -> String {
    let mut html = String::with_capacity(HTML_HEAD.len() + message.len() + HTML_TAIL.len());
    html.push_str(HTML_HEAD);
    html.push_str(message);
    html.push_str(HTML_TAIL);
    html
}

/// Plain-text rendering of `html`: every text node, markup stripped,
/// whitespace kept as written
pub fn make_text(html: &str) -> String {
    Html::parse_document(html).root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_html_envelope() {
        let html = make_html("<b>Hi</b>");
        assert_eq!(
            html,
            "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" /></head><body><b>Hi</b></body></html>"
        );
    }

    #[test]
    fn test_make_text_strips_markup() {
        assert_eq!(make_text("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(make_text("line one\nline two"), "line one\nline two");
        assert_eq!(make_text("plain"), "plain");
    }

    #[test]
    fn test_make_text_of_envelope() {
        assert_eq!(make_text(&make_html("<i>Report</i> ready")), "Report ready");
    }
}
