// src/core/html.rs
// Small query helpers on top of `scraper`.

use scraper::{ElementRef, Html, Selector};

use super::sanitize::normalize_ws;

/// Parse a CSS selector that is known at compile time.
/// Panics on a malformed literal, which is a programming error.
pub fn sel(css: &str) -> Selector {
    match Selector::parse(css) {
        Ok(s) => s,
        Err(e) => panic!("invalid selector {css:?}: {e}"),
    }
}

/// All text under `el`, whitespace collapsed to single spaces.
pub fn text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Text under `el` keeping one line per text node, like a `get_text("\n")`.
/// Blank runs are dropped and each line is trimmed.
pub fn text_lines(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Highest page number listed in the `<select name="page">` pagination control.
pub fn max_page_option(doc: &Html) -> Option<u32> {
    let options = sel(r#"select[name="page"] option"#);
    doc.select(&options)
        .filter_map(|o| {
            o.value()
                .attr("value")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .or_else(|| text(o).parse::<u32>().ok())
        })
        .max()
}

/// Numeric query parameter from an href, e.g. `who` in `user.php?who=123`.
pub fn query_param_u32(href: &str, key: &str) -> Option<u32> {
    let query = href.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_page_reads_option_values_and_text() {
        let doc = Html::parse_document(
            r#"<form><select name="page">
                 <option value="1">1</option><option>2</option><option value="17">17</option>
               </select></form>"#,
        );
        assert_eq!(max_page_option(&doc), Some(17));
    }

    #[test]
    fn max_page_absent_without_selector() {
        let doc = Html::parse_document("<p>one page only</p>");
        assert_eq!(max_page_option(&doc), None);
    }

    #[test]
    fn query_param_parsing() {
        assert_eq!(query_param_u32("user.php?who=38632", "who"), Some(38632));
        assert_eq!(query_param_u32("topic.php?which=7&page=3", "page"), Some(3));
        assert_eq!(query_param_u32("user.php", "who"), None);
        assert_eq!(query_param_u32("user.php?who=abc", "who"), None);
    }

    #[test]
    fn text_collapses_whitespace() {
        let doc = Html::parse_fragment("<div>  hello \n <b>big</b>\tworld </div>");
        let div = doc.select(&sel("div")).next().unwrap();
        assert_eq!(text(div), "hello big world");
        assert_eq!(text_lines(div), "hello\nbig\nworld");
    }
}
