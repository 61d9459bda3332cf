//! Field extraction from console pages. The console predates any structured
//! API: state lives in hidden form inputs, results are announced in the page
//! heading, and the block list is a single textarea.
use common::document::Element;

/// All hidden form inputs on the page, in document order. Later duplicates
/// deliberately survive so that callers applying them in order end up with
/// the last observed value.
pub(crate) fn hidden_fields(page: &Element) -> Vec<(String, String)> {
    page.find_all(&["input"])
        .into_iter()
        .filter(|input| {
            input
                .attr("type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
        })
        .filter_map(|input| {
            let name = input.attr("name")?;
            Some((
                name.to_owned(),
                input.attr("value").unwrap_or_default().to_owned(),
            ))
        })
        .collect()
}

/// The page's `<h1>` text, the console's way of reporting an outcome.
pub(crate) fn heading(page: &Element) -> String {
    page.find_first(&["h1"])
        .map(|h1| h1.text().trim().to_owned())
        .unwrap_or_default()
}

/// Content of the named `<textarea>`, if the page has one.
pub(crate) fn textarea(page: &Element, name: &str) -> Option<String> {
    page.find_all(&["textarea"])
        .into_iter()
        .find(|area| area.attr("name") == Some(name))
        .map(|area| area.text().trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::document::parse_html;

    #[test]
    fn collects_hidden_fields_in_document_order() {
        let page = parse_html(
            "<html><body><form>\
             <input type=\"hidden\" name=\"srt\" value=\"AAA\">\
             <input type=\"text\" name=\"userid\">\
             <input type=\"HIDDEN\" name=\"stok\" value=\"BBB\">\
             <input type=\"hidden\" value=\"anonymous\">\
             </form></body></html>",
        );

        assert_eq!(
            hidden_fields(&page),
            [
                ("srt".to_owned(), "AAA".to_owned()),
                ("stok".to_owned(), "BBB".to_owned()),
            ]
        );
    }

    #[test]
    fn heading_is_empty_when_page_has_none() {
        let page = parse_html("<html><body><p>nothing here</p></body></html>");
        assert_eq!(heading(&page), "");
    }

    #[test]
    fn textarea_is_matched_by_name() {
        let page = parse_html(
            "<html><body>\
             <textarea name=\"notes\">ignore me</textarea>\
             <textarea name=\"bidderlist\">alice, bob</textarea>\
             </body></html>",
        );

        assert_eq!(textarea(&page, "bidderlist").as_deref(), Some("alice, bob"));
        assert_eq!(textarea(&page, "absent"), None);
    }
}
