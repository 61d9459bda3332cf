//! Structured-document codec shared by both wire syntaxes. Strict XML
//! (trading API) and tag-soup HTML (console pages) are parsed into the same
//! element tree, and fields are pulled out of either with breadcrumb paths.
use crate::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{ElementRef, Html};
use std::fmt::Write;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(tag);
        element.children.push(Node::Text(text.into()));
        element
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn insert_element(&mut self, index: usize, element: Element) {
        self.children.insert(index, Node::Element(element));
    }

    /// First element matching `path`, or `None` if nothing matches. Each path
    /// step is a descendant search in pre-order, so the breadcrumb does not
    /// have to name every intermediate level.
    pub fn find_first(&self, path: &[&str]) -> Option<&Element> {
        let (tag, rest) = path.split_first()?;
        self.children.iter().find_map(|child| {
            let Node::Element(element) = child else {
                return None;
            };
            if element.tag == *tag {
                if rest.is_empty() {
                    Some(element)
                } else {
                    element.find_first(rest)
                }
            } else {
                element.find_first(path)
            }
        })
    }

    /// Every element matching `path`, in document order. A matched element is
    /// searched only with the remaining breadcrumb, not re-scanned for the
    /// step it already satisfied.
    pub fn find_all(&self, path: &[&str]) -> Vec<&Element> {
        let mut matches = Vec::new();
        self.collect_matches(path, &mut matches);
        matches
    }

    fn collect_matches<'a>(&'a self, path: &[&str], matches: &mut Vec<&'a Element>) {
        let Some((tag, rest)) = path.split_first() else {
            return;
        };
        for child in &self.children {
            let Node::Element(element) = child else {
                continue;
            };
            if element.tag == *tag {
                if rest.is_empty() {
                    matches.push(element);
                } else {
                    element.collect_matches(rest, matches);
                }
            } else {
                element.collect_matches(path, matches);
            }
        }
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.append_text(out),
            }
        }
    }

    /// Trimmed text of the first element matching `path`. `None` means the
    /// field is absent, which callers treat as data, not as a parse failure.
    pub fn first_text(&self, path: &[&str]) -> Option<String> {
        self.find_first(path)
            .map(|element| element.text().trim().to_owned())
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value.as_str()));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_xml(out),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Parses strict XML into an element tree. Malformed markup is an error;
/// the trading API promises well-formed responses.
pub fn parse_xml(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
                for attr in start.attributes() {
                    let attr = attr?;
                    element.set_attr(
                        String::from_utf8_lossy(attr.key.as_ref()),
                        attr.unescape_value()?,
                    );
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
                for attr in start.attributes() {
                    let attr = attr?;
                    element.set_attr(
                        String::from_utf8_lossy(attr.key.as_ref()),
                        attr.unescape_value()?,
                    );
                }
                close(element, &mut stack, &mut root);
            }
            Event::End(end) => {
                let Some(element) = stack.pop() else {
                    return Err(Error::UnexpectedClosingTag(
                        String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    ));
                };
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(
                        String::from_utf8_lossy(&cdata.into_inner()).into_owned(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(Error::NoRoot)
}

fn close(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Parses HTML into the same element tree, tolerating the console's tag soup.
/// Unclosed tags are repaired by the parser, so this never fails.
pub fn parse_html(input: &str) -> Element {
    let html = Html::parse_document(input);
    convert(html.root_element())
}

fn convert(source: ElementRef<'_>) -> Element {
    let value = source.value();
    let mut element = Element::new(value.name());
    for (name, attr_value) in value.attrs() {
        element.set_attr(name, attr_value);
    }
    for child in source.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            element.push_element(convert(child_element));
        } else if let scraper::Node::Text(text) = child.value() {
            element.children.push(Node::Text(text.to_string()));
        }
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_xml() {
        let root = parse_xml(
            "<GetItemResponse><Ack>Success</Ack>\
             <Item><Title>Blue &amp; white vase</Title></Item></GetItemResponse>",
        )
        .unwrap();

        assert_eq!(root.tag, "GetItemResponse");
        assert_eq!(root.first_text(&["Ack"]).as_deref(), Some("Success"));
        assert_eq!(
            root.first_text(&["Item", "Title"]).as_deref(),
            Some("Blue & white vase")
        );
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse_xml("<a><b></a>").is_err());
        assert!(parse_xml("no markup at all").is_err());
    }

    #[test]
    fn path_search_skips_intermediate_levels() {
        let root = parse_xml(
            "<Response><ItemArray>\
             <Item><ItemID>111</ItemID></Item>\
             <Item><ItemID>222</ItemID></Item>\
             </ItemArray></Response>",
        )
        .unwrap();

        let ids: Vec<String> = root
            .find_all(&["Item", "ItemID"])
            .iter()
            .map(|id| id.text())
            .collect();
        assert_eq!(ids, ["111", "222"]);
    }

    #[test]
    fn missing_paths_are_absent_not_errors() {
        let root = parse_xml("<Response><Ack>Success</Ack></Response>").unwrap();

        assert!(root.find_first(&["Item", "Title"]).is_none());
        assert!(root.find_all(&["HighBidder"]).is_empty());
        assert_eq!(root.first_text(&["Errors", "LongMessage"]), None);
    }

    #[test]
    fn serializes_tree_with_escaping() {
        let mut root = Element::new("GetItemRequest");
        root.set_attr("xmlns", "urn:ebay:apis:eBLBaseComponents");
        root.push_element(Element::with_text("ItemID", "111"));
        root.push_element(Element::with_text("Note", "a < b & c"));

        assert_eq!(
            root.to_xml(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <GetItemRequest xmlns=\"urn:ebay:apis:eBLBaseComponents\">\
             <ItemID>111</ItemID><Note>a &lt; b &amp; c</Note></GetItemRequest>"
        );
    }

    #[test]
    fn html_parsing_repairs_tag_soup() {
        let page = parse_html(
            "<html><body><h1>Review bids</h1><p>unclosed paragraph\
             <input type=\"hidden\" name=\"srt\" value=\"tok\">\
             </body></html>",
        );

        let heading = page.find_first(&["h1"]).unwrap();
        assert_eq!(heading.text(), "Review bids");
        let input = page.find_first(&["input"]).unwrap();
        assert_eq!(input.attr("name"), Some("srt"));
        assert_eq!(input.attr("value"), Some("tok"));
    }

    #[test]
    fn single_tag_path_scans_whole_document() {
        let page = parse_html(
            "<html><body><div><form><textarea name=\"bidderlist\">alice, bob\
             </textarea></form></div></body></html>",
        );

        let areas = page.find_all(&["textarea"]);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].text().trim(), "alice, bob");
    }
}
