use crate::call::TradingCall;
use crate::{Error, Result};
use common::document::{self, Element};
use log::debug;
use reqwest::header::CONTENT_TYPE;

const API_URL: &str = "https://api.ebay.com/ws/api.dll";
const NAMESPACE: &str = "urn:ebay:apis:eBLBaseComponents";
const COMPATIBILITY_LEVEL: &str = "967";
const SITE_ID: &str = "0";
const ACK_SUCCESS: &str = "Success";

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    auth_token: String,
}

impl Client {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_token: auth_token.into(),
        }
    }

    /// Issues one API call and returns the parsed response document.
    ///
    /// Transport failures (connection errors, non-2xx) surface immediately;
    /// only a non-success acknowledgement becomes [`Error::ApiCallFailed`],
    /// with the request body and the API's own diagnostic message attached.
    pub async fn call(&self, call: TradingCall, params: Vec<Element>) -> Result<Element> {
        let request = build_request(call, &self.auth_token, params);
        debug!("{call}: POST {API_URL}");

        let response = self
            .http
            .post(API_URL)
            .header("X-EBAY-API-CALL-NAME", call.to_string())
            .header("X-EBAY-API-COMPATIBILITY-LEVEL", COMPATIBILITY_LEVEL)
            .header("X-EBAY-API-SITEID", SITE_ID)
            .header(CONTENT_TYPE, "text/xml")
            .body(request.clone())
            .send()
            .await?
            .error_for_status()?;

        classify_response(call, request, &response.text().await?)
    }
}

fn build_request(call: TradingCall, token: &str, params: Vec<Element>) -> String {
    let mut root = Element::new(format!("{call}Request"));
    root.set_attr("xmlns", NAMESPACE);
    for param in params {
        root.push_element(param);
    }
    add_token(&mut root, token);
    root.to_xml()
}

/// Inserts the credential element as the first child of the request root,
/// leaving every other child in place.
fn add_token(root: &mut Element, token: &str) {
    let mut credentials = Element::new("RequesterCredentials");
    credentials.push_element(Element::with_text("eBayAuthToken", token));
    root.insert_element(0, credentials);
}

fn classify_response(call: TradingCall, request: String, body: &str) -> Result<Element> {
    let response = document::parse_xml(body)?;
    if response.first_text(&["Ack"]).as_deref() == Some(ACK_SUCCESS) {
        return Ok(response);
    }
    Err(Error::ApiCallFailed {
        call,
        request,
        message: response.first_text(&["Errors", "LongMessage"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::document::Node;

    #[test]
    fn add_token_becomes_first_child_and_preserves_order() {
        let mut root = Element::new("GetSellerListRequest");
        root.push_element(Element::with_text("StartTimeFrom", "2026-07-01T00:00:00Z"));
        root.push_element(Element::with_text("StartTimeTo", "2026-08-01T00:00:00Z"));
        root.push_element(Element::with_text("GranularityLevel", "Coarse"));

        add_token(&mut root, "tok-123");

        let tags: Vec<&str> = root
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Element(element) => Some(element.tag.as_str()),
                Node::Text(_) => None,
            })
            .collect();
        assert_eq!(
            tags,
            [
                "RequesterCredentials",
                "StartTimeFrom",
                "StartTimeTo",
                "GranularityLevel"
            ]
        );
        assert_eq!(
            root.first_text(&["RequesterCredentials", "eBayAuthToken"])
                .as_deref(),
            Some("tok-123")
        );
        assert_eq!(
            root.find_all(&["RequesterCredentials"]).len(),
            1,
            "exactly one credential element"
        );
    }

    #[test]
    fn build_request_wraps_params_in_namespaced_root() {
        let body = build_request(
            TradingCall::GetItem,
            "tok",
            vec![Element::with_text("ItemID", "111")],
        );

        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(body.contains("<GetItemRequest xmlns=\"urn:ebay:apis:eBLBaseComponents\">"));
        assert!(body.contains("<RequesterCredentials><eBayAuthToken>tok</eBayAuthToken></RequesterCredentials><ItemID>111</ItemID>"));
    }

    #[test]
    fn success_ack_returns_response_document() {
        let response = classify_response(
            TradingCall::GetItem,
            String::new(),
            "<GetItemResponse><Ack>Success</Ack><Item><ItemID>111</ItemID></Item></GetItemResponse>",
        )
        .unwrap();

        assert_eq!(response.first_text(&["Item", "ItemID"]).as_deref(), Some("111"));
    }

    #[test]
    fn failure_ack_carries_long_message() {
        let err = classify_response(
            TradingCall::GetSellerList,
            "<req/>".to_owned(),
            "<GetSellerListResponse><Ack>Failure</Ack>\
             <Errors><LongMessage>Auth token is invalid.</LongMessage></Errors>\
             </GetSellerListResponse>",
        )
        .unwrap_err();

        match err {
            Error::ApiCallFailed { call, request, message } => {
                assert_eq!(call, TradingCall::GetSellerList);
                assert_eq!(request, "<req/>");
                assert_eq!(message.as_deref(), Some("Auth token is invalid."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failure_ack_without_message_is_still_typed() {
        let err = classify_response(
            TradingCall::GetItem,
            String::new(),
            "<GetItemResponse><Ack>Failure</Ack></GetItemResponse>",
        )
        .unwrap_err();

        match err {
            Error::ApiCallFailed { message, .. } => assert_eq!(message, None),
            other => panic!("unexpected error: {other}"),
        }
    }
}
