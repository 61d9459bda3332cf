//! Sign-in flow. Credentials are POSTed together with every hidden field the
//! sign-in page supplied, and success is a raw 302 whose target must be the
//! page the caller was trying to reach in the first place.
use crate::page;
use crate::session::{Session, SIGN_IN_URL};
use crate::{Error, Result};
use common::document;
use log::debug;
use reqwest::header::LOCATION;
use reqwest::StatusCode;

impl Session {
    /// Submits the sign-in form scraped from `sign_in_page`.
    ///
    /// `expected_redirect` is the URL of the originally requested page; the
    /// console redirects back to it after a successful sign-in. Any other
    /// target means the sign-in flow changed (extra verification step, new
    /// landing page) and is fatal rather than retried.
    pub(crate) async fn sign_in(&self, sign_in_page: &str, expected_redirect: &str) -> Result<()> {
        let mut form = page::hidden_fields(&document::parse_html(sign_in_page));
        form.push(("userid".to_owned(), self.credentials.userid.clone()));
        form.push(("pass".to_owned(), self.credentials.password.clone()));

        let response = self.sign_in_http.post(SIGN_IN_URL).form(&form).send().await?;
        let status = response.status();
        if status != StatusCode::FOUND {
            return Err(Error::LoginFailed {
                status,
                body: response.text().await?,
            });
        }

        let target = response
            .headers()
            .get(LOCATION)
            .and_then(|location| location.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !target.starts_with(expected_redirect) {
            return Err(Error::RedirectTarget {
                expected: expected_redirect.to_owned(),
                actual: target,
            });
        }

        debug!("Signed in, console redirecting to {target}");
        Ok(())
    }
}
