use crate::call::ConsoleCall;
use crate::page;
use crate::{Error, Result};
use common::{document, Credentials};
use log::{debug, info};
use reqwest::cookie::Jar;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Method, Response, StatusCode, Url};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

pub(crate) const CONSOLE_URL: &str = "https://offer.ebay.com/ws/eBayISAPI.dll";
pub(crate) const SIGN_IN_URL: &str = "https://signin.ebay.com/ws/eBayISAPI.dll";
const SIGN_IN_HOST: &str = "signin.ebay.com";

/// Where a console request ended up after the client followed at most one
/// redirect hop.
enum Landing {
    /// The page that was asked for.
    Page,
    /// The sign-in page: the session cookie is missing or expired.
    SignIn,
    /// Some other page; the console changed its flow.
    Elsewhere,
}

/// A logical request gets exactly one re-login. The transition is a pure
/// function so the bound is enforced by the type, not by convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    Fresh,
    RetriedAfterLogin,
}

fn next_attempt(attempt: Attempt) -> Option<Attempt> {
    match attempt {
        Attempt::Fresh => Some(Attempt::RetriedAfterLogin),
        Attempt::RetriedAfterLogin => None,
    }
}

/// Anti-forgery tokens, rotated by the console on every page load.
/// Last observed wins; there is no expiry to track.
#[derive(Default)]
struct Tokens {
    srt: Option<String>,
    stok: Option<String>,
}

#[derive(Clone)]
pub struct Session {
    /// Follows a single redirect hop and hands back anything further.
    http: reqwest::Client,
    /// Sign-in POSTs must observe their raw 302, so redirects stay off.
    pub(crate) sign_in_http: reqwest::Client,
    pub(crate) credentials: Credentials,
    tokens: Arc<Mutex<Tokens>>,
    /// Serializes logical requests; overlapping callers would race on the
    /// token cache.
    lock: Arc<AsyncMutex<()>>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let single_hop = Policy::custom(|attempt| {
            if attempt.previous().len() > 1 {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(single_hop)
            .build()?;
        let sign_in_http = reqwest::Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            http,
            sign_in_http,
            credentials,
            tokens: Arc::new(Mutex::new(Tokens::default())),
            lock: Arc::new(AsyncMutex::new(())),
        })
    }

    /// Issues one logical console request and returns the page body.
    ///
    /// A redirect to the sign-in page triggers a login and a single re-issue
    /// of the identical request; a sign-in redirect on the re-issue means the
    /// fresh session was rejected too and is fatal. Every page that comes
    /// back is scanned for rotated `srt`/`stok` tokens before it is returned.
    pub async fn request(
        &self,
        method: Method,
        call: ConsoleCall,
        params: &[(String, String)],
    ) -> Result<String> {
        let _guard = self.lock.lock().await;
        let mut attempt = Attempt::Fresh;

        loop {
            let (requested, response) = self.send(method.clone(), call, params).await?;

            if response.status().is_redirection() {
                // The client already followed one hop and was sent on again.
                let target = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|location| location.to_str().ok())
                    .unwrap_or_default()
                    .to_owned();
                return Err(Error::UnexpectedRedirect {
                    requested: requested.to_string(),
                    landed: target,
                });
            }

            let landed = response.url().clone();
            let status = response.status();
            let body = response.text().await?;

            match classify_landing(&requested, &landed) {
                Landing::Page => {
                    if status != StatusCode::OK {
                        return Err(Error::UnexpectedStatus { status, body });
                    }
                    self.harvest_tokens(&body);
                    return Ok(body);
                }
                Landing::SignIn => match next_attempt(attempt) {
                    Some(next) => {
                        info!(
                            "Console session expired, signing in as {}",
                            self.credentials.userid
                        );
                        self.sign_in(&body, requested.as_str()).await?;
                        attempt = next;
                    }
                    None => {
                        return Err(Error::RedirectAfterLogin {
                            landed: landed.to_string(),
                        })
                    }
                },
                Landing::Elsewhere => {
                    return Err(Error::UnexpectedRedirect {
                        requested: requested.to_string(),
                        landed: landed.to_string(),
                    })
                }
            }
        }
    }

    pub(crate) async fn get(&self, call: ConsoleCall) -> Result<String> {
        self.request(Method::GET, call, &[]).await
    }

    pub(crate) async fn post(&self, call: ConsoleCall, params: &[(String, String)]) -> Result<String> {
        self.request(Method::POST, call, params).await
    }

    async fn send(
        &self,
        method: Method,
        call: ConsoleCall,
        params: &[(String, String)],
    ) -> Result<(Url, Response)> {
        let url = format!("{CONSOLE_URL}?{call}");
        let builder = if method == Method::POST {
            let form = {
                let tokens = self.tokens.lock().unwrap();
                with_tokens(params, &tokens)
            };
            self.http.post(&url).form(&form)
        } else {
            let mut builder = self.http.get(&url);
            if !params.is_empty() {
                builder = builder.query(params);
            }
            builder
        };

        let request = builder.build()?;
        let requested = request.url().clone();
        debug!("{method} {requested}");
        let response = self.http.execute(request).await?;
        Ok((requested, response))
    }

    fn harvest_tokens(&self, body: &str) {
        let fields = page::hidden_fields(&document::parse_html(body));
        let mut tokens = self.tokens.lock().unwrap();
        for (name, value) in fields {
            match name.as_str() {
                "srt" => tokens.srt = Some(value),
                "stok" => tokens.stok = Some(value),
                _ => {}
            }
        }
    }
}

/// Echo the cached anti-forgery tokens on a state-changing POST.
fn with_tokens(params: &[(String, String)], tokens: &Tokens) -> Vec<(String, String)> {
    let mut form = params.to_vec();
    if let Some(srt) = &tokens.srt {
        form.push(("srt".to_owned(), srt.clone()));
    }
    if let Some(stok) = &tokens.stok {
        form.push(("stok".to_owned(), stok.clone()));
    }
    form
}

fn classify_landing(requested: &Url, landed: &Url) -> Landing {
    if landed == requested {
        Landing::Page
    } else if landed.host_str() == Some(SIGN_IN_HOST) {
        Landing::SignIn
    } else {
        Landing::Elsewhere
    }
}
