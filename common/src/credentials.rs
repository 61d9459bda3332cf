use crate::Result;
use std::env;

/// Marketplace credentials, loaded once at startup and immutable for the
/// process lifetime. The auth token authenticates the XML trading API; the
/// userid/password pair signs in to the HTML console.
#[derive(Clone)]
pub struct Credentials {
    pub auth_token: String,
    pub userid: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth_token: env::var("EBAY_AUTH_TOKEN")?,
            userid: env::var("EBAY_USERID")?,
            password: env::var("EBAY_PASSWORD")?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("userid", &self.userid)
            .finish_non_exhaustive()
    }
}
