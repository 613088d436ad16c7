use anyhow::Context;
use reqwest::{
    Client, ClientBuilder, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// HTTP client preloaded with the remote store's auth and API headers.
#[derive(Clone)]
pub struct RequestClient {
    client: Client,
}

impl RequestClient {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {token}"))
            .context("access token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.client.put(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(RequestClient::new("bad\ntoken").is_err());
    }
}
