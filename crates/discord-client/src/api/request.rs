use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};

use super::*;

impl DiscordApiClient {
    pub fn new(authorization: Authorization, timeout: Duration) -> Result<Self, DiscordError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            authorization,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build auth headers from the configured credentials.
    fn auth_headers(&self) -> Result<HeaderMap, DiscordError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&self.authorization.header_value())
            .map_err(|_| DiscordError::AuthRequired)?;
        headers.insert(AUTHORIZATION, value);
        headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));
        Ok(headers)
    }

    /// Execute a GET request with auth headers and return the body.
    pub(super) async fn authenticated_get(&self, url: &str) -> Result<String, DiscordError> {
        let headers = self.auth_headers()?;
        let resp = self.http.get(url).headers(headers).send().await.map_err(|e| {
            if e.is_timeout() {
                DiscordError::Timeout
            } else {
                DiscordError::Http(e)
            }
        })?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            tracing::warn!(url, status = status.as_u16(), "Discord rejected credentials");
        }

        if !status.is_success() {
            return Err(DiscordError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }
}
