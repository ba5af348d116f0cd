//! Low-level HTTP client — `HttpClient`.
//!
//! One thin wrapper around `reqwest` shared by both exchange clients.
//! Every call decodes into a typed response schema; a non-2xx status maps
//! to a typed `HttpError`, never to a success payload. There is no retry
//! and no backoff — a failed call is the caller's problem.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing;

use crate::error::HttpError;

/// Header name/value pairs attached to a single request.
pub type Headers = Vec<(&'static str, String)>;

/// Low-level REST client bound to one base URL.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path_query` (path plus any pre-encoded query string).
    pub async fn get<T: DeserializeOwned>(
        &self,
        path_query: &str,
        headers: &Headers,
    ) -> Result<T, HttpError> {
        self.execute(Method::GET, path_query, None, headers).await
    }

    /// POST `path_query` with no body (parameters ride in the query string).
    pub async fn post<T: DeserializeOwned>(
        &self,
        path_query: &str,
        headers: &Headers,
    ) -> Result<T, HttpError> {
        self.execute(Method::POST, path_query, None, headers).await
    }

    /// DELETE `path_query` with no body.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path_query: &str,
        headers: &Headers,
    ) -> Result<T, HttpError> {
        self.execute(Method::DELETE, path_query, None, headers).await
    }

    /// POST `path` with a URL-encoded form body.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        headers: &Headers,
    ) -> Result<T, HttpError> {
        self.execute(Method::POST, path, Some(form), headers).await
    }

    /// DELETE `path` with a URL-encoded form body.
    pub async fn delete_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
        headers: &Headers,
    ) -> Result<T, HttpError> {
        self.execute(Method::DELETE, path, Some(form), headers).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(String, String)]>,
        headers: &Headers,
    ) -> Result<T, HttpError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut req = self.client.request(method.clone(), &url);
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        if let Some(body) = form {
            req = req.form(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body_text = resp.text().await?;

        if status.is_success() {
            return serde_json::from_str::<T>(&body_text).map_err(|e| {
                tracing::warn!("Response decode failed for {} {}: {}", method, url, e);
                HttpError::Decode(e)
            });
        }

        tracing::warn!("{} {} returned status {}", method, url, status.as_u16());

        match status.as_u16() {
            401 | 403 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            code => Err(HttpError::Rejected {
                status: code,
                body: body_text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpClient::new("https://testnet.bitmex.com/api/v1/");
        assert_eq!(client.base_url(), "https://testnet.bitmex.com/api/v1");
    }
}
