//! HTTP client for the Buen Sabor REST API
//!
//! Wraps `reqwest` with the session's bearer token, request logging and
//! error normalization. Paths are relative to the configured base URL.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::AuthSession;

/// REST API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: AuthSession,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig, session: AuthSession) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create a client with a custom base URL and default settings (for testing)
    pub fn with_base_url(base_url: impl Into<String>, session: AuthSession) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request and decode the JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>`
    /// targets work for endpoints that return nothing.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> ClientResult<T> {
        tracing::debug!("{} {}", method, path);

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = ClientError::from_response(status, &body);
            if matches!(error, ClientError::Unauthorized { .. }) {
                self.session.expire();
            }
            tracing::warn!("{} {} -> {}: {}", method, path, status, error);
            return Err(error);
        }

        tracing::debug!("{} {} -> {}", method, path, status);

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!("{} {}: could not decode response: {}", method, path, e);
            ClientError::from(e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path);
        self.send(Method::GET, path, builder).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, builder).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, builder).await
    }

    /// POST without a body, parameters in the query string
    pub async fn post_with<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).query(query);
        self.send(Method::POST, path, builder).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, builder).await
    }

    /// PUT without a body, parameters in the query string
    pub async fn put_with<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).query(query);
        self.send(Method::PUT, path, builder).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await
    }
}
