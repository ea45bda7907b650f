//! PostgREST-style HTTP implementation of [`RemoteStore`].

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::debug;

use super::{RemoteEstimate, RemoteStore};
use crate::config::RemoteCredentials;
use crate::{AppError, Result};

const API_PREFIX: &str = "rest/v1";

/// Remote table reached over HTTP.
///
/// Requests carry the access token both as the `apikey` header and as a
/// bearer token. No client-side timeout is set.
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    http: Client,
    table_url: String,
    table: String,
}

impl RestRemoteStore {
    /// Build a client for `table` at the credentials' endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the token is not a valid header value,
    /// or `AppError::Remote` if the HTTP client cannot be built.
    pub fn new(credentials: &RemoteCredentials, table: &str) -> Result<Self> {
        let token = HeaderValue::from_str(&credentials.token)
            .map_err(|err| AppError::Config(format!("invalid remote token: {err}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.token))
            .map_err(|err| AppError::Config(format!("invalid remote token: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), token);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            table_url: format!("{}/{API_PREFIX}/{table}", credentials.url),
            table: table.to_owned(),
        })
    }

    /// Base URL of the table endpoint.
    #[must_use]
    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn row_url(&self, id: i64) -> String {
        format!("{}?id=eq.{id}", self.table_url)
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_owned());
    Err(AppError::Remote(format!("{operation} returned {status}: {body}")))
}

impl RemoteStore for RestRemoteStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn select_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RemoteEstimate>>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}?select=*&order=id.asc", self.table_url);
            let response = self.http.get(&url).send().await?;
            let rows: Vec<RemoteEstimate> = ensure_success(response, "select").await?.json().await?;
            debug!(table = %self.table, count = rows.len(), "remote select complete");
            Ok(rows)
        })
    }

    fn insert<'a>(
        &'a self,
        rows: &'a [RemoteEstimate],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .http
                .post(&self.table_url)
                .header("Prefer", "return=minimal")
                .json(rows)
                .send()
                .await?;
            ensure_success(response, "insert").await?;
            Ok(())
        })
    }

    fn update<'a>(
        &'a self,
        row: &'a RemoteEstimate,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .http
                .patch(self.row_url(row.id))
                .header("Prefer", "return=minimal")
                .json(row)
                .send()
                .await?;
            ensure_success(response, "update").await?;
            Ok(())
        })
    }

    fn delete(&self, id: i64) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let response = self.http.delete(self.row_url(id)).send().await?;
            ensure_success(response, "delete").await?;
            Ok(())
        })
    }
}
