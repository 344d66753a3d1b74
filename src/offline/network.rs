//! Outbound fetch used by the offline shell

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use super::{HttpRequest, HttpResponse};
use crate::error::{Result, ShellError};

#[async_trait]
pub trait Network: Send + Sync {
    /// Any HTTP status is `Ok`; only transport failures are errors
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|e| ShellError::Network(format!("bad method '{}': {}", request.method, e)))?;

        let mut builder = self.client.request(method, &request.url);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
