//! REST Gateway - hosted backend over HTTP
//!
//! Table access follows the PostgREST conventions (`/rest/v1/<table>` with
//! `field=op.value` filters), auth the GoTrue endpoints under `/auth/v1`,
//! files the storage API under `/storage/v1`. The realtime feed needs a
//! websocket channel and is not provided here.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::Stream;
use tracing::{debug, warn};
use url::Url;

use super::{ChangeEvent, Filter, Gateway, Query, SignUp};
use crate::actions::FileUpload;
use crate::config::GatewayConfig;
use crate::error::{Result, ShellError};
use crate::record::Record;
use crate::state::Session;

pub struct RestGateway {
    client: Client,
    base: Url,
    key: String,
    session: Mutex<Option<Session>>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

impl RestGateway {
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        // Trailing slash so `join` appends instead of replacing the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| ShellError::Config {
            reason: format!("invalid gateway url '{}': {}", base_url, e),
        })?;

        Ok(Self {
            client: Client::new(),
            base,
            key: key.to_string(),
            session: Mutex::new(None),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        match (&config.url, &config.key) {
            (Some(url), Some(key)) => Self::new(url, key),
            _ => Err(ShellError::Config {
                reason: "gateway.url and gateway.key must both be set".to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| ShellError::Config {
            reason: format!("invalid gateway path '{}': {}", path, e),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self
            .session
            .lock()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.key.clone());
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(bearer)
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(operation, status = status.as_u16(), "Gateway request failed");
        Err(ShellError::gateway(operation, error_message(&body, status.as_u16())))
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{}", table))
    }

    fn authenticated(&self, auth: AuthResponse) -> Session {
        let session = Session {
            user_id: auth.user.id,
            email: auth.user.email,
            access_token: auth.access_token,
        };
        *self.session.lock() = Some(session.clone());
        session
    }
}

/// Backend error text: `{"message": .., "code": ..}` when present
fn error_message(body: &str, status: u16) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => {
            let message = v
                .get("message")
                .or_else(|| v.get("msg"))
                .or_else(|| v.get("error_description"))
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            match v.get("code").and_then(Value::as_str) {
                Some(code) => format!("{} ({})", message, code),
                None => message.to_string(),
            }
        }
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => format!("HTTP {}", status),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Nested form used inside `or=(..)` / `and=(..)`
fn nested(filter: &Filter) -> String {
    match filter {
        Filter::Eq(field, value) => format!("{}.eq.{}", field, literal(value)),
        Filter::Gte(field, n) => format!("{}.gte.{}", field, n),
        Filter::Lte(field, n) => format!("{}.lte.{}", field, n),
        Filter::Contains(field, needle) => format!("{}.ilike.*{}*", field, needle),
        Filter::Any(filters) => format!("or({})", join(filters)),
        Filter::All(filters) => format!("and({})", join(filters)),
    }
}

fn join(filters: &[Filter]) -> String {
    filters.iter().map(nested).collect::<Vec<_>>().join(",")
}

/// Top-level query parameter for one filter
fn query_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(field, value) => (field.clone(), format!("eq.{}", literal(value))),
        Filter::Gte(field, n) => (field.clone(), format!("gte.{}", n)),
        Filter::Lte(field, n) => (field.clone(), format!("lte.{}", n)),
        Filter::Contains(field, needle) => (field.clone(), format!("ilike.*{}*", needle)),
        Filter::Any(filters) => ("or".to_string(), format!("({})", join(filters))),
        Filter::All(filters) => ("and".to_string(), format!("({})", join(filters))),
    }
}

fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(query.filters.iter().map(query_param));
    if let Some((field, ascending)) = &query.order {
        let direction = if *ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", field, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, query: Query) -> Result<Vec<Record>> {
        let url = self.table_url(&query.table)?;
        debug!(table = %query.table, "REST select");
        let builder = self.request(Method::GET, url).query(&query_params(&query));
        Ok(self.send("select", builder).await?.json().await?)
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record> {
        let builder = self
            .request(Method::POST, self.table_url(table)?)
            .header("Prefer", "return=representation")
            .json(&record);
        let rows: Vec<Record> = self.send("insert", builder).await?.json().await?;
        Ok(rows.into_iter().next().unwrap_or(record))
    }

    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<Record> {
        let builder = self
            .request(Method::PATCH, self.table_url(table)?)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&changes);
        let rows: Vec<Record> = self.send("update", builder).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| ShellError::RecordNotFound {
            table: table.to_string(),
            id: id.to_string(),
        })
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let builder = self
            .request(Method::DELETE, self.table_url(table)?)
            .query(&[("id", format!("eq.{}", id))]);
        self.send("delete", builder).await?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let builder = self
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }));
        let auth: AuthResponse = self.send("sign_in", builder).await?.json().await?;
        Ok(self.authenticated(auth))
    }

    async fn sign_up(&self, request: SignUp) -> Result<Session> {
        let builder = self
            .request(Method::POST, self.endpoint("auth/v1/signup")?)
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "data": {
                    "full_name": request.full_name,
                    "phone": request.phone,
                    "role": request.role,
                    "district": request.district,
                }
            }));
        let auth: AuthResponse = self.send("sign_up", builder).await?.json().await?;
        let session = self.authenticated(auth);

        let profile = Record::new()
            .with("id", session.user_id.as_str())
            .with("full_name", request.full_name.as_str())
            .with("phone", request.phone.as_str())
            .with("role", request.role.to_string())
            .with("district", request.district.map(Value::from).unwrap_or(Value::Null));
        self.insert("profiles", profile).await?;

        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let builder = self.request(Method::POST, self.endpoint("auth/v1/logout")?);
        let result = self.send("sign_out", builder).await;
        // The local session is dropped even if the server call fails
        *self.session.lock() = None;
        result.map(|_| ())
    }

    async fn upload(&self, bucket: &str, file: &FileUpload) -> Result<String> {
        let object = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            file.name.replace(' ', "_")
        );
        let builder = self
            .request(
                Method::POST,
                self.endpoint(&format!("storage/v1/object/{}/{}", bucket, object))?,
            )
            .header("Content-Type", &file.content_type)
            .body(file.bytes.clone());
        self.send("upload", builder).await?;

        Ok(self
            .endpoint(&format!("storage/v1/object/public/{}/{}", bucket, object))?
            .to_string())
    }

    fn subscribe(&self, table: &str) -> Box<dyn Stream<Item = ChangeEvent> + Send + Unpin> {
        debug!(table, "Realtime feed not available over REST");
        Box::new(tokio_stream::empty())
    }
}
