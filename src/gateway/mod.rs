//! Gateway - Connector Layer
//!
//! Abstracts the hosted backend: table queries, auth, file storage and
//! realtime change feeds. The shell only ever talks to `dyn Gateway`.

mod memory;
mod rest;

pub use memory::{GatewayCall, MemoryGateway};
pub use rest::RestGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::Stream;

use crate::actions::FileUpload;
use crate::error::Result;
use crate::record::Record;
use crate::state::{Collection, Role, Session};

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Remote data / auth / storage service
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Rows of `query.table` matching every filter
    async fn select(&self, query: Query) -> Result<Vec<Record>>;

    /// Insert a row; returns it as stored (with generated id)
    async fn insert(&self, table: &str, record: Record) -> Result<Record>;

    /// Merge `changes` into the row with `id`
    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<Record>;

    async fn delete(&self, table: &str, id: &str) -> Result<()>;

    /// Session restored from the previous run, if any
    async fn current_session(&self) -> Result<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Create the account and its profile row
    async fn sign_up(&self, request: SignUp) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    /// Store a file and return its public URL
    async fn upload(&self, bucket: &str, file: &FileUpload) -> Result<String>;

    /// Change feed for one table
    fn subscribe(&self, table: &str) -> Box<dyn Stream<Item = ChangeEvent> + Send + Unpin>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// Row predicate evaluated by the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, f64),
    Lte(String, f64),
    /// Case-insensitive substring
    Contains(String, String),
    /// Any nested filter matches
    Any(Vec<Filter>),
    /// Every nested filter matches
    All(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq(field.to_string(), value.into())
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Eq(field, expected) => match (record.get(field), expected) {
                (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
                (Some(actual), expected) => actual == expected,
                (None, Value::Null) => true,
                (None, _) => false,
            },
            Self::Gte(field, bound) => record.number(field).is_some_and(|n| n >= *bound),
            Self::Lte(field, bound) => record.number(field).is_some_and(|n| n <= *bound),
            Self::Contains(field, needle) => record
                .text(field)
                .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase())),
            Self::Any(filters) => filters.iter().any(|f| f.matches(record)),
            Self::All(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }
}

/// Select request: table, filters, ordering, limit
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    /// (field, ascending)
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Query for a cached collection with its default ordering
    pub fn collection(collection: Collection) -> Self {
        let (field, ascending) = collection.order();
        Self::table(collection.table()).order(field, ascending)
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    pub fn order(mut self, field: &str, ascending: bool) -> Self {
        self.order = Some((field.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth / Realtime
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One row change pushed by the realtime feed
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub record: Record,
}
