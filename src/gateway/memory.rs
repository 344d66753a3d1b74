//! Memory Gateway - in-process backend for tests, demos and the CLI
//!
//! Tables live in memory. Every call is logged, failures can be injected per
//! operation, and per-table latency scripts let tests force responses to
//! resolve out of order.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use super::{ChangeEvent, ChangeKind, Gateway, Query, SignUp};
use crate::actions::FileUpload;
use crate::error::{Result, ShellError};
use crate::record::Record;
use crate::state::{Role, Session};

/// One logged gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub operation: &'static str,
    /// Table, bucket or account the call targeted
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Account {
    id: String,
    email: String,
    password: String,
}

/// YAML seed layout
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Seed {
    users: Vec<Account>,
    /// Id of the user whose session is restored on startup
    session: Option<String>,
    tables: HashMap<String, Vec<Record>>,
}

pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    accounts: Mutex<Vec<Account>>,
    session: Mutex<Option<Session>>,
    calls: Mutex<Vec<GatewayCall>>,
    failures: Mutex<HashMap<&'static str, String>>,
    latency: Mutex<HashMap<String, VecDeque<Duration>>>,
    changes: broadcast::Sender<ChangeEvent>,
    next_id: AtomicU64,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            tables: Mutex::new(HashMap::new()),
            accounts: Mutex::new(Vec::new()),
            session: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            latency: Mutex::new(HashMap::new()),
            changes,
            next_id: AtomicU64::new(1),
        }
    }

    /// Build from a YAML seed with `users`, `session` and `tables` keys
    pub fn from_yaml(content: &str) -> Result<Self> {
        let seed: Seed = serde_yaml::from_str(content)?;
        let gateway = Self::new();

        if let Some(user_id) = &seed.session {
            let account = seed
                .users
                .iter()
                .find(|a| &a.id == user_id)
                .ok_or_else(|| ShellError::Config {
                    reason: format!("seed session user '{}' is not in users", user_id),
                })?;
            *gateway.session.lock() = Some(session_for(account));
        }

        *gateway.accounts.lock() = seed.users;
        *gateway.tables.lock() = seed.tables;
        Ok(gateway)
    }

    /// Register an account (no profile row)
    pub fn add_user(&self, id: &str, email: &str, password: &str) {
        self.accounts.lock().push(Account {
            id: id.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Start with `user_id` signed in
    pub fn sign_in_as(&self, user_id: &str) -> Result<Session> {
        let accounts = self.accounts.lock();
        let account = accounts
            .iter()
            .find(|a| a.id == user_id)
            .ok_or(ShellError::NotAuthenticated)?;
        let session = session_for(account);
        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    /// Replace a table's rows without logging or broadcasting
    pub fn seed(&self, table: &str, rows: Vec<Record>) {
        self.tables.lock().insert(table.to_string(), rows);
    }

    /// Current rows of a table, unfiltered
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    /// Make the next call of `operation` fail with `message`
    pub fn fail_next(&self, operation: &'static str, message: impl Into<String>) {
        self.failures.lock().insert(operation, message.into());
    }

    /// Queue response delays for selects of `table`, consumed in call order
    pub fn script_latency(&self, table: &str, delays: impl IntoIterator<Item = Duration>) {
        self.latency
            .lock()
            .entry(table.to_string())
            .or_default()
            .extend(delays);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Number of logged calls of one operation
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log_call(&self, operation: &'static str, target: &str) {
        debug!(operation, target, "Gateway call");
        self.calls.lock().push(GatewayCall {
            operation,
            target: target.to_string(),
        });
    }

    fn record(&self, operation: &'static str, target: &str) -> Result<()> {
        self.log_call(operation, target);
        match self.failures.lock().remove(operation) {
            Some(message) => Err(ShellError::gateway(operation, message)),
            None => Ok(()),
        }
    }

    fn publish(&self, table: &str, kind: ChangeKind, record: &Record) {
        // No receivers is fine
        let _ = self.changes.send(ChangeEvent {
            table: table.to_string(),
            kind,
            record: record.clone(),
        });
    }

    fn generate_id(&self, prefix: &str) -> String {
        format!(
            "{}-{}",
            prefix,
            self.next_id.fetch_add(1, AtomicOrdering::SeqCst)
        )
    }
}

fn session_for(account: &Account) -> Session {
    Session {
        user_id: account.id.clone(),
        email: account.email.clone(),
        access_token: format!("memory-token-{}", account.id),
    }
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.number(field), b.number(field)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.text(field).cmp(&b.text(field)),
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, query: Query) -> Result<Vec<Record>> {
        self.record("select", &query.table)?;

        // Snapshot at call time; the scripted delay only postpones delivery
        let mut rows: Vec<Record> = self
            .tables
            .lock()
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((field, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_field(a, b, field);
                if *ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        let delay = self
            .latency
            .lock()
            .get_mut(&query.table)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, mut record: Record) -> Result<Record> {
        self.record("insert", table)?;

        if record.id().is_none() {
            record.set("id", self.generate_id(table));
        }
        if record.get("created_at").is_none() {
            record.set("created_at", Utc::now().to_rfc3339());
        }

        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        self.publish(table, ChangeKind::Insert, &record);
        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, changes: Record) -> Result<Record> {
        self.record("update", table)?;

        let updated = {
            let mut tables = self.tables.lock();
            let row = tables
                .get_mut(table)
                .and_then(|rows| rows.iter_mut().find(|r| r.id().as_deref() == Some(id)))
                .ok_or_else(|| ShellError::RecordNotFound {
                    table: table.to_string(),
                    id: id.to_string(),
                })?;
            for (field, value) in changes.into_inner() {
                row.set(&field, value);
            }
            row.clone()
        };

        self.publish(table, ChangeKind::Update, &updated);
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        self.record("delete", table)?;

        let removed = {
            let mut tables = self.tables.lock();
            let rows = tables.get_mut(table);
            let position = rows
                .as_ref()
                .and_then(|rows| rows.iter().position(|r| r.id().as_deref() == Some(id)));
            match (rows, position) {
                (Some(rows), Some(i)) => rows.remove(i),
                _ => {
                    return Err(ShellError::RecordNotFound {
                        table: table.to_string(),
                        id: id.to_string(),
                    })
                }
            }
        };

        self.publish(table, ChangeKind::Delete, &removed);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        self.record("current_session", "auth")?;
        Ok(self.session.lock().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.record("sign_in", email)?;

        let session = self
            .accounts
            .lock()
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email) && a.password == password)
            .map(session_for)
            .ok_or_else(|| ShellError::gateway("sign_in", "Invalid login credentials"))?;

        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, request: SignUp) -> Result<Session> {
        self.record("sign_up", &request.email)?;

        let account = {
            let mut accounts = self.accounts.lock();
            if accounts
                .iter()
                .any(|a| a.email.eq_ignore_ascii_case(&request.email))
            {
                return Err(ShellError::gateway(
                    "sign_up",
                    "duplicate key value violates unique constraint (23505)",
                ));
            }
            let account = Account {
                id: self.generate_id("user"),
                email: request.email.clone(),
                password: request.password.clone(),
            };
            accounts.push(account.clone());
            account
        };

        let profile = Record::new()
            .with("id", account.id.as_str())
            .with("full_name", request.full_name.as_str())
            .with("phone", request.phone.as_str())
            .with("role", request.role.to_string())
            .with("is_verified", request.role == Role::Admin)
            .with(
                "district",
                request.district.clone().map(Value::from).unwrap_or(Value::Null),
            )
            .with("created_at", Utc::now().to_rfc3339());
        self.tables
            .lock()
            .entry("profiles".to_string())
            .or_default()
            .push(profile.clone());
        self.publish("profiles", ChangeKind::Insert, &profile);

        let session = session_for(&account);
        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.record("sign_out", "auth")?;
        *self.session.lock() = None;
        Ok(())
    }

    async fn upload(&self, bucket: &str, file: &FileUpload) -> Result<String> {
        self.record("upload", bucket)?;
        Ok(format!(
            "memory://{}/{}-{}",
            bucket,
            self.next_id.fetch_add(1, AtomicOrdering::SeqCst),
            file.name
        ))
    }

    fn subscribe(&self, table: &str) -> Box<dyn Stream<Item = ChangeEvent> + Send + Unpin> {
        self.log_call("subscribe", table);
        let table = table.to_string();
        let stream = BroadcastStream::new(self.changes.subscribe()).filter_map(move |event| {
            match event {
                Ok(event) if event.table == table => Some(event),
                // Lagged receivers skip the dropped events
                _ => None,
            }
        });
        Box::new(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Filter;

    const SEED: &str = r#"
users:
  - id: u-ram
    email: ram@khetgo.in
    password: secret
session: u-ram
tables:
  listings:
    - { id: l1, name: Tomato, price: 40, created_at: "2026-10-01" }
    - { id: l2, name: Onion, price: 25, created_at: "2026-10-03" }
"#;

    #[tokio::test]
    async fn test_seed_and_select_ordering() {
        let gateway = MemoryGateway::from_yaml(SEED).unwrap();
        let rows = gateway
            .select(Query::table("listings").order("created_at", false))
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.text("name")).collect();
        assert_eq!(names, ["Onion", "Tomato"]);

        let session = gateway.current_session().await.unwrap().unwrap();
        assert_eq!(session.user_id, "u-ram");
    }

    #[tokio::test]
    async fn test_select_filters() {
        let gateway = MemoryGateway::from_yaml(SEED).unwrap();
        let rows = gateway
            .select(Query::table("listings").filter(Filter::Gte("price".into(), 30.0)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let gateway = MemoryGateway::new();
        gateway.fail_next("insert", "boom");
        assert!(gateway.insert("listings", Record::new()).await.is_err());
        assert!(gateway.insert("listings", Record::new()).await.is_ok());
        assert_eq!(gateway.call_count("insert"), 2);
        assert_eq!(gateway.rows("listings").len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_signup() {
        let gateway = MemoryGateway::from_yaml(SEED).unwrap();
        let request = SignUp {
            email: "ram@khetgo.in".into(),
            password: "x".into(),
            full_name: "Ram".into(),
            phone: "9876543210".into(),
            role: Role::Farmer,
            district: None,
        };
        let err = gateway.sign_up(request).await.unwrap_err();
        assert_eq!(err.user_message(), "This item already exists");
    }

    #[tokio::test]
    async fn test_subscribe_receives_table_inserts_only() {
        let gateway = MemoryGateway::new();
        let mut feed = gateway.subscribe("messages");

        gateway.insert("listings", Record::new()).await.unwrap();
        gateway
            .insert("messages", Record::new().with("content", "namaste"))
            .await
            .unwrap();

        let event = feed.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.record.text("content").as_deref(), Some("namaste"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let gateway = MemoryGateway::from_yaml(SEED).unwrap();
        let updated = gateway
            .update("listings", "l1", Record::new().with("price", 45))
            .await
            .unwrap();
        assert_eq!(updated.number("price"), Some(45.0));

        let err = gateway.delete("listings", "nope").await.unwrap_err();
        assert!(matches!(err, ShellError::RecordNotFound { .. }));
    }
}
