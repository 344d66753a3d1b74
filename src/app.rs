//! App - the running shell
//!
//! Owns the store, the gateway and the feature clients. Cloning is cheap;
//! every clone drives the same state, so handlers can overlap.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::actions::{EventPayload, Intent};
use crate::config::ShellConfig;
use crate::debounce::Debouncer;
use crate::error::{Result, ShellError};
use crate::gateway::{ChangeKind, Gateway};
use crate::render::{EventKind, Surface};
use crate::services::Services;
use crate::state::{AppState, Collection, FilterField, Notice, StatePatch};
use crate::store::{ResponseOrdering, Store};

#[derive(Clone)]
pub struct App {
    pub(crate) store: Arc<Store>,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) services: Services,
    pub(crate) config: Arc<ShellConfig>,
    filters: Arc<DashMap<FilterField, Debouncer<String>>>,
    /// Message feed for the current session
    realtime: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl App {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        services: Services,
        config: ShellConfig,
        surface: impl Surface + 'static,
    ) -> Self {
        let ordering = if config.ui.discard_stale_responses {
            ResponseOrdering::DiscardStale
        } else {
            ResponseOrdering::LastWriteWins
        };
        let state = AppState {
            max_notices: config.ui.max_notices,
            ..AppState::default()
        };

        Self {
            store: Arc::new(Store::with_state(state, surface, ordering)),
            gateway,
            services,
            config: Arc::new(config),
            filters: Arc::new(DashMap::new()),
            realtime: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Route an intent to its handler.
    ///
    /// Failures are already surfaced as notices and logged when this returns.
    pub async fn dispatch(&self, intent: Intent, payload: EventPayload) -> Result<()> {
        debug!(%intent, "Dispatch");
        let result = self.route(intent, payload).await;
        if let Err(e) = &result {
            self.surface_error(e);
        }
        result
    }

    async fn route(&self, intent: Intent, payload: EventPayload) -> Result<()> {
        let form = payload.form.unwrap_or_default();
        let value = payload.value.unwrap_or_default();

        match intent {
            Intent::Navigate { view, param } => {
                self.navigate(view, param);
                Ok(())
            }
            Intent::Submit(kind) => self.submit(kind, &form).await,
            Intent::Filter(field) => {
                self.filter_change(field, value);
                Ok(())
            }
            Intent::ClearFilters => {
                self.clear_filters();
                Ok(())
            }
            Intent::StartConversation { peer_id } => self.start_conversation(&peer_id).await,
            Intent::EditDraft => {
                self.edit_draft(value);
                Ok(())
            }
            Intent::SendMessage => {
                let text = form.get("message").map(str::to_string);
                self.send_message(text).await
            }
            Intent::Logout => self.logout().await,
            Intent::Refresh => self.refresh().await,
            Intent::BookService { service_id } => self.book_service(&service_id).await,
            Intent::DeleteListing { listing_id } => self.delete_listing(&listing_id).await,
            Intent::VerifyFarmer { profile_id } => self.verify_farmer(&profile_id).await,
            Intent::LoadWeather => self.load_weather().await,
            Intent::AskAdvisor => self.ask_advisor(form.get("question")).await,
        }
    }

    /// Fire an event on an element of the current tree.
    ///
    /// Returns false when nothing is bound to `(element_id, event)`.
    pub async fn trigger(
        &self,
        element_id: &str,
        event: EventKind,
        payload: EventPayload,
    ) -> Result<bool> {
        let Some(intent) = self.store.resolve(element_id, event) else {
            debug!(element_id, event = event.tag(), "No handler bound");
            return Ok(false);
        };
        self.dispatch(intent, payload).await?;
        Ok(true)
    }

    /// Log and notify; validation problems are warnings, the rest errors
    fn surface_error(&self, err: &ShellError) {
        warn!(error = %err, "Action failed");
        let notice = if err.is_validation() {
            Notice::warning(err.user_message())
        } else {
            Notice::error(err.user_message())
        };
        self.store.push_notice(notice);
    }

    /// Trailing-edge debounced filter update, one window per field
    pub(crate) fn filter_change(&self, field: FilterField, value: String) {
        let debouncer = self.filters.entry(field).or_insert_with(|| {
            let store = Arc::clone(&self.store);
            Debouncer::spawn(self.config.debounce(), move |value: String| {
                store.update(|state| {
                    let mut filters = state.filters.clone();
                    field.apply(&mut filters, &value);
                    StatePatch::new().filters(filters)
                });
            })
        });
        debouncer.push(value);
    }

    /// True while a session's message feed is running
    pub fn is_realtime_running(&self) -> bool {
        self.realtime
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort the message feed, if any
    pub fn stop_realtime(&self) {
        if let Some(handle) = self.realtime.lock().take() {
            debug!("Stopping realtime feed");
            handle.abort();
        }
    }

    /// Subscribe to message inserts, replacing any previous feed.
    ///
    /// The subscription is open when this returns, so rows inserted after it
    /// reach the store. Inserts are applied as previous + new record.
    pub(crate) fn start_realtime(&self) {
        let mut feed = self.gateway.subscribe(Collection::Messages.table());
        let store = Arc::clone(&self.store);

        let handle = tokio::spawn(async move {
            while let Some(event) = feed.next().await {
                if event.kind != ChangeKind::Insert {
                    continue;
                }
                store.update(|state| {
                    let me = state.user_id();
                    let involved = me.is_some()
                        && (event.record.str("sender_id") == me
                            || event.record.str("receiver_id") == me);
                    if !involved {
                        return StatePatch::new();
                    }
                    let mut messages = state.collection(Collection::Messages).to_vec();
                    messages.push(event.record.clone());
                    StatePatch::new().collection(Collection::Messages, messages)
                });
            }
            info!("Realtime feed closed");
        });

        if let Some(previous) = self.realtime.lock().replace(handle) {
            previous.abort();
        }
    }
}
