//! Handler bodies behind `App::dispatch`
//!
//! Each handler validates locally, awaits the gateway (never while holding
//! the store lock), then merges the outcome through the store.

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use super::forms;
use super::intent::{FormData, FormKind};
use crate::app::App;
use crate::error::{Result, ShellError};
use crate::gateway::{Filter, Query};
use crate::record::Record;
use crate::services::locate_with_fallback;
use crate::state::{
    ActivePeer, Advisory, Collection, FeatureStatus, Filters, Notice, Profile, Session,
    StatePatch, View,
};

const IMAGE_BUCKET: &str = "crop-images";

/// Collections cleared on logout
const PERSONAL: [Collection; 4] = [
    Collection::Bookings,
    Collection::LedgerEntries,
    Collection::Messages,
    Collection::Profiles,
];

impl App {
    // ─────────────────────────────────────────────────────────────────────────
    // Navigation / local state
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn navigate(&self, view: View, param: Option<String>) {
        self.store.set_state(StatePatch::navigate(view, param));
    }

    pub(crate) fn clear_filters(&self) {
        self.store
            .set_state(StatePatch::new().filters(Filters::default()));
    }

    pub(crate) fn edit_draft(&self, value: String) {
        self.store.set_state(StatePatch::new().draft(value));
    }

    fn session(&self) -> Result<Session> {
        self.store
            .select(|s| s.session.clone())
            .ok_or(ShellError::NotAuthenticated)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Query for a collection, scoped to the signed-in user where needed.
    /// `None` when the collection is not visible to this user.
    fn scoped_query(&self, collection: Collection) -> Option<Query> {
        let (user_id, is_admin) = self
            .store
            .select(|s| (s.user_id().map(str::to_string), s.is_admin()));
        let query = Query::collection(collection);

        match collection {
            Collection::Profiles if !is_admin => None,
            Collection::Messages => {
                let me = user_id?;
                Some(query.filter(Filter::Any(vec![
                    Filter::eq("sender_id", me.as_str()),
                    Filter::eq("receiver_id", me.as_str()),
                ])))
            }
            _ => match collection.owner_field() {
                Some(field) => Some(query.eq(field, user_id?)),
                None => Some(query),
            },
        }
    }

    /// Refetch one collection and replace it wholesale
    pub(crate) async fn fetch_collection(&self, collection: Collection) -> Result<()> {
        let Some(query) = self.scoped_query(collection) else {
            return Ok(());
        };
        let token = self.store.begin_request(collection);
        let rows = self.gateway.select(query).await?;
        self.store.commit(token, rows);
        Ok(())
    }

    /// Fetch every collection concurrently.
    ///
    /// Individual failures keep the previous data; one warning notice
    /// summarizes them.
    pub(crate) async fn load_all(&self) -> Result<()> {
        self.store.set_state(StatePatch::new().loading(true));

        let results = join_all(Collection::ALL.iter().map(|c| self.fetch_collection(*c))).await;

        let peers = self.fetch_peer_profiles().await;

        self.store.set_state(StatePatch::new().loading(false));

        if let Some(first) = results.into_iter().chain([peers]).find_map(|r| r.err()) {
            warn!(error = %first, "Some collections failed to load");
            self.store
                .push_notice(Notice::warning("Some data could not be loaded"));
        }
        Ok(())
    }

    /// Profiles of everyone the user has exchanged messages with.
    ///
    /// Admins already hold the whole directory in `profiles`; for everyone
    /// else the collection carries only these peers.
    async fn fetch_peer_profiles(&self) -> Result<()> {
        let (is_admin, peers) = self.store.select(|s| {
            let mut peers: Vec<String> = Vec::new();
            if let Some(me) = s.user_id() {
                for message in s.collection(Collection::Messages) {
                    for field in ["sender_id", "receiver_id"] {
                        match message.str(field) {
                            Some(id) if id != me && !peers.iter().any(|p| p == id) => {
                                peers.push(id.to_string())
                            }
                            _ => {}
                        }
                    }
                }
            }
            (s.is_admin(), peers)
        });
        if is_admin || peers.is_empty() {
            return Ok(());
        }

        let query = Query::collection(Collection::Profiles).filter(Filter::Any(
            peers.iter().map(|id| Filter::eq("id", id.as_str())).collect(),
        ));
        let token = self.store.begin_request(Collection::Profiles);
        let rows = self.gateway.select(query).await?;
        self.store.commit(token, rows);
        Ok(())
    }

    pub(crate) async fn refresh(&self) -> Result<()> {
        self.load_all().await
    }

    /// Load the profile for a fresh session, open its message feed, then
    /// load everything else.
    ///
    /// The feed is subscribed before the first messages fetch so no insert
    /// falls between the two.
    pub(crate) async fn establish(&self, session: Session) -> Result<()> {
        let profile = self
            .gateway
            .select(Query::table(Collection::Profiles.table()).eq("id", session.user_id.as_str()))
            .await?
            .first()
            .and_then(Profile::from_record);

        info!(user = %session.user_id, role = ?profile.as_ref().map(|p| p.role), "Session established");
        self.store
            .set_state(StatePatch::new().session(Some(session)).profile(profile));
        self.start_realtime();
        self.load_all().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Forms
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn submit(&self, kind: FormKind, form: &FormData) -> Result<()> {
        match kind {
            FormKind::AddListing => self.add_listing(form).await,
            FormKind::LedgerEntry => self.add_ledger_entry(form).await,
            FormKind::ForumPost => self.add_forum_post(form).await,
            FormKind::Login => self.login(form).await,
            FormKind::Signup => self.signup(form).await,
        }
    }

    async fn add_listing(&self, form: &FormData) -> Result<()> {
        // Validation comes first: a rejected form makes no gateway call
        let draft = forms::listing(form)?;
        let session = self.session()?;
        let (farmer, verified) = self.store.select(|s| {
            (
                s.display_name().to_string(),
                s.profile.as_ref().is_some_and(|p| p.is_verified),
            )
        });

        let mut record = draft.record;
        if let Some(image) = &draft.image {
            let url = self.gateway.upload(IMAGE_BUCKET, image).await?;
            record.set("image_url", url);
        }
        record.set("farmer_id", session.user_id.as_str());
        record.set("farmer", farmer);
        record.set("is_verified", verified);

        let image_url = record.text("image_url");
        if let Err(e) = self.gateway.insert(Collection::Listings.table(), record).await {
            if let Some(url) = image_url {
                warn!(%url, error = %e, "Listing insert failed, uploaded image is orphaned");
            }
            return Err(e);
        }
        self.fetch_collection(Collection::Listings).await?;
        self.navigate(View::Marketplace, None);
        self.store
            .push_notice(Notice::success("Listing published successfully"));
        Ok(())
    }

    async fn add_ledger_entry(&self, form: &FormData) -> Result<()> {
        let mut record = forms::ledger_entry(form)?;
        let session = self.session()?;
        record.set("user_id", session.user_id.as_str());

        self.gateway
            .insert(Collection::LedgerEntries.table(), record)
            .await?;
        self.fetch_collection(Collection::LedgerEntries).await?;
        self.store.push_notice(Notice::success("Entry recorded"));
        Ok(())
    }

    async fn add_forum_post(&self, form: &FormData) -> Result<()> {
        let mut record = forms::forum_post(form)?;
        let session = self.session()?;
        let author = self.store.select(|s| s.display_name().to_string());
        record.set("author_id", session.user_id.as_str());
        record.set("author_name", author);

        self.gateway
            .insert(Collection::ForumPosts.table(), record)
            .await?;
        self.fetch_collection(Collection::ForumPosts).await?;
        self.store.push_notice(Notice::success("Posted to the forum"));
        Ok(())
    }

    async fn login(&self, form: &FormData) -> Result<()> {
        let (email, password) = forms::credentials(form)?;
        let session = self.gateway.sign_in(&email, &password).await?;
        self.establish(session).await?;
        self.navigate(View::Dashboard, None);
        self.store.push_notice(Notice::success("Welcome back!"));
        Ok(())
    }

    async fn signup(&self, form: &FormData) -> Result<()> {
        let request = forms::signup(form)?;
        let session = self.gateway.sign_up(request).await?;
        self.establish(session).await?;
        self.navigate(View::Dashboard, None);
        self.store
            .push_notice(Notice::success("Account created. Welcome to KhetGo!"));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn start_conversation(&self, peer_id: &str) -> Result<()> {
        let me = self.session()?;
        if me.user_id == peer_id {
            return Err(ShellError::invalid("conversation", "you cannot message yourself"));
        }

        let name = self
            .gateway
            .select(Query::table(Collection::Profiles.table()).eq("id", peer_id))
            .await?
            .first()
            .and_then(|p| p.text("full_name"))
            .unwrap_or_else(|| "Farmer".to_string());

        self.fetch_collection(Collection::Messages).await?;
        self.fetch_peer_profiles().await?;
        self.store.set_state(
            StatePatch::navigate(View::Chat, None)
                .peer(Some(ActivePeer {
                    id: peer_id.to_string(),
                    name,
                }))
                .draft(""),
        );
        Ok(())
    }

    /// Send `text` (or the current draft) to the active peer.
    ///
    /// The draft is cleared before the insert and restored if it fails. The
    /// echo arrives through the realtime feed.
    pub(crate) async fn send_message(&self, text: Option<String>) -> Result<()> {
        let session = self.session()?;
        let (peer, draft) = self
            .store
            .select(|s| (s.active_peer.clone(), s.message_draft.clone()));
        let peer = peer.ok_or_else(|| ShellError::invalid("message", "no conversation is open"))?;

        let content = text.unwrap_or_else(|| draft.clone()).trim().to_string();
        if content.is_empty() {
            return Err(ShellError::MissingField {
                field: "message".to_string(),
            });
        }

        self.store.set_state(StatePatch::new().draft(""));

        let record = Record::new()
            .with("sender_id", session.user_id.as_str())
            .with("receiver_id", peer.id.as_str())
            .with("content", content.as_str());

        if let Err(e) = self.gateway.insert(Collection::Messages.table(), record).await {
            self.store.set_state(StatePatch::new().draft(content));
            return Err(e);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn logout(&self) -> Result<()> {
        // Local state is cleared even when the remote sign-out fails
        let remote = self.gateway.sign_out().await;
        self.stop_realtime();

        let mut patch = StatePatch::navigate(View::Login, None)
            .session(None)
            .profile(None)
            .peer(None)
            .draft("");
        for collection in PERSONAL {
            patch = patch.collection(collection, Vec::new());
        }
        self.store.set_state(patch);
        info!("Signed out");

        remote
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn book_service(&self, service_id: &str) -> Result<()> {
        let session = self.session()?;
        let service_name = self
            .store
            .select(|s| {
                s.find(Collection::Services, service_id)
                    .and_then(|r| r.text("name"))
            })
            .ok_or_else(|| ShellError::RecordNotFound {
                table: Collection::Services.table().to_string(),
                id: service_id.to_string(),
            })?;

        let record = Record::new()
            .with("user_id", session.user_id.as_str())
            .with("service_id", service_id)
            .with("service_name", service_name.as_str())
            .with("status", "pending")
            .with("booking_date", Utc::now().format("%Y-%m-%d").to_string());

        self.gateway
            .insert(Collection::Bookings.table(), record)
            .await?;
        self.fetch_collection(Collection::Bookings).await?;
        self.store
            .push_notice(Notice::success(format!("{} booked", service_name)));
        Ok(())
    }

    pub(crate) async fn delete_listing(&self, listing_id: &str) -> Result<()> {
        let session = self.session()?;
        let owner = self.store.select(|s| {
            s.find(Collection::Listings, listing_id)
                .map(|l| l.text("farmer_id"))
        });
        match owner {
            None => {
                return Err(ShellError::RecordNotFound {
                    table: Collection::Listings.table().to_string(),
                    id: listing_id.to_string(),
                })
            }
            Some(owner) if owner.as_deref() != Some(session.user_id.as_str()) => {
                return Err(ShellError::invalid(
                    "listing",
                    "you can only delete your own listings",
                ))
            }
            Some(_) => {}
        }

        self.gateway
            .delete(Collection::Listings.table(), listing_id)
            .await?;
        self.fetch_collection(Collection::Listings).await?;
        self.store.set_state(StatePatch::new().view(View::MyActivity));
        self.store.push_notice(Notice::info("Listing removed"));
        Ok(())
    }

    pub(crate) async fn verify_farmer(&self, profile_id: &str) -> Result<()> {
        if !self.store.select(|s| s.is_admin()) {
            return Err(ShellError::invalid("admin", "administrator access required"));
        }

        self.gateway
            .update(
                Collection::Profiles.table(),
                profile_id,
                Record::new().with("is_verified", Value::Bool(true)),
            )
            .await?;
        self.fetch_collection(Collection::Profiles).await?;
        self.store.push_notice(Notice::success("Farmer verified"));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Weather / advisory
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch current weather. Failures degrade the feature instead of erroring.
    pub(crate) async fn load_weather(&self) -> Result<()> {
        let Some(provider) = self.services.weather.clone() else {
            self.store.set_state(StatePatch {
                weather_status: Some(FeatureStatus::Unavailable),
                ..StatePatch::default()
            });
            return Ok(());
        };

        self.store.set_state(StatePatch {
            weather_loading: Some(true),
            ..StatePatch::default()
        });

        let at =
            locate_with_fallback(self.services.geolocator.as_ref(), &self.services.geolocation)
                .await;
        let result = provider.current(at).await;

        match result {
            Ok(snapshot) => {
                self.store.set_state(StatePatch {
                    weather: Some(Some(snapshot)),
                    weather_status: Some(FeatureStatus::Ready),
                    weather_loading: Some(false),
                    ..StatePatch::default()
                });
            }
            Err(e) => {
                warn!(error = %e, "Weather fetch failed");
                self.store.update(|s| StatePatch {
                    weather_status: Some(if s.weather.is_some() {
                        FeatureStatus::Stale
                    } else {
                        FeatureStatus::Unavailable
                    }),
                    weather_loading: Some(false),
                    ..StatePatch::default()
                });
                self.store
                    .push_notice(Notice::warning("Weather is currently unavailable"));
            }
        }
        Ok(())
    }

    /// Ask the AI advisor. A missing provider marks the feature unavailable.
    pub(crate) async fn ask_advisor(&self, question: Option<&str>) -> Result<()> {
        let question = question
            .ok_or_else(|| ShellError::MissingField {
                field: "question".to_string(),
            })?
            .to_string();

        let Some(provider) = self.services.advisory.clone() else {
            self.store.set_state(StatePatch {
                advisory_status: Some(FeatureStatus::Unavailable),
                ..StatePatch::default()
            });
            return Ok(());
        };

        match provider.ask(&question).await {
            Ok(answer) => {
                self.store.set_state(StatePatch {
                    advisory: Some(Some(Advisory { question, answer })),
                    advisory_status: Some(FeatureStatus::Ready),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(e) => {
                self.store.set_state(StatePatch {
                    advisory_status: Some(FeatureStatus::Unavailable),
                    ..StatePatch::default()
                });
                Err(e)
            }
        }
    }
}
