//! Action handler tests against the in-memory gateway
//!
//! Each test boots a full `App` over a `MemorySurface` and drives it through
//! the bindings of the rendered tree, the way a host page would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use khetgo::actions::FileUpload;
use khetgo::bootstrap::boot;
use khetgo::config::ShellConfig;
use khetgo::error::{Result, ShellError};
use khetgo::record::Record;
use khetgo::services::{Coordinates, Services, WeatherProvider};
use khetgo::state::{Collection, FeatureStatus, NoticeKind, View, WeatherSnapshot};
use khetgo::{App, EventKind, EventPayload, FormData, Gateway, Intent, MemoryGateway, MemorySurface};
use parking_lot::Mutex;

const SEED: &str = include_str!("../fixtures/seed.yaml");

fn seeded() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::from_yaml(SEED).unwrap())
}

fn app_over(gateway: Arc<MemoryGateway>, config: ShellConfig) -> (App, MemorySurface) {
    app_with_services(gateway, config, Services::disabled())
}

fn app_with_services(
    gateway: Arc<MemoryGateway>,
    config: ShellConfig,
    services: Services,
) -> (App, MemorySurface) {
    let surface = MemorySurface::new();
    let app = App::new(gateway, services, config, surface.clone());
    (app, surface)
}

async fn booted() -> (App, MemorySurface, Arc<MemoryGateway>) {
    let gateway = seeded();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();
    (app, surface, gateway)
}

async fn booted_as(user_id: &str) -> (App, MemorySurface, Arc<MemoryGateway>) {
    let gateway = seeded();
    gateway.sign_in_as(user_id).unwrap();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();
    (app, surface, gateway)
}

async fn go(app: &App, view: View, param: Option<&str>) {
    app.dispatch(
        Intent::Navigate {
            view,
            param: param.map(str::to_string),
        },
        EventPayload::none(),
    )
    .await
    .unwrap();
}

fn ids(app: &App, collection: Collection) -> Vec<String> {
    app.store()
        .select(|s| s.collection(collection).iter().filter_map(Record::id).collect())
}

fn latest_notice(app: &App) -> Option<(NoticeKind, String)> {
    app.store()
        .select(|s| s.notices.front().map(|n| (n.kind, n.message.clone())))
}

fn listing_form() -> FormData {
    FormData::new()
        .text("name", "Green Chilli")
        .text("category", "Vegetables")
        .text("price", "60")
        .text("unit", "kg")
        .text("quantity", "120 kg")
        .text("location", "Nagpur")
        .text("pincode", "440010")
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn test_boot_with_session_loads_data() {
    let (app, surface, _) = booted().await;

    let state = app.store().read();
    assert_eq!(state.current_view, View::Dashboard);
    assert_eq!(state.display_name(), "Ramesh Patil");
    assert_eq!(ids(&app, Collection::Listings).len(), 3);
    // Per-user tables are scoped to the session
    assert_eq!(ids(&app, Collection::LedgerEntries), ["ledger-1", "ledger-2"]);
    // Non-admins only hold the profiles of their conversation peers
    assert_eq!(ids(&app, Collection::Profiles), ["buyer-1"]);
    assert!(app.is_realtime_running());
    assert!(surface.html().contains("Organic Tomato"));
}

#[tokio::test]
async fn test_feed_is_open_before_first_messages_fetch() {
    let (_, _, gateway) = booted().await;

    let calls = gateway.calls();
    let position = |operation: &str, target: &str| {
        calls
            .iter()
            .position(|c| c.operation == operation && c.target == target)
            .unwrap()
    };

    assert!(position("subscribe", "messages") < position("select", "messages"));
}

#[tokio::test]
async fn test_boot_without_session_shows_login() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());

    let booted = boot(&app).await.unwrap();

    assert!(!booted.authenticated);
    assert_eq!(booted.view, View::Login);
    assert!(surface.html().contains("login-form"));
    assert_eq!(gateway.call_count("select"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_boot_survives_session_lookup_failure() {
    let gateway = seeded();
    gateway.fail_next("current_session", "permission denied");
    let (app, _) = app_over(gateway, ShellConfig::default());

    let booted = boot(&app).await.unwrap();

    assert!(!booted.authenticated);
    assert_eq!(booted.view, View::Login);
    assert_eq!(latest_notice(&app).map(|n| n.0), Some(NoticeKind::Warning));
}

// ============================================================================
// Forms
// ============================================================================

#[tokio::test]
async fn test_negative_price_never_reaches_gateway() {
    let (app, _, gateway) = booted().await;
    go(&app, View::AddListing, None).await;
    let inserts = gateway.call_count("insert");

    let result = app
        .trigger(
            "add-listing-form",
            EventKind::Submit,
            EventPayload::form(listing_form().text("price", "-5")),
        )
        .await;

    assert!(result.unwrap_err().is_validation());
    assert_eq!(gateway.call_count("insert"), inserts);
    assert_eq!(gateway.call_count("upload"), 0);
    assert_eq!(app.store().select(|s| s.current_view), View::AddListing);
    let (kind, message) = latest_notice(&app).unwrap();
    assert_eq!(kind, NoticeKind::Warning);
    assert!(message.contains("price"));
}

#[tokio::test]
async fn test_add_listing_uploads_inserts_and_navigates() {
    let (app, surface, gateway) = booted().await;
    go(&app, View::AddListing, None).await;

    let form = listing_form().file(
        "image",
        FileUpload {
            name: "chilli.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        },
    );
    let fired = app
        .trigger("add-listing-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    assert!(fired);
    assert_eq!(gateway.call_count("upload"), 1);
    let stored = gateway
        .rows("listings")
        .into_iter()
        .find(|r| r.text("name").as_deref() == Some("Green Chilli"))
        .unwrap();
    assert_eq!(stored.text("farmer_id").as_deref(), Some("farmer-1"));
    assert!(stored
        .text("image_url")
        .is_some_and(|u| u.starts_with("memory://crop-images/")));

    assert_eq!(app.store().select(|s| s.current_view), View::Marketplace);
    assert_eq!(ids(&app, Collection::Listings).len(), 4);
    assert!(surface.html().contains("Green Chilli"));
    assert_eq!(latest_notice(&app).unwrap().0, NoticeKind::Success);
}

#[tokio::test]
async fn test_gateway_failure_keeps_state() {
    let (app, _, gateway) = booted().await;
    go(&app, View::AddListing, None).await;
    gateway.fail_next("insert", "row violates policy");

    let err = app
        .trigger(
            "add-listing-form",
            EventKind::Submit,
            EventPayload::form(listing_form()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ShellError::Gateway { .. }));
    assert_eq!(app.store().select(|s| s.current_view), View::AddListing);
    assert_eq!(ids(&app, Collection::Listings).len(), 3);
    assert_eq!(
        latest_notice(&app),
        Some((NoticeKind::Error, "row violates policy".to_string()))
    );
}

#[tokio::test]
async fn test_failed_insert_after_upload_keeps_form() {
    let (app, _, gateway) = booted().await;
    go(&app, View::AddListing, None).await;
    gateway.fail_next("insert", "row violates policy");

    let form = listing_form().file(
        "image",
        FileUpload {
            name: "chilli.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        },
    );
    let err = app
        .trigger("add-listing-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap_err();

    assert!(matches!(err, ShellError::Gateway { .. }));
    assert_eq!(gateway.call_count("upload"), 1);
    assert!(gateway
        .rows("listings")
        .iter()
        .all(|r| r.text("name").as_deref() != Some("Green Chilli")));
    assert_eq!(app.store().select(|s| s.current_view), View::AddListing);
    assert_eq!(ids(&app, Collection::Listings).len(), 3);
}

#[tokio::test]
async fn test_ledger_entry_is_scoped_to_user() {
    let (app, surface, gateway) = booted().await;
    go(&app, View::Ledger, None).await;

    let form = FormData::new()
        .text("entry_type", "expense")
        .text("description", "Diesel")
        .text("amount", "1200");
    app.trigger("ledger-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    let stored = gateway.rows("ledger_entries");
    let diesel = stored
        .iter()
        .find(|r| r.text("description").as_deref() == Some("Diesel"))
        .unwrap();
    assert_eq!(diesel.text("user_id").as_deref(), Some("farmer-1"));
    assert_eq!(ids(&app, Collection::LedgerEntries).len(), 3);
    assert!(surface.html().contains("Diesel"));
}

#[tokio::test]
async fn test_forum_post_carries_author() {
    let (app, _, gateway) = booted().await;
    go(&app, View::Community, None).await;

    let form = FormData::new()
        .text("title", "Pink bollworm")
        .text("content", "Any organic remedy?");
    app.trigger("forum-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    let post = gateway
        .rows("forum_posts")
        .into_iter()
        .find(|r| r.text("title").as_deref() == Some("Pink bollworm"))
        .unwrap();
    assert_eq!(post.text("author_name").as_deref(), Some("Ramesh Patil"));
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_then_logout() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();

    let credentials = FormData::new()
        .text("email", "anita@khetgo.in")
        .text("password", "mandi1234");
    app.trigger("login-form", EventKind::Submit, EventPayload::form(credentials))
        .await
        .unwrap();

    let state = app.store().read();
    assert_eq!(state.current_view, View::Dashboard);
    assert_eq!(state.user_id(), Some("buyer-1"));
    assert_eq!(state.display_name(), "Anita Sharma");
    assert_eq!(ids(&app, Collection::Messages).len(), 2);

    app.trigger("logout", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    let state = app.store().read();
    assert_eq!(state.current_view, View::Login);
    assert!(state.session.is_none());
    assert!(state.profile.is_none());
    assert!(ids(&app, Collection::Messages).is_empty());
    assert!(!app.is_realtime_running());
    assert!(surface.html().contains("login-form"));
}

#[tokio::test]
async fn test_bad_credentials_stay_on_login() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, _) = app_over(gateway, ShellConfig::default());
    boot(&app).await.unwrap();

    let credentials = FormData::new()
        .text("email", "anita@khetgo.in")
        .text("password", "wrong-password");
    let result = app
        .trigger("login-form", EventKind::Submit, EventPayload::form(credentials))
        .await;

    assert!(result.is_err());
    assert_eq!(app.store().select(|s| s.current_view), View::Login);
    assert_eq!(latest_notice(&app).unwrap().0, NoticeKind::Error);
}

#[tokio::test]
async fn test_signup_creates_farmer_profile() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, _) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();
    app.trigger("goto-signup", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    let form = FormData::new()
        .text("full_name", "Kavita Rao")
        .text("email", "kavita@khetgo.in")
        .text("phone", "98220 11223")
        .text("password", "secret99")
        .text("district", "Akola");
    app.trigger("signup-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    let state = app.store().read();
    assert_eq!(state.current_view, View::Dashboard);
    assert_eq!(state.display_name(), "Kavita Rao");
    assert!(!state.is_admin());
    assert!(gateway
        .rows("profiles")
        .iter()
        .any(|p| p.text("full_name").as_deref() == Some("Kavita Rao")));
}

#[tokio::test]
async fn test_duplicate_signup_is_friendly() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, _) = app_over(gateway, ShellConfig::default());
    boot(&app).await.unwrap();
    go(&app, View::Signup, None).await;

    let form = FormData::new()
        .text("full_name", "Ramesh Again")
        .text("email", "ramesh@khetgo.in")
        .text("phone", "9876543210")
        .text("password", "secret99");
    let result = app
        .trigger("signup-form", EventKind::Submit, EventPayload::form(form))
        .await;

    assert!(result.is_err());
    assert_eq!(
        latest_notice(&app).unwrap().1,
        "This item already exists".to_string()
    );
}

// ============================================================================
// Records
// ============================================================================

#[tokio::test]
async fn test_book_service_refetches_bookings() {
    let (app, surface, _) = booted().await;
    go(&app, View::Services, None).await;

    app.trigger("book-service-1", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    assert_eq!(ids(&app, Collection::Bookings).len(), 2);
    let pending = app.store().select(|s| {
        s.collection(Collection::Bookings)
            .iter()
            .any(|b| b.text("status").as_deref() == Some("pending"))
    });
    assert!(pending);
    assert!(surface.html().contains("Tractor Rental booked"));
}

#[tokio::test]
async fn test_owner_deletes_listing() {
    let (app, _, gateway) = booted().await;
    go(&app, View::Listing, Some("listing-1")).await;

    app.trigger("delete-listing-1", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    assert!(!gateway
        .rows("listings")
        .iter()
        .any(|r| r.id().as_deref() == Some("listing-1")));
    assert_eq!(ids(&app, Collection::Listings).len(), 2);
    assert_eq!(app.store().select(|s| s.current_view), View::MyActivity);
}

#[tokio::test]
async fn test_foreign_listing_cannot_be_deleted() {
    let (app, _, gateway) = booted().await;

    let err = app
        .dispatch(
            Intent::DeleteListing {
                listing_id: "listing-2".to_string(),
            },
            EventPayload::none(),
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(gateway.call_count("delete"), 0);
}

#[tokio::test]
async fn test_admin_verifies_farmer() {
    let (app, _, gateway) = booted_as("admin-1").await;
    go(&app, View::Admin, None).await;
    assert_eq!(ids(&app, Collection::Profiles).len(), 3);

    app.trigger("verify-buyer-1", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    assert!(gateway
        .rows("profiles")
        .iter()
        .any(|p| p.id().as_deref() == Some("buyer-1") && p.flag("is_verified")));
    let verified = app.store().select(|s| {
        s.find(Collection::Profiles, "buyer-1")
            .is_some_and(|p| p.flag("is_verified"))
    });
    assert!(verified);
}

#[tokio::test]
async fn test_non_admin_cannot_verify() {
    let (app, _, gateway) = booted().await;

    let result = app
        .dispatch(
            Intent::VerifyFarmer {
                profile_id: "buyer-1".to_string(),
            },
            EventPayload::none(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(gateway.call_count("update"), 0);
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_conversation_and_realtime_echo() {
    let (app, surface, _) = booted_as("buyer-1").await;
    go(&app, View::Listing, Some("listing-1")).await;

    app.trigger("contact-farmer", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    let state = app.store().read();
    assert_eq!(state.current_view, View::Chat);
    let peer = state.active_peer.unwrap();
    assert_eq!(peer.id, "farmer-1");
    assert_eq!(peer.name, "Ramesh Patil");
    assert!(surface.html().contains("Yes, 500 kg ready for pickup."));

    let form = FormData::new().text("message", "Can you deliver to Wardha?");
    app.trigger("send-message-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    // The echo arrives through the realtime task
    for _ in 0..50 {
        if surface.html().contains("Can you deliver to Wardha?") {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(surface.html().contains("Can you deliver to Wardha?"));
    assert_eq!(ids(&app, Collection::Messages).len(), 3);
    assert_eq!(app.store().select(|s| s.message_draft.clone()), "");
}

#[tokio::test]
async fn test_echo_arrives_after_interactive_login() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();
    assert!(!app.is_realtime_running());

    let credentials = FormData::new()
        .text("email", "anita@khetgo.in")
        .text("password", "mandi1234");
    app.trigger("login-form", EventKind::Submit, EventPayload::form(credentials))
        .await
        .unwrap();
    assert!(app.is_realtime_running());

    app.dispatch(
        Intent::StartConversation {
            peer_id: "farmer-1".to_string(),
        },
        EventPayload::none(),
    )
    .await
    .unwrap();
    app.dispatch(
        Intent::SendMessage,
        EventPayload::form(FormData::new().text("message", "Is the mango crop ready?")),
    )
    .await
    .unwrap();

    for _ in 0..50 {
        if surface.html().contains("Is the mango crop ready?") {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(surface.html().contains("Is the mango crop ready?"));
    assert_eq!(ids(&app, Collection::Messages).len(), 3);
}

#[tokio::test]
async fn test_relogin_keeps_a_single_feed() {
    let gateway = seeded();
    gateway.sign_out().await.unwrap();
    let (app, surface) = app_over(gateway.clone(), ShellConfig::default());
    boot(&app).await.unwrap();

    for _ in 0..2 {
        let credentials = FormData::new()
            .text("email", "anita@khetgo.in")
            .text("password", "mandi1234");
        app.trigger("login-form", EventKind::Submit, EventPayload::form(credentials))
            .await
            .unwrap();
        app.trigger("logout", EventKind::Click, EventPayload::none())
            .await
            .unwrap();
    }
    let credentials = FormData::new()
        .text("email", "anita@khetgo.in")
        .text("password", "mandi1234");
    app.trigger("login-form", EventKind::Submit, EventPayload::form(credentials))
        .await
        .unwrap();
    app.dispatch(
        Intent::StartConversation {
            peer_id: "farmer-1".to_string(),
        },
        EventPayload::none(),
    )
    .await
    .unwrap();
    app.dispatch(
        Intent::SendMessage,
        EventPayload::form(FormData::new().text("message", "Only once please")),
    )
    .await
    .unwrap();

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(surface.html().contains("Only once please"));
    // One live feed appends the echo exactly once
    assert_eq!(ids(&app, Collection::Messages).len(), 3);
}

#[tokio::test]
async fn test_inbox_shows_peer_names() {
    let (app, surface, _) = booted_as("buyer-1").await;

    go(&app, View::Chat, None).await;

    assert_eq!(ids(&app, Collection::Profiles), ["farmer-1"]);
    let html = surface.html();
    assert!(html.contains("conversation-farmer-1"));
    assert!(html.contains("<strong>Ramesh Patil</strong>"));
}

#[tokio::test]
async fn test_failed_send_restores_draft() {
    let (app, _, gateway) = booted_as("buyer-1").await;
    app.dispatch(
        Intent::StartConversation {
            peer_id: "farmer-1".to_string(),
        },
        EventPayload::none(),
    )
    .await
    .unwrap();

    app.trigger("message-draft", EventKind::Input, EventPayload::value("hello"))
        .await
        .unwrap();
    gateway.fail_next("insert", "network unreachable");

    let result = app
        .trigger("send-message-form", EventKind::Submit, EventPayload::form(FormData::new()))
        .await;

    assert!(result.is_err());
    assert_eq!(app.store().select(|s| s.message_draft.clone()), "hello");
    assert_eq!(
        latest_notice(&app).unwrap().1,
        "Network error. Please check your internet connection."
    );
}

#[tokio::test]
async fn test_empty_message_is_rejected_locally() {
    let (app, _, gateway) = booted_as("buyer-1").await;
    app.dispatch(
        Intent::StartConversation {
            peer_id: "farmer-1".to_string(),
        },
        EventPayload::none(),
    )
    .await
    .unwrap();
    let inserts = gateway.call_count("insert");

    let err = app
        .dispatch(Intent::SendMessage, EventPayload::none())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(gateway.call_count("insert"), inserts);
}

// ============================================================================
// Debounce
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_filter_input_is_debounced() {
    let (app, surface, _) = booted().await;
    go(&app, View::Marketplace, None).await;
    let renders = surface.render_count();

    for value in ["4", "44", "440"] {
        app.trigger("filter-region", EventKind::Input, EventPayload::value(value))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(app.store().select(|s| s.filters.region.clone()), "");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(app.store().select(|s| s.filters.region.clone()), "440");
    assert_eq!(surface.render_count(), renders + 1);
    let html = surface.html();
    assert!(html.contains("market-listing-listing-1"));
    assert!(!html.contains("market-listing-listing-2"));

    app.trigger("filter-clear", EventKind::Click, EventPayload::none())
        .await
        .unwrap();
    assert!(app.store().select(|s| s.filters.is_empty()));
}

// ============================================================================
// Overlapping refreshes
// ============================================================================

async fn overlapping_refreshes(config: ShellConfig) -> Vec<String> {
    let gateway = seeded();
    let (app, _) = app_over(gateway.clone(), config);
    boot(&app).await.unwrap();

    // First dispatched resolves last
    gateway.script_latency(
        "listings",
        [Duration::from_millis(200), Duration::from_millis(10)],
    );

    let first = {
        let app = app.clone();
        tokio::spawn(async move { app.dispatch(Intent::Refresh, EventPayload::none()).await })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    gateway.seed(
        "listings",
        vec![Record::new()
            .with("id", "listing-fresh")
            .with("name", "Fresh Okra")
            .with("price", 30)],
    );
    app.dispatch(Intent::Refresh, EventPayload::none())
        .await
        .unwrap();
    first.await.unwrap().unwrap();

    ids(&app, Collection::Listings)
}

#[tokio::test(start_paused = true)]
async fn test_later_resolving_response_wins_without_guard() {
    let mut config = ShellConfig::default();
    config.ui.discard_stale_responses = false;

    let listings = overlapping_refreshes(config).await;

    assert_eq!(listings, ["listing-1", "listing-2", "listing-3"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded_by_default() {
    let listings = overlapping_refreshes(ShellConfig::default()).await;

    assert_eq!(listings, ["listing-fresh"]);
}

// ============================================================================
// Weather / advisory
// ============================================================================

/// Succeeds once, then fails
struct FlakyWeather {
    calls: Mutex<u32>,
}

#[async_trait]
impl WeatherProvider for FlakyWeather {
    async fn current(&self, _at: Coordinates) -> Result<WeatherSnapshot> {
        let mut calls = self.calls.lock();
        *calls += 1;
        if *calls > 1 {
            return Err(ShellError::Network("connection reset".to_string()));
        }
        Ok(WeatherSnapshot {
            location: "Nagpur".to_string(),
            temperature_c: 31.5,
            humidity: 40,
            wind_kph: 12.0,
            description: "clear sky".to_string(),
            fetched_at: Utc::now(),
        })
    }
}

#[tokio::test]
async fn test_weather_without_key_is_unavailable() {
    let (app, surface, _) = booted().await;
    go(&app, View::Weather, None).await;

    app.trigger("load-weather", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    assert_eq!(
        app.store().select(|s| s.weather_status),
        FeatureStatus::Unavailable
    );
    assert!(!surface.html().is_empty());
}

#[tokio::test]
async fn test_weather_failure_keeps_previous_snapshot() {
    let gateway = seeded();
    let services = Services::disabled().with_weather(Arc::new(FlakyWeather {
        calls: Mutex::new(0),
    }));
    let (app, surface) = app_with_services(gateway, ShellConfig::default(), services);
    boot(&app).await.unwrap();
    go(&app, View::Weather, None).await;

    app.dispatch(Intent::LoadWeather, EventPayload::none())
        .await
        .unwrap();
    assert_eq!(app.store().select(|s| s.weather_status), FeatureStatus::Ready);
    assert!(surface.html().contains("clear sky"));

    app.dispatch(Intent::LoadWeather, EventPayload::none())
        .await
        .unwrap();

    let state = app.store().read();
    assert_eq!(state.weather_status, FeatureStatus::Stale);
    assert!(!state.weather_loading);
    assert_eq!(state.weather.unwrap().location, "Nagpur");
    assert!(surface.html().contains("clear sky"));
}

#[tokio::test]
async fn test_advisor_without_key_is_unavailable() {
    let (app, _, _) = booted().await;
    go(&app, View::Advisory, None).await;

    let form = FormData::new().text("question", "When to sow cotton?");
    app.trigger("advisory-form", EventKind::Submit, EventPayload::form(form))
        .await
        .unwrap();

    assert_eq!(
        app.store().select(|s| s.advisory_status),
        FeatureStatus::Unavailable
    );
}

// ============================================================================
// Unbound elements
// ============================================================================

#[tokio::test]
async fn test_unbound_element_is_ignored() {
    let (app, _, gateway) = booted().await;
    let calls = gateway.calls().len();

    let fired = app
        .trigger("does-not-exist", EventKind::Click, EventPayload::none())
        .await
        .unwrap();

    assert!(!fired);
    assert_eq!(gateway.calls().len(), calls);
}
