//! AppState - Domain Layer
//!
//! The single record every view reads from. Mutation happens only through
//! [`StatePatch`] merges performed by the store.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;

// ─────────────────────────────────────────────────────────────────────────────
// Core State
// ─────────────────────────────────────────────────────────────────────────────

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_param: Option<String>,

    // Identity
    pub session: Option<Session>,
    pub profile: Option<Profile>,

    // Client-side query constraints
    pub filters: Filters,

    // Point-in-time copies of gateway tables
    pub collections: HashMap<Collection, Vec<Record>>,

    // Chat
    pub active_peer: Option<ActivePeer>,
    pub message_draft: String,

    // Weather / advisory
    pub weather: Option<WeatherSnapshot>,
    pub weather_status: FeatureStatus,
    pub weather_loading: bool,
    pub advisory: Option<Advisory>,
    pub advisory_status: FeatureStatus,

    // Transient flags
    pub is_loading: bool,

    // User-visible notifications, newest first
    pub notices: VecDeque<Notice>,
    pub max_notices: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_view: View::default(),
            view_param: None,
            session: None,
            profile: None,
            filters: Filters::default(),
            collections: HashMap::new(),
            active_peer: None,
            message_draft: String::new(),
            weather: None,
            weather_status: FeatureStatus::NotLoaded,
            weather_loading: false,
            advisory: None,
            advisory_status: FeatureStatus::NotLoaded,
            is_loading: false,
            notices: VecDeque::new(),
            max_notices: 20,
        }
    }
}

impl AppState {
    /// Records cached for a collection (empty when never fetched)
    pub fn collection(&self, collection: Collection) -> &[Record] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a record by id in a collection
    pub fn find(&self, collection: Collection, id: &str) -> Option<&Record> {
        self.collection(collection)
            .iter()
            .find(|r| r.id().as_deref() == Some(id))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.role == Role::Admin)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    /// Name shown in chrome
    pub fn display_name(&self) -> &str {
        match (&self.profile, &self.session) {
            (Some(p), _) if !p.full_name.is_empty() => &p.full_name,
            (_, Some(s)) => &s.email,
            _ => "Guest",
        }
    }

    /// Add a notice, dropping the oldest beyond the cap
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_front(notice);
        if self.notices.len() > self.max_notices {
            self.notices.pop_back();
        }
    }

    /// Merge a patch. Collections are replaced wholesale.
    pub fn apply(&mut self, patch: StatePatch) {
        let StatePatch {
            current_view,
            view_param,
            session,
            profile,
            filters,
            collections,
            active_peer,
            message_draft,
            weather,
            weather_status,
            weather_loading,
            advisory,
            advisory_status,
            is_loading,
        } = patch;

        if let Some(v) = current_view {
            self.current_view = v;
        }
        if let Some(v) = view_param {
            self.view_param = v;
        }
        if let Some(v) = session {
            self.session = v;
        }
        if let Some(v) = profile {
            self.profile = v;
        }
        if let Some(v) = filters {
            self.filters = v;
        }
        for (collection, records) in collections {
            self.collections.insert(collection, records);
        }
        if let Some(v) = active_peer {
            self.active_peer = v;
        }
        if let Some(v) = message_draft {
            self.message_draft = v;
        }
        if let Some(v) = weather {
            self.weather = v;
        }
        if let Some(v) = weather_status {
            self.weather_status = v;
        }
        if let Some(v) = weather_loading {
            self.weather_loading = v;
        }
        if let Some(v) = advisory {
            self.advisory = v;
        }
        if let Some(v) = advisory_status {
            self.advisory_status = v;
        }
        if let Some(v) = is_loading {
            self.is_loading = v;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State Patch
// ─────────────────────────────────────────────────────────────────────────────

/// Partial update merged by `Store::set_state`.
///
/// `None` leaves a field untouched; nullable fields use `Option<Option<_>>`.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub current_view: Option<View>,
    pub view_param: Option<Option<String>>,
    pub session: Option<Option<Session>>,
    pub profile: Option<Option<Profile>>,
    pub filters: Option<Filters>,
    pub collections: Vec<(Collection, Vec<Record>)>,
    pub active_peer: Option<Option<ActivePeer>>,
    pub message_draft: Option<String>,
    pub weather: Option<Option<WeatherSnapshot>>,
    pub weather_status: Option<FeatureStatus>,
    pub weather_loading: Option<bool>,
    pub advisory: Option<Option<Advisory>>,
    pub advisory_status: Option<FeatureStatus>,
    pub is_loading: Option<bool>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate: view plus (possibly cleared) detail parameter
    pub fn navigate(view: View, param: Option<String>) -> Self {
        Self {
            current_view: Some(view),
            view_param: Some(param),
            ..Self::default()
        }
    }

    pub fn session(mut self, session: Option<Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn profile(mut self, profile: Option<Profile>) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn view(mut self, view: View) -> Self {
        self.current_view = Some(view);
        self.view_param = Some(None);
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn collection(mut self, collection: Collection, records: Vec<Record>) -> Self {
        self.collections.push((collection, records));
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.is_loading = Some(loading);
        self
    }

    pub fn draft(mut self, draft: impl Into<String>) -> Self {
        self.message_draft = Some(draft.into());
        self
    }

    pub fn peer(mut self, peer: Option<ActivePeer>) -> Self {
        self.active_peer = Some(peer);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

/// Every view the render engine can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Dashboard,
    Marketplace,
    Listing,
    AddListing,
    Services,
    MyActivity,
    Chat,
    Ledger,
    Store,
    Community,
    Weather,
    Advisory,
    Admin,
    Login,
    Signup,
}

impl View {
    pub const ALL: [View; 15] = [
        View::Dashboard,
        View::Marketplace,
        View::Listing,
        View::AddListing,
        View::Services,
        View::MyActivity,
        View::Chat,
        View::Ledger,
        View::Store,
        View::Community,
        View::Weather,
        View::Advisory,
        View::Admin,
        View::Login,
        View::Signup,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Marketplace => "marketplace",
            Self::Listing => "listing",
            Self::AddListing => "add-listing",
            Self::Services => "services",
            Self::MyActivity => "my-activity",
            Self::Chat => "chat",
            Self::Ledger => "ledger",
            Self::Store => "store",
            Self::Community => "community",
            Self::Weather => "weather",
            Self::Advisory => "advisory",
            Self::Admin => "admin",
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Farm Overview",
            Self::Marketplace => "Marketplace",
            Self::Listing => "Listing Details",
            Self::AddListing => "Add New Listing",
            Self::Services => "Agri Services",
            Self::MyActivity => "My Activity",
            Self::Chat => "Messages",
            Self::Ledger => "Farm Ledger",
            Self::Store => "Agri Store",
            Self::Community => "Community",
            Self::Weather => "Weather",
            Self::Advisory => "AI Advisory",
            Self::Admin => "Administration",
            Self::Login => "Sign In",
            Self::Signup => "Create Account",
        }
    }

    /// Views reachable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// Parse a textual tag, falling back to the default view
    pub fn from_tag_or_default(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .iter()
            .copied()
            .find(|v| v.tag() == s.trim())
            .ok_or_else(|| format!("unknown view '{}'", s))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collections
// ─────────────────────────────────────────────────────────────────────────────

/// Gateway tables cached in state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Listings,
    Bookings,
    Messages,
    LedgerEntries,
    Services,
    StoreProducts,
    News,
    ForumPosts,
    AcademyContent,
    MandiPrices,
    Profiles,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Listings,
        Collection::Bookings,
        Collection::Messages,
        Collection::LedgerEntries,
        Collection::Services,
        Collection::StoreProducts,
        Collection::News,
        Collection::ForumPosts,
        Collection::AcademyContent,
        Collection::MandiPrices,
        Collection::Profiles,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Listings => "listings",
            Self::Bookings => "bookings",
            Self::Messages => "messages",
            Self::LedgerEntries => "ledger_entries",
            Self::Services => "services",
            Self::StoreProducts => "store_products",
            Self::News => "news",
            Self::ForumPosts => "forum_posts",
            Self::AcademyContent => "academy_content",
            Self::MandiPrices => "mandi_prices",
            Self::Profiles => "profiles",
        }
    }

    /// Default ordering: (field, ascending)
    pub fn order(&self) -> (&'static str, bool) {
        match self {
            Self::Listings => ("created_at", false),
            Self::Bookings => ("booking_date", false),
            Self::Messages => ("created_at", true),
            Self::LedgerEntries => ("entry_date", false),
            Self::Services => ("created_at", false),
            Self::StoreProducts => ("name", true),
            Self::News => ("published_at", false),
            Self::ForumPosts => ("created_at", false),
            Self::AcademyContent => ("created_at", false),
            Self::MandiPrices => ("crop", true),
            Self::Profiles => ("created_at", false),
        }
    }

    /// Field holding the owner id for per-user tables
    pub fn owner_field(&self) -> Option<&'static str> {
        match self {
            Self::Bookings | Self::LedgerEntries => Some("user_id"),
            _ => None,
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.table() == table)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Farmer,
    Buyer,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "buyer" => Ok(Self::Buyer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Farmer => write!(f, "farmer"),
            Self::Buyer => write!(f, "buyer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Extended identity fetched from the `profiles` table
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub is_verified: bool,
    pub district: Option<String>,
    pub phone: Option<String>,
}

impl Profile {
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            id: record.id()?,
            full_name: record.text("full_name").unwrap_or_default(),
            role: record
                .str("role")
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
            is_verified: record.flag("is_verified"),
            district: record.text("district"),
            phone: record.text("phone"),
        })
    }
}

/// Peer of the open conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePeer {
    pub id: String,
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub query: String,
    /// Pincode prefix
    pub region: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub category: Option<String>,
    pub sort: SortKey,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl SortKey {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" | "" => Ok(Self::Newest),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// Which filter input changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Query,
    Region,
    MinPrice,
    MaxPrice,
    Category,
    Sort,
}

impl FilterField {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Region => "region",
            Self::MinPrice => "min-price",
            Self::MaxPrice => "max-price",
            Self::Category => "category",
            Self::Sort => "sort",
        }
    }

    /// Apply a raw input value; unparsable numbers clear the bound
    pub fn apply(&self, filters: &mut Filters, value: &str) {
        let value = value.trim();
        match self {
            Self::Query => filters.query = value.to_string(),
            Self::Region => filters.region = value.to_string(),
            Self::MinPrice => filters.min_price = value.parse().ok(),
            Self::MaxPrice => filters.max_price = value.parse().ok(),
            Self::Category => {
                filters.category = (!value.is_empty()).then(|| value.to_string());
            }
            Self::Sort => filters.sort = value.parse().unwrap_or_default(),
        }
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "query" => Ok(Self::Query),
            "region" => Ok(Self::Region),
            "min-price" => Ok(Self::MinPrice),
            "max-price" => Ok(Self::MaxPrice),
            "category" => Ok(Self::Category),
            "sort" => Ok(Self::Sort),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weather / Advisory
// ─────────────────────────────────────────────────────────────────────────────

/// Availability of an optional third-party feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureStatus {
    #[default]
    NotLoaded,
    Ready,
    /// Last fetch failed; showing the previous snapshot
    Stale,
    /// No credential configured or nothing cached to fall back on
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub temperature_c: f64,
    pub humidity: u32,
    pub wind_kph: f64,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub question: String,
    pub answer: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Info => "toast-info",
            Self::Success => "toast-success",
            Self::Warning => "toast-warning",
            Self::Error => "toast-error",
        }
    }
}

/// A toast shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_view_falls_back() {
        assert_eq!(View::from_tag_or_default("nope"), View::Dashboard);
        assert_eq!(View::from_tag_or_default("add-listing"), View::AddListing);
    }

    #[test]
    fn test_view_tags_round_trip() {
        for view in View::ALL {
            assert_eq!(view.tag().parse::<View>(), Ok(view));
        }
    }

    #[test]
    fn test_notice_queue_is_bounded() {
        let mut state = AppState {
            max_notices: 2,
            ..AppState::default()
        };
        state.push_notice(Notice::info("a"));
        state.push_notice(Notice::info("b"));
        state.push_notice(Notice::info("c"));
        assert_eq!(state.notices.len(), 2);
        assert_eq!(state.notices[0].message, "c");
    }

    #[test]
    fn test_patch_replaces_collection_wholesale() {
        let mut state = AppState::default();
        state.apply(
            StatePatch::new().collection(Collection::Listings, vec![Record::new().with("id", 1)]),
        );
        state.apply(
            StatePatch::new().collection(Collection::Listings, vec![Record::new().with("id", 2)]),
        );
        let ids: Vec<_> = state
            .collection(Collection::Listings)
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_patch_leaves_untouched_fields() {
        let mut state = AppState {
            message_draft: "hello".to_string(),
            ..AppState::default()
        };
        state.apply(StatePatch::navigate(View::Chat, None));
        assert_eq!(state.current_view, View::Chat);
        assert_eq!(state.message_draft, "hello");
    }

    #[test]
    fn test_filter_field_apply() {
        let mut filters = Filters::default();
        FilterField::MinPrice.apply(&mut filters, "20");
        FilterField::MaxPrice.apply(&mut filters, "abc");
        FilterField::Sort.apply(&mut filters, "price-desc");
        assert_eq!(filters.min_price, Some(20.0));
        assert_eq!(filters.max_price, None);
        assert_eq!(filters.sort, SortKey::PriceDesc);
    }

    #[test]
    fn test_profile_from_record() {
        let record = Record::new()
            .with("id", "u1")
            .with("full_name", "Ram Singh")
            .with("role", "admin")
            .with("is_verified", true);
        let profile = Profile::from_record(&record).unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert!(profile.is_verified);
    }
}
