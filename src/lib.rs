//! KhetGo - headless render/state core for a farmer marketplace

#[macro_use]
pub mod markup;

pub mod actions;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod offline;
pub mod record;
pub mod render;
pub mod retry;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod views;

pub use actions::{EventPayload, FormData, FormKind, Intent};
pub use app::App;
pub use bootstrap::{boot, Boot};
pub use config::ShellConfig;
pub use error::{FixSuggestion, Result, ShellError};
pub use gateway::{Gateway, MemoryGateway, RestGateway};
pub use markup::Markup;
pub use offline::OfflineShell;
pub use record::Record;
pub use render::{EventKind, MemorySurface, Surface};
pub use state::{AppState, Collection, StatePatch, View};
pub use store::{ResponseOrdering, Store};
