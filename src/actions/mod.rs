//! Action Handlers
//!
//! Typed intents, form parsing, and the handlers `App::dispatch` routes to.

pub mod forms;
mod handlers;
mod intent;

pub use intent::{EventPayload, FileUpload, FormData, FormKind, FormValue, Intent};
