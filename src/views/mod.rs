//! View Functions
//!
//! Pure mappings from a state snapshot (plus an optional detail parameter)
//! to markup. No view mutates state or performs I/O, and every record field
//! goes through the escaping `markup!` macro.

mod activity;
mod admin;
mod auth;
mod chat;
mod community;
mod dashboard;
pub mod format;
mod layout;
mod ledger;
mod listing_form;
mod marketplace;
mod services;
mod weather;

use crate::markup::Markup;
use crate::state::{AppState, View};

/// Signature every view function follows
pub type ViewFn = fn(&AppState, Option<&str>) -> Markup;

/// View function for a tag
pub fn view_fn(view: View) -> ViewFn {
    match view {
        View::Dashboard => dashboard::render,
        View::Marketplace => marketplace::render,
        View::Listing => marketplace::render_detail,
        View::AddListing => listing_form::render,
        View::Services => services::render,
        View::Store => services::render_store,
        View::MyActivity => activity::render,
        View::Chat => chat::render,
        View::Ledger => ledger::render,
        View::Community => community::render,
        View::Weather => weather::render,
        View::Advisory => weather::render_advisory,
        View::Admin => admin::render,
        View::Login => auth::render_login,
        View::Signup => auth::render_signup,
    }
}

/// Full screen for a view: content plus chrome
pub fn render_view(view: View, state: &AppState, param: Option<&str>) -> Markup {
    let content = view_fn(view)(state, param);
    if view.is_public() {
        layout::bare(state, content)
    } else {
        layout::page(state, view, content)
    }
}

/// Placeholder shown while the first data load is in flight
pub fn loading() -> Markup {
    Markup::trusted(
        "<div class=\"loading-screen\"><h2>Syncing with KhetGo...</h2></div>",
    )
}
