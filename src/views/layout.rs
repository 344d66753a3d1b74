//! Chrome shared by authenticated views: sidebar, header, toasts

use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, FilterField, View};

const NAV: [(View, &str, &str); 11] = [
    (View::Dashboard, "Dashboard", "fa-house"),
    (View::Marketplace, "Marketplace", "fa-store"),
    (View::AddListing, "Add Listing", "fa-plus-circle"),
    (View::Services, "Agri Services", "fa-truck-tractor"),
    (View::Store, "Agri Store", "fa-bag-shopping"),
    (View::MyActivity, "My Activity", "fa-user-clock"),
    (View::Chat, "Messages", "fa-comments"),
    (View::Ledger, "Ledger", "fa-book"),
    (View::Community, "Community", "fa-people-group"),
    (View::Weather, "Weather", "fa-cloud-sun"),
    (View::Advisory, "AI Advisory", "fa-robot"),
];

/// Wrap a view's content in the application chrome
pub fn page(state: &AppState, view: View, content: Markup) -> Markup {
    markup!(
        "{}<main class=\"main-content\"><div class=\"fade-in\">{}{}</div></main>{}",
        sidebar(state, view),
        header(state, view.title()),
        content,
        toasts(state)
    )
}

/// Chrome-less wrapper for login / signup
pub fn bare(state: &AppState, content: Markup) -> Markup {
    markup!(
        "<main class=\"auth-shell\">{}</main>{}",
        content,
        toasts(state)
    )
}

fn sidebar(state: &AppState, current: View) -> Markup {
    let mut links: Markup = NAV
        .iter()
        .map(|(view, label, icon)| nav_link(*view, label, icon, current))
        .collect();

    if state.is_admin() {
        links.push(nav_link(View::Admin, "Admin", "fa-shield-halved", current));
    }

    markup!(
        "<aside class=\"sidebar\"><div class=\"brand\"><i class=\"fa-solid fa-leaf\"></i><span>KhetGo</span></div><ul class=\"nav-links\">{}</ul><button class=\"btn-ghost\" {}>Sign out</button></aside>",
        links,
        hook("logout", EventKind::Click, &Intent::Logout)
    )
}

fn nav_link(view: View, label: &str, icon: &str, current: View) -> Markup {
    let active = if view == current { " active" } else { "" };
    markup!(
        "<li class=\"nav-item\"><a class=\"nav-link{}\" {}><i class=\"fa-solid {}\"></i><span>{}</span></a></li>",
        active,
        hook(
            &format!("nav-{}", view.tag()),
            EventKind::Click,
            &Intent::navigate(view)
        ),
        icon,
        label
    )
}

fn header(state: &AppState, title: &str) -> Markup {
    let badge = match &state.profile {
        Some(p) if p.is_verified => markup!(
            "<div class=\"verified-badge\"><i class=\"fa-solid fa-check-circle\"></i> Verified {}</div>",
            capitalize(&p.role.to_string())
        ),
        _ => Markup::new(),
    };

    markup!(
        "<header><div class=\"header-left\"><h1>{}</h1></div><div class=\"header-right\"><div class=\"search-bar\"><i class=\"fa-solid fa-magnifying-glass\"></i><input type=\"text\" {} placeholder=\"Search crops, locations...\" value=\"{}\"></div><div class=\"user-profile\">{}<span class=\"user-name\">{}</span></div></div></header>",
        title,
        hook("global-search", EventKind::Input, &Intent::Filter(FilterField::Query)),
        state.filters.query,
        badge,
        state.display_name()
    )
}

fn toasts(state: &AppState) -> Markup {
    let Some(latest) = state.notices.front() else {
        return Markup::new();
    };
    markup!(
        "<div class=\"toast-notification {}\" role=\"status\">{}</div>",
        latest.kind.class(),
        latest.message
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Explicit empty-state block
pub fn empty(icon: &str, title: &str, hint: &str) -> Markup {
    markup!(
        "<div class=\"glass-card empty-state\"><i class=\"fa-solid {}\"></i><h3>{}</h3><p>{}</p></div>",
        icon,
        title,
        hint
    )
}

/// Explicit not-found block
pub fn not_found(what: &str) -> Markup {
    markup!(
        "<div class=\"glass-card not-found\"><h3>{} not found</h3><p>It may have been removed.</p><button class=\"btn-primary\" {}>Back to dashboard</button></div>",
        what,
        hook("not-found-back", EventKind::Click, &Intent::navigate(View::Dashboard))
    )
}
