//! Admin directory: farmer verification

use super::layout::empty;
use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection};

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    if !state.is_admin() {
        return Markup::trusted(
            "<div class=\"glass-card access-denied\"><i class=\"fa-solid fa-lock\"></i><h3>Access denied</h3><p>This area is restricted to administrators.</p></div>",
        );
    }

    let profiles = state.collection(Collection::Profiles);
    if profiles.is_empty() {
        return empty("fa-users", "No registered users", "New signups will appear here.");
    }

    let rows: Markup = profiles
        .iter()
        .map(|p| {
            let id = p.id().unwrap_or_default();
            let action = if p.flag("is_verified") {
                Markup::trusted("<span class=\"badge verified\">Verified</span>")
            } else {
                markup!(
                    "<button class=\"btn-primary\" {}>Verify</button>",
                    hook(
                        &format!("verify-{}", id),
                        EventKind::Click,
                        &Intent::VerifyFarmer { profile_id: id.clone() }
                    )
                )
            };
            markup!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                p.text("full_name").unwrap_or_default(),
                p.text("role").unwrap_or_default(),
                p.text("district").unwrap_or_default(),
                action
            )
        })
        .collect();

    markup!(
        "<table class=\"glass-card admin-table\"><thead><tr><th>Name</th><th>Role</th><th>District</th><th></th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}
