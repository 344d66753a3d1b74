//! My listings and my bookings

use super::format::{currency, date};
use super::layout::empty;
use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection, View};

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let me = state.user_id();
    let mine: Vec<_> = state
        .collection(Collection::Listings)
        .iter()
        .filter(|l| me.is_some() && l.str("farmer_id") == me)
        .collect();

    let listings = if mine.is_empty() {
        markup!(
            "{}<button class=\"btn-primary\" {}>Add a listing</button>",
            empty("fa-seedling", "You have not listed anything", "Your crops will show up here."),
            hook("activity-add", EventKind::Click, &Intent::navigate(View::AddListing))
        )
    } else {
        let rows: Markup = mine
            .iter()
            .map(|l| {
                let id = l.id().unwrap_or_default();
                markup!(
                    "<li class=\"activity-row\"><span>{}</span><span>{}</span><button class=\"btn-danger\" {}>Delete</button></li>",
                    l.text("name").unwrap_or_default(),
                    currency(l.number("price").unwrap_or(0.0)),
                    hook(
                        &format!("activity-delete-{}", id),
                        EventKind::Click,
                        &Intent::DeleteListing { listing_id: id.clone() }
                    )
                )
            })
            .collect();
        markup!("<ul class=\"activity-list\">{}</ul>", rows)
    };

    let bookings = state.collection(Collection::Bookings);
    let bookings = if bookings.is_empty() {
        empty("fa-calendar", "No bookings yet", "Booked services appear here.")
    } else {
        let rows: Markup = bookings
            .iter()
            .map(|b| {
                markup!(
                    "<li class=\"activity-row\"><span>{}</span><span>{}</span><span class=\"status status-{}\">{}</span></li>",
                    b.text("service_name").unwrap_or_else(|| "Service".to_string()),
                    b.text("booking_date").map(|d| date(&d)),
                    b.text("status").unwrap_or_else(|| "pending".to_string()),
                    b.text("status").unwrap_or_else(|| "pending".to_string())
                )
            })
            .collect();
        markup!("<ul class=\"activity-list\">{}</ul>", rows)
    };

    markup!(
        "<section class=\"glass-card\"><h3>My listings</h3>{}</section><section class=\"glass-card\"><h3>My bookings</h3>{}</section>",
        listings,
        bookings
    )
}
