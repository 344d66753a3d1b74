//! Agri services (bookable) and the agri store

use super::format::currency;
use super::layout::empty;
use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection};

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let services = state.collection(Collection::Services);
    if services.is_empty() {
        return empty(
            "fa-truck-tractor",
            "No services available",
            "Tractor, drone and soil-testing providers will appear here.",
        );
    }

    let cards: Markup = services
        .iter()
        .map(|s| {
            let id = s.id().unwrap_or_default();
            markup!(
                "<div class=\"glass-card service-card\"><h3>{}</h3><p>{}</p><p class=\"provider\"><i class=\"fa-solid fa-user\"></i> {}</p><div class=\"service-footer\"><span class=\"price\">{}/{}</span><button class=\"btn-primary\" {}>Book now</button></div></div>",
                s.text("name").unwrap_or_default(),
                s.text("description").unwrap_or_default(),
                s.text("provider").unwrap_or_else(|| "KhetGo Partner".to_string()),
                currency(s.number("price").unwrap_or(0.0)),
                s.text("unit").unwrap_or_else(|| "hr".to_string()),
                hook(
                    &format!("book-{}", id),
                    EventKind::Click,
                    &Intent::BookService { service_id: id.clone() }
                )
            )
        })
        .collect();

    markup!("<div class=\"services-grid\">{}</div>", cards)
}

pub fn render_store(state: &AppState, _param: Option<&str>) -> Markup {
    let products = state.collection(Collection::StoreProducts);
    if products.is_empty() {
        return empty(
            "fa-bag-shopping",
            "The store is empty",
            "Seeds, fertilizer and tools will be listed soon.",
        );
    }

    let cards: Markup = products
        .iter()
        .map(|p| {
            let stock = if p.number("stock").is_some_and(|n| n <= 0.0) {
                Markup::trusted("<span class=\"badge out-of-stock\">Out of stock</span>")
            } else {
                Markup::new()
            };
            markup!(
                "<div class=\"glass-card product-card\"><h3>{}</h3><p class=\"category\">{}</p><span class=\"price\">{}</span>{}</div>",
                p.text("name").unwrap_or_default(),
                p.text("category").unwrap_or_default(),
                currency(p.number("price").unwrap_or(0.0)),
                stock
            )
        })
        .collect();

    markup!("<div class=\"store-grid\">{}</div>", cards)
}
