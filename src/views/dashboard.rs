//! Farm overview: weather, mandi prices, trending listings

use super::format::currency;
use super::layout::empty;
use super::marketplace::card;
use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection, FeatureStatus, View};

const TRENDING: usize = 3;

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let weather = match (&state.weather, state.weather_status) {
        (Some(w), _) => markup!(
            "<div class=\"glass-card weather-mini\"><i class=\"fa-solid fa-cloud-sun\"></i><div><h3>{}°C</h3><p>{} · {}</p></div></div>",
            format!("{:.0}", w.temperature_c),
            w.location,
            w.description
        ),
        (None, FeatureStatus::Unavailable) => Markup::trusted(
            "<div class=\"glass-card weather-mini\"><p>Weather unavailable</p></div>",
        ),
        (None, _) => markup!(
            "<div class=\"glass-card weather-mini\"><button class=\"btn-ghost\" {}>Check weather</button></div>",
            hook("dashboard-weather", EventKind::Click, &Intent::navigate(View::Weather))
        ),
    };

    let prices = state.collection(Collection::MandiPrices);
    let mandi = if prices.is_empty() {
        empty("fa-chart-line", "No mandi prices yet", "Prices refresh every morning.")
    } else {
        let rows: Markup = prices
            .iter()
            .map(|p| {
                let trend = match p.str("trend") {
                    Some("up") => "trend-up",
                    Some("down") => "trend-down",
                    _ => "trend-flat",
                };
                markup!(
                    "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
                    p.text("crop").unwrap_or_default(),
                    p.text("market").unwrap_or_default(),
                    trend,
                    currency(p.number("price").unwrap_or(0.0))
                )
            })
            .collect();
        markup!(
            "<table class=\"mandi-table\"><thead><tr><th>Crop</th><th>Mandi</th><th>Price/qtl</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let listings = state.collection(Collection::Listings);
    let trending = if listings.is_empty() {
        empty("fa-seedling", "No listings yet", "Be the first to list your harvest.")
    } else {
        markup!(
            "<div class=\"marketplace-grid\">{}</div>",
            listings
                .iter()
                .take(TRENDING)
                .map(|r| card(r, "trending"))
                .collect::<Markup>()
        )
    };

    markup!(
        "<div class=\"dashboard-grid\">{}<section class=\"glass-card\"><h3>Mandi prices</h3>{}</section><section><div class=\"section-header\"><h3>Trending near you</h3><button class=\"btn-ghost\" {}>View all</button><button class=\"btn-ghost\" {}><i class=\"fa-solid fa-rotate\"></i></button></div>{}</section></div>",
        weather,
        mandi,
        hook("dashboard-view-all", EventKind::Click, &Intent::navigate(View::Marketplace)),
        hook("dashboard-refresh", EventKind::Click, &Intent::Refresh),
        trending
    )
}
