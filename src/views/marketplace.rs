//! Marketplace grid and listing detail

use super::format::currency;
use super::layout::{empty, not_found};
use crate::actions::Intent;
use crate::filter;
use crate::markup::Markup;
use crate::record::Record;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection, FilterField, SortKey, View};

const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1542838132-92c53300491e?auto=format&fit=crop&q=80&w=400";

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let listings = filter::apply(state.collection(Collection::Listings), &state.filters);

    let grid = if listings.is_empty() {
        empty(
            "fa-seedling",
            "No crops found matching your search.",
            "Try a different name or pincode, or clear the filters.",
        )
    } else {
        markup!(
            "<div class=\"marketplace-grid\">{}</div>",
            listings
                .iter()
                .map(|r| card(r, "market"))
                .collect::<Markup>()
        )
    };

    markup!(
        "<div class=\"marketplace-layout\">{}<section>{}</section></div>",
        filters_panel(state),
        grid
    )
}

fn filters_panel(state: &AppState) -> Markup {
    let f = &state.filters;
    let sort_options: Markup = [
        (SortKey::Newest, "Newest"),
        (SortKey::PriceAsc, "Price: low to high"),
        (SortKey::PriceDesc, "Price: high to low"),
        (SortKey::Name, "Name"),
    ]
    .iter()
    .map(|(key, label)| {
        let selected = if *key == f.sort { " selected" } else { "" };
        markup!("<option value=\"{}\"{}>{}</option>", key.tag(), selected, label)
    })
    .collect();

    markup!(
        "<aside class=\"filters glass-card\"><h3>Filters</h3>\
         <label>Location (Pincode Pref)</label><input type=\"text\" {} placeholder=\"e.g. 44\" value=\"{}\">\
         <label>Min price</label><input type=\"number\" {} value=\"{}\">\
         <label>Max price</label><input type=\"number\" {} value=\"{}\">\
         <label>Sort</label><select {}>{}</select>\
         <button class=\"btn-ghost\" {}>Clear filters</button></aside>",
        hook("filter-region", EventKind::Input, &Intent::Filter(FilterField::Region)),
        f.region,
        hook("filter-min-price", EventKind::Input, &Intent::Filter(FilterField::MinPrice)),
        f.min_price.map(|p| p.to_string()),
        hook("filter-max-price", EventKind::Input, &Intent::Filter(FilterField::MaxPrice)),
        f.max_price.map(|p| p.to_string()),
        hook("filter-sort", EventKind::Change, &Intent::Filter(FilterField::Sort)),
        sort_options,
        hook("filter-clear", EventKind::Click, &Intent::ClearFilters)
    )
}

/// Listing card; `prefix` keeps element ids unique per section
pub(super) fn card(record: &Record, prefix: &str) -> Markup {
    let id = record.id().unwrap_or_default();
    let verified = if record.flag("is_verified") {
        Markup::trusted(
            "<i class=\"fa-solid fa-certificate verified\" title=\"Verified Farmer\"></i>",
        )
    } else {
        Markup::new()
    };

    markup!(
        "<div class=\"crop-card\" {}><img src=\"{}\" class=\"crop-image\" alt=\"{}\"><div class=\"crop-details\"><div class=\"crop-name\">{}</div>{}<div class=\"crop-location\"><i class=\"fa-solid fa-location-dot\"></i> {} ({})</div><div class=\"crop-footer\"><span class=\"price\">{}/{}</span></div></div></div>",
        hook(
            &format!("{}-listing-{}", prefix, id),
            EventKind::Click,
            &Intent::open(View::Listing, id.clone())
        ),
        record.text("image_url").unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        record.text("name").unwrap_or_default(),
        record.text("name").unwrap_or_default(),
        verified,
        record.text("location").unwrap_or_else(|| "Local".to_string()),
        record.text("pincode").unwrap_or_default(),
        currency(record.number("price").unwrap_or(0.0)),
        record.text("unit").unwrap_or_else(|| "kg".to_string())
    )
}

pub fn render_detail(state: &AppState, param: Option<&str>) -> Markup {
    let Some(listing) = param.and_then(|id| state.find(Collection::Listings, id)) else {
        return not_found("Listing");
    };

    let id = listing.id().unwrap_or_default();
    let owner = listing.text("farmer_id");
    let is_mine = owner.is_some() && owner.as_deref() == state.user_id();

    let action = match (&owner, is_mine) {
        (_, true) => markup!(
            "<button class=\"btn-danger\" {}>Delete listing</button>",
            hook(
                &format!("delete-{}", id),
                EventKind::Click,
                &Intent::DeleteListing { listing_id: id.clone() }
            )
        ),
        (Some(farmer_id), false) => markup!(
            "<button class=\"btn-primary\" {}>Chat with farmer</button>",
            hook(
                "contact-farmer",
                EventKind::Click,
                &Intent::StartConversation { peer_id: farmer_id.clone() }
            )
        ),
        (None, false) => Markup::new(),
    };

    markup!(
        "<article class=\"listing-detail glass-card\"><img src=\"{}\" class=\"detail-image\" alt=\"{}\"><div class=\"detail-body\"><h2>{}</h2><p class=\"price\">{}/{}</p><p>{}</p><dl><dt>Farmer</dt><dd>{}</dd><dt>Location</dt><dd>{} ({})</dd><dt>Quantity</dt><dd>{}</dd><dt>Category</dt><dd>{}</dd></dl>{}<button class=\"btn-ghost\" {}>Back to marketplace</button></div></article>",
        listing.text("image_url").unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        listing.text("name").unwrap_or_default(),
        listing.text("name").unwrap_or_default(),
        currency(listing.number("price").unwrap_or(0.0)),
        listing.text("unit").unwrap_or_else(|| "kg".to_string()),
        listing.text("description").unwrap_or_default(),
        listing.text("farmer").unwrap_or_else(|| "Unknown".to_string()),
        listing.text("location").unwrap_or_else(|| "Local".to_string()),
        listing.text("pincode").unwrap_or_default(),
        listing.text("quantity").unwrap_or_else(|| "-".to_string()),
        listing.text("category").unwrap_or_else(|| "Fresh".to_string()),
        action,
        hook("detail-back", EventKind::Click, &Intent::navigate(View::Marketplace))
    )
}
