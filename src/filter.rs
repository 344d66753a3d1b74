//! Client-side filtering and sorting of fetched listings
//!
//! Pure functions of `(collection, filters)`: the source slice is never
//! reordered or modified.

use std::cmp::Ordering;

use crate::record::Record;
use crate::state::{Filters, SortKey};

/// Listings matching the filters, in display order
pub fn apply<'a>(listings: &'a [Record], filters: &Filters) -> Vec<&'a Record> {
    let query = filters.query.trim().to_lowercase();

    let mut matched: Vec<&Record> = listings
        .iter()
        .filter(|r| matches_query(r, &query))
        .filter(|r| matches_region(r, &filters.region))
        .filter(|r| matches_price(r, filters.min_price, filters.max_price))
        .filter(|r| matches_category(r, filters.category.as_deref()))
        .collect();

    // Stable sort keeps gateway order for ties
    match filters.sort {
        SortKey::Newest => {}
        SortKey::PriceAsc => matched.sort_by(|a, b| cmp_price(a, b)),
        SortKey::PriceDesc => matched.sort_by(|a, b| cmp_price(b, a)),
        SortKey::Name => matched.sort_by_key(|r| r.text("name").unwrap_or_default().to_lowercase()),
    }

    matched
}

fn matches_query(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    ["name", "location", "category"].iter().any(|field| {
        record
            .text(field)
            .is_some_and(|v| v.to_lowercase().contains(query))
    })
}

fn matches_region(record: &Record, region: &str) -> bool {
    let region = region.trim();
    region.is_empty()
        || record
            .text("pincode")
            .is_some_and(|p| p.starts_with(region))
}

fn matches_price(record: &Record, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(price) = record.number("price") else {
        return false;
    };
    min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m)
}

fn matches_category(record: &Record, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(c) => record
            .text("category")
            .is_some_and(|v| v.eq_ignore_ascii_case(c)),
    }
}

fn cmp_price(a: &Record, b: &Record) -> Ordering {
    let pa = a.number("price").unwrap_or(f64::MAX);
    let pb = b.number("price").unwrap_or(f64::MAX);
    pa.partial_cmp(&pb).unwrap_or(Ordering::Equal)
}
