//! Weather and AI advisory

use crate::actions::Intent;
use crate::markup::Markup;
use crate::render::{hook, EventKind};
use crate::state::{AppState, FeatureStatus};

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let refresh = hook("load-weather", EventKind::Click, &Intent::LoadWeather);

    if state.weather_loading {
        return Markup::trusted(
            "<div class=\"glass-card weather-card\"><p>Fetching local weather...</p></div>",
        );
    }

    match (&state.weather, state.weather_status) {
        (None, FeatureStatus::Unavailable) => markup!(
            "<div class=\"glass-card weather-card unavailable\"><i class=\"fa-solid fa-cloud\"></i><h3>Weather is currently unavailable</h3><p>Configure a weather API key or try again when online.</p><button class=\"btn-ghost\" {}>Retry</button></div>",
            refresh
        ),
        (None, _) => markup!(
            "<div class=\"glass-card weather-card\"><h3>Local weather</h3><p>Get the forecast for your farm.</p><button class=\"btn-primary\" {}>Load weather</button></div>",
            refresh
        ),
        (Some(w), status) => {
            let stale = if status == FeatureStatus::Stale {
                markup!(
                    "<p class=\"stale\">Showing last known weather from {}</p>",
                    w.fetched_at.format("%d %b %H:%M").to_string()
                )
            } else {
                Markup::new()
            };
            markup!(
                "<div class=\"glass-card weather-card\"><h3>{}</h3><div class=\"temp\">{}°C</div><p>{}</p><ul><li>Humidity: {}%</li><li>Wind: {} km/h</li></ul>{}<button class=\"btn-ghost\" {}>Refresh</button></div>",
                w.location,
                format!("{:.0}", w.temperature_c),
                w.description,
                w.humidity,
                format!("{:.1}", w.wind_kph),
                stale,
                refresh
            )
        }
    }
}

pub fn render_advisory(state: &AppState, _param: Option<&str>) -> Markup {
    let answer = match (&state.advisory, state.advisory_status) {
        (_, FeatureStatus::Unavailable) => Markup::trusted(
            "<div class=\"advisory-answer unavailable\">AI advisory is currently unavailable.</div>",
        ),
        (Some(a), _) => markup!(
            "<div class=\"advisory-answer\"><p class=\"question\">{}</p><p>{}</p></div>",
            a.question,
            a.answer
        ),
        (None, _) => Markup::trusted(
            "<p class=\"hint\">Ask about crop diseases, fertilizer doses or sowing times.</p>",
        ),
    };

    markup!(
        "<div class=\"glass-card advisory-card\"><h3><i class=\"fa-solid fa-robot\"></i> KhetGo AI</h3><form {}><textarea name=\"question\" placeholder=\"Ask a farming question...\" required></textarea><button type=\"submit\" class=\"btn-primary\">Ask</button></form>{}</div>",
        hook("advisory-form", EventKind::Submit, &Intent::AskAdvisor),
        answer
    )
}
