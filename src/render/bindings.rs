//! Event Bindings - hook attributes and the handler registry
//!
//! Views mark interactive elements with [`hook`]. After every whole-tree
//! replace the engine re-scans the markup and rebuilds the registry, since
//! the replace discards every previous binding.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::actions::Intent;
use crate::markup::{unescape, Markup};

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<[a-zA-Z][a-zA-Z0-9-]*\s[^>]*data-intent="[^"]*"[^>]*>"#).unwrap());

static ATTR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:-]*)="([^"]*)""#).unwrap());

/// DOM-style event kinds a binding listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
    Change,
}

impl EventKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(Self::Click),
            "submit" => Ok(Self::Submit),
            "input" => Ok(Self::Input),
            "change" => Ok(Self::Change),
            other => Err(format!("unknown event '{}'", other)),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One interactive element found in rendered markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub element_id: String,
    pub event: EventKind,
    pub intent: Intent,
}

/// Attributes that make an element bindable
pub fn hook(id: &str, event: EventKind, intent: &Intent) -> Markup {
    let (name, arg) = intent.to_parts();
    markup!(
        "id=\"{}\" data-event=\"{}\" data-intent=\"{}\" data-arg=\"{}\"",
        id,
        event.tag(),
        name,
        arg
    )
}

/// Find every hooked element in a fragment
pub fn scan(markup: &Markup) -> Vec<Binding> {
    TAG_RE
        .find_iter(markup.as_str())
        .filter_map(|tag| {
            let attrs: HashMap<&str, String> = ATTR_RE
                .captures_iter(tag.as_str())
                .filter_map(|c| Some((c.get(1)?.as_str(), unescape(c.get(2)?.as_str()))))
                .collect();

            let element_id = attrs.get("id")?.clone();
            let event = attrs
                .get("data-event")
                .and_then(|e| e.parse().ok())
                .unwrap_or(EventKind::Click);
            let arg = attrs.get("data-arg").map(String::as_str).unwrap_or("");
            let intent = match Intent::from_parts(attrs.get("data-intent")?, arg) {
                Some(intent) => intent,
                None => {
                    debug!(element = %element_id, "Skipping element with unknown intent");
                    return None;
                }
            };

            Some(Binding {
                element_id,
                event,
                intent,
            })
        })
        .collect()
}

/// Handlers attached to the current tree, keyed by element id
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<(EventKind, Intent)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: &[Binding]) -> Self {
        let mut handlers: HashMap<String, Vec<(EventKind, Intent)>> = HashMap::new();
        for b in bindings {
            handlers
                .entry(b.element_id.clone())
                .or_default()
                .push((b.event, b.intent.clone()));
        }
        Self { handlers }
    }

    /// Intent bound to `(element, event)`; `None` means nothing to do
    pub fn resolve(&self, element_id: &str, event: EventKind) -> Option<&Intent> {
        self.handlers
            .get(element_id)?
            .iter()
            .find(|(e, _)| *e == event)
            .map(|(_, intent)| intent)
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.handlers.contains_key(element_id)
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
