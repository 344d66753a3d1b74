//! Intents - typed actions triggered by bound elements
//!
//! An [`Intent`] is what a hooked element asks for. The host supplies the
//! event payload (input value, form fields) when it fires.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::state::{FilterField, View};

/// Actions that can be triggered by user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate { view: View, param: Option<String> },
    Submit(FormKind),
    Filter(FilterField),
    ClearFilters,
    StartConversation { peer_id: String },
    EditDraft,
    SendMessage,
    Logout,
    Refresh,
    BookService { service_id: String },
    DeleteListing { listing_id: String },
    VerifyFarmer { profile_id: String },
    LoadWeather,
    AskAdvisor,
}

impl Intent {
    pub fn navigate(view: View) -> Self {
        Self::Navigate { view, param: None }
    }

    pub fn open(view: View, param: impl Into<String>) -> Self {
        Self::Navigate {
            view,
            param: Some(param.into()),
        }
    }

    /// Attribute encoding: (`data-intent`, `data-arg`)
    pub fn to_parts(&self) -> (&'static str, String) {
        match self {
            Self::Navigate { view, param: None } => ("navigate", view.tag().to_string()),
            Self::Navigate {
                view,
                param: Some(p),
            } => ("navigate", format!("{}:{}", view.tag(), p)),
            Self::Submit(kind) => ("submit", kind.tag().to_string()),
            Self::Filter(field) => ("filter", field.tag().to_string()),
            Self::ClearFilters => ("clear-filters", String::new()),
            Self::StartConversation { peer_id } => ("start-conversation", peer_id.clone()),
            Self::EditDraft => ("edit-draft", String::new()),
            Self::SendMessage => ("send-message", String::new()),
            Self::Logout => ("logout", String::new()),
            Self::Refresh => ("refresh", String::new()),
            Self::BookService { service_id } => ("book-service", service_id.clone()),
            Self::DeleteListing { listing_id } => ("delete-listing", listing_id.clone()),
            Self::VerifyFarmer { profile_id } => ("verify-farmer", profile_id.clone()),
            Self::LoadWeather => ("load-weather", String::new()),
            Self::AskAdvisor => ("ask-advisor", String::new()),
        }
    }

    /// Inverse of [`Intent::to_parts`]
    pub fn from_parts(intent: &str, arg: &str) -> Option<Self> {
        let non_empty = || (!arg.is_empty()).then(|| arg.to_string());
        Some(match intent {
            "navigate" => match arg.split_once(':') {
                Some((view, param)) => Self::Navigate {
                    view: View::from_tag_or_default(view),
                    param: Some(param.to_string()),
                },
                None => Self::navigate(View::from_tag_or_default(arg)),
            },
            "submit" => Self::Submit(arg.parse().ok()?),
            "filter" => Self::Filter(arg.parse().ok()?),
            "clear-filters" => Self::ClearFilters,
            "start-conversation" => Self::StartConversation {
                peer_id: non_empty()?,
            },
            "edit-draft" => Self::EditDraft,
            "send-message" => Self::SendMessage,
            "logout" => Self::Logout,
            "refresh" => Self::Refresh,
            "book-service" => Self::BookService {
                service_id: non_empty()?,
            },
            "delete-listing" => Self::DeleteListing {
                listing_id: non_empty()?,
            },
            "verify-farmer" => Self::VerifyFarmer {
                profile_id: non_empty()?,
            },
            "load-weather" => Self::LoadWeather,
            "ask-advisor" => Self::AskAdvisor,
            _ => return None,
        })
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, arg) = self.to_parts();
        if arg.is_empty() {
            write!(f, "{}", name)
        } else {
            write!(f, "{}({})", name, arg)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    AddListing,
    LedgerEntry,
    ForumPost,
    Login,
    Signup,
}

impl FormKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AddListing => "add-listing",
            Self::LedgerEntry => "ledger-entry",
            Self::ForumPost => "forum-post",
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add-listing" => Ok(Self::AddListing),
            "ledger-entry" => Ok(Self::LedgerEntry),
            "forum-post" => Ok(Self::ForumPost),
            "login" => Ok(Self::Login),
            "signup" => Ok(Self::Signup),
            other => Err(format!("unknown form '{}'", other)),
        }
    }
}

/// A file attached to a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FileUpload),
}

/// Submitted form fields, keyed by input name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, FormValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.to_string(), FormValue::Text(value.into()));
        self
    }

    pub fn file(mut self, name: &str, file: FileUpload) -> Self {
        self.fields.insert(name.to_string(), FormValue::File(file));
        self
    }

    /// Trimmed text value; empty strings read as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FormValue::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    pub fn get_file(&self, name: &str) -> Option<&FileUpload> {
        match self.fields.get(name)? {
            FormValue::File(f) => Some(f),
            FormValue::Text(_) => None,
        }
    }
}

/// Data carried by a DOM-style event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    pub value: Option<String>,
    pub form: Option<FormData>,
}

impl EventPayload {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            form: None,
        }
    }

    pub fn form(form: FormData) -> Self {
        Self {
            value: None,
            form: Some(form),
        }
    }
}
