//! Markup - auto-escaping template layer
//!
//! Every value interpolated through [`markup!`] is escaped unless it is
//! already a [`Markup`]. The only way to produce unescaped text is
//! [`Markup::trusted`], reserved for fragments the crate builds itself.
//!
//! Arguments must be positional (`{}`): inline captures such as `{name}`
//! bypass [`ToMarkup`] and are not escaped.

use std::fmt;

/// A markup fragment that is safe to insert as-is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Empty fragment
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Wrap a string the caller guarantees is already safe
    pub fn trusted(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escape arbitrary text into a fragment
    pub fn text(text: &str) -> Self {
        Self(escape(text))
    }

    /// Concatenate fragments
    pub fn join<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Markup>,
    {
        Self(parts.into_iter().map(|m| m.0).collect())
    }

    pub fn push(&mut self, other: Markup) {
        self.0.push_str(&other.0);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<Markup> for Markup {
    fn from_iter<T: IntoIterator<Item = Markup>>(iter: T) -> Self {
        Self::join(iter)
    }
}

/// Conversion into an interpolatable fragment
pub trait ToMarkup {
    fn to_markup(&self) -> Markup;
}

impl ToMarkup for Markup {
    fn to_markup(&self) -> Markup {
        self.clone()
    }
}

impl ToMarkup for str {
    fn to_markup(&self) -> Markup {
        Markup::text(self)
    }
}

impl ToMarkup for String {
    fn to_markup(&self) -> Markup {
        Markup::text(self)
    }
}

impl<T: ToMarkup + ?Sized> ToMarkup for &T {
    fn to_markup(&self) -> Markup {
        (**self).to_markup()
    }
}

impl<T: ToMarkup> ToMarkup for Option<T> {
    fn to_markup(&self) -> Markup {
        match self {
            Some(v) => v.to_markup(),
            None => Markup::new(),
        }
    }
}

impl ToMarkup for serde_json::Value {
    fn to_markup(&self) -> Markup {
        match self {
            serde_json::Value::Null => Markup::new(),
            serde_json::Value::String(s) => Markup::text(s),
            other => Markup::text(&other.to_string()),
        }
    }
}

macro_rules! display_markup {
    ($($t:ty),*) => {
        $(impl ToMarkup for $t {
            fn to_markup(&self) -> Markup {
                Markup::text(&self.to_string())
            }
        })*
    };
}

display_markup!(i32, i64, u32, u64, usize, f32, f64, bool, char);

/// Build a [`Markup`] from a format string, escaping every argument
#[macro_export]
macro_rules! markup {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::markup::Markup::trusted(format!(
            $fmt $(, $crate::markup::ToMarkup::to_markup(&$arg))*
        ))
    };
}

/// Escape HTML-significant characters
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`] (used when reading attributes back from markup)
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}
