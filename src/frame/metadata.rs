//! Decoded header blocks.

use std::fmt;

/// Ordered list of header fields.
///
/// Names are stored as received; lookups compare them case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    /// Create an empty field list.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a field, returning the list for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether the list holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<N, V> FromIterator<(N, V)> for Fields
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Message metadata carried by a HEADERS frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaData {
    /// Request head: method, target and fields.
    Request {
        /// Request method, for example `GET`.
        method: String,
        /// Request target (path and query).
        target: String,
        /// Remaining header fields.
        fields: Fields,
    },
    /// Response head.
    Response {
        /// Status code.
        status: u16,
        /// Remaining header fields.
        fields: Fields,
    },
    /// Trailer section following the body.
    Trailers {
        /// Trailer fields.
        fields: Fields,
    },
}

impl MetaData {
    /// Build request metadata without extra fields.
    #[must_use]
    pub fn request(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Request {
            method: method.into(),
            target: target.into(),
            fields: Fields::new(),
        }
    }

    /// Build response metadata without extra fields.
    #[must_use]
    pub fn response(status: u16) -> Self {
        Self::Response {
            status,
            fields: Fields::new(),
        }
    }

    /// Build trailer metadata.
    #[must_use]
    pub fn trailers(fields: Fields) -> Self { Self::Trailers { fields } }

    /// Whether this is a request head.
    #[must_use]
    pub fn is_request(&self) -> bool { matches!(self, Self::Request { .. }) }

    /// Whether this is a response head.
    #[must_use]
    pub fn is_response(&self) -> bool { matches!(self, Self::Response { .. }) }

    /// Whether this is a trailer section.
    #[must_use]
    pub fn is_trailers(&self) -> bool { matches!(self, Self::Trailers { .. }) }

    /// Response status, if this is a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a 1xx response, after which a final response follows.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        self.status().is_some_and(|status| (100..200).contains(&status))
    }

    /// Header fields of any variant.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        match self {
            Self::Request { fields, .. } | Self::Response { fields, .. } | Self::Trailers { fields } => {
                fields
            }
        }
    }
}

impl fmt::Display for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { method, target, .. } => write!(f, "{method} {target}"),
            Self::Response { status, .. } => write!(f, "{status}"),
            Self::Trailers { fields } => write!(f, "trailers({})", fields.len()),
        }
    }
}
