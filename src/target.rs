// Navigation targets - the addresses loaded into page regions
use crate::error::TargetError;
use std::fmt;

/// An address of content to load, optionally followed by an `#id` selector
/// (`"/ #bzs-index-main-header"`) that narrows the fetched document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NavigationTarget(String);

impl NavigationTarget {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TargetError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part that is actually requested from the server.
    pub fn url(&self) -> &str {
        match self.0.split_once(char::is_whitespace) {
            Some((url, _)) => url,
            None => &self.0,
        }
    }

    /// Element id to extract from the response, if any.
    pub fn selector(&self) -> Option<&str> {
        let (_, rest) = self.0.split_once(char::is_whitespace)?;
        let id = rest.trim().strip_prefix('#')?;
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for NavigationTarget {
    type Error = TargetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
