//! Topic names.
//!
//! A topic is a destination path such as `/topic/notifications`. It must
//! start with `/`, have at least one character after it, and contain no
//! whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated topic name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// The broadcast topic every client joins on connect.
    pub const DEFAULT: &'static str = "/topic/notifications";

    /// The destination outbound envelopes are sent to.
    pub const SEND_DESTINATION: &'static str = "/app/notifications";

    /// The default broadcast topic.
    pub fn default_topic() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// The default send destination.
    pub fn send_destination() -> Self {
        Self(Self::SEND_DESTINATION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| TopicParseError::MissingSlash(s.to_string()))?;

        if rest.is_empty() {
            return Err(TopicParseError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TopicParseError::Whitespace(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Topic {
    type Error = TopicParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

/// Error parsing a topic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicParseError {
    #[error("topic must start with '/', got: {0}")]
    MissingSlash(String),
    #[error("topic name cannot be empty")]
    Empty,
    #[error("topic cannot contain whitespace, got: {0:?}")]
    Whitespace(String),
}
