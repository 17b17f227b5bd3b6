//! Namespaced resource identifiers (`namespace:path`).

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{self, Display},
    iter,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an identifier string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The string had more than one `:` separator.
    #[error("Invalid identifier: {0}")]
    Malformed(String),
    /// The namespace contained a forbidden character.
    #[error("Invalid namespace: {0}")]
    Namespace(String),
    /// The path contained a forbidden character.
    #[error("Invalid path: {0}")]
    Path(String),
}

/// A namespaced identifier such as `curios:slot/ring`.
///
/// Ordering compares the textual `namespace:path` form byte by byte, so sorting a
/// list of identifiers gives the same order as sorting their strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    /// The namespace, usually the name of the producer that owns the resource.
    pub namespace: Cow<'static, str>,
    /// The path inside the namespace.
    pub path: Cow<'static, str>,
}

impl Identifier {
    /// Namespace used when a string carries no explicit namespace.
    pub const VANILLA_NAMESPACE: &'static str = "minecraft";

    /// Creates an identifier without validating it.
    pub fn new(namespace: impl Into<Cow<'static, str>>, path: impl Into<Cow<'static, str>>) -> Self {
        Identifier {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Creates a vanilla identifier from a static path.
    #[must_use]
    pub const fn vanilla_static(path: &'static str) -> Self {
        Identifier {
            namespace: Cow::Borrowed(Self::VANILLA_NAMESPACE),
            path: Cow::Borrowed(path),
        }
    }

    /// Returns whether a character may appear in a namespace.
    #[must_use]
    pub fn valid_namespace_char(namespace_char: char) -> bool {
        namespace_char == '_'
            || namespace_char == '-'
            || namespace_char.is_ascii_lowercase()
            || namespace_char.is_ascii_digit()
            || namespace_char == '.'
    }

    /// Returns whether a character may appear in a path.
    #[must_use]
    pub fn valid_path_char(path_char: char) -> bool {
        Self::valid_namespace_char(path_char) || path_char == '/'
    }

    /// Returns whether the namespace is non-empty and only uses allowed characters.
    #[must_use]
    pub fn validate_namespace(namespace: &str) -> bool {
        !namespace.is_empty() && namespace.chars().all(Self::valid_namespace_char)
    }

    /// Returns whether the path is non-empty and only uses allowed characters.
    #[must_use]
    pub fn validate_path(path: &str) -> bool {
        !path.is_empty() && path.chars().all(Self::valid_path_char)
    }

    fn textual_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.namespace
            .bytes()
            .chain(iter::once(b':'))
            .chain(self.path.bytes())
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.textual_bytes().cmp(other.textual_bytes())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = match s.split_once(':') {
            Some((_, path)) if path.contains(':') => {
                return Err(IdentifierError::Malformed(s.to_string()));
            }
            Some((namespace, path)) => (namespace, path),
            None => (Self::VANILLA_NAMESPACE, s),
        };

        if !Self::validate_namespace(namespace) {
            return Err(IdentifierError::Namespace(namespace.to_string()));
        }
        if !Self::validate_path(path) {
            return Err(IdentifierError::Path(path.to_string()));
        }

        Ok(Identifier {
            namespace: Cow::Owned(namespace.to_string()),
            path: Cow::Owned(path.to_string()),
        })
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}
