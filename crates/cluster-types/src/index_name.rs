use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NameErrorReason;

const FILESYSTEM_FORBIDDEN: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ':'];

/// A validated index name.
///
/// Construction always goes through [`IndexName::parse`]; there is no public constructor that
/// skips validation, so a value of this type is a proof the name passed every check in §4.2.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexName(String);

impl IndexName {
    /// Runs the fixed-order checks from §4.2. Order matters: callers that inspect the
    /// returned reason rely on the first violated rule being reported, not an arbitrary one.
    pub fn parse(candidate: &str) -> Result<Self, NameErrorReason> {
        if candidate.chars().any(|c| c.is_whitespace()) {
            return Err(NameErrorReason::WhitespaceForbidden);
        }
        if candidate.contains(',') {
            return Err(NameErrorReason::CommaForbidden);
        }
        if candidate.contains('#') {
            return Err(NameErrorReason::HashForbidden);
        }
        if candidate.starts_with('_') {
            return Err(NameErrorReason::LeadingUnderscoreForbidden);
        }
        if candidate.to_lowercase() != candidate {
            return Err(NameErrorReason::MustBeLowercase);
        }
        if candidate.chars().any(|c| FILESYSTEM_FORBIDDEN.contains(&c)) {
            return Err(NameErrorReason::IllegalFilesystemChar);
        }
        Ok(IndexName(candidate.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IndexName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for IndexName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
