//! Content-addressed identifiers.
//!
//! An identifier is the tail of the blake3 digest of its input, uppercased:
//! 26 characters from the Crockford base-32 alphabet. The same input always
//! yields the same identifier. Collisions are not detected.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier length in characters.
pub const UID_LEN: usize = 26;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("malformed identifier `{value}` derived from `{input}`")]
    Malformed { input: String, value: String },

    #[error("`{0}` is not a valid identifier")]
    Invalid(String),
}

/// Stable 26-character identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Derive the identifier of `input`.
    pub fn derive(input: &str) -> Result<Self, IdentifierError> {
        let digest = hex::encode(blake3::hash(input.as_bytes()).as_bytes());
        let value = digest[digest.len() - UID_LEN..].to_ascii_uppercase();
        if !is_valid(&value) {
            return Err(IdentifierError::Malformed {
                input: input.to_string(),
                value,
            });
        }
        Ok(Self(value))
    }

    /// Accept an existing identifier, e.g. from a lookup request.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let upper = value.to_ascii_uppercase();
        if is_valid(&upper) {
            Ok(Self(upper))
        } else {
            Err(IdentifierError::Invalid(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(value: &str) -> bool {
    value.len() == UID_LEN && value.bytes().all(|b| CROCKFORD.contains(&b))
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Uid {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_derive_is_stable() {
        let a = Uid::derive("guide/setup.md").unwrap();
        let b = Uid::derive("guide/setup.md").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Uid::derive("intro.md").unwrap());
    }

    #[test]
    fn test_length_and_alphabet() {
        for input in ["", "pages", "intro.mdx", "日本語/ページ.md"] {
            let uid = Uid::derive(input).unwrap();
            assert_eq!(uid.as_str().len(), UID_LEN);
            assert!(uid.as_str().bytes().all(|b| CROCKFORD.contains(&b)));
        }
    }

    #[test]
    fn test_no_collisions_over_realistic_names() {
        let dirs = ["", "guide/", "docs/en/", "blog/2024/", "reference/api/"];
        let mut seen = FxHashSet::default();
        let mut count = 0;
        for dir in dirs {
            for i in 0..2000 {
                for ext in ["md", "mdx"] {
                    let file = format!("{dir}{i:04}-post-number-{i}.{ext}");
                    assert!(seen.insert(Uid::derive(&file).unwrap()), "collision at {file}");
                    count += 1;
                }
            }
        }
        assert_eq!(seen.len(), count);
    }

    #[test]
    fn test_parse_roundtrip() {
        let uid = Uid::derive("intro.md").unwrap();
        assert_eq!(Uid::parse(uid.as_str()).unwrap(), uid);
        assert_eq!(Uid::parse(&uid.as_str().to_ascii_lowercase()).unwrap(), uid);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Uid::parse("short").is_err());
        // `U` is not in the Crockford alphabet
        assert!(Uid::parse("UUUUUUUUUUUUUUUUUUUUUUUUUU").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let uid = Uid::derive("intro.md").unwrap();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, format!("\"{uid}\""));
        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }
}
