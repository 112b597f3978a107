// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Kind of object a [`TokenId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Signature,
    Certificate,
    Revocation,
    Timestamp,
    SignedData,
}

impl TokenKind {
    /// Short prefix used in derived identifiers (e.g. `C-` for certificates).
    pub fn prefix(self) -> &'static str {
        match self {
            TokenKind::Signature => "S",
            TokenKind::Certificate => "C",
            TokenKind::Revocation => "R",
            TokenKind::Timestamp => "T",
            TokenKind::SignedData => "D",
        }
    }
}

/// Stable identifier of an object in the diagnostic snapshot.
///
/// Identifiers are opaque to the core. Producers of diagnostic data may pick any unique string,
/// or derive one from the encoded object via [`TokenId::derived`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Identifier derived from the encoded object bytes: `<prefix>-<SHA-256 hex>`.
    pub fn derived(kind: TokenKind, encoded: &[u8]) -> Self {
        let digest = token_digest(kind, encoded);
        Self(format!("{}-{}", kind.prefix(), hex::encode_upper(digest)))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

const TOKEN_ID_DOMAIN: &[u8] = b"AdES.Validation/TokenId";

/// SHA-256 over the domain, a zero separator, then each part prefixed with its big-endian length.
fn token_digest(kind: TokenKind, encoded: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(TOKEN_ID_DOMAIN);
    hasher.update([0u8]);
    for part in [kind.prefix().as_bytes(), encoded] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}
