//! Typed identifiers and the identifier validator.
//!
//! Every id a client can put in a path goes through [`parse_id`] before any
//! lookup, so a malformed token is reported as [`AppError::InvalidIdentifier`]
//! rather than as a missing row.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of the canonical hyphenated form (8-4-4-4-12 hex digits)
const CANONICAL_LEN: usize = 36;

/// Returns true only for the canonical hyphenated UUID form used as row key.
///
/// Braced, URN and simple (unhyphenated) spellings are rejected so that one
/// resource has exactly one accepted spelling.
pub fn is_valid_id(input: &str) -> bool {
    input.len() == CANONICAL_LEN && Uuid::try_parse(input).is_ok()
}

/// Parse a client-supplied identifier, naming the field on failure.
pub fn parse_id(input: &str, field: &'static str) -> Result<Uuid> {
    if !is_valid_id(input) {
        return Err(AppError::InvalidIdentifier {
            field,
            value: input.to_string(),
        });
    }
    Uuid::try_parse(input).map_err(|_| AppError::InvalidIdentifier {
        field,
        value: input.to_string(),
    })
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(input: &str) -> Result<Self> {
                parse_id(input, $field).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_id!(
    /// Identifier of a Post aggregate
    PostId,
    "post_id"
);
typed_id!(
    /// Identifier of a comment inside a Post
    CommentId,
    "comment_id"
);
typed_id!(
    /// Identifier of a reply inside a comment
    ReplyId,
    "reply_id"
);
typed_id!(
    /// Identifier of a user (the principal, or an author)
    UserId,
    "user_id"
);
