//! Credential contexts
//!
//! Every catalog call runs under one of two identities: the requester's
//! own account (after they logged in) or the shared application account.
//! The context only decides which account is charged; it never changes
//! the shape of the returned data.

use super::ids::RequesterId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A completed login of a requester with the catalog service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    pub requester: RequesterId,
    pub access_token: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("requester", &self.requester)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Identity a provider call executes under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialContext {
    /// Shared application credentials, no per-user state
    Shared,
    /// The requester's own login
    Requester(Login),
}

impl CredentialContext {
    pub fn is_requester(&self) -> bool {
        matches!(self, Self::Requester(_))
    }

    pub fn login(&self) -> Option<&Login> {
        match self {
            Self::Shared => None,
            Self::Requester(login) => Some(login),
        }
    }
}
