//! Per-listing co-investor invitations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::ListingId;
use super::user::Email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteId(Uuid);

impl InviteId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InviteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Invite lifecycle. `Pending` only ever moves to `Accepted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InviteStatus {
    Pending,
    Accepted,
}

impl InviteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitation of `email` to collaborate on `listing_id`.
///
/// ## Invariants
/// - At most one invite exists per `(listing_id, email)` pair; the
///   repository enforces this on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInvite {
    pub id: InviteId,
    pub listing_id: ListingId,
    pub email: Email,
    pub status: InviteStatus,
    pub date: DateTime<Utc>,
}

impl TeamInvite {
    /// Create a pending invite.
    pub fn pending(listing_id: ListingId, email: Email, date: DateTime<Utc>) -> Self {
        Self {
            id: InviteId::random(),
            listing_id,
            email,
            status: InviteStatus::Pending,
            date,
        }
    }

    /// Move the invite to `Accepted`. Accepting twice is a no-op.
    pub fn accept(&mut self) {
        self.status = InviteStatus::Accepted;
    }
}
