//! Port implementations for [`MemoryStore`].

use async_trait::async_trait;

use crate::domain::ports::{
    InvestmentPersistenceError, InvestmentRepository, ListingPersistenceError, ListingRepository,
    OtpPersistenceError, OtpRepository, TeamInvitePersistenceError, TeamInviteRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Investment, InvestmentFilter, Listing, ListingId, OtpRecord, RaisedTotalAdjustment,
    TeamInvite, User, UserId,
};

use super::memory_store::{MemoryStore, Table};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.write(&[Table::Users], |tables| {
            if tables.users.values().any(|existing| existing.email() == user.email()) {
                return Err(UserPersistenceError::duplicate(user.email().to_string()));
            }
            tables.users.insert(*user.id(), user.clone());
            Ok(())
        })
        .map_err(UserPersistenceError::query)?
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.write(&[Table::Users], |tables| match tables.users.get_mut(user.id()) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query(format!(
                "user {} does not exist",
                user.id()
            ))),
        })
        .map_err(UserPersistenceError::query)?
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.read(|tables| tables.users.get(id).cloned())
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        self.read(|tables| {
            tables
                .users
                .values()
                .find(|user| user.email() == email)
                .cloned()
        })
        .map_err(UserPersistenceError::query)
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn upsert(&self, listing: &Listing) -> Result<(), ListingPersistenceError> {
        self.write(&[Table::Listings], |tables| {
            tables
                .listings
                .insert(listing.id().clone(), listing.clone());
        })
        .map_err(ListingPersistenceError::query)
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingPersistenceError> {
        self.read(|tables| tables.listings.get(id).cloned())
            .map_err(ListingPersistenceError::query)
    }

    async fn list(&self) -> Result<Vec<Listing>, ListingPersistenceError> {
        self.read(|tables| tables.listings.values().cloned().collect())
            .map_err(ListingPersistenceError::query)
    }

    async fn delete_cascading(&self, id: &ListingId) -> Result<bool, ListingPersistenceError> {
        let touched = [
            Table::Listings,
            Table::Investments,
            Table::TeamInvites,
            Table::Adjustments,
        ];
        self.write(&touched, |tables| {
            if tables.listings.remove(id).is_none() {
                return false;
            }
            tables
                .investments
                .retain(|investment| investment.listing_id != *id);
            tables.team_invites.retain(|invite| invite.listing_id != *id);
            tables
                .adjustments
                .retain(|adjustment| adjustment.listing_id != *id);
            true
        })
        .map_err(ListingPersistenceError::query)
    }

    async fn record_adjustment(
        &self,
        adjustment: &RaisedTotalAdjustment,
    ) -> Result<(), ListingPersistenceError> {
        self.write(&[Table::Adjustments], |tables| {
            tables.adjustments.push(adjustment.clone());
        })
        .map_err(ListingPersistenceError::query)
    }

    async fn adjustments(
        &self,
        id: &ListingId,
    ) -> Result<Vec<RaisedTotalAdjustment>, ListingPersistenceError> {
        self.read(|tables| {
            tables
                .adjustments
                .iter()
                .filter(|adjustment| adjustment.listing_id == *id)
                .cloned()
                .collect()
        })
        .map_err(ListingPersistenceError::query)
    }
}

#[async_trait]
impl InvestmentRepository for MemoryStore {
    async fn append(&self, investment: &Investment) -> Result<(), InvestmentPersistenceError> {
        self.write(&[Table::Investments], |tables| {
            tables.investments.push(investment.clone());
        })
        .map_err(InvestmentPersistenceError::query)
    }

    async fn list(
        &self,
        filter: &InvestmentFilter,
    ) -> Result<Vec<Investment>, InvestmentPersistenceError> {
        self.read(|tables| {
            tables
                .investments
                .iter()
                .filter(|investment| filter.matches(investment))
                .cloned()
                .collect()
        })
        .map_err(InvestmentPersistenceError::query)
    }
}

fn same_pair(invite: &TeamInvite, listing_id: &ListingId, email: &Email) -> bool {
    invite.listing_id == *listing_id && invite.email == *email
}

#[async_trait]
impl TeamInviteRepository for MemoryStore {
    async fn insert(&self, invite: &TeamInvite) -> Result<(), TeamInvitePersistenceError> {
        self.write(&[Table::TeamInvites], |tables| {
            if tables
                .team_invites
                .iter()
                .any(|existing| same_pair(existing, &invite.listing_id, &invite.email))
            {
                return Err(TeamInvitePersistenceError::duplicate(
                    invite.listing_id.to_string(),
                    invite.email.to_string(),
                ));
            }
            tables.team_invites.push(invite.clone());
            Ok(())
        })
        .map_err(TeamInvitePersistenceError::query)?
    }

    async fn update(&self, invite: &TeamInvite) -> Result<(), TeamInvitePersistenceError> {
        self.write(&[Table::TeamInvites], |tables| {
            match tables
                .team_invites
                .iter_mut()
                .find(|existing| same_pair(existing, &invite.listing_id, &invite.email))
            {
                Some(slot) => {
                    *slot = invite.clone();
                    Ok(())
                }
                None => Err(TeamInvitePersistenceError::query(format!(
                    "no invite for {} on {}",
                    invite.email, invite.listing_id
                ))),
            }
        })
        .map_err(TeamInvitePersistenceError::query)?
    }

    async fn find(
        &self,
        listing_id: &ListingId,
        email: &Email,
    ) -> Result<Option<TeamInvite>, TeamInvitePersistenceError> {
        self.read(|tables| {
            tables
                .team_invites
                .iter()
                .find(|invite| same_pair(invite, listing_id, email))
                .cloned()
        })
        .map_err(TeamInvitePersistenceError::query)
    }

    async fn remove(
        &self,
        listing_id: &ListingId,
        email: &Email,
    ) -> Result<bool, TeamInvitePersistenceError> {
        self.write(&[Table::TeamInvites], |tables| {
            let before = tables.team_invites.len();
            tables
                .team_invites
                .retain(|invite| !same_pair(invite, listing_id, email));
            tables.team_invites.len() != before
        })
        .map_err(TeamInvitePersistenceError::query)
    }

    async fn list(
        &self,
        listing_id: &ListingId,
    ) -> Result<Vec<TeamInvite>, TeamInvitePersistenceError> {
        self.read(|tables| {
            tables
                .team_invites
                .iter()
                .filter(|invite| invite.listing_id == *listing_id)
                .cloned()
                .collect()
        })
        .map_err(TeamInvitePersistenceError::query)
    }
}

#[async_trait]
impl OtpRepository for MemoryStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), OtpPersistenceError> {
        self.write(&[Table::PendingOtps], |tables| {
            tables
                .pending_otps
                .insert(record.email.clone(), record.clone());
        })
        .map_err(OtpPersistenceError::query)
    }

    async fn find(&self, email: &Email) -> Result<Option<OtpRecord>, OtpPersistenceError> {
        self.read(|tables| tables.pending_otps.get(email).cloned())
            .map_err(OtpPersistenceError::query)
    }

    async fn delete(&self, email: &Email) -> Result<(), OtpPersistenceError> {
        self.write(&[Table::PendingOtps], |tables| {
            tables.pending_otps.remove(email);
        })
        .map_err(OtpPersistenceError::query)
    }
}
