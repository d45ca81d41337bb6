//! Demo accounts and listings for development environments.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ListingRepository, PasswordHasher, UserRepository};
use crate::domain::{
    Email, Error, Listing, ListingDraft, ListingId, User, UserDraft, UserId, UserName, UserRole,
};

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: UserRole,
}

const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        name: "Platform Admin",
        email: "admin@stake.com",
        password: "admin123",
        role: UserRole::Admin,
    },
    DemoAccount {
        name: "Demo Investor",
        email: "investor@stake.com",
        password: "investor123",
        role: UserRole::Investor,
    },
];

struct DemoListing {
    id: &'static str,
    title: &'static str,
    city: &'static str,
    category: &'static str,
    status: &'static str,
    min_investment: i64,
    roi: f64,
    target_amount: i64,
    total_raised: i64,
    duration_months: i64,
}

const DEMO_LISTINGS: [DemoListing; 3] = [
    DemoListing {
        id: "colombo-sky-1",
        title: "Colombo Sky Residences",
        city: "Colombo",
        category: "Residential",
        status: "Active",
        min_investment: 500_000,
        roi: 12.0,
        target_amount: 50_000_000,
        total_raised: 25_000_000,
        duration_months: 24,
    },
    DemoListing {
        id: "galle-heritage-1",
        title: "Galle Fort Heritage Villas",
        city: "Galle",
        category: "Hospitality",
        status: "Active",
        min_investment: 750_000,
        roi: 15.0,
        target_amount: 75_000_000,
        total_raised: 45_000_000,
        duration_months: 36,
    },
    DemoListing {
        id: "kandy-hills-1",
        title: "Kandy Hills Retreat",
        city: "Kandy",
        category: "Hospitality",
        status: "Funding",
        min_investment: 600_000,
        roi: 11.0,
        target_amount: 60_000_000,
        total_raised: 30_000_000,
        duration_months: 30,
    },
];

impl DemoListing {
    fn draft(&self) -> ListingDraft {
        ListingDraft {
            id: Some(self.id.to_owned()),
            title: self.title.to_owned(),
            city: self.city.to_owned(),
            category: self.category.to_owned(),
            status: self.status.to_owned(),
            image: String::new(),
            min_investment: self.min_investment,
            roi: self.roi,
            target_amount: self.target_amount,
            total_raised: Some(self.total_raised),
            duration_months: self.duration_months,
        }
    }
}

/// What a seeding run inserted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub users: usize,
    pub listings: usize,
}

/// Inserts demo data into an empty store.
pub struct DemoSeeder {
    users: Arc<dyn UserRepository>,
    listings: Arc<dyn ListingRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl DemoSeeder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        listings: Arc<dyn ListingRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            listings,
            hasher,
            clock,
        }
    }

    /// Add missing demo accounts, and the demo listings when no listing
    /// exists yet. Safe to run on every start.
    pub async fn seed(&self) -> Result<SeedOutcome, Error> {
        let mut outcome = SeedOutcome::default();
        let now = self.clock.utc();

        for account in &DEMO_ACCOUNTS {
            let email = Email::new(account.email).map_err(|err| Error::internal(err.to_string()))?;
            if self.users.find_by_email(&email).await?.is_some() {
                continue;
            }
            let user = User::new(UserDraft {
                id: UserId::random(),
                email,
                password_hash: self.hasher.hash(account.password).await?,
                name: UserName::new(account.name).map_err(|err| Error::internal(err.to_string()))?,
                role: account.role,
                is_verified: true,
                created_at: now,
            });
            self.users.insert(&user).await?;
            outcome.users += 1;
        }

        if self.listings.list().await?.is_empty() {
            for demo in &DEMO_LISTINGS {
                let id = ListingId::new(demo.id).map_err(|err| Error::internal(err.to_string()))?;
                let listing = Listing::create(id, &demo.draft(), now)
                    .map_err(|err| Error::internal(err.to_string()))?;
                self.listings.upsert(&listing).await?;
                outcome.listings += 1;
            }
        }

        info!(users = outcome.users, listings = outcome.listings, "demo data seeded");
        Ok(outcome)
    }
}
