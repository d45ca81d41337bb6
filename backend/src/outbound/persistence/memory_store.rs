//! Process-local store backing every persistence port.
//!
//! Tables sit behind one `std::sync::RwLock`. Each port call takes the lock
//! once, so single-row operations and the listing cascade are atomic. The
//! lock is never held across an `.await`. Multi-call sequences such as an
//! investment commit are coordinated by the domain's per-listing locks.
//!
//! With a data directory, every mutation re-serializes each touched table
//! in full and rewrites its file, so an investment append costs time
//! proportional to the whole ledger. Encoding happens under the write lock.
//! File I/O happens after it is released, under a flush mutex taken before
//! the release so files land in mutation order. That I/O still blocks the
//! calling worker thread.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::domain::{
    Email, Investment, Listing, ListingId, OtpRecord, RaisedTotalAdjustment, TeamInvite, User,
    UserId,
};

use super::models::{
    AdjustmentRow, InvestmentRow, ListingRow, OtpRow, TeamInviteRow, UserRow,
};
use super::snapshot::{
    ADJUSTMENTS_FILE, EncodedTable, INVESTMENTS_FILE, LISTINGS_FILE, PENDING_OTPS_FILE,
    SnapshotDir, SnapshotError, TEAM_INVITES_FILE, USERS_FILE,
};

/// Table names, used to decide which snapshot files a mutation rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Table {
    Users,
    Listings,
    Investments,
    TeamInvites,
    PendingOtps,
    Adjustments,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<UserId, User>,
    pub listings: HashMap<ListingId, Listing>,
    pub investments: Vec<Investment>,
    pub team_invites: Vec<TeamInvite>,
    pub pending_otps: HashMap<Email, OtpRecord>,
    pub adjustments: Vec<RaisedTotalAdjustment>,
}

impl Tables {
    fn load(snapshots: &SnapshotDir) -> Result<Self, SnapshotError> {
        let users: Vec<User> = snapshots.load::<UserRow, _>(USERS_FILE)?;
        let listings: Vec<Listing> = snapshots.load::<ListingRow, _>(LISTINGS_FILE)?;
        let otps: Vec<OtpRecord> = snapshots.load::<OtpRow, _>(PENDING_OTPS_FILE)?;
        Ok(Self {
            users: users.into_iter().map(|user| (*user.id(), user)).collect(),
            listings: listings
                .into_iter()
                .map(|listing| (listing.id().clone(), listing))
                .collect(),
            investments: snapshots.load::<InvestmentRow, _>(INVESTMENTS_FILE)?,
            team_invites: snapshots.load::<TeamInviteRow, _>(TEAM_INVITES_FILE)?,
            pending_otps: otps
                .into_iter()
                .map(|record| (record.email.clone(), record))
                .collect(),
            adjustments: snapshots.load::<AdjustmentRow, _>(ADJUSTMENTS_FILE)?,
        })
    }

    fn encode(&self, snapshots: &SnapshotDir, table: Table) -> Result<EncodedTable, SnapshotError> {
        match table {
            Table::Users => {
                let mut users: Vec<&User> = self.users.values().collect();
                users.sort_by_key(|user| (user.created_at(), *user.id()));
                let rows: Vec<UserRow> = users.into_iter().map(UserRow::from).collect();
                snapshots.encode(USERS_FILE, &rows)
            }
            Table::Listings => {
                let mut listings: Vec<&Listing> = self.listings.values().collect();
                listings.sort_by(|a, b| a.id().cmp(b.id()));
                let rows: Vec<ListingRow> = listings.into_iter().map(ListingRow::from).collect();
                snapshots.encode(LISTINGS_FILE, &rows)
            }
            Table::Investments => {
                let rows: Vec<InvestmentRow> =
                    self.investments.iter().map(InvestmentRow::from).collect();
                snapshots.encode(INVESTMENTS_FILE, &rows)
            }
            Table::TeamInvites => {
                let rows: Vec<TeamInviteRow> =
                    self.team_invites.iter().map(TeamInviteRow::from).collect();
                snapshots.encode(TEAM_INVITES_FILE, &rows)
            }
            Table::PendingOtps => {
                let mut records: Vec<&OtpRecord> = self.pending_otps.values().collect();
                records.sort_by(|a, b| a.email.cmp(&b.email));
                let rows: Vec<OtpRow> = records.into_iter().map(OtpRow::from).collect();
                snapshots.encode(PENDING_OTPS_FILE, &rows)
            }
            Table::Adjustments => {
                let rows: Vec<AdjustmentRow> =
                    self.adjustments.iter().map(AdjustmentRow::from).collect();
                snapshots.encode(ADJUSTMENTS_FILE, &rows)
            }
        }
    }
}

/// In-process implementation of every persistence port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    snapshots: Option<SnapshotDir>,
    flush: Mutex<()>,
}

const POISONED: &str = "store lock poisoned";

impl MemoryStore {
    /// Create an empty store that never touches the filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load snapshots from `data_dir` (creating it when missing) and keep
    /// them current after every mutation.
    pub fn open(data_dir: &Path) -> Result<Self, SnapshotError> {
        let snapshots = SnapshotDir::open(data_dir)?;
        let tables = Tables::load(&snapshots)?;
        info!(
            data_dir = %data_dir.display(),
            users = tables.users.len(),
            listings = tables.listings.len(),
            investments = tables.investments.len(),
            "snapshot store opened"
        );
        Ok(Self {
            tables: RwLock::new(tables),
            snapshots: Some(snapshots),
            flush: Mutex::new(()),
        })
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, &'static str> {
        let guard: RwLockReadGuard<'_, Tables> = self.tables.read().map_err(|_| POISONED)?;
        Ok(f(&guard))
    }

    /// Mutate the tables and rewrite the snapshot files of `touched`.
    ///
    /// Snapshot failures are logged and do not fail the mutation; the
    /// in-memory state stays authoritative for the running process.
    pub(crate) fn write<T>(
        &self,
        touched: &[Table],
        f: impl FnOnce(&mut Tables) -> T,
    ) -> Result<T, &'static str> {
        let mut guard: RwLockWriteGuard<'_, Tables> = self.tables.write().map_err(|_| POISONED)?;
        let outcome = f(&mut guard);
        let Some(snapshots) = &self.snapshots else {
            return Ok(outcome);
        };
        let encoded: Vec<EncodedTable> = touched
            .iter()
            .filter_map(|table| match guard.encode(snapshots, *table) {
                Ok(encoded) => Some(encoded),
                Err(error) => {
                    warn!(table = ?table, error = %error, "snapshot encoding failed");
                    None
                }
            })
            .collect();
        let _flush = self
            .flush
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(guard);
        for table in &encoded {
            if let Err(error) = snapshots.write(table) {
                warn!(file = table.file, error = %error, "snapshot write failed");
            }
        }
        Ok(outcome)
    }
}
