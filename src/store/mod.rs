// hackops-service/src/store/mod.rs
//! Persistence boundary for teams, users and the judging schedule.
//!
//! Writes succeed only when the caller holds the latest revision: `save_team`
//! and `delete_team` compare `Team::revision` against the stored copy under the
//! store's lock and answer `ServiceError::Conflict` on a mismatch. `save_team`
//! also refuses a team whose members already sit on another team.

use crate::models::{Assignment, ServiceError, Team, User};
use log::{error, warn};
use std::sync::{Mutex, MutexGuard};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub trait TeamStore: Send + Sync {
    fn find_team_by_id(&self, team_id: &str) -> Result<Option<Team>, ServiceError>;
    fn find_team_by_member(&self, user_id: &str) -> Result<Option<Team>, ServiceError>;
    fn find_team_by_join_code(&self, join_code: &str) -> Result<Option<Team>, ServiceError>;
    /// Upsert; returns the stored record with its new revision.
    fn save_team(&self, team: &Team) -> Result<Team, ServiceError>;
    /// Deletes `team` if the stored copy is still at `team.revision`.
    /// Returns `false` when there was nothing to delete.
    fn delete_team(&self, team: &Team) -> Result<bool, ServiceError>;

    fn find_user(&self, user_id: &str) -> Result<Option<User>, ServiceError>;
    fn save_user(&self, user: &User) -> Result<(), ServiceError>;

    // Resolve member ids, skipping ids with no user record
    fn find_users(&self, user_ids: &[String]) -> Result<Vec<User>, ServiceError> {
        let mut users = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if let Some(user) = self.find_user(id)? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

pub trait ScheduleStore: Send + Sync {
    fn load_assignments(&self) -> Result<Vec<Assignment>, ServiceError>;
    fn replace_assignments(&self, assignments: &[Assignment]) -> Result<(), ServiceError>;
}

pub trait Store: TeamStore + ScheduleStore {}

impl<T: TeamStore + ScheduleStore> Store for T {}

fn check_revision(team: &Team, existing: Option<&Team>) -> Result<(), ServiceError> {
    let stored_revision = existing.map(|t| t.revision).unwrap_or(0);
    if stored_revision != team.revision {
        return Err(ServiceError::Conflict(format!(
            "Team {} was modified concurrently (revision {} != {})",
            team.id, team.revision, stored_revision
        )));
    }
    Ok(())
}

// Revision, uniqueness and membership checks shared by every store before a
// team write. `existing` is the stored copy of `team` (if any), `others` every
// stored team.
fn check_team_write<'a>(
    team: &Team,
    existing: Option<&Team>,
    others: impl IntoIterator<Item = &'a Team>,
) -> Result<(), ServiceError> {
    check_revision(team, existing)?;

    for other in others {
        if other.id == team.id {
            continue;
        }
        if other.join_code == team.join_code {
            return Err(ServiceError::Conflict(format!(
                "Join code {} is already in use",
                team.join_code
            )));
        }
        if other.name.to_lowercase() == team.name.to_lowercase() {
            return Err(ServiceError::Conflict(format!(
                "Team name '{}' is already taken",
                team.name
            )));
        }
        if let Some(member) = team.members.iter().find(|m| other.has_member(m)) {
            warn!(
                "⛔ User: {} is already on team {}, refusing write to {}",
                member, other.id, team.id
            );
            return Err(ServiceError::AlreadyOnTeam);
        }
    }

    Ok(())
}

// A delete must come from the latest revision, or a concurrent join is lost
fn check_team_delete(team: &Team, existing: Option<&Team>) -> Result<bool, ServiceError> {
    match existing {
        Some(stored) => check_revision(team, Some(stored)).map(|_| true),
        None => Ok(false),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
    mutex.lock().map_err(|e| {
        error!("❌ Store lock poisoned: {:?}", e);
        ServiceError::InternalServerError
    })
}
