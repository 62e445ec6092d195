use super::{check_team_delete, check_team_write, lock, ScheduleStore, TeamStore};
use crate::models::{Assignment, ServiceError, Team, User};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store, used by tests and throwaway deployments.
#[derive(Default)]
pub struct MemoryStore {
    teams: Mutex<HashMap<String, Team>>,
    users: Mutex<HashMap<String, User>>,
    assignments: Mutex<Vec<Assignment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Snapshot of every stored team
    pub fn teams(&self) -> Result<Vec<Team>, ServiceError> {
        Ok(lock(&self.teams)?.values().cloned().collect())
    }
}

impl TeamStore for MemoryStore {
    fn find_team_by_id(&self, team_id: &str) -> Result<Option<Team>, ServiceError> {
        Ok(lock(&self.teams)?.get(team_id).cloned())
    }

    fn find_team_by_member(&self, user_id: &str) -> Result<Option<Team>, ServiceError> {
        Ok(lock(&self.teams)?
            .values()
            .find(|team| team.has_member(user_id))
            .cloned())
    }

    fn find_team_by_join_code(&self, join_code: &str) -> Result<Option<Team>, ServiceError> {
        Ok(lock(&self.teams)?
            .values()
            .find(|team| team.join_code == join_code)
            .cloned())
    }

    fn save_team(&self, team: &Team) -> Result<Team, ServiceError> {
        let mut teams = lock(&self.teams)?;
        check_team_write(team, teams.get(&team.id), teams.values())?;

        let saved = Team {
            revision: team.revision + 1,
            ..team.clone()
        };
        teams.insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    fn delete_team(&self, team: &Team) -> Result<bool, ServiceError> {
        let mut teams = lock(&self.teams)?;
        if !check_team_delete(team, teams.get(&team.id))? {
            return Ok(false);
        }
        teams.remove(&team.id);
        Ok(true)
    }

    fn find_user(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        Ok(lock(&self.users)?.get(user_id).cloned())
    }

    fn save_user(&self, user: &User) -> Result<(), ServiceError> {
        lock(&self.users)?.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

impl ScheduleStore for MemoryStore {
    fn load_assignments(&self) -> Result<Vec<Assignment>, ServiceError> {
        Ok(lock(&self.assignments)?.clone())
    }

    fn replace_assignments(&self, assignments: &[Assignment]) -> Result<(), ServiceError> {
        *lock(&self.assignments)? = assignments.to_vec();
        Ok(())
    }
}
