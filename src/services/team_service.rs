// hackops-service/src/services/team_service.rs
//! Team lifecycle: create, join, update and leave.
//!
//! Every operation reads the caller's current team, builds the next version of
//! the record and hands it to `TeamStore::save_team`. A user is on at most one
//! team, and a team whose last member leaves is deleted rather than saved.

use crate::models::{
    Identity, LeaveOutcome, ServiceError, Team, TeamCommand, TeamOutcome, TeamProfile, TeamUpdate,
    User,
};
use crate::store::TeamStore;
use crate::utils::join_code;
use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

/// How many fresh join codes creation tries before giving up.
pub const JOIN_CODE_ATTEMPTS: usize = 5;

// User records are created on first sight and never modified afterwards
pub fn ensure_user<S: TeamStore + ?Sized>(
    store: &S,
    identity: &Identity,
) -> Result<User, ServiceError> {
    if let Some(user) = store.find_user(&identity.user_id)? {
        return Ok(user);
    }

    let user = User {
        id: identity.user_id.clone(),
        name: identity.name.clone(),
        created_at: Utc::now(),
    };
    store.save_user(&user)?;
    info!("👤 Registered user: {}", user.id);
    Ok(user)
}

pub fn get_my_team<S: TeamStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Option<TeamProfile>, ServiceError> {
    match store.find_team_by_member(user_id)? {
        Some(team) => {
            let members = store.find_users(&team.members)?;
            Ok(Some(TeamProfile::new(team, members)))
        }
        None => Ok(None),
    }
}

pub fn create_team<S: TeamStore + ?Sized>(
    store: &S,
    user_id: &str,
    name: &str,
    devpost: Option<String>,
) -> Result<Team, ServiceError> {
    if store.find_team_by_member(user_id)?.is_some() {
        return Err(ServiceError::AlreadyOnTeam);
    }

    let code = fresh_join_code(store)?;
    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        devpost,
        join_code: code,
        members: vec![user_id.to_string()],
        revision: 0,
        created_at: Utc::now(),
    };

    let saved = store.save_team(&team)?;
    info!("✅ Team created: {} ({}) by user: {}", saved.name, saved.id, user_id);
    Ok(saved)
}

fn fresh_join_code<S: TeamStore + ?Sized>(store: &S) -> Result<String, ServiceError> {
    for _ in 0..JOIN_CODE_ATTEMPTS {
        let code = join_code::generate_join_code();
        if store.find_team_by_join_code(&code)?.is_none() {
            return Ok(code);
        }
        warn!("🔁 Join code collision on {}, retrying", code);
    }

    Err(ServiceError::Conflict(
        "Could not allocate a unique join code".to_string(),
    ))
}

pub fn join_team<S: TeamStore + ?Sized>(
    store: &S,
    user_id: &str,
    code: &str,
) -> Result<Team, ServiceError> {
    if !join_code::is_well_formed(code) {
        return Err(ServiceError::TeamNotFound);
    }
    let team = store
        .find_team_by_join_code(code)?
        .ok_or(ServiceError::TeamNotFound)?;
    if store.find_team_by_member(user_id)?.is_some() {
        return Err(ServiceError::AlreadyOnTeam);
    }

    let mut members = team.members.clone();
    members.push(user_id.to_string());
    let saved = store.save_team(&Team { members, ..team })?;

    info!("👥 User: {} joined team: {}", user_id, saved.id);
    Ok(saved)
}

pub fn update_team<S: TeamStore + ?Sized>(
    store: &S,
    user_id: &str,
    update: TeamUpdate,
) -> Result<Team, ServiceError> {
    let team = store
        .find_team_by_member(user_id)?
        .ok_or(ServiceError::TeamNotFound)?;

    let next = Team {
        name: update.team_name.unwrap_or_else(|| team.name.clone()),
        devpost: update.devpost.or_else(|| team.devpost.clone()),
        ..team
    };
    let saved = store.save_team(&next)?;

    info!("📝 Team updated: {}", saved.id);
    Ok(saved)
}

pub fn leave_team<S: TeamStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<LeaveOutcome, ServiceError> {
    let team = store
        .find_team_by_member(user_id)?
        .ok_or(ServiceError::TeamNotFound)?;

    let members: Vec<String> = team
        .members
        .iter()
        .filter(|member| member.as_str() != user_id)
        .cloned()
        .collect();

    if members.is_empty() {
        // Fails with a conflict if someone joined after we read the team
        if !store.delete_team(&team)? {
            warn!("Team {} was already gone when its last member left", team.id);
        }
        info!("🗑️ Team {} deleted after its last member left", team.id);
        return Ok(LeaveOutcome::Deleted {
            team_name: team.name,
        });
    }

    let saved = store.save_team(&Team { members, ..team })?;
    info!("👋 User: {} left team: {}", user_id, saved.id);
    Ok(LeaveOutcome::Updated(saved))
}

/// Run a validated command on behalf of `identity`.
pub fn execute<S: TeamStore + ?Sized>(
    store: &S,
    identity: &Identity,
    command: TeamCommand,
) -> Result<TeamOutcome, ServiceError> {
    let user_id = identity.user_id.as_str();
    match command {
        TeamCommand::Create { team_name, devpost } => {
            create_team(store, user_id, &team_name, devpost).map(TeamOutcome::Created)
        }
        TeamCommand::Join { join_code } => {
            join_team(store, user_id, &join_code).map(TeamOutcome::Joined)
        }
        TeamCommand::Update(update) => {
            update_team(store, user_id, update).map(TeamOutcome::Updated)
        }
        TeamCommand::Leave => Ok(match leave_team(store, user_id)? {
            LeaveOutcome::Updated(team) => TeamOutcome::Updated(team),
            LeaveOutcome::Deleted { team_name } => TeamOutcome::Deleted { team_name },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    type Hook = Box<dyn FnOnce(&MemoryStore) + Send>;

    // Lets another request's write land between our read and our write
    #[derive(Default)]
    struct InterleavedStore {
        inner: MemoryStore,
        before_write: Mutex<Option<Hook>>,
    }

    impl InterleavedStore {
        fn before_next_write(&self, hook: impl FnOnce(&MemoryStore) + Send + 'static) {
            *self.before_write.lock().unwrap() = Some(Box::new(hook));
        }

        fn interleave(&self) {
            let hook = self.before_write.lock().unwrap().take();
            if let Some(hook) = hook {
                hook(&self.inner);
            }
        }
    }

    impl TeamStore for InterleavedStore {
        fn find_team_by_id(&self, team_id: &str) -> Result<Option<Team>, ServiceError> {
            self.inner.find_team_by_id(team_id)
        }

        fn find_team_by_member(&self, user_id: &str) -> Result<Option<Team>, ServiceError> {
            self.inner.find_team_by_member(user_id)
        }

        fn find_team_by_join_code(&self, join_code: &str) -> Result<Option<Team>, ServiceError> {
            self.inner.find_team_by_join_code(join_code)
        }

        fn save_team(&self, team: &Team) -> Result<Team, ServiceError> {
            self.interleave();
            self.inner.save_team(team)
        }

        fn delete_team(&self, team: &Team) -> Result<bool, ServiceError> {
            self.interleave();
            self.inner.delete_team(team)
        }

        fn find_user(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
            self.inner.find_user(user_id)
        }

        fn save_user(&self, user: &User) -> Result<(), ServiceError> {
            self.inner.save_user(user)
        }
    }

    fn hacker(id: &str) -> Identity {
        Identity {
            user_id: id.to_string(),
            name: format!("Hacker {}", id),
            role: Role::Hacker,
        }
    }

    // No user may hold more than one membership slot across all teams
    fn assert_single_membership(store: &MemoryStore, users: &[&str]) {
        let teams = store.teams().unwrap();
        for user in users {
            let slots: usize = teams
                .iter()
                .map(|t| t.members.iter().filter(|m| m.as_str() == *user).count())
                .sum();
            assert!(slots <= 1, "{} holds {} memberships", user, slots);
        }
    }

    #[test]
    fn create_then_get() {
        let store = MemoryStore::new();
        ensure_user(&store, &hacker("u1")).unwrap();
        let team = create_team(&store, "u1", "Crabs", None).unwrap();

        assert_eq!(team.members, vec!["u1".to_string()]);
        assert!(join_code::is_well_formed(&team.join_code));

        let profile = get_my_team(&store, "u1").unwrap().unwrap();
        assert_eq!(profile.id, team.id);
        assert_eq!(profile.members.len(), 1);
        assert_eq!(profile.members[0].name, "Hacker u1");
    }

    #[test]
    fn no_team_is_none_not_error() {
        let store = MemoryStore::new();
        assert_eq!(get_my_team(&store, "nobody").unwrap(), None);
    }

    #[test]
    fn second_create_is_already_on_team() {
        let store = MemoryStore::new();
        create_team(&store, "u1", "Crabs", None).unwrap();
        assert_eq!(
            create_team(&store, "u1", "Lobsters", None),
            Err(ServiceError::AlreadyOnTeam)
        );
        assert_eq!(store.teams().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_team_name_conflicts() {
        let store = MemoryStore::new();
        create_team(&store, "u1", "Crabs", None).unwrap();
        assert!(matches!(
            create_team(&store, "u2", "crabs", None),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn join_by_code() {
        let store = MemoryStore::new();
        let team = create_team(&store, "u1", "Crabs", None).unwrap();

        assert_eq!(
            join_team(&store, "u2", "zzzzzzz"),
            Err(ServiceError::TeamNotFound)
        );
        assert_eq!(
            join_team(&store, "u2", "not a code"),
            Err(ServiceError::TeamNotFound)
        );

        let joined = join_team(&store, "u2", &team.join_code).unwrap();
        assert_eq!(joined.members, vec!["u1".to_string(), "u2".to_string()]);
        assert_eq!(get_my_team(&store, "u2").unwrap().unwrap().id, team.id);
        assert_single_membership(&store, &["u1", "u2"]);
    }

    #[test]
    fn join_while_on_a_team_is_rejected() {
        let store = MemoryStore::new();
        let crabs = create_team(&store, "u1", "Crabs", None).unwrap();
        create_team(&store, "u2", "Lobsters", None).unwrap();

        assert_eq!(
            join_team(&store, "u2", &crabs.join_code),
            Err(ServiceError::AlreadyOnTeam)
        );
        assert_eq!(
            join_team(&store, "u1", &crabs.join_code),
            Err(ServiceError::AlreadyOnTeam)
        );
        assert_single_membership(&store, &["u1", "u2"]);
    }

    #[test]
    fn update_is_partial() {
        let store = MemoryStore::new();
        create_team(
            &store,
            "u1",
            "Crabs",
            Some("https://devpost.com/software/crabs".to_string()),
        )
        .unwrap();

        let renamed = update_team(
            &store,
            "u1",
            TeamUpdate {
                team_name: Some("Hermit Crabs".to_string()),
                devpost: None,
            },
        )
        .unwrap();
        assert_eq!(renamed.name, "Hermit Crabs");
        assert_eq!(
            renamed.devpost.as_deref(),
            Some("https://devpost.com/software/crabs")
        );

        assert_eq!(
            update_team(&store, "stranger", TeamUpdate::default()),
            Err(ServiceError::TeamNotFound)
        );
    }

    #[test]
    fn stale_write_is_a_conflict() {
        let store = MemoryStore::new();
        let team = create_team(&store, "u1", "Crabs", None).unwrap();
        join_team(&store, "u2", &team.join_code).unwrap();

        // `team` predates the join, so saving it would drop u2
        let stale = Team {
            name: "Overwrite".to_string(),
            ..team
        };
        assert!(matches!(
            store.save_team(&stale),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn last_member_leaving_deletes_team() {
        let store = MemoryStore::new();
        let team = create_team(&store, "u1", "Crabs", None).unwrap();
        join_team(&store, "u2", &team.join_code).unwrap();

        match leave_team(&store, "u2").unwrap() {
            LeaveOutcome::Updated(t) => assert_eq!(t.members, vec!["u1".to_string()]),
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(
            leave_team(&store, "u1").unwrap(),
            LeaveOutcome::Deleted {
                team_name: "Crabs".to_string()
            }
        );

        assert_eq!(get_my_team(&store, "u1").unwrap(), None);
        assert_eq!(
            join_team(&store, "u3", &team.join_code),
            Err(ServiceError::TeamNotFound)
        );
        assert_eq!(leave_team(&store, "u1"), Err(ServiceError::TeamNotFound));
        assert_eq!(store.teams().unwrap().len(), 0);
    }

    #[test]
    fn execute_dispatches_commands() {
        let store = MemoryStore::new();
        let ada = hacker("u1");

        let created = execute(
            &store,
            &ada,
            TeamCommand::Create {
                team_name: "Crabs".to_string(),
                devpost: None,
            },
        )
        .unwrap();
        let code = match created {
            TeamOutcome::Created(team) => team.join_code,
            other => panic!("expected created, got {:?}", other),
        };

        let joined = execute(&store, &hacker("u2"), TeamCommand::Join { join_code: code });
        assert!(matches!(joined, Ok(TeamOutcome::Joined(_))));

        execute(&store, &hacker("u2"), TeamCommand::Leave).unwrap();
        assert_eq!(
            execute(&store, &ada, TeamCommand::Leave).unwrap(),
            TeamOutcome::Deleted {
                team_name: "Crabs".to_string()
            }
        );
    }

    #[test]
    fn leave_racing_a_join_keeps_the_joiner() {
        let store = InterleavedStore::default();
        let team = create_team(&store.inner, "u1", "Crabs", None).unwrap();
        let code = team.join_code.clone();
        store.before_next_write(move |inner| {
            join_team(inner, "u2", &code).unwrap();
        });

        // u1 read a one-member team, but u2 joined before the delete landed
        assert!(matches!(
            leave_team(&store, "u1"),
            Err(ServiceError::Conflict(_))
        ));
        assert_eq!(get_my_team(&store.inner, "u2").unwrap().unwrap().id, team.id);

        // Retrying from fresh state is an ordinary leave
        match leave_team(&store, "u1").unwrap() {
            LeaveOutcome::Updated(t) => assert_eq!(t.members, vec!["u2".to_string()]),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn create_racing_a_join_keeps_one_membership() {
        let store = InterleavedStore::default();
        let lobsters = create_team(&store.inner, "u9", "Lobsters", None).unwrap();
        let code = lobsters.join_code.clone();
        store.before_next_write(move |inner| {
            join_team(inner, "u1", &code).unwrap();
        });

        assert_eq!(
            create_team(&store, "u1", "Crabs", None),
            Err(ServiceError::AlreadyOnTeam)
        );
        assert_eq!(store.inner.teams().unwrap().len(), 1);
        assert_eq!(get_my_team(&store.inner, "u1").unwrap().unwrap().id, lobsters.id);
        assert_single_membership(&store.inner, &["u1", "u9"]);
    }

    #[test]
    fn joins_racing_into_two_teams_keep_one_membership() {
        let store = InterleavedStore::default();
        let crabs = create_team(&store.inner, "u1", "Crabs", None).unwrap();
        let lobsters = create_team(&store.inner, "u2", "Lobsters", None).unwrap();
        let code = lobsters.join_code.clone();
        store.before_next_write(move |inner| {
            join_team(inner, "u3", &code).unwrap();
        });

        assert_eq!(
            join_team(&store, "u3", &crabs.join_code),
            Err(ServiceError::AlreadyOnTeam)
        );
        assert_eq!(get_my_team(&store.inner, "u3").unwrap().unwrap().id, lobsters.id);
        assert_single_membership(&store.inner, &["u1", "u2", "u3"]);
    }
}
