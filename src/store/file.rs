// hackops-service/src/store/file.rs
use super::{check_team_delete, check_team_write, lock, ScheduleStore, TeamStore};
use crate::models::{Assignment, ServiceError, Team, User};
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

lazy_static! {
    // Ids become file names, so no separators and no leading dot
    static ref FILE_ID: Regex = Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_.@-]*$").unwrap();
}

fn file_name(id: &str) -> Result<String, ServiceError> {
    if FILE_ID.is_match(id) {
        Ok(format!("{}.json", id))
    } else {
        warn!("⛔ Refusing unsafe record id: {:?}", id);
        Err(ServiceError::ValidationError(format!("Invalid id '{}'", id)))
    }
}

/// JSON-file store: one file per team and per user, plus `schedule.json`.
pub struct FileStore {
    root: PathBuf,
    // Serialises read-check-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("teams"))?;
        fs::create_dir_all(root.join("users"))?;
        info!("📂 File store opened at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn team_path(&self, team_id: &str) -> Result<PathBuf, ServiceError> {
        Ok(self.root.join("teams").join(file_name(team_id)?))
    }

    fn user_path(&self, user_id: &str) -> Result<PathBuf, ServiceError> {
        Ok(self.root.join("users").join(file_name(user_id)?))
    }

    fn schedule_path(&self) -> PathBuf {
        self.root.join("schedule.json")
    }

    fn all_teams(&self) -> Result<Vec<Team>, ServiceError> {
        let mut teams = Vec::new();
        let dir = fs::read_dir(self.root.join("teams")).map_err(|e| {
            error!("Failed to read teams directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        for entry in dir {
            let entry = entry.map_err(|e| {
                error!("Failed to read directory entry: {:?}", e);
                ServiceError::InternalServerError
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                // An unreadable team file fails the whole scan
                if let Some(team) = read_json::<Team>(&path)? {
                    teams.push(team);
                }
            }
        }

        Ok(teams)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ServiceError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read {}: {:?}", path.display(), e);
        ServiceError::InternalServerError
    })?;
    let value = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse {}: {:?}", path.display(), e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(value))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ServiceError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        error!("Failed to serialize {}: {:?}", path.display(), e);
        ServiceError::InternalServerError
    })?;

    // Readers see either the old record or the new one
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temp file in {}: {:?}", dir.display(), e);
        ServiceError::InternalServerError
    })?;
    file.write_all(json.as_bytes()).map_err(|e| {
        error!("Failed to write {}: {:?}", path.display(), e);
        ServiceError::InternalServerError
    })?;
    file.persist(path).map_err(|e| {
        error!("Failed to persist {}: {:?}", path.display(), e.error);
        ServiceError::InternalServerError
    })?;

    Ok(())
}

impl TeamStore for FileStore {
    fn find_team_by_id(&self, team_id: &str) -> Result<Option<Team>, ServiceError> {
        read_json(&self.team_path(team_id)?)
    }

    fn find_team_by_member(&self, user_id: &str) -> Result<Option<Team>, ServiceError> {
        Ok(self
            .all_teams()?
            .into_iter()
            .find(|team| team.has_member(user_id)))
    }

    fn find_team_by_join_code(&self, join_code: &str) -> Result<Option<Team>, ServiceError> {
        Ok(self
            .all_teams()?
            .into_iter()
            .find(|team| team.join_code == join_code))
    }

    fn save_team(&self, team: &Team) -> Result<Team, ServiceError> {
        let _guard = lock(&self.write_lock)?;
        let teams = self.all_teams()?;
        let existing = teams.iter().find(|t| t.id == team.id);
        check_team_write(team, existing, &teams)?;

        let saved = Team {
            revision: team.revision + 1,
            ..team.clone()
        };
        write_json(&self.team_path(&saved.id)?, &saved)?;
        Ok(saved)
    }

    fn delete_team(&self, team: &Team) -> Result<bool, ServiceError> {
        let _guard = lock(&self.write_lock)?;
        let path = self.team_path(&team.id)?;
        let existing = read_json::<Team>(&path)?;
        if !check_team_delete(team, existing.as_ref())? {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete team file: {:?}", e);
            ServiceError::InternalServerError
        })?;
        Ok(true)
    }

    fn find_user(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        read_json(&self.user_path(user_id)?)
    }

    fn save_user(&self, user: &User) -> Result<(), ServiceError> {
        write_json(&self.user_path(&user.id)?, user)
    }
}

impl ScheduleStore for FileStore {
    fn load_assignments(&self) -> Result<Vec<Assignment>, ServiceError> {
        Ok(read_json(&self.schedule_path())?.unwrap_or_default())
    }

    fn replace_assignments(&self, assignments: &[Assignment]) -> Result<(), ServiceError> {
        let _guard = lock(&self.write_lock)?;
        write_json(&self.schedule_path(), assignments)
    }
}
