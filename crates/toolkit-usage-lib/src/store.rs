use crate::data_structures::{UsageEvent, UserProfile};
use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable per-user state: an append-only JSON-lines usage log and a JSON
/// profile, both under `<dir>/users/`.
#[derive(Debug, Clone)]
pub struct UsageStore {
    dir: PathBuf,
}

impl UsageStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self, user_id: &str) -> Result<PathBuf> {
        Self::validate_user_id(user_id)?;
        Ok(self.users_dir().join(format!("{}.jsonl", user_id)))
    }

    pub fn profile_path(&self, user_id: &str) -> Result<PathBuf> {
        Self::validate_user_id(user_id)?;
        Ok(self.users_dir().join(format!("{}.json", user_id)))
    }

    pub fn load_events(&self, user_id: &str) -> Result<Vec<UsageEvent>> {
        let path = self.log_path(user_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut events = self.load_from_file(&path)?;
        events.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()));
        Ok(events)
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<UsageEvent>> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;

        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            match Self::parse_line(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(
                        path = %path.as_ref().display(),
                        line = line_num + 1,
                        error = %e,
                        "Skipping unreadable usage log line"
                    );
                }
            }
        }

        Ok(events)
    }

    pub fn append_event(&self, user_id: &str, event: &UsageEvent) -> Result<()> {
        let path = self.log_path(user_id)?;
        self.ensure_users_dir()?;

        let mut line = serde_json::to_string(event).context("Failed to encode usage event")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open usage log: {}", path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to usage log: {}", path.display()))?;

        debug!(user_id, tool_id = event.tool_id(), "Appended usage event");
        Ok(())
    }

    pub fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let path = self.profile_path(user_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        let profile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile: {}", path.display()))?;
        Ok(Some(profile))
    }

    pub fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let path = self.profile_path(user_id)?;
        self.ensure_users_dir()?;

        let content = serde_json::to_string_pretty(profile)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write profile: {}", path.display()))?;
        Ok(())
    }

    fn parse_line(line: &str) -> Result<UsageEvent> {
        let event: UsageEvent = serde_json::from_str(line).context("Failed to parse JSON")?;
        if event.tool_id().is_empty() {
            bail!("Missing tool_id");
        }
        Ok(event)
    }

    fn users_dir(&self) -> PathBuf {
        self.dir.join("users")
    }

    fn ensure_users_dir(&self) -> Result<()> {
        let dir = self.users_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }

    fn validate_user_id(user_id: &str) -> Result<()> {
        let valid = !user_id.is_empty()
            && !user_id.starts_with('.')
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            bail!("Invalid user id '{}'", user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Tier;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_line() {
        let line = r#"{"timestamp": "2024-01-01T12:00:00Z", "tool_id": "hash-generator"}"#;

        let event = UsageStore::parse_line(line).unwrap();
        assert_eq!(event.tool_id(), "hash-generator");
        assert_eq!(
            event.timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_json_line() {
        assert!(UsageStore::parse_line(r#"{"tool_id": "hash"#).is_err());
        assert!(UsageStore::parse_line(r#"{"timestamp": "2024-01-01T12:00:00Z"}"#).is_err());
        assert!(
            UsageStore::parse_line(r#"{"timestamp": "2024-01-01T12:00:00Z", "tool_id": ""}"#)
                .is_err()
        );
    }

    #[test]
    fn test_append_and_load_events() {
        let dir = TempDir::new().unwrap();
        let store = UsageStore::new(dir.path());

        let later = UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap(), "json-formatter");
        let earlier = UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), "hash-generator");
        store.append_event("alice", &later).unwrap();
        store.append_event("alice", &earlier).unwrap();

        let events = store.load_events("alice").unwrap();
        assert_eq!(events, vec![earlier, later]);
        assert!(store.load_events("bob").unwrap().is_empty());
    }

    #[test]
    fn test_load_skips_bad_lines() {
        let dir = TempDir::new().unwrap();
        let store = UsageStore::new(dir.path());
        let path = store.log_path("alice").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let content = r#"{"timestamp": "2024-01-01T12:00:00Z", "tool_id": "hash-generator"}

not json
{"timestamp": "2024-01-01T13:00:00Z", "tool_id": "hash-generator"}"#;
        fs::write(&path, content).unwrap();

        assert_eq!(store.load_events("alice").unwrap().len(), 2);
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = UsageStore::new(dir.path());
        assert!(store.load_profile("alice").unwrap().is_none());

        let profile = UserProfile::new("Alice", Tier::Pro, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        store.save_profile("alice", &profile).unwrap();
        assert_eq!(store.load_profile("alice").unwrap(), Some(profile));
    }

    #[test]
    fn test_rejects_path_like_user_ids() {
        let store = UsageStore::new("/tmp/unused");
        assert!(store.log_path("../etc/passwd").is_err());
        assert!(store.log_path("").is_err());
        assert!(store.profile_path(".hidden").is_err());
        assert!(store.log_path("alice_01").is_ok());
    }
}
