//! Security task store.
//!
//! Tasks are kept in memory and written to a JSON file after every mutation.
//! A missing file starts an empty store; an unreadable or corrupt one is
//! logged and also starts empty, so a bad file never blocks the chat.

use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::types::{EngineError, Result};

pub const TASKS_FILE: &str = "security_tasks.json";

/// Display format for reminder dates, e.g. "Mar 10, 2026 at 14:00".
pub const DATE_FORMAT: &str = "%b %d, %Y at %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityTask {
    pub id: Uuid,
    pub task_name: String,
    pub description: String,
    pub created_date: NaiveDateTime,
    pub reminder_date: NaiveDateTime,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Overdue,
    DueSoon,
    Pending,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
            TaskStatus::DueSoon => "Due Soon",
            TaskStatus::Pending => "Pending",
        };
        f.write_str(s)
    }
}

impl SecurityTask {
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.is_completed && self.reminder_date < now
    }

    /// Pending and due within the next 24 hours.
    pub fn is_due_soon(&self, now: NaiveDateTime) -> bool {
        !self.is_completed
            && self.reminder_date > now
            && self.reminder_date <= now + Duration::days(1)
    }

    pub fn status(&self, now: NaiveDateTime) -> TaskStatus {
        if self.is_completed {
            TaskStatus::Completed
        } else if self.is_overdue(now) {
            TaskStatus::Overdue
        } else if self.is_due_soon(now) {
            TaskStatus::DueSoon
        } else {
            TaskStatus::Pending
        }
    }

    /// One-line description: `[Pending] name - description (Reminder: ...)`.
    pub fn describe(&self, now: NaiveDateTime) -> String {
        format!(
            "[{}] {} - {} (Reminder: {})",
            self.status(now),
            self.task_name,
            self.description,
            self.reminder_date.format(DATE_FORMAT)
        )
    }
}

/// Counts shown by the task summary command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub due_soon: usize,
}

#[derive(Debug, Default)]
pub struct TaskStore {
    path: Option<PathBuf>,
    tasks: Vec<SecurityTask>,
}

impl TaskStore {
    /// Open the store backed by `<dir>/security_tasks.json`.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(TASKS_FILE);
        let tasks = load_json(&path);
        TaskStore { path: Some(path), tasks }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        TaskStore::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn create_task(
        &mut self,
        name: &str,
        description: &str,
        due: NaiveDateTime,
    ) -> Result<Uuid> {
        let task = SecurityTask {
            id: Uuid::new_v4(),
            task_name: name.to_string(),
            description: description.to_string(),
            created_date: Local::now().naive_local(),
            reminder_date: due,
            is_completed: false,
            completed_date: None,
        };
        let id = task.id;
        log::info!("task created: '{}' due {}", name, due);
        self.tasks.push(task);
        self.save()?;
        Ok(id)
    }

    /// All tasks, earliest reminder first.
    pub fn all(&self) -> Vec<&SecurityTask> {
        self.sorted(|_| true)
    }

    pub fn pending(&self) -> Vec<&SecurityTask> {
        self.sorted(|t| !t.is_completed)
    }

    pub fn overdue(&self, now: NaiveDateTime) -> Vec<&SecurityTask> {
        self.sorted(|t| t.is_overdue(now))
    }

    pub fn due_soon(&self, now: NaiveDateTime) -> Vec<&SecurityTask> {
        self.sorted(|t| t.is_due_soon(now))
    }

    pub fn get(&self, id: Uuid) -> Option<&SecurityTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Case-insensitive exact name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&SecurityTask> {
        let name = name.trim().to_lowercase();
        self.tasks.iter().find(|t| t.task_name.to_lowercase() == name)
    }

    /// Mark the named task completed. Completing an already completed task
    /// is a no-op that returns `Ok(false)`.
    pub fn complete_by_name(&mut self, name: &str) -> Result<bool> {
        let idx = self.index_of(name)?;
        let task = &mut self.tasks[idx];
        if task.is_completed {
            return Ok(false);
        }
        task.is_completed = true;
        task.completed_date = Some(Local::now().naive_local());
        log::info!("task completed: '{}'", task.task_name);
        self.save()?;
        Ok(true)
    }

    /// Remove the named task and return it.
    pub fn delete_by_name(&mut self, name: &str) -> Result<SecurityTask> {
        let idx = self.index_of(name)?;
        let task = self.tasks.remove(idx);
        log::info!("task deleted: '{}'", task.task_name);
        self.save()?;
        Ok(task)
    }

    /// Remove every task, returning how many there were.
    pub fn remove_all(&mut self) -> Result<usize> {
        let n = self.tasks.len();
        self.tasks.clear();
        self.save()?;
        Ok(n)
    }

    pub fn summary(&self, now: NaiveDateTime) -> TaskSummary {
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        TaskSummary {
            total: self.tasks.len(),
            completed,
            pending: self.tasks.len() - completed,
            overdue: self.tasks.iter().filter(|t| t.is_overdue(now)).count(),
            due_soon: self.tasks.iter().filter(|t| t.is_due_soon(now)).count(),
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        let wanted = name.trim().to_lowercase();
        self.tasks
            .iter()
            .position(|t| t.task_name.to_lowercase() == wanted)
            .ok_or_else(|| EngineError::TaskNotFound(name.trim().to_string()))
    }

    fn sorted(&self, keep: impl Fn(&SecurityTask) -> bool) -> Vec<&SecurityTask> {
        let mut out: Vec<&SecurityTask> = self.tasks.iter().filter(|t| keep(t)).collect();
        out.sort_by_key(|t| t.reminder_date);
        out
    }

    fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_json(path, &self.tasks),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON file helpers (shared with the journal)
// ---------------------------------------------------------------------------

/// Load a JSON array, treating a missing or corrupt file as empty.
pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Vec<T> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    if text.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("ignoring corrupt {}: {}", path.display(), e);
        Vec::new()
    })
}

/// Write `items` as pretty JSON, creating the parent directory if needed.
pub(crate) fn save_json<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(items)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_create_and_find() {
        let mut store = TaskStore::in_memory();
        let id = store.create_task("Enable 2FA", "Reminder to enable 2FA", at(12, 9)).unwrap();
        let task = store.find_by_name("enable 2fa").unwrap();
        assert_eq!(task.id, id);
        assert!(!task.is_completed);
        assert_eq!(store.get(id).unwrap().task_name, "Enable 2FA");
    }

    #[test]
    fn test_all_sorted_by_reminder() {
        let mut store = TaskStore::in_memory();
        store.create_task("later", "", at(20, 9)).unwrap();
        store.create_task("sooner", "", at(11, 9)).unwrap();
        let names: Vec<&str> = store.all().iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["sooner", "later"]);
    }

    #[test]
    fn test_status_buckets() {
        let now = at(10, 12);
        let mut store = TaskStore::in_memory();
        store.create_task("past", "", at(9, 12)).unwrap();
        store.create_task("soon", "", at(11, 6)).unwrap();
        store.create_task("far", "", at(20, 12)).unwrap();
        store.create_task("done", "", at(9, 12)).unwrap();
        store.complete_by_name("done").unwrap();

        assert_eq!(store.overdue(now).len(), 1);
        assert_eq!(store.due_soon(now).len(), 1);
        assert_eq!(store.pending().len(), 3);
        assert_eq!(
            store.summary(now),
            TaskSummary { total: 4, completed: 1, pending: 3, overdue: 1, due_soon: 1 }
        );
        assert_eq!(store.find_by_name("far").unwrap().status(now), TaskStatus::Pending);
        assert_eq!(store.find_by_name("done").unwrap().status(now), TaskStatus::Completed);
    }

    #[test]
    fn test_complete_twice() {
        let mut store = TaskStore::in_memory();
        store.create_task("patch router", "", at(12, 9)).unwrap();
        assert!(store.complete_by_name("Patch Router").unwrap());
        assert!(!store.complete_by_name("patch router").unwrap());
        assert!(store.find_by_name("patch router").unwrap().completed_date.is_some());
    }

    #[test]
    fn test_missing_task() {
        let mut store = TaskStore::in_memory();
        assert!(matches!(store.complete_by_name("nope"), Err(EngineError::TaskNotFound(_))));
        assert!(matches!(store.delete_by_name("nope"), Err(EngineError::TaskNotFound(_))));
    }

    #[test]
    fn test_delete_and_remove_all() {
        let mut store = TaskStore::in_memory();
        store.create_task("a", "", at(12, 9)).unwrap();
        store.create_task("b", "", at(12, 9)).unwrap();
        store.create_task("c", "", at(12, 9)).unwrap();
        assert_eq!(store.delete_by_name("b").unwrap().task_name, "b");
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove_all().unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_describe() {
        let mut store = TaskStore::in_memory();
        store.create_task("backup", "Back up photos", at(12, 14)).unwrap();
        let line = store.find_by_name("backup").unwrap().describe(at(1, 0));
        assert_eq!(line, "[Pending] backup - Back up photos (Reminder: Mar 12, 2026 at 14:00)");
    }

    #[test]
    fn test_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = TaskStore::open(dir.path());
            store.create_task("rotate keys", "", at(12, 9)).unwrap();
        }
        let store = TaskStore::open(dir.path());
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].reminder_date, at(12, 9));
    }

    #[test]
    fn test_json_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TaskStore::open(dir.path());
        store.create_task("x", "y", at(12, 9)).unwrap();
        let text = std::fs::read_to_string(dir.path().join(TASKS_FILE)).unwrap();
        assert!(text.contains("\"taskName\""));
        assert!(text.contains("\"reminderDate\""));
        assert!(text.contains("\"isCompleted\""));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TASKS_FILE), "{ not json").unwrap();
        let store = TaskStore::open(dir.path());
        assert!(store.is_empty());
    }
}
