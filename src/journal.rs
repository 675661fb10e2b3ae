//! Chat and activity journals.
//!
//! Both journals append entries to an in-memory list and rewrite their JSON
//! file after each append. The dialogue core never writes here itself: the
//! session records each turn using the topic and intent metadata the engine
//! returns.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::tasks::{load_json, save_json, DATE_FORMAT};
use crate::types::{Result, TopicId};

pub const CHAT_LOG_FILE: &str = "chat_logs.json";
pub const ACTIVITY_LOG_FILE: &str = "activity_logs.json";

/// Entries shown by the activity log command.
pub const DEFAULT_RECENT: usize = 10;

// ---------------------------------------------------------------------------
// Chat log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("User"),
            Sender::Bot => f.write_str("Bot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub session_id: String,
    #[serde(default)]
    pub topic: Option<TopicId>,
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.timestamp.format("%H:%M:%S"), self.sender, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatSummary {
    pub total: usize,
    pub user: usize,
    pub bot: usize,
    pub sessions: usize,
    pub today: usize,
}

#[derive(Debug)]
pub struct ChatLog {
    path: Option<PathBuf>,
    session_id: String,
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Open `<dir>/chat_logs.json` and start a new session.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(CHAT_LOG_FILE);
        let messages = load_json(&path);
        ChatLog { path: Some(path), session_id: Uuid::new_v4().to_string(), messages }
    }

    pub fn in_memory() -> Self {
        ChatLog { path: None, session_id: Uuid::new_v4().to_string(), messages: Vec::new() }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_new_session(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
    }

    pub fn record(&mut self, sender: Sender, text: &str, topic: Option<TopicId>) -> Result<()> {
        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            sender,
            message: text.to_string(),
            timestamp: Local::now().naive_local(),
            session_id: self.session_id.clone(),
            topic,
        });
        self.save()
    }

    /// Messages from the current session, oldest first.
    pub fn current_session(&self) -> Vec<&ChatMessage> {
        self.messages.iter().filter(|m| m.session_id == self.session_id).collect()
    }

    /// The last `n` messages across all sessions, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&ChatMessage> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter().collect()
    }

    pub fn by_topic(&self, topic: TopicId) -> Vec<&ChatMessage> {
        self.messages.iter().filter(|m| m.topic == Some(topic)).collect()
    }

    pub fn on_date(&self, date: NaiveDate) -> Vec<&ChatMessage> {
        self.messages.iter().filter(|m| m.timestamp.date() == date).collect()
    }

    pub fn summary(&self) -> ChatSummary {
        let sessions: HashSet<&str> = self.messages.iter().map(|m| m.session_id.as_str()).collect();
        ChatSummary {
            total: self.messages.len(),
            user: self.messages.iter().filter(|m| m.sender == Sender::User).count(),
            bot: self.messages.iter().filter(|m| m.sender == Sender::Bot).count(),
            sessions: sessions.len(),
            today: self.on_date(Local::now().date_naive()).len(),
        }
    }

    /// Drop the current session's messages.
    pub fn clear_session(&mut self) -> Result<()> {
        let id = self.session_id.clone();
        self.messages.retain(|m| m.session_id != id);
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_json(path, &self.messages),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Task,
    Reminder,
    Quiz,
    Topic,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
    pub user_name: String,
    pub category: ActivityCategory,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.timestamp.format("%b %d, %H:%M"), self.action, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivitySummary {
    pub total: usize,
    pub tasks: usize,
    pub reminders: usize,
    pub quizzes: usize,
    pub topics: usize,
    pub general: usize,
}

#[derive(Debug)]
pub struct ActivityLog {
    path: Option<PathBuf>,
    user_name: String,
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn open(dir: &Path, user_name: &str) -> Self {
        let path = dir.join(ACTIVITY_LOG_FILE);
        let entries = load_json(&path);
        ActivityLog { path: Some(path), user_name: user_name.to_string(), entries }
    }

    pub fn in_memory(user_name: &str) -> Self {
        ActivityLog { path: None, user_name: user_name.to_string(), entries: Vec::new() }
    }

    pub fn set_user(&mut self, user_name: &str) {
        self.user_name = user_name.to_string();
    }

    pub fn record(&mut self, action: &str, description: &str, category: ActivityCategory) -> Result<()> {
        log::info!("activity: {} ({})", action, description);
        self.entries.push(ActivityEntry {
            id: Uuid::new_v4(),
            action: action.to_string(),
            description: description.to_string(),
            timestamp: Local::now().naive_local(),
            user_name: self.user_name.clone(),
            category,
        });
        self.save()
    }

    // --- logged user actions ---

    pub fn task_created(&mut self, name: &str) -> Result<()> {
        self.record("Task Created", &format!("Created task: {}", name), ActivityCategory::Task)
    }

    pub fn task_completed(&mut self, name: &str) -> Result<()> {
        self.record("Task Completed", &format!("Marked task as completed: {}", name), ActivityCategory::Task)
    }

    pub fn task_deleted(&mut self, name: &str) -> Result<()> {
        self.record("Task Deleted", &format!("Deleted task: {}", name), ActivityCategory::Task)
    }

    pub fn all_tasks_removed(&mut self, count: usize) -> Result<()> {
        self.record("All Tasks Removed", &format!("Removed all {} tasks", count), ActivityCategory::Task)
    }

    pub fn reminder_set(&mut self, name: &str, due: NaiveDateTime) -> Result<()> {
        self.record(
            "Reminder Set",
            &format!("Set reminder for '{}' on {}", name, due.format(DATE_FORMAT)),
            ActivityCategory::Reminder,
        )
    }

    pub fn quiz_started(&mut self) -> Result<()> {
        self.record("Quiz Started", "Started cybersecurity quiz", ActivityCategory::Quiz)
    }

    pub fn quiz_completed(&mut self, score: usize, total: usize) -> Result<()> {
        self.record(
            "Quiz Completed",
            &format!("Completed cybersecurity quiz with score: {}/{}", score, total),
            ActivityCategory::Quiz,
        )
    }

    pub fn quiz_abandoned(&mut self) -> Result<()> {
        self.record("Quiz Abandoned", "Abandoned cybersecurity quiz", ActivityCategory::Quiz)
    }

    pub fn session_started(&mut self) -> Result<()> {
        let description = format!("User '{}' started a new session", self.user_name);
        self.record("User Login", &description, ActivityCategory::General)
    }

    pub fn topic_discussed(&mut self, topic: TopicId) -> Result<()> {
        self.record(
            "Topic Discussed",
            &format!("Discussed cybersecurity topic: {}", topic.label()),
            ActivityCategory::Topic,
        )
    }

    pub fn favourite_topic_set(&mut self, topic: TopicId) -> Result<()> {
        self.record(
            "Favourite Topic Set",
            &format!("Set favourite topic: {}", topic.label()),
            ActivityCategory::Topic,
        )
    }

    pub fn tips_requested(&mut self, topic: TopicId) -> Result<()> {
        self.record(
            "Tips Requested",
            &format!("Requested tips for topic: {}", topic.label()),
            ActivityCategory::Topic,
        )
    }

    // --- queries ---

    /// The newest `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn by_category(&self, category: ActivityCategory, n: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().filter(|e| e.category == category).take(n).collect()
    }

    pub fn summary(&self) -> ActivitySummary {
        let count = |c: ActivityCategory| self.entries.iter().filter(|e| e.category == c).count();
        ActivitySummary {
            total: self.entries.len(),
            tasks: count(ActivityCategory::Task),
            reminders: count(ActivityCategory::Reminder),
            quizzes: count(ActivityCategory::Quiz),
            topics: count(ActivityCategory::Topic),
            general: count(ActivityCategory::General),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_json(path, &self.entries),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
