use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// A cybersecurity subject the dialogue can discuss in depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicId {
    Password,
    Phishing,
    Malware,
    Vpn,
    Firewall,
    Encryption,
    TwoFactor,
    SocialEngineering,
    DataBreach,
    SafeBrowsing,
}

impl TopicId {
    pub const ALL: [TopicId; 10] = [
        TopicId::Password,
        TopicId::Phishing,
        TopicId::Malware,
        TopicId::Vpn,
        TopicId::Firewall,
        TopicId::Encryption,
        TopicId::TwoFactor,
        TopicId::SocialEngineering,
        TopicId::DataBreach,
        TopicId::SafeBrowsing,
    ];

    /// Stable identifier, as used in data files and journals.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicId::Password => "password",
            TopicId::Phishing => "phishing",
            TopicId::Malware => "malware",
            TopicId::Vpn => "vpn",
            TopicId::Firewall => "firewall",
            TopicId::Encryption => "encryption",
            TopicId::TwoFactor => "two_factor",
            TopicId::SocialEngineering => "social_engineering",
            TopicId::DataBreach => "data_breach",
            TopicId::SafeBrowsing => "safe_browsing",
        }
    }

    /// Human-readable name for use inside sentences.
    pub fn label(&self) -> &'static str {
        match self {
            TopicId::Password => "passwords",
            TopicId::Phishing => "phishing",
            TopicId::Malware => "malware",
            TopicId::Vpn => "VPNs",
            TopicId::Firewall => "firewalls",
            TopicId::Encryption => "encryption",
            TopicId::TwoFactor => "two-factor authentication",
            TopicId::SocialEngineering => "social engineering",
            TopicId::DataBreach => "data breaches",
            TopicId::SafeBrowsing => "safe browsing",
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        TopicId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EngineError::UnknownTopic(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// The user's high-level goal for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentId {
    CreateTask,
    ViewTasks,
    CompleteTask,
    DeleteTask,
    TaskSummary,
    StartQuiz,
    ViewChatLogs,
    ViewActivityLog,
    GetTips,
    DiscussTopic,
    Exit,
    Help,
    Unknown,
}

impl IntentId {
    /// Intents handled by the shell's task, quiz and journal commands.
    pub const MANAGEMENT: [IntentId; 7] = [
        IntentId::ViewTasks,
        IntentId::CompleteTask,
        IntentId::DeleteTask,
        IntentId::TaskSummary,
        IntentId::StartQuiz,
        IntentId::ViewChatLogs,
        IntentId::ViewActivityLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentId::CreateTask => "create_task",
            IntentId::ViewTasks => "view_tasks",
            IntentId::CompleteTask => "complete_task",
            IntentId::DeleteTask => "delete_task",
            IntentId::TaskSummary => "task_summary",
            IntentId::StartQuiz => "start_quiz",
            IntentId::ViewChatLogs => "view_chat_logs",
            IntentId::ViewActivityLog => "view_activity_log",
            IntentId::GetTips => "get_tips",
            IntentId::DiscussTopic => "discuss_topic",
            IntentId::Exit => "exit",
            IntentId::Help => "help",
            IntentId::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Follow-up aspects
// ---------------------------------------------------------------------------

/// The sub-intent of a follow-up question about the active topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    More,
    How,
    Avoid,
    Example,
}

impl Aspect {
    pub const ALL: [Aspect; 4] = [Aspect::More, Aspect::How, Aspect::Avoid, Aspect::Example];

    /// The aspect's own keyword, which also counts as a cue.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aspect::More => "more",
            Aspect::How => "how",
            Aspect::Avoid => "avoid",
            Aspect::Example => "example",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("duplicate phrase '{phrase}' in {table} table")]
    DuplicatePhrase { table: String, phrase: String },

    #[error("duplicate entry '{key}' in {table} table")]
    DuplicateKey { table: String, key: String },

    #[error("empty phrase in {table} table")]
    EmptyPhrase { table: String },

    #[error("vocabulary error: {0}")]
    Vocab(String),

    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("no task named '{0}'")]
    TaskNotFound(String),

    #[error("quiz error: {0}")]
    Quiz(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trips_through_str() {
        for topic in TopicId::ALL {
            assert_eq!(topic.as_str().parse::<TopicId>().unwrap(), topic);
        }
    }

    #[test]
    fn test_unknown_topic_is_error() {
        assert!(matches!("ransom".parse::<TopicId>(), Err(EngineError::UnknownTopic(_))));
    }

    #[test]
    fn test_topic_serde_matches_as_str() {
        let json = serde_json::to_string(&TopicId::SocialEngineering).unwrap();
        assert_eq!(json, "\"social_engineering\"");
    }
}
