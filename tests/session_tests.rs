use chrono::{Duration, NaiveDate, NaiveDateTime};

use cyberaware::config::Settings;
use cyberaware::journal::{ActivityCategory, Sender};
use cyberaware::quiz;
use cyberaware::session::{Reply, Session, Tone};
use cyberaware::types::TopicId;

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

fn session() -> Session {
    let mut s = Session::in_memory("Ada", 11).unwrap();
    s.set_clock(noon());
    s
}

fn has_line(reply: &Reply, tone: Tone, needle: &str) -> bool {
    reply.lines.iter().any(|l| l.tone == tone && l.text.contains(needle))
}

// ===========================================================================
// Conversation
// ===========================================================================

#[test]
fn test_greeting_uses_name() {
    let mut s = session();
    let reply = s.greeting();
    assert!(reply.text().contains("Ada"));
    assert!(!reply.exit);
    assert_eq!(s.activity().by_category(ActivityCategory::General, 5).len(), 1);
}

#[test]
fn test_topic_overview_and_follow_up() {
    let mut s = session();
    let reply = s.handle("tell me about phishing");
    assert!(has_line(&reply, Tone::Title, "Phishing"), "got {:?}", reply);
    assert_eq!(s.engine().active_topic(), Some(TopicId::Phishing));

    let reply = s.handle("give me an example");
    assert_eq!(reply.lines.len(), 1);
    assert_eq!(reply.lines[0].tone, Tone::Plain);
    assert_eq!(s.activity().by_category(ActivityCategory::Topic, 5).len(), 1);
}

#[test]
fn test_tip_is_logged() {
    let mut s = session();
    s.handle("malware");
    let reply = s.handle("any tips?");
    assert_eq!(reply.lines[0].tone, Tone::Tip);
    let topic_entries = s.activity().by_category(ActivityCategory::Topic, 5);
    assert!(topic_entries[0].action.contains("Tips"));
}

#[test]
fn test_tip_without_topic_lists_topics() {
    let mut s = session();
    let reply = s.handle("give me a tip");
    assert!(reply.text().contains("phishing"));
    assert!(reply.text().contains("VPNs"));
}

#[test]
fn test_sentiment_reply_comes_first() {
    let mut s = session();
    let reply = s.handle("I'm really worried about ransomware");
    assert_eq!(reply.lines[0].tone, Tone::Empathy);
    assert!(has_line(&reply, Tone::Title, "Malware"));
}

#[test]
fn test_help_lists_commands() {
    let mut s = session();
    let reply = s.handle("help");
    assert!(reply.text().contains("remind me to"));
    assert!(reply.text().contains("start quiz"));
}

#[test]
fn test_unknown_input() {
    let mut s = session();
    let reply = s.handle("purple elephants");
    assert!(reply.text().contains("rephrase"));
}

#[test]
fn test_exit_sets_flag() {
    let mut s = session();
    let reply = s.handle("bye");
    assert!(reply.exit);
    assert!(reply.text().contains("Ada"));
    assert!(!s.handle("I don't know what to do").exit);
}

#[test]
fn test_favourite_topic_is_remembered() {
    let mut s = session();
    let reply = s.handle("my favourite topic is encryption");
    assert!(has_line(&reply, Tone::Success, "encryption"), "got {:?}", reply);
    assert!(has_line(&reply, Tone::Title, "Encryption"));
    assert_eq!(s.favourite_topic(), Some(TopicId::Encryption));

    let entries = s.activity().by_category(ActivityCategory::Topic, 5);
    assert!(entries.iter().any(|e| e.action == "Favourite Topic Set"));

    // With no topic in play, a tip comes from the favourite.
    s.handle("");
    let reply = s.handle("give me a tip");
    assert!(reply.text().contains("your favourite topic"));
    assert_eq!(reply.lines[1].tone, Tone::Tip);
}

#[test]
fn test_liking_something_else_is_not_a_favourite() {
    let mut s = session();
    s.handle("i like cats");
    assert_eq!(s.favourite_topic(), None);
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Settings::load(Some(&dir.path().join("absent.yaml"))).is_err());
}

// ===========================================================================
// Tasks
// ===========================================================================

#[test]
fn test_reminder_with_time() {
    let mut s = session();
    let reply = s.handle("remind me to enable 2FA in 2 weeks");
    assert!(has_line(&reply, Tone::Success, "enable 2FA"), "got {:?}", reply);
    assert!(reply.text().contains("Mar 24, 2026 at 12:00"));

    let task = s.tasks().find_by_name("enable 2fa").unwrap();
    assert_eq!(task.reminder_date, noon() + Duration::days(14));

    let tasks = s.activity().by_category(ActivityCategory::Task, 5);
    assert_eq!(tasks.len(), 1);
    assert_eq!(s.activity().by_category(ActivityCategory::Reminder, 5).len(), 1);
}

#[test]
fn test_reminder_asks_for_time() {
    let mut s = session();
    let reply = s.handle("remind me to update my antivirus");
    assert!(reply.text().contains("When should I remind you"));
    assert_eq!(s.pending_task(), Some("update my antivirus"));

    s.handle("tomorrow");
    assert_eq!(s.pending_task(), None);
    let task = s.tasks().find_by_name("update my antivirus").unwrap();
    assert_eq!(task.reminder_date, noon() + Duration::days(1));
}

#[test]
fn test_pending_task_defaults_on_enter() {
    let mut s = session();
    s.handle("add task check backups");
    s.handle("");
    let task = s.tasks().find_by_name("check backups").unwrap();
    assert_eq!(task.reminder_date, noon() + Duration::days(1));
}

#[test]
fn test_view_and_summary() {
    let mut s = session();
    assert!(s.handle("show my tasks").text().contains("no tasks"));
    s.handle("remind me to rotate my passwords in 3 days");
    s.handle("remind me to review app permissions tomorrow");

    let listing = s.handle("show my tasks");
    assert!(listing.text().contains("review app permissions"));
    assert!(listing.text().contains("rotate my passwords"));

    let summary = s.handle("task summary");
    assert!(summary.text().contains("Total: 2"));
    assert!(summary.text().contains("Due soon: 1"));
}

#[test]
fn test_complete_by_name() {
    let mut s = session();
    s.handle("remind me to enable 2FA in 2 weeks");
    let reply = s.handle("complete task enable 2FA");
    assert!(has_line(&reply, Tone::Success, "enable 2FA"), "got {:?}", reply);
    assert!(s.tasks().find_by_name("enable 2fa").unwrap().is_completed);

    let again = s.handle("complete task enable 2fa");
    assert!(again.text().contains("already completed"));
}

#[test]
fn test_complete_unknown_task() {
    let mut s = session();
    s.handle("remind me to enable 2FA in 2 weeks");
    let reply = s.handle("complete task water the plants");
    assert!(has_line(&reply, Tone::Warning, "water the plants"));
}

#[test]
fn test_delete_by_number() {
    let mut s = session();
    s.handle("remind me to check my firewall in 3 days");
    let reply = s.handle("delete task");
    assert!(reply.text().contains("Which task"));
    assert!(reply.text().contains("check my firewall"));

    let reply = s.handle("1");
    assert!(has_line(&reply, Tone::Success, "check my firewall"));
    assert!(s.tasks().is_empty());
}

#[test]
fn test_delete_all() {
    let mut s = session();
    s.handle("remind me to check my firewall in 3 days");
    s.handle("remind me to enable 2FA in 2 weeks");
    let reply = s.handle("delete all tasks");
    assert!(reply.text().contains("Removed all 2"));
    assert!(s.tasks().is_empty());
}

#[test]
fn test_task_clears_topic() {
    let mut s = session();
    s.handle("tell me about vpn");
    s.handle("remind me to install a VPN in 2 days");
    assert_eq!(s.engine().active_topic(), None);
}

// ===========================================================================
// Quiz
// ===========================================================================

#[test]
fn test_quiz_all_correct() {
    let mut s = session();
    let answers: Vec<usize> = quiz::load_questions(None).unwrap().iter().map(|q| q.answer + 1).collect();

    let reply = s.handle("start quiz");
    assert!(reply.text().contains("Question 1/10"));
    assert!(s.in_quiz());

    let mut last = Reply::default();
    for a in answers {
        last = s.handle(&a.to_string());
    }
    assert!(!s.in_quiz());
    assert!(last.text().contains("You scored 10 out of 10"));
    assert!(last.text().contains("cybersecurity pro"));
    assert_eq!(s.activity().by_category(ActivityCategory::Quiz, 5).len(), 2);
}

#[test]
fn test_quiz_rejects_bad_choice() {
    let mut s = session();
    s.handle("start quiz");
    let reply = s.handle("42");
    assert!(has_line(&reply, Tone::Warning, "between 1 and"));
    assert!(reply.text().contains("Question 1/10"));
}

#[test]
fn test_quiz_quit() {
    let mut s = session();
    s.handle("start quiz");
    let reply = s.handle("quit");
    assert!(!reply.exit, "quitting the quiz must not end the chat");
    assert!(reply.text().contains("Quiz stopped"));
    assert!(!s.in_quiz());
}

// ===========================================================================
// Journals
// ===========================================================================

#[test]
fn test_every_exchange_is_journaled() {
    let mut s = session();
    s.handle("tell me about encryption");
    s.handle("tell me more");
    let messages = s.chat().current_session();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].topic, Some(TopicId::Encryption));
    assert_eq!(s.chat().by_topic(TopicId::Encryption).len(), 3);
}

#[test]
fn test_chat_log_command() {
    let mut s = session();
    s.handle("tell me about firewalls");
    let reply = s.handle("show chat logs");
    assert!(reply.text().contains("User: tell me about firewalls"));
    assert!(reply.text().contains("1 session"));
}

#[test]
fn test_activity_log_command() {
    let mut s = session();
    let empty = s.handle("show activity log");
    assert!(empty.text().contains("No activity"));
    s.handle("remind me to enable 2FA in 2 weeks");
    let reply = s.handle("show activity log");
    assert!(reply.text().contains("Task Created"));
}

// ===========================================================================
// Persistence
// ===========================================================================

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        seed: Some(3),
        ..Settings::default()
    };

    {
        let mut s = Session::open(&settings, "Ada").unwrap();
        s.handle("remind me to enable 2FA in 2 weeks");
    }

    let mut s = Session::open(&settings, "Ada").unwrap();
    assert_eq!(s.tasks().len(), 1);
    assert_eq!(s.chat().len(), 2);
    assert_eq!(s.chat().current_session().len(), 0);
    assert!(s.handle("show my tasks").text().contains("enable 2FA"));
}

#[test]
fn test_corrupt_files_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("security_tasks.json"), "{ not json").unwrap();
    let settings = Settings { data_dir: dir.path().to_path_buf(), ..Settings::default() };
    let s = Session::open(&settings, "Ada").unwrap();
    assert!(s.tasks().is_empty());
}
