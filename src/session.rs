//! Conversation session: the presentation-side controller.
//!
//! A [`Session`] owns the dialogue engine and the collaborators (task store,
//! journals, quiz bank) and turns each input line into a [`Reply`]. Multi-line
//! exchanges are explicit session state rather than nested reads:
//!
//! - **pending task**: a task name is known and the next line is its time;
//! - **pending choice**: complete/delete was asked without a task name;
//! - **quiz**: lines are answers until the quiz ends or the user quits.
//!
//! Every user line and every reply is written to the chat log with the
//! turn's topic; user actions go to the activity log. Journal write failures
//! are logged and never interrupt the conversation.

use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Settings;
use crate::journal::{ActivityLog, ChatLog, Sender, DEFAULT_RECENT};
use crate::nl::normalize::normalize;
use crate::nl::slots::extract_time_expression;
use crate::nl::vocab::Lexicon;
use crate::nl::when::resolve_due;
use crate::nl::{DialogueEngine, Directive};
use crate::quiz::{self, QuizQuestion, QuizRun};
use crate::tasks::{TaskStore, DATE_FORMAT};
use crate::types::{EngineError, IntentId, Result, TopicId};

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// How the shell should style a reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Title,
    Tip,
    Success,
    Warning,
    Empathy,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub tone: Tone,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<ReplyLine>,
    /// The user asked to leave.
    pub exit: bool,
}

impl Reply {
    fn push(&mut self, tone: Tone, text: impl Into<String>) {
        self.lines.push(ReplyLine { tone, text: text.into() });
    }

    /// All line texts joined with newlines.
    pub fn text(&self) -> String {
        self.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    engine: DialogueEngine,
    tasks: TaskStore,
    chat: ChatLog,
    activity: ActivityLog,
    questions: Vec<QuizQuestion>,
    quiz: Option<QuizRun>,
    pending_task: Option<String>,
    pending_choice: Option<IntentId>,
    favourite_topic: Option<TopicId>,
    user_name: String,
    rng: StdRng,
    clock: Option<NaiveDateTime>,
}

impl Session {
    /// Session persisting to `settings.data_dir`.
    pub fn open(settings: &Settings, user_name: &str) -> Result<Session> {
        let vocab_dir = settings.vocab_dir.as_deref();
        let engine = DialogueEngine::from_lexicon(Lexicon::load(vocab_dir)?, settings.seed)?;
        std::fs::create_dir_all(&settings.data_dir)?;
        Ok(Session::assemble(
            engine,
            TaskStore::open(&settings.data_dir),
            ChatLog::open(&settings.data_dir),
            ActivityLog::open(&settings.data_dir, user_name),
            quiz::load_questions(vocab_dir)?,
            user_name,
            settings.seed,
        ))
    }

    /// Session with no files, embedded data and a fixed seed.
    pub fn in_memory(user_name: &str, seed: u64) -> Result<Session> {
        let engine = DialogueEngine::from_lexicon(Lexicon::embedded()?, Some(seed))?;
        Ok(Session::assemble(
            engine,
            TaskStore::in_memory(),
            ChatLog::in_memory(),
            ActivityLog::in_memory(user_name),
            quiz::load_questions(None)?,
            user_name,
            Some(seed),
        ))
    }

    fn assemble(
        engine: DialogueEngine,
        tasks: TaskStore,
        chat: ChatLog,
        activity: ActivityLog,
        questions: Vec<QuizQuestion>,
        user_name: &str,
        seed: Option<u64>,
    ) -> Session {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Session {
            engine,
            tasks,
            chat,
            activity,
            questions,
            quiz: None,
            pending_task: None,
            pending_choice: None,
            favourite_topic: None,
            user_name: user_name.to_string(),
            rng,
            clock: None,
        }
    }

    /// Pin "now" for due-date resolution.
    pub fn set_clock(&mut self, now: NaiveDateTime) {
        self.clock = Some(now);
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn in_quiz(&self) -> bool {
        self.quiz.is_some()
    }

    /// The topic the user said they like, for this session.
    pub fn favourite_topic(&self) -> Option<TopicId> {
        self.favourite_topic
    }

    pub fn pending_task(&self) -> Option<&str> {
        self.pending_task.as_deref()
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Opening lines, including overdue and due-soon reminders.
    pub fn greeting(&mut self) -> Reply {
        let mut reply = Reply::default();
        reply.push(
            Tone::Title,
            format!("Hello, {}! I'm your cybersecurity awareness assistant.", self.user_name),
        );
        reply.push(
            Tone::Plain,
            "Ask me about passwords, phishing, malware, VPNs, firewalls, encryption, 2FA, \
             social engineering, data breaches or safe browsing. Type 'help' for more.",
        );
        let now = self.now();
        let overdue = self.tasks.overdue(now).len();
        let due_soon = self.tasks.due_soon(now).len();
        if overdue > 0 {
            reply.push(Tone::Warning, format!("You have {} overdue security task(s).", overdue));
        }
        if due_soon > 0 {
            reply.push(Tone::Warning, format!("{} task(s) are due within the next day.", due_soon));
        }
        let started = self.activity.session_started();
        self.note(started);
        self.record_bot(&reply, None);
        reply
    }

    /// Handle one input line.
    pub fn handle(&mut self, input: &str) -> Reply {
        let topic_before = self.engine.active_topic();
        let logged = self.chat.record(Sender::User, input.trim(), topic_before);
        self.note(logged);

        let reply = if self.quiz.is_some() {
            self.quiz_answer(input)
        } else if let Some(name) = self.pending_task.take() {
            self.task_time(&name, input)
        } else if let Some(intent) = self.pending_choice.take() {
            self.task_choice(intent, input)
        } else {
            self.converse(input)
        };

        let topic = self.engine.active_topic();
        self.record_bot(&reply, topic);
        reply
    }

    // --- dialogue ---

    fn converse(&mut self, input: &str) -> Reply {
        let turn = self.engine.process(input);
        let mut reply = Reply::default();

        if let Some(mood) = turn.sentiment {
            if let Some(line) = self.engine.moods().reply(mood, &mut self.rng) {
                reply.push(Tone::Empathy, line);
            }
        }

        match turn.directive {
            Directive::TopicInfoRequest(topic) => self.topic_overview(topic, &mut reply),
            Directive::FavouriteTopic(topic) => {
                reply.push(
                    Tone::Success,
                    format!("Great! I'll remember that you're interested in {}.", topic.label()),
                );
                self.favourite_topic = Some(topic);
                let logged = self.activity.favourite_topic_set(topic);
                self.note(logged);
                self.topic_overview(topic, &mut reply);
            }
            Directive::TipText(text) => {
                reply.push(Tone::Tip, text);
                if let Some(topic) = turn.topic {
                    let logged = self.activity.tips_requested(topic);
                    self.note(logged);
                }
            }
            Directive::FollowUpText(text) => reply.push(Tone::Plain, text),
            Directive::UnknownInput if input.trim().is_empty() => {
                reply.push(Tone::Plain, "What would you like to talk about next?");
            }
            Directive::UnknownInput => {
                reply.push(
                    Tone::Plain,
                    "I'm not sure I understand. Could you rephrase, or type 'help' to see what I can do?",
                );
            }
            Directive::ExitRequested => {
                reply.push(Tone::Title, format!("Goodbye, {}! Stay safe online.", self.user_name));
                reply.exit = true;
            }
            Directive::HelpRequested => self.help(&mut reply),
            Directive::TaskSlots { name, time_expression } => match time_expression {
                Some(expr) => self.create_task(&name, Some(expr.as_str()), &mut reply),
                None => {
                    reply.push(
                        Tone::Plain,
                        format!(
                            "When should I remind you to {}? (e.g. 'in 3 days', 'tomorrow', \
                             '5pm'; press enter for tomorrow)",
                            name
                        ),
                    );
                    self.pending_task = Some(name);
                }
            },
            Directive::TaskNameMissing => {
                reply.push(
                    Tone::Plain,
                    "What should I remind you to do? Try 'remind me to update my antivirus in 3 days'.",
                );
            }
            // No topic in play: fall back to the one the user said they like.
            Directive::TipNeedsTopic => match self.favourite_topic {
                Some(topic) => {
                    reply.push(Tone::Plain, format!("Here's a tip on {}, your favourite topic:", topic.label()));
                    let tip = self.engine.next_tip(topic);
                    reply.push(Tone::Tip, tip.text());
                    let logged = self.activity.tips_requested(topic);
                    self.note(logged);
                }
                None => {
                    let topics: Vec<&str> = TopicId::ALL.iter().map(|t| t.label()).collect();
                    reply.push(
                        Tone::Plain,
                        format!("Which topic would you like a tip on? I know about {}.", topics.join(", ")),
                    );
                }
            },
            Directive::Command(intent) => self.command(intent, input, &mut reply),
        }
        reply
    }

    fn topic_overview(&mut self, topic: TopicId, reply: &mut Reply) {
        let content = self.engine.lexicon().content(topic);
        reply.push(Tone::Title, content.title.clone());
        reply.push(Tone::Plain, content.info.clone());
        reply.push(
            Tone::Plain,
            format!(
                "Would you like to know more about {}, see an example, learn how to \
                 protect yourself, what to avoid, or get a tip?",
                topic.label()
            ),
        );
        let logged = self.activity.topic_discussed(topic);
        self.note(logged);
    }

    fn help(&self, reply: &mut Reply) {
        reply.push(Tone::Title, "Here's what I can do:");
        for line in [
            "Explain a topic: 'tell me about phishing', 'what is a VPN'",
            "Follow up on it: 'tell me more', 'give me an example', 'how do I do that', 'what should I avoid'",
            "Share a tip: 'give me a tip', 'any tips on passwords?'",
            "Set a reminder: 'remind me to enable 2FA in 2 weeks'",
            "Tell me what you like: 'my favourite topic is encryption'",
            "Manage tasks: 'show my tasks', 'complete task <name>', 'delete task <name>', 'task summary'",
            "Test yourself: 'start quiz'",
            "Review history: 'show chat logs', 'show activity log'",
            "Leave: 'bye' or 'exit'",
        ] {
            reply.push(Tone::Item, line);
        }
    }

    // --- tasks ---

    fn create_task(&mut self, name: &str, time_expression: Option<&str>, reply: &mut Reply) {
        let due = resolve_due(time_expression, self.now());
        match self.tasks.create_task(name, &format!("Reminder to {}", name), due) {
            Ok(_) => {
                reply.push(
                    Tone::Success,
                    format!("Task added: '{}'. I'll remind you on {}.", name, due.format(DATE_FORMAT)),
                );
                let created = self.activity.task_created(name);
                self.note(created);
                let reminder = self.activity.reminder_set(name, due);
                self.note(reminder);
            }
            Err(e) => {
                log::warn!("task store: {}", e);
                reply.push(Tone::Warning, format!("I couldn't save that task: {}", e));
            }
        }
    }

    fn task_time(&mut self, name: &str, input: &str) -> Reply {
        let mut reply = Reply::default();
        let expr = extract_time_expression(input);
        if expr.is_none() && !input.trim().is_empty() {
            log::debug!("no time expression in '{}', using default", input.trim());
        }
        self.create_task(name, expr.as_deref(), &mut reply);
        reply
    }

    fn command(&mut self, intent: IntentId, input: &str, reply: &mut Reply) {
        let now = self.now();
        match intent {
            IntentId::ViewTasks => {
                let tasks = self.tasks.all();
                if tasks.is_empty() {
                    reply.push(Tone::Plain, "You have no tasks yet.");
                    return;
                }
                reply.push(Tone::Title, "Your security tasks:");
                for (i, task) in tasks.iter().enumerate() {
                    reply.push(Tone::Item, format!("{}. {}", i + 1, task.describe(now)));
                }
            }
            IntentId::TaskSummary => {
                let s = self.tasks.summary(now);
                reply.push(Tone::Title, "Task summary:");
                reply.push(Tone::Item, format!("Total: {}", s.total));
                reply.push(Tone::Item, format!("Completed: {}", s.completed));
                reply.push(Tone::Item, format!("Pending: {}", s.pending));
                reply.push(Tone::Item, format!("Overdue: {}", s.overdue));
                reply.push(Tone::Item, format!("Due soon: {}", s.due_soon));
            }
            IntentId::CompleteTask | IntentId::DeleteTask => {
                let normalized = normalize(input);
                if intent == IntentId::DeleteTask && normalized.contains("all tasks") {
                    self.remove_all_tasks(reply);
                    return;
                }
                match self.command_argument(intent, &normalized) {
                    Some(name) => self.apply_task_choice(intent, &name, reply),
                    None => self.ask_which_task(intent, reply),
                }
            }
            IntentId::StartQuiz => self.start_quiz(reply),
            IntentId::ViewChatLogs => {
                let s = self.chat.summary();
                reply.push(Tone::Title, "Recent conversation:");
                for m in self.chat.recent(DEFAULT_RECENT) {
                    reply.push(Tone::Item, m.to_string());
                }
                reply.push(
                    Tone::Plain,
                    format!(
                        "{} messages in total ({} from you, {} from me) across {} session(s); {} today.",
                        s.total, s.user, s.bot, s.sessions, s.today
                    ),
                );
            }
            IntentId::ViewActivityLog => {
                let recent = self.activity.recent(DEFAULT_RECENT);
                if recent.is_empty() {
                    reply.push(Tone::Plain, "No activity recorded yet.");
                    return;
                }
                reply.push(Tone::Title, "Recent activity:");
                for (i, e) in recent.iter().enumerate() {
                    reply.push(Tone::Item, format!("{}. {}", i + 1, e));
                }
            }
            other => {
                log::debug!("command {} has no handler", other);
                reply.push(Tone::Plain, "I'm not sure how to do that yet.");
            }
        }
    }

    /// Text following the longest matching command phrase.
    fn command_argument(&self, intent: IntentId, normalized: &str) -> Option<String> {
        let phrase = self
            .engine
            .classifier()
            .phrases(intent)
            .iter()
            .filter(|p| normalized.contains(p.as_str()))
            .max_by_key(|p| p.len())?;
        let start = normalized.find(phrase.as_str())? + phrase.len();
        let rest = normalized[start..]
            .trim()
            .trim_start_matches(':')
            .trim()
            .trim_end_matches(['.', '!', '?'])
            .trim();
        let rest = rest.strip_prefix("the ").unwrap_or(rest);
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    fn ask_which_task(&mut self, intent: IntentId, reply: &mut Reply) {
        let candidates = self.task_candidates(intent);
        if candidates.is_empty() {
            reply.push(Tone::Plain, "You don't have any tasks to choose from.");
            return;
        }
        let verb = if intent == IntentId::DeleteTask { "delete" } else { "mark as completed" };
        reply.push(Tone::Plain, format!("Which task would you like to {}?", verb));
        for (i, name) in candidates.iter().enumerate() {
            reply.push(Tone::Item, format!("{}. {}", i + 1, name));
        }
        self.pending_choice = Some(intent);
    }

    /// Names offered for a complete (pending only) or delete (all) choice.
    fn task_candidates(&self, intent: IntentId) -> Vec<String> {
        let tasks = if intent == IntentId::DeleteTask { self.tasks.all() } else { self.tasks.pending() };
        tasks.iter().map(|t| t.task_name.clone()).collect()
    }

    fn task_choice(&mut self, intent: IntentId, input: &str) -> Reply {
        let mut reply = Reply::default();
        let choice = input.trim();
        if choice.is_empty() {
            reply.push(Tone::Plain, "Okay, never mind.");
            return reply;
        }
        // A number picks from the list shown; anything else is a name.
        let listed = self.task_candidates(intent);
        let name = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= listed.len() => listed[n - 1].clone(),
            _ => choice.to_string(),
        };
        self.apply_task_choice(intent, &name, &mut reply);
        reply
    }

    fn apply_task_choice(&mut self, intent: IntentId, name: &str, reply: &mut Reply) {
        let result = if intent == IntentId::DeleteTask {
            self.tasks.delete_by_name(name).map(|task| {
                reply.push(Tone::Success, format!("Deleted task '{}'.", task.task_name));
                Some(task.task_name)
            })
        } else {
            let stored = self.tasks.find_by_name(name).map(|t| t.task_name.clone());
            let shown = stored.unwrap_or_else(|| name.to_string());
            self.tasks.complete_by_name(name).map(|changed| {
                if changed {
                    reply.push(Tone::Success, format!("Marked '{}' as completed. Well done!", shown));
                    Some(shown)
                } else {
                    reply.push(Tone::Plain, format!("'{}' is already completed.", shown));
                    None
                }
            })
        };
        match result {
            Ok(Some(done)) => {
                let logged = if intent == IntentId::DeleteTask {
                    self.activity.task_deleted(&done)
                } else {
                    self.activity.task_completed(&done)
                };
                self.note(logged);
            }
            Ok(None) => {}
            Err(EngineError::TaskNotFound(n)) => {
                reply.push(Tone::Warning, format!("I couldn't find a task named '{}'.", n));
            }
            Err(e) => {
                log::warn!("task store: {}", e);
                reply.push(Tone::Warning, format!("Something went wrong: {}", e));
            }
        }
    }

    fn remove_all_tasks(&mut self, reply: &mut Reply) {
        match self.tasks.remove_all() {
            Ok(0) => reply.push(Tone::Plain, "There were no tasks to remove."),
            Ok(n) => {
                reply.push(Tone::Success, format!("Removed all {} task(s).", n));
                let logged = self.activity.all_tasks_removed(n);
                self.note(logged);
            }
            Err(e) => {
                log::warn!("task store: {}", e);
                reply.push(Tone::Warning, format!("Something went wrong: {}", e));
            }
        }
    }

    // --- quiz ---

    fn start_quiz(&mut self, reply: &mut Reply) {
        let run = QuizRun::new(self.questions.clone());
        reply.push(
            Tone::Title,
            format!("Cybersecurity quiz: {} questions. Answer with the option number, or 'quit' to stop.", run.total()),
        );
        push_question(&run, reply);
        self.quiz = Some(run);
        let logged = self.activity.quiz_started();
        self.note(logged);
    }

    fn quiz_answer(&mut self, input: &str) -> Reply {
        let mut reply = Reply::default();
        let Some(run) = self.quiz.as_mut() else {
            return reply;
        };
        let normalized = normalize(input);

        if normalized == "quit" || normalized == "stop" || self.engine.classifier().is_exit(&normalized) {
            reply.push(
                Tone::Plain,
                format!("Quiz stopped. You scored {} out of {} so far.", run.score(), run.position() - 1),
            );
            self.quiz = None;
            let logged = self.activity.quiz_abandoned();
            self.note(logged);
            return reply;
        }

        let choice = match normalized.parse::<usize>() {
            Ok(n) => n,
            Err(_) => match run.current().map(|q| (q.kind, q.options.clone())) {
                // "true"/"false" typed out for true/false questions.
                Some((quiz::QuestionKind::TrueFalse, options)) => options
                    .iter()
                    .position(|o| o.to_lowercase() == normalized)
                    .map(|i| i + 1)
                    .unwrap_or(0),
                _ => 0,
            },
        };

        match run.answer(choice) {
            Ok(feedback) => {
                if feedback.correct {
                    reply.push(Tone::Success, format!("Correct! {}", feedback.explanation));
                } else {
                    reply.push(
                        Tone::Warning,
                        format!("Not quite. The answer is '{}'. {}", feedback.correct_option, feedback.explanation),
                    );
                }
            }
            Err(e) => {
                let text = match e {
                    EngineError::Quiz(msg) => msg,
                    other => other.to_string(),
                };
                reply.push(Tone::Warning, text);
                push_question(run, &mut reply);
                return reply;
            }
        }

        if run.is_finished() {
            let (score, total) = (run.score(), run.total());
            reply.push(Tone::Title, format!("Quiz complete! You scored {} out of {}.", score, total));
            reply.push(Tone::Plain, quiz::score_message(score, total));
            self.quiz = None;
            let logged = self.activity.quiz_completed(score, total);
            self.note(logged);
        } else {
            push_question(run, &mut reply);
        }
        reply
    }

    // --- journals ---

    fn record_bot(&mut self, reply: &Reply, topic: Option<TopicId>) {
        if reply.lines.is_empty() {
            return;
        }
        let logged = self.chat.record(Sender::Bot, &reply.text(), topic);
        self.note(logged);
    }

    fn note(&self, result: Result<()>) {
        if let Err(e) = result {
            log::warn!("journal write failed: {}", e);
        }
    }
}

fn push_question(run: &QuizRun, reply: &mut Reply) {
    if let Some(q) = run.current() {
        reply.push(Tone::Title, format!("Question {}/{}: {}", run.position(), run.total(), q.question));
        for (i, option) in q.options.iter().enumerate() {
            reply.push(Tone::Item, format!("{}. {}", i + 1, option));
        }
    }
}
