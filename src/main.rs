use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cyberaware::config::Settings;
use cyberaware::line_editor::{LineEditor, ReadResult};
use cyberaware::session::Session;
use cyberaware::ui;

#[derive(Parser, Debug)]
#[command(name = "cyberaware", version, about = "Cybersecurity awareness chat assistant")]
struct Args {
    /// Settings file (defaults to ./cyberaware.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for tasks and conversation logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory with nl_vocab.yaml, topics.yaml or quiz.yaml overrides
    #[arg(long)]
    vocab_dir: Option<PathBuf>,

    /// Your name (skips the greeting question)
    #[arg(long)]
    name: Option<String>,

    /// Fixed seed for tip order
    #[arg(long)]
    seed: Option<u64>,

    /// Don't read or write ~/.cyberaware_history
    #[arg(long)]
    no_history: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", ui::error(&format!("bad settings: {}", e)));
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    if let Some(dir) = args.vocab_dir {
        settings.vocab_dir = Some(dir);
    }
    if args.name.is_some() {
        settings.user_name = args.name;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if args.no_history {
        settings.history = false;
    }
    log::debug!("settings: {:?}", settings);

    let mut editor = match LineEditor::new(settings.history) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{}", ui::error(&format!("cannot start line editor: {}", e)));
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{}",
        ui::banner("CYBERAWARE", concat!("v", env!("CARGO_PKG_VERSION")), "Cybersecurity Awareness Assistant")
    );
    println!("{}", ui::rule());

    let user_name = match settings.user_name.clone() {
        Some(name) => name,
        None => match ask_name(&mut editor) {
            Some(name) => name,
            None => return ExitCode::SUCCESS,
        },
    };

    let mut session = match Session::open(&settings, &user_name) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", ui::error(&format!("cannot start: {}", e)));
            return ExitCode::FAILURE;
        }
    };

    println!("{}", ui::render(&session.greeting()));

    let prompt = ui::prompt();
    loop {
        match editor.read_line(&prompt) {
            ReadResult::Line(line) => {
                print!("{}", ui::reset());
                editor.add_history(&line);
                let reply = session.handle(&line);
                println!("{}", ui::render(&reply));
                if reply.exit {
                    break;
                }
            }
            ReadResult::Interrupted => {
                print!("{}", ui::reset());
                continue;
            }
            ReadResult::Eof => {
                print!("{}", ui::reset());
                println!("{}", ui::info(&format!("Goodbye, {}! Stay safe online.", user_name)));
                break;
            }
        }
    }

    editor.save_history();
    ExitCode::SUCCESS
}

/// Ask until a non-empty name is typed; `None` on EOF.
fn ask_name(editor: &mut LineEditor) -> Option<String> {
    println!("What's your name?");
    loop {
        match editor.read_line(&ui::prompt()) {
            ReadResult::Line(line) => {
                print!("{}", ui::reset());
                let name = line.trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
                println!("{}", ui::warning("Please enter a name so I know what to call you."));
            }
            ReadResult::Interrupted => continue,
            ReadResult::Eof => return None,
        }
    }
}
