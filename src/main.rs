use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tricalc::calculator::{TextSource, format_value, to_stored, try_evaluate};
use tricalc::input::{SpeechEvent, SpeechRecognizer, TranscriptSegment, split_sequence};
use tricalc::{App, Config, Mode, Screen, SpeechError};

#[derive(Parser)]
#[command(name = "tricalc", version, about = "Keypad, voice and free-text calculator")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer an arithmetic question, e.g. "what is 12 plus 8"
    Eval {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
        /// Treat the text as a speech transcript rather than a typed question
        #[arg(long)]
        speech: bool,
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Feed keys to the keypad, e.g. "12+3=" or "9 Backspace 4 Enter"
    Keys {
        /// Print the display as JSON
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        sequence: Vec<String>,
    },
    /// Interactive session; `:mode <voice|text|keypad>` switches input
    Repl {
        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    input: &'a str,
    result: Option<f64>,
    display: Option<String>,
    error: Option<String>,
}

/// Stands in for a speech provider in the terminal: each typed line is
/// treated as a final transcript.
struct TypedTranscripts {
    language: String,
}

impl SpeechRecognizer for TypedTranscripts {
    fn start(&mut self) -> Result<(), SpeechError> {
        info!(language = %self.language, "capturing typed transcripts");
        Ok(())
    }

    fn stop(&mut self) {}
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Eval {
            json,
            speech,
            words,
        } => run_eval(&config, &words.join(" "), speech, json),
        Command::Keys { json, sequence } => run_keys(&config, &sequence.join(" "), json),
        Command::Repl { mode } => run_repl(&config, mode.unwrap_or(config.mode)),
    }
}

fn run_eval(config: &Config, text: &str, speech: bool, json: bool) -> Result<()> {
    let source = if speech {
        TextSource::Speech
    } else {
        TextSource::Question
    };
    let outcome = try_evaluate(text, source);

    if json {
        let output = EvalOutput {
            input: text,
            result: outcome.as_ref().ok().copied(),
            display: outcome
                .as_ref()
                .ok()
                .map(|value| format_value(*value, &config.display)),
            error: outcome.as_ref().err().map(ToString::to_string),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match outcome {
        Ok(value) => {
            println!("Answer: {}", to_stored(value));
            Ok(())
        }
        Err(e) => Err(e).context(if speech {
            tricalc::app::SPEECH_FAILURE
        } else {
            tricalc::app::QUESTION_FAILURE
        }),
    }
}

fn run_keys(config: &Config, sequence: &str, json: bool) -> Result<()> {
    let mut app = new_app(config, Mode::Keypad);

    for key in split_sequence(sequence) {
        if !app.key(&key) {
            warn!(key = %key, "ignoring unknown key");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&app.screen())?);
    } else {
        print_screen(&app.screen());
    }
    Ok(())
}

fn run_repl(config: &Config, mode: Mode) -> Result<()> {
    let mut app = new_app(config, mode);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("tricalc: {:?} mode. Type :help for commands.", app.mode());
    print_prompt(&mut stdout, app.mode())?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("q" | "quit"), _) => break,
                (Some("mode"), Some(name)) => match Mode::from_str(name, true) {
                    Ok(mode) => {
                        app.set_mode(mode);
                        print_screen(&app.screen());
                    }
                    Err(_) => println!("unknown mode '{}'", name),
                },
                (Some("help"), _) => print_help(),
                _ => println!("unknown command ':{}'", command),
            }
        } else if !line.is_empty() {
            handle_line(&mut app, line);
        }

        print_prompt(&mut stdout, app.mode())?;
    }

    Ok(())
}

fn handle_line(app: &mut App<TypedTranscripts>, line: &str) {
    match app.mode() {
        Mode::Keypad => {
            for key in split_sequence(line) {
                if !app.key(&key) {
                    warn!(key = %key, "ignoring unknown key");
                }
            }
        }
        Mode::Text => {
            app.submit_question(line);
            println!("{}", app.answer());
        }
        Mode::Voice => {
            app.toggle_voice();
            app.on_speech_event(SpeechEvent::Started);
            app.on_speech_event(SpeechEvent::Results(vec![TranscriptSegment::final_text(
                line,
            )]));
            println!("heard: {}", app.voice().transcript());
            println!("{}", app.voice().status());
            app.on_speech_event(SpeechEvent::Ended);
        }
    }

    print_screen(&app.screen());
}

fn new_app(config: &Config, mode: Mode) -> App<TypedTranscripts> {
    let recognizer = TypedTranscripts {
        language: config.speech.language.clone(),
    };
    App::new(mode, config.display.clone(), Some(recognizer))
}

fn print_screen(screen: &Screen) {
    if !screen.previous.is_empty() {
        println!("{:>24}", screen.previous);
    }
    println!("{:>24}", screen.current);
}

fn print_prompt(stdout: &mut io::Stdout, mode: Mode) -> Result<()> {
    let label = match mode {
        Mode::Voice => "voice",
        Mode::Text => "text",
        Mode::Keypad => "keys",
    };
    write!(stdout, "{}> ", label)?;
    stdout.flush()?;
    Ok(())
}

fn print_help() {
    println!(":mode voice|text|keypad  switch input mode (resets the calculator)");
    println!(":quit                    leave");
    println!("voice mode:  each line is treated as a spoken phrase");
    println!("text mode:   each line is a question, e.g. what is 15% of 80");
    println!("keypad mode: keys such as 12+3= or 9 Backspace 4 Enter");
}
