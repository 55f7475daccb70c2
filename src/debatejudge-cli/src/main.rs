//! DebateJudge CLI - AI Debate Generator and Judge
//!
//! Runs a three-round debate between two model-backed participants, judges
//! the result, and stores the transcript. Also exposes the settings store
//! (guardrail blocklists, model parameters, duration cap) for editing.

use clap::{Parser, Subcommand};
use colored::Colorize;
use debatejudge_core::settings as settings_api;
use debatejudge_core::{
    DebateCallback, DebateEvent, DebateOrchestrator, DebateOutcome, DebateSetup, FileSettingsStore,
    JsonlTranscriptStore, KokoroSynth, OpenAiModelClient, SettingsStore,
};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "debatejudge",
    version,
    about = "AI Debate Generator and Judge",
    long_about = "Runs debates between two AI participants (Tim and Tina) over an \
                  OpenAI-compatible API, judges the winner, and stores the transcript."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full debate on a topic
    Debate {
        /// The topic to debate, e.g. "Cats vs Dogs"
        #[arg(value_name = "TOPIC")]
        topic: String,

        /// Model backing Tim
        #[arg(long, value_name = "MODEL")]
        model_tim: String,

        /// Model backing Tina
        #[arg(long, value_name = "MODEL")]
        model_tina: String,

        /// Model used to judge the debate
        #[arg(long, value_name = "MODEL")]
        judge_model: String,

        /// Settings file (blocklists, model parameters, duration cap)
        #[arg(long, value_name = "FILE", default_value = "settings.toml")]
        settings: PathBuf,

        /// File the finished debate is appended to
        #[arg(long, value_name = "FILE", default_value = "debates.jsonl")]
        transcripts: PathBuf,

        /// Directory for per-turn audio files
        #[arg(long, value_name = "DIR", default_value = "audio")]
        audio_dir: PathBuf,

        /// Skip speech synthesis entirely
        #[arg(long)]
        no_audio: bool,
    },

    /// Inspect or edit the settings store
    Settings {
        /// Settings file to operate on
        #[arg(long, value_name = "FILE", default_value = "settings.toml")]
        settings: PathBuf,

        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print all current settings
    Show,
    /// Add a word to the guardrail blocklist
    BlockWord { word: String },
    /// Remove a word from the guardrail blocklist
    UnblockWord { word: String },
    /// Add a topic to the guardrail blocklist
    BlockTopic { topic: String },
    /// Remove a topic from the guardrail blocklist
    UnblockTopic { topic: String },
    /// Set the advisory maximum debate duration in seconds
    SetMaxDuration { secs: i64 },
    /// Set generation parameters for one model
    SetModel {
        model: String,
        #[arg(long, default_value = "0.7")]
        temperature: f64,
        #[arg(long, default_value = "1000")]
        max_tokens: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Debate {
            topic,
            model_tim,
            model_tina,
            judge_model,
            settings,
            transcripts,
            audio_dir,
            no_audio,
        } => {
            run_debate(
                topic,
                model_tim,
                model_tina,
                judge_model,
                settings,
                transcripts,
                audio_dir,
                no_audio,
            )
            .await
        }
        Command::Settings { settings, action } => {
            let store = FileSettingsStore::new(settings);
            run_settings_action(&store, action)?;
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_debate(
    topic: String,
    model_tim: String,
    model_tina: String,
    judge_model: String,
    settings: PathBuf,
    transcripts: PathBuf,
    audio_dir: PathBuf,
    no_audio: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_base = env::var("OPENAI_API_BASE")
        .or_else(|_| env::var("OPENAI_BASE_URL"))
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
        String::new()
    });

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        "  DebateJudge - AI Debate Generator and Judge"
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Topic:".bold(), topic.bright_white());
    println!(
        "  {} {} {}",
        "Tim".bright_cyan(),
        "using".dimmed(),
        model_tim.dimmed()
    );
    println!(
        "  {} {} {}",
        "Tina".bright_magenta(),
        "using".dimmed(),
        model_tina.dimmed()
    );
    println!(
        "  {} {} {}",
        "Judge".yellow(),
        "using".dimmed(),
        judge_model.dimmed()
    );
    println!("{}", "─".repeat(70).dimmed());

    let setup = DebateSetup {
        topic,
        model_tim,
        model_tina,
        judge_model,
    };
    let client = OpenAiModelClient::new(api_base, api_key);
    let store = JsonlTranscriptStore::new(transcripts);

    let mut orchestrator = DebateOrchestrator::new(
        setup,
        Box::new(client),
        Box::new(FileSettingsStore::new(settings)),
    )
    .with_store(Box::new(store))
    .with_callback(console_callback());

    if !no_audio {
        match KokoroSynth::new().await {
            Ok(synth) => {
                orchestrator = orchestrator.with_synth(Box::new(synth), audio_dir);
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("Warning: TTS unavailable, continuing without audio: {}", e).yellow()
                );
            }
        }
    }

    match orchestrator.run().await? {
        DebateOutcome::Blocked => {
            println!();
            println!(
                "{}",
                "The topic contains blocked words or topics. Please choose a different topic."
                    .red()
                    .bold()
            );
        }
        DebateOutcome::Completed(completed) => {
            println!();
            println!(
                "{} {:.2} seconds",
                "Estimated total debate duration:".bold(),
                completed.estimated_secs
            );
            if let Some(id) = completed.transcript_id {
                println!("{} {}", "Debate stored with ID:".bold(), id.bright_green());
            }
            println!();
            println!("{}", "═".repeat(70).bright_blue());
            println!("{}", "  Debate concluded.".bright_green().bold());
            println!("{}", "═".repeat(70).bright_blue());
            println!();
        }
    }

    Ok(())
}

/// Create a callback that prints debate events to the console.
fn console_callback() -> DebateCallback {
    Box::new(move |event| match event {
        DebateEvent::DebateStart { stances, .. } => {
            println!();
            println!("Tim is arguing that {}.", stances.tim.bright_cyan());
            println!("Tina is arguing that {}.", stances.tina.bright_magenta());
        }
        DebateEvent::RoundStart { round } => {
            println!();
            println!("{}", format!("Round {}", round).bold().underline());
        }
        DebateEvent::TurnStart { speaker, .. } => {
            println!("{}", format!("{}'s turn...", speaker).dimmed());
        }
        DebateEvent::TurnComplete { speaker, text, .. } => {
            println!("{}", format!("{}:", speaker).bold());
            for line in textwrap(&text, 66).lines() {
                println!("  {}", line);
            }
        }
        DebateEvent::JudgingStart => {
            println!();
            println!("{}", "Judging the debate...".bold());
        }
        DebateEvent::DurationWarning {
            estimated_secs,
            max_secs,
        } => {
            println!(
                "{}",
                format!(
                    "Warning: estimated duration {:.0}s exceeds the maximum of {}s. \
                     Some content may run long.",
                    estimated_secs, max_secs
                )
                .yellow()
            );
        }
        DebateEvent::VerdictReady { verdict, summary } => {
            println!();
            println!("{} {}", "Winner:".bold(), verdict.winner.name().bright_green());
            println!("{} {}", "Reasoning:".bold(), verdict.reasoning);
            println!("{} {}", "Summary:".bold(), summary);
        }
        DebateEvent::Stored { .. } => {
            // Printed from the final outcome in main.
        }
    })
}

fn run_settings_action(
    store: &dyn SettingsStore,
    action: SettingsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show => {
            let words = settings_api::blocked_words(store)?;
            let topics = settings_api::blocked_topics(store)?;
            let max = settings_api::max_debate_duration(store)?;
            println!("{}", "Blocked words:".bold());
            for word in &words {
                println!("  - {}", word);
            }
            println!("{}", "Blocked topics:".bold());
            for topic in &topics {
                println!("  - {}", topic);
            }
            println!("{} {} seconds", "Max debate duration:".bold(), max);
            if let Some(models) = store.get("model_settings")? {
                println!("{}", "Model settings:".bold());
                print!("{}", toml::to_string(&models).unwrap_or_default());
            }
        }
        SettingsAction::BlockWord { word } => {
            add_to_list(store, "blocked_words", &word)?;
            println!("Added '{}' to blocked words", word);
        }
        SettingsAction::UnblockWord { word } => {
            remove_from_list(store, "blocked_words", &word)?;
            println!("Removed '{}' from blocked words", word);
        }
        SettingsAction::BlockTopic { topic } => {
            add_to_list(store, "blocked_topics", &topic)?;
            println!("Added '{}' to blocked topics", topic);
        }
        SettingsAction::UnblockTopic { topic } => {
            remove_from_list(store, "blocked_topics", &topic)?;
            println!("Removed '{}' from blocked topics", topic);
        }
        SettingsAction::SetMaxDuration { secs } => {
            store.set("max_debate_duration", toml::Value::Integer(secs))?;
            println!("Updated maximum debate duration to {} seconds", secs);
        }
        SettingsAction::SetModel {
            model,
            temperature,
            max_tokens,
        } => {
            let mut models = store
                .get("model_settings")?
                .and_then(|v| v.as_table().cloned())
                .unwrap_or_default();
            let mut entry = toml::Table::new();
            entry.insert("temperature".to_string(), toml::Value::Float(temperature));
            entry.insert("max_tokens".to_string(), toml::Value::Integer(max_tokens));
            models.insert(model.clone(), toml::Value::Table(entry));
            store.set("model_settings", toml::Value::Table(models))?;
            println!("Updated settings for model {}", model);
        }
    }
    Ok(())
}

fn current_list(store: &dyn SettingsStore, key: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    Ok(store
        .get(key)?
        .and_then(|v| v.as_array().cloned())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

fn add_to_list(
    store: &dyn SettingsStore,
    key: &str,
    item: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = current_list(store, key)?;
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
    save_list(store, key, items)
}

fn remove_from_list(
    store: &dyn SettingsStore,
    key: &str,
    item: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = current_list(store, key)?;
    items.retain(|existing| existing != item);
    save_list(store, key, items)
}

fn save_list(
    store: &dyn SettingsStore,
    key: &str,
    items: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = items.into_iter().map(toml::Value::String).collect();
    store.set(key, toml::Value::Array(values))?;
    Ok(())
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
