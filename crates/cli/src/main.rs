use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;
use wayfarer_core::DialogueOutcome;
use wayfarer_engine::{Brain, KNOWLEDGE_FILE};
use wayfarer_knowledge::KnowledgeBase;
use wayfarer_observability::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer travel-assistant engine CLI")]
struct Cli {
    /// Directory holding training_data.json and knowledge_base.json
    #[arg(long, default_value = "kb")]
    kb_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session
    Chat {
        /// Seed for reproducible template selection
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Classify one utterance and print the result
    Classify { text: String },
    /// Show the slots the extractor finds in one utterance
    Extract { text: String },
    /// Inspect the knowledge base
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum KbCommand {
    /// List travel hacks
    Hacks,
    /// Show packing suggestions for a theme
    Packing { theme: String },
}

fn main() -> Result<()> {
    init_tracing("wayfarer_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Chat { seed } => run_chat(build_brain(&cli.kb_root, seed))?,
        Command::Classify { text } => {
            let brain = build_brain(&cli.kb_root, None);
            let result = brain.classify(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Extract { text } => {
            let slots = wayfarer_extract::extract_slots(&text);
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Command::Kb { command } => {
            let kb = KnowledgeBase::from_path(cli.kb_root.join(KNOWLEDGE_FILE))
                .with_context(|| format!("failed loading knowledge base from {}", cli.kb_root.display()))?;

            match command {
                KbCommand::Hacks => {
                    for hack in kb.travel_hacks() {
                        println!("- {hack}");
                    }
                }
                KbCommand::Packing { theme } => match kb.packing_for(&theme) {
                    Some(items) => {
                        for item in items {
                            println!("- {item}");
                        }
                    }
                    None => {
                        let themes: Vec<_> = kb.packing_themes().collect();
                        println!("no such theme; known themes: {}", themes.join(", "));
                    }
                },
            }
        }
    }

    Ok(())
}

fn build_brain(kb_root: &PathBuf, seed: Option<u64>) -> Brain {
    match seed {
        Some(seed) => {
            // Degraded loading mirrors Brain::from_kb_dir, but seeded.
            let corpus = wayfarer_knowledge::IntentCorpus::from_path(
                kb_root.join(wayfarer_engine::TRAINING_FILE),
            )
            .unwrap_or_default();
            let kb = KnowledgeBase::from_path(kb_root.join(KNOWLEDGE_FILE)).unwrap_or_default();
            Brain::with_rng_seed(corpus, kb, seed)
        }
        None => Brain::from_kb_dir(kb_root),
    }
}

fn run_chat(brain: Brain) -> Result<()> {
    let user_id = Uuid::new_v4().to_string();
    println!("Wayfarer chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        match brain.generate_response(&user_id, message) {
            Some(DialogueOutcome::Text { text }) => println!("\n{text}\n"),
            Some(outcome @ DialogueOutcome::Action { .. }) => {
                println!("\n{}\n", outcome.reply_text());
                println!("action payload:");
                println!("{}\n", serde_json::to_string_pretty(&outcome)?);
            }
            None => println!("\n(no engine answer; a caller would fall back here)\n"),
        }
    }

    Ok(())
}
