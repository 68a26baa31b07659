//! Line-mode chat on stdin/stdout.
//!
//! Reads one query per line and prints the answer with the same
//! character-by-character reveal the widget uses, as plain text. `:q` or
//! end of input exits.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use platen_core::config::{Config, paths};
use platen_core::conversation;
use platen_core::format::span_tree;
use platen_core::query::{FALLBACK_ANSWER, QueryClient};
use platen_core::tree::{Leaf, LeafKind};

pub async fn run(config: &Config) -> Result<()> {
    let conversation_id = conversation::load_or_create(&paths::conversation_path())
        .context("Failed to load conversation token")?;
    let client = QueryClient::from_config(config, conversation_id)?;

    if !config.greeting.is_empty() {
        println!("{}", config.greeting);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query == ":q" {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let answer = match client.ask(query).await {
            Ok(answer) => answer,
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(%error, "query failed");
                FALLBACK_ANSWER.to_string()
            }
        };
        print_revealed(&answer, config.reveal_interval(), &mut stdout).await?;
    }

    println!("Goodbye!");
    Ok(())
}

fn paragraph_instance(leaf: &Leaf) -> Option<u64> {
    leaf.path
        .first()
        .filter(|e| e.desc.tag == "p")
        .map(|e| e.instance)
}

/// Types the answer out one character at a time; paragraph boundaries
/// become blank lines. A `None` interval prints everything at once.
async fn print_revealed(
    text: &str,
    interval: Option<Duration>,
    stdout: &mut io::Stdout,
) -> Result<()> {
    let tree = span_tree(text);
    let mut last_paragraph: Option<u64> = None;

    for (i, leaf) in tree.leaves().iter().enumerate() {
        let paragraph = paragraph_instance(leaf);
        if i > 0 && paragraph != last_paragraph {
            writeln!(stdout)?;
            writeln!(stdout)?;
        }
        last_paragraph = paragraph;

        match leaf.kind {
            LeafKind::Break => writeln!(stdout)?,
            LeafKind::Char(ch) => {
                write!(stdout, "{ch}")?;
                if let Some(interval) = interval {
                    stdout.flush()?;
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
