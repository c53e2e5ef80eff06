// SPDX-FileCopyrightText: 2026 Docrev Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docrev shell` command implementation.
//!
//! Launches the interactive review REPL with colored prompt and readline
//! history. Wires storage, backend client, queue store, dispatcher, and
//! the approved-change set together for the lifetime of the session.

use std::sync::Arc;

use colored::{ColoredString, Colorize};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use docrev_backend::BackendClient;
use docrev_config::model::DocrevConfig;
use docrev_core::{BackendAdapter, DocrevError, QueryRecord, QueryStatus, StorageAdapter};
use docrev_queue::{Dispatcher, QueueStore};
use docrev_review::ReviewSet;
use docrev_storage::SqliteStorage;

/// Runs the `docrev shell` interactive REPL.
///
/// Restores the persisted queue, spawns the dispatcher, and processes
/// commands until the user quits. Queue mutations render from a fresh
/// snapshot on every command, so results resolved in the background
/// show up on the next `list`.
pub async fn run_shell(config: DocrevConfig) -> Result<(), DocrevError> {
    // Initialize storage.
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    // Initialize the backend client.
    let backend: Arc<dyn BackendAdapter> = Arc::new(BackendClient::new(&config.backend)?);

    // Restore the queue and start dispatching.
    let (store, waiting_rx) = QueueStore::new(storage.clone());
    store.load().await;
    let dispatcher = Dispatcher::new(store.clone(), backend.clone()).spawn(waiting_rx);

    let review = ReviewSet::new(backend.clone());

    info!(backend = %config.backend.base_url, "review shell started");

    // Set up readline editor.
    let mut rl = DefaultEditor::new()
        .map_err(|e| DocrevError::Internal(format!("failed to initialize readline: {e}")))?;

    // Print welcome message.
    println!("{}", "docrev shell".bold().green());
    println!(
        "Type {} for commands, {} to exit.\n",
        "help".yellow(),
        "quit".yellow()
    );

    // REPL loop.
    let prompt = format!("{}> ", "docrev".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_command(trimmed) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = handle_command(command, &store, &review).await {
                            eprintln!("{}: {e}", "error".red());
                        }
                    }
                    Err(usage) => {
                        eprintln!("{}", usage.yellow());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    // Clean up: stop dispatching before the database goes away.
    dispatcher.abort();
    storage.close().await?;

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// A parsed REPL command. Indices are 1-based queue positions as shown
/// by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Query(String),
    List,
    Show(usize),
    Retry(usize),
    Discard(usize),
    Clear,
    Approve(usize, usize),
    Amend { chunk_id: String, text: String },
    Reject(String),
    Approved,
    Apply,
    Help,
    Quit,
}

/// Parses one input line into a [`ShellCommand`].
///
/// Returns a usage message on malformed input; the caller prints it
/// without treating it as an error.
fn parse_command(input: &str) -> Result<ShellCommand, String> {
    let mut parts = input.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    match head {
        "query" | "q" => {
            if rest.is_empty() {
                Err("usage: query <text>".to_string())
            } else {
                Ok(ShellCommand::Query(rest.to_string()))
            }
        }
        "list" | "ls" => Ok(ShellCommand::List),
        "show" => parse_index(rest, "show <n>").map(ShellCommand::Show),
        "retry" => parse_index(rest, "retry <n>").map(ShellCommand::Retry),
        "discard" => parse_index(rest, "discard <n>").map(ShellCommand::Discard),
        "clear" => Ok(ShellCommand::Clear),
        "approve" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next(), args.next()) {
                (Some(n), Some(m), None) => Ok(ShellCommand::Approve(
                    parse_index(n, "approve <n> <m>")?,
                    parse_index(m, "approve <n> <m>")?,
                )),
                _ => Err("usage: approve <n> <m>".to_string()),
            }
        }
        "amend" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let chunk_id = args.next().unwrap_or_default();
            let text = args.next().map(str::trim).unwrap_or_default();
            if chunk_id.is_empty() || text.is_empty() {
                Err("usage: amend <chunk_id> <text>".to_string())
            } else {
                Ok(ShellCommand::Amend {
                    chunk_id: chunk_id.to_string(),
                    text: text.to_string(),
                })
            }
        }
        "reject" => {
            if rest.is_empty() {
                Err("usage: reject <chunk_id>".to_string())
            } else {
                Ok(ShellCommand::Reject(rest.to_string()))
            }
        }
        "approved" => Ok(ShellCommand::Approved),
        "apply" => Ok(ShellCommand::Apply),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

/// Parses a 1-based position argument.
fn parse_index(arg: &str, usage: &str) -> Result<usize, String> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("usage: {usage} (n is a 1-based queue position)")),
    }
}

/// Executes one parsed command against the queue and the review set.
async fn handle_command(
    command: ShellCommand,
    store: &QueueStore,
    review: &ReviewSet,
) -> Result<(), DocrevError> {
    match command {
        ShellCommand::Query(text) => {
            let record = store.submit(text).await?;
            println!(
                "queued {} [{}]",
                record.id.to_string().dimmed(),
                status_label(record.status)
            );
        }
        ShellCommand::List => {
            let records = store.list().await;
            if records.is_empty() {
                println!("{}", "queue is empty".dimmed());
            }
            for (i, record) in records.iter().enumerate() {
                println!("{}", render_record_line(i + 1, record));
            }
        }
        ShellCommand::Show(n) => {
            let records = store.list().await;
            match nth_record(&records, n) {
                Some(record) => print_record_detail(record),
                None => println!("no record at position {n}"),
            }
        }
        ShellCommand::Retry(n) => {
            let records = store.list().await;
            let Some(record) = nth_record(&records, n) else {
                println!("no record at position {n}");
                return Ok(());
            };
            match store.retry(&record.id).await {
                Some(updated) => {
                    println!("record requeued (retry #{})", updated.retry_count);
                }
                None => {
                    println!("only records in [{}] can be retried", status_label(QueryStatus::Error));
                }
            }
        }
        ShellCommand::Discard(n) => {
            let records = store.list().await;
            let Some(record) = nth_record(&records, n) else {
                println!("no record at position {n}");
                return Ok(());
            };
            if store.remove(&record.id).await {
                println!("discarded {}", record.id.to_string().dimmed());
            }
        }
        ShellCommand::Clear => {
            store.clear().await;
            println!("queue cleared");
        }
        ShellCommand::Approve(n, m) => {
            let records = store.list().await;
            let Some(record) = nth_record(&records, n) else {
                println!("no record at position {n}");
                return Ok(());
            };
            let Some(results) = record.results.as_ref() else {
                println!("record {n} has no results to approve");
                return Ok(());
            };
            let Some(update) = m.checked_sub(1).and_then(|i| results.get(i)) else {
                println!("record {n} has {} result(s)", results.len());
                return Ok(());
            };
            if review.approve(update.clone()).await {
                println!("approved {}", update.document_metadata.chunk_id.green());
            } else {
                println!("{} is already approved", update.document_metadata.chunk_id);
            }
        }
        ShellCommand::Amend { chunk_id, text } => match review.amend(&chunk_id, text).await {
            Some(update) => {
                println!("amended {}", update.document_metadata.chunk_id.green());
            }
            None => println!("{chunk_id} is not in the approved set"),
        },
        ShellCommand::Reject(chunk_id) => {
            if review.reject(&chunk_id).await {
                println!("rejected {chunk_id}");
            } else {
                println!("{chunk_id} is not in the approved set");
            }
        }
        ShellCommand::Approved => {
            let approved = review.list().await;
            if approved.is_empty() {
                println!("{}", "nothing approved".dimmed());
            }
            for (i, update) in approved.iter().enumerate() {
                println!(
                    "{:>3}. {} [{}] {}",
                    i + 1,
                    update.document_metadata.chunk_id,
                    update.model_output.change_type,
                    truncate(&update.document_metadata.title, 60)
                );
            }
        }
        ShellCommand::Apply => {
            let count = review.apply().await?;
            if count == 0 {
                println!("{}", "nothing to apply".dimmed());
            } else {
                println!("applied {count} approved change(s)");
            }
        }
        ShellCommand::Help => print_help(),
        // Quit never reaches the handler.
        ShellCommand::Quit => {}
    }
    Ok(())
}

/// Returns the record at the given 1-based position.
fn nth_record(records: &[QueryRecord], position: usize) -> Option<&QueryRecord> {
    position.checked_sub(1).and_then(|i| records.get(i))
}

/// Colors a status for terminal display.
fn status_label(status: QueryStatus) -> ColoredString {
    match status {
        QueryStatus::Waiting => "waiting".yellow(),
        QueryStatus::Processing => "processing".blue(),
        QueryStatus::Completed => "completed".green(),
        QueryStatus::Error => "error".red(),
    }
}

/// Formats one queue line for `list`.
fn render_record_line(position: usize, record: &QueryRecord) -> String {
    let mut line = format!(
        "{:>3}. [{}] {}",
        position,
        status_label(record.status),
        truncate(&record.query_text, 60)
    );
    if let Some(results) = &record.results {
        line.push_str(&format!(" ({} result(s))", results.len()));
    }
    if record.retry_count > 0 {
        line.push_str(&format!(" (retry #{})", record.retry_count));
    }
    line
}

/// Prints the full detail view for `show`.
fn print_record_detail(record: &QueryRecord) {
    println!("id:        {}", record.id);
    println!("status:    {}", status_label(record.status));
    println!("query:     {}", record.query_text);
    println!("created:   {}", record.created_at.to_rfc3339());
    if let Some(at) = record.completed_at {
        println!("completed: {}", at.to_rfc3339());
    }
    if record.retry_count > 0 {
        println!("retries:   {}", record.retry_count);
    }
    if let Some(message) = &record.error_message {
        println!("error:     {}", message.red());
    }
    if let Some(results) = &record.results {
        println!("results:");
        for (i, update) in results.iter().enumerate() {
            println!(
                "  {:>3}. {} [{}] {}",
                i + 1,
                update.document_metadata.chunk_id,
                update.model_output.change_type,
                truncate(&update.model_output.suggested, 60)
            );
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  query <text>             submit a new query");
    println!("  list                     show the queue");
    println!("  show <n>                 show record n in full");
    println!("  retry <n>                requeue a failed record");
    println!("  discard <n>              remove record n from the queue");
    println!("  clear                    empty the queue");
    println!("  approve <n> <m>          approve result m of record n");
    println!("  amend <chunk_id> <text>  replace an approved suggestion");
    println!("  reject <chunk_id>        withdraw an approval");
    println!("  approved                 list approved changes");
    println!("  apply                    send approved changes to the backend");
    println!("  help                     show this help");
    println!("  quit                     exit the shell");
}

/// Truncates to `max_chars` characters, appending an ellipsis when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
