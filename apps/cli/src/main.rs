use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ControllerConfig, ListSnapshot, TodoEntry, TodoListController};
use shared::domain::TodoId;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Manage the todo list on a running server")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
    /// How long `delete` waits before removing the row.
    #[arg(long, default_value_t = 0)]
    removal_delay_ms: u64,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the list (the default).
    List,
    Add {
        /// Words are joined with single spaces.
        #[arg(required = true)]
        content: Vec<String>,
    },
    Toggle {
        id: i64,
    },
    Delete {
        id: i64,
    },
    /// Move `source` to the slot held by `destination`.
    Move {
        source: i64,
        destination: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = ControllerConfig {
        removal_delay: Duration::from_millis(args.removal_delay_ms),
    };
    let controller = TodoListController::over_http(&args.server_url, config)
        .with_context(|| format!("invalid server url {}", args.server_url))?;
    controller
        .refresh()
        .await
        .with_context(|| format!("failed to load todos from {}", args.server_url))?;

    match args.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add { content } => {
            let record = controller.add(&content.join(" ")).await?;
            println!("added #{}", record.id);
        }
        Command::Toggle { id } => {
            let completed = controller.toggle(TodoId(id)).await?;
            println!("#{id} is now {}", if completed { "done" } else { "open" });
        }
        Command::Delete { id } => {
            controller.delete(TodoId(id)).await?;
            println!("deleted #{id}");
        }
        Command::Move {
            source,
            destination,
        } => {
            controller.reorder(TodoId(source), TodoId(destination)).await?;
            println!("moved #{source} to #{destination}");
        }
    }

    print!("{}", render_list(&controller.snapshot().await));
    Ok(())
}

fn render_list(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();
    for entry in &snapshot.entries {
        let record = entry.record();
        let mark = if record.completed { "x" } else { " " };
        let pending = match entry {
            TodoEntry::Optimistic(_) => " (saving)",
            TodoEntry::Confirmed(_) => "",
        };
        out.push_str(&format!("[{mark}] #{:<6} {}{pending}\n", record.id.0, record.content));
    }
    out.push_str(&format!("{} items remaining\n", snapshot.remaining_count()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::TodoRecord;

    fn confirmed(id: i64, content: &str, completed: bool) -> TodoEntry {
        TodoEntry::Confirmed(TodoRecord {
            id: TodoId(id),
            content: content.to_string(),
            completed,
            created_at: 0,
        })
    }

    #[test]
    fn parses_move_subcommand() {
        let args = Args::parse_from(["todo", "move", "3", "1"]);
        assert_eq!(
            args.command,
            Some(Command::Move {
                source: 3,
                destination: 1
            })
        );
        assert_eq!(args.server_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn add_joins_words() {
        let args = Args::parse_from(["todo", "add", "Buy", "milk"]);
        assert_eq!(
            args.command,
            Some(Command::Add {
                content: vec!["Buy".to_string(), "milk".to_string()]
            })
        );
    }

    #[test]
    fn renders_marks_and_remaining_count() {
        let snapshot = ListSnapshot {
            entries: vec![confirmed(1, "Buy milk", false), confirmed(2, "Walk dog", true)],
            ..Default::default()
        };
        let out = render_list(&snapshot);
        assert!(out.contains("[ ] #1      Buy milk"));
        assert!(out.contains("[x] #2      Walk dog"));
        assert!(out.ends_with("1 items remaining\n"));
    }
}
