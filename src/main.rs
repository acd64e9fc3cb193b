use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use composable_registry::{Registry, Value};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "composable-registry")]
#[command(about = "A lazy dependency injection registry")]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Definition files (.toml or .json) whose top-level keys become entries
    #[arg(required = true)]
    definitions: Vec<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Perform a dry run, printing the loaded entries without resolving them
    #[arg(long, short)]
    dry_run: bool,

    /// Export resolved entries to a JSON file (registry.json)
    #[arg(long, short)]
    export: bool,

    /// Start interactive session for inspecting and editing entries
    #[arg(long, short)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered identifiers
    List,
    /// Show the number of entries
    Count,
    /// Check whether an identifier is registered
    Has { id: String },
    /// Resolve an identifier
    Get { id: String },
    /// Store a plain value
    Set { id: String, value: String },
    /// Remove an entry
    Delete { id: String },
    /// Remove all entries
    Reset,
}

#[derive(Serialize)]
struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize)]
struct SnapshotEntry {
    id: String,
    kind: Option<composable_registry::Kind>,
    value: serde_json::Value,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading definitions from: {:?}...", cli.definitions);
    let mut builder = Registry::builder();
    for path in &cli.definitions {
        builder = builder.load_file(path);
    }
    let mut registry = builder.build()?;

    if cli.mode.dry_run {
        println!("--- Registry Entries (Dry Run) ---");
        for id in registry.keys() {
            println!("{id}: {:?}", registry.raw_get(&id)?);
        }
        println!("{} entries", registry.len());
        println!("----------------------------------");
    } else if cli.mode.export {
        let filename = "registry.json";
        export(&mut registry, filename)?;
        println!("Registry exported to {filename}");
    } else if cli.mode.interactive {
        run_interactive_session(&mut registry)?;
    }

    Ok(())
}

fn export(registry: &mut Registry, filename: &str) -> Result<()> {
    let kinds: Vec<_> = registry.keys().iter().map(|id| registry.kind(id)).collect();
    let mut entries = Vec::with_capacity(kinds.len());
    for (item, kind) in registry.iter().zip(kinds) {
        let (id, value) = item?;
        entries.push(SnapshotEntry {
            id,
            kind,
            value: to_json(&value),
        });
    }
    let content = serde_json::to_string_pretty(&Snapshot { entries })?;
    std::fs::write(filename, content)
        .map_err(|e| anyhow::anyhow!("Failed to write export file: {e}"))?;
    Ok(())
}

fn to_json(value: &Value) -> serde_json::Value {
    match value.downcast_ref::<serde_json::Value>() {
        Some(json) => json.clone(),
        None => serde_json::Value::String("<opaque>".to_string()),
    }
}

fn display(value: &Value) -> String {
    match value.downcast_ref::<serde_json::Value>() {
        Some(json) => serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string()),
        None => "<opaque>".to_string(),
    }
}

fn run_interactive_session(registry: &mut Registry) -> Result<()> {
    println!("Loaded registry with {} entries.", registry.len());

    println!("Starting interactive session. Type 'help' for commands.");
    let mut rl = Editor::<(), DefaultHistory>::new()?;
    loop {
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if handle_command(&line, registry).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(line: &str, registry: &mut Registry) -> Result<(), ()> {
    let parts = parse_quoted_args(line);

    let Some(command_str) = parts.first() else {
        return Ok(());
    };

    let id_arg = |usage: &str| {
        let id = parts.get(1).cloned();
        if id.is_none() {
            eprintln!("Usage: {usage}");
        }
        id
    };

    let command = match command_str.as_str() {
        "list" => Some(Commands::List),
        "count" => Some(Commands::Count),
        "has" => id_arg("has <id>").map(|id| Commands::Has { id }),
        "get" => id_arg("get <id>").map(|id| Commands::Get { id }),
        "delete" => id_arg("delete <id>").map(|id| Commands::Delete { id }),
        "set" => match (parts.get(1), parts.get(2)) {
            (Some(id), Some(_)) => Some(Commands::Set {
                id: id.clone(),
                value: parts[2..].join(" "),
            }),
            _ => {
                eprintln!("Usage: set <id> <value>");
                None
            }
        },
        "reset" => Some(Commands::Reset),
        "help" => {
            println!("Available commands:");
            println!("  list                 - List registered identifiers");
            println!("  count                - Show the number of entries");
            println!("  has <id>             - Check whether an identifier is registered");
            println!("  get <id>             - Resolve an identifier");
            println!("  set <id> <value>     - Store a plain value (JSON, or a string)");
            println!("  delete <id>          - Remove an entry");
            println!("  reset                - Remove all entries");
            println!("  help                 - Show this help message");
            println!("  exit, quit           - Exit the interactive session");
            None
        }
        "exit" | "quit" => return Err(()),
        _ => {
            eprintln!("Unknown command. Type 'help' for a list of commands.");
            None
        }
    };

    if let Some(command) = command {
        match command {
            Commands::List => {
                for id in registry.keys() {
                    match registry.kind(&id) {
                        Some(kind) => println!("- {id} ({kind})"),
                        None => println!("- {id}"),
                    }
                }
            }
            Commands::Count => println!("{}", registry.len()),
            Commands::Has { id } => println!("{}", registry.has(&id)),
            Commands::Get { id } => match registry.get(&id) {
                Ok(value) => println!("{}", display(&value)),
                Err(e) => eprintln!("Error: {e}"),
            },
            Commands::Set { id, value } => {
                let trimmed = value.trim();
                // Parse as any valid JSON value, falling back to a string.
                let json_val = serde_json::from_str(trimmed)
                    .unwrap_or_else(|_| serde_json::Value::String(trimmed.to_string()));
                registry.set_value(id, json_val);
            }
            Commands::Delete { id } => {
                if !registry.has(&id) {
                    eprintln!("Error: Identifier '{id}' is not defined");
                }
                registry.delete(&id);
            }
            Commands::Reset => {
                registry.reset();
            }
        }
    }
    Ok(())
}

fn parse_quoted_args(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote_char: Option<char> = None;

    for ch in line.trim().chars() {
        match (ch, quote_char) {
            ('"', None) | ('\'', None) => {
                quote_char = Some(ch);
            }
            (ch, Some(open_char)) if ch == open_char => {
                quote_char = None;
            }
            (' ', None) => {
                if !current.is_empty() {
                    parts.push(current);
                    current = String::new();
                }
            }
            (ch, _) => {
                current.push(ch);
            }
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
