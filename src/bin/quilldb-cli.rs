//! QuillDB interactive shell
//!
//! Reads statements line by line, buffering until a line ends with `;`,
//! and prints results as a boxed table or as JSON.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use quilldb::{DBConfig, QueryResult, Session, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// QuillDB: an in-memory relational engine with JSON snapshots.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (data_path, autosave, load_on_open)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file; overrides the config's data_path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Save the snapshot after every successful mutation
    #[arg(long)]
    autosave: bool,

    /// Execute statements from a file instead of reading stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log access-path decisions and snapshot activity
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Table,
    Json,
}

struct Shell {
    session: Session,
    mode: OutputMode,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &args.config {
        Some(path) => DBConfig::from_file(path)?,
        None => DBConfig::default(),
    };
    if let Some(data) = args.data {
        config.data_path = Some(data);
    }
    if args.autosave {
        config.autosave = true;
    }

    let session = Session::open(config).context("failed to open database")?;
    let mut shell = Shell {
        session,
        mode: OutputMode::Table,
    };

    match args.file {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
            shell.run_lines(BufReader::new(file), false)
        }
        None => {
            println!("QuillDB v{}", VERSION);
            match &shell.session.config().data_path {
                Some(path) => println!("Database: {}", path.display()),
                None => println!("Database: in-memory"),
            }
            println!("Type '.help' for help, '.exit' to quit\n");
            let stdin = io::stdin();
            shell.run_lines(stdin.lock(), true)
        }
    }
}

impl Shell {
    fn run_lines<R: BufRead>(&mut self, mut reader: R, interactive: bool) -> Result<()> {
        let mut buffer = String::new();
        let mut statement = String::new();

        loop {
            if interactive {
                print!("{}", if statement.is_empty() { "quill> " } else { "    -> " });
                io::stdout().flush()?;
            }

            buffer.clear();
            if reader.read_line(&mut buffer)? == 0 {
                break;
            }
            let input = buffer.trim();

            if statement.is_empty() && input.starts_with('.') {
                if !self.meta_command(input) {
                    break;
                }
                continue;
            }

            if input.is_empty() {
                continue;
            }

            statement.push_str(input);
            statement.push('\n');

            if input.ends_with(';') {
                match self.session.execute(&statement) {
                    Ok(result) => self.display_result(result),
                    Err(e) => eprintln!("Error: {}", e),
                }
                statement.clear();
            }
        }

        if !statement.trim().is_empty() {
            eprintln!("Warning: incomplete statement discarded (missing ';')");
        }
        Ok(())
    }

    /// Handle a `.command`; returns false when the shell should exit
    fn meta_command(&mut self, input: &str) -> bool {
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let argument = parts.next();

        let outcome = match (command, argument) {
            (".exit" | ".quit", _) => return false,
            (".help", _) => {
                print_interactive_help();
                Ok(())
            }
            (".tables", _) => {
                self.list_tables();
                Ok(())
            }
            (".schema", None) => self.show_all_schemas(),
            (".schema", Some(table)) => self.show_table_schema(table),
            (".save", None) => self.session.save().map_err(Into::into),
            (".save", Some(path)) => self.session.save_to(path).map_err(Into::into),
            (".load", None) => self.session.load().map_err(Into::into),
            (".load", Some(path)) => self.session.load_from(path).map_err(Into::into),
            (".mode", Some("table")) => {
                self.mode = OutputMode::Table;
                Ok(())
            }
            (".mode", Some("json")) => {
                self.mode = OutputMode::Json;
                Ok(())
            }
            (".mode", _) => Err(anyhow!("usage: .mode table|json")),
            _ => Err(anyhow!("Unknown command: {} (type '.help')", input)),
        };

        match outcome {
            Ok(()) if matches!(command, ".save" | ".load") => println!("OK"),
            Ok(()) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
        true
    }

    fn display_result(&self, result: QueryResult) {
        match result {
            QueryResult::Definition { message } | QueryResult::Modification { message, .. } => {
                println!("{}", message);
            }
            QueryResult::Select { columns, rows } => match self.mode {
                OutputMode::Table => display_table(&columns, &rows),
                OutputMode::Json => display_json(&columns, &rows),
            },
        }
    }

    fn list_tables(&self) {
        let tables = self.session.database().list_tables();
        if tables.is_empty() {
            println!("No tables found");
        } else {
            for table in tables {
                println!("  {}", table);
            }
        }
    }

    fn show_all_schemas(&mut self) -> Result<()> {
        let tables = self.session.database().list_tables();
        if tables.is_empty() {
            println!("No tables found");
        }
        for table in tables {
            self.show_table_schema(&table)?;
            println!();
        }
        Ok(())
    }

    fn show_table_schema(&mut self, table_name: &str) -> Result<()> {
        let (columns, rows) = self.describe(table_name)?;
        println!("Table: {}", self.session.database().get_table_schema(table_name)?.name);
        display_table(&columns, &rows);
        Ok(())
    }

    /// Column/Type/Constraints rows for one table, via `DESCRIBE`
    fn describe(&mut self, table_name: &str) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        match self.session.execute(&format!("DESCRIBE {}", table_name))? {
            QueryResult::Select { columns, rows } => Ok((columns, rows)),
            other => Err(anyhow!("unexpected DESCRIBE result: {:?}", other)),
        }
    }
}

fn display_json(columns: &[String], rows: &[Vec<Value>]) {
    let objects: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let object = columns
                .iter()
                .zip(row)
                .map(|(col, value)| (col.clone(), serde_json::to_value(value).unwrap_or(serde_json::Value::Null)))
                .collect::<serde_json::Map<_, _>>();
            serde_json::Value::Object(object)
        })
        .collect();

    match serde_json::to_string_pretty(&objects) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Text(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("{}...", head)
        }
        other => other.to_string(),
    }
}

fn display_table(columns: &[String], rows: &[Vec<Value>]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let cells: Vec<Vec<String>> = rows.iter().map(|row| row.iter().map(cell).collect()).collect();

    let mut widths: Vec<usize> = columns.iter().map(|col| col.chars().count()).collect();
    for row in &cells {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    print_border(&widths, '┌', '┬', '┐');
    print_row(columns, &widths);
    print_border(&widths, '├', '┼', '┤');
    for row in &cells {
        print_row(row, &widths);
    }
    print_border(&widths, '└', '┴', '┘');

    println!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" });
}

fn print_border(widths: &[usize], left: char, middle: char, right: char) {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    println!("{}{}{}", left, segments.join(&middle.to_string()), right);
}

fn print_row(values: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let value = values.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(value.chars().count());
            format!(" {}{} ", value, " ".repeat(pad))
        })
        .collect();
    println!("│{}│", padded.join("│"));
}

fn print_interactive_help() {
    println!(
        r#"
Meta commands:
  .help                 Show this help
  .exit, .quit          Leave the shell
  .tables               List tables
  .schema [table]       Show one or every table's columns
  .save [path]          Save a snapshot (default: configured data path)
  .load [path]          Load a snapshot (default: configured data path)
  .mode table|json      Choose result output format

Statements end with ';' and may span lines:
  CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, active BOOL);
  INSERT INTO users (id, email, active) VALUES (1, 'a@example.com', TRUE);
  SELECT * FROM users WHERE id = 1;
  SELECT users.email, orders.total FROM users INNER JOIN orders ON users.id = orders.user_id;
  UPDATE users SET active = FALSE WHERE email = 'a@example.com';
  DELETE FROM users WHERE id = 1;
  SHOW TABLES;
  DESCRIBE users;
"#
    );
}
