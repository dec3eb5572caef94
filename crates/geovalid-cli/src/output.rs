use console::style;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Clone, Copy)]
enum Status {
    Success,
    Info,
    Warning,
}

pub struct OutputWriter {
    format: OutputFormat,
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn status_message(status: &str, message: impl Display) -> String {
    pretty(&json!({
        "status": status,
        "message": message.to_string(),
    }))
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    fn status(&self, kind: Status, message: impl Display) {
        let (name, symbol) = match kind {
            Status::Success => ("success", style("✓").green().bold()),
            Status::Info => ("info", style("ℹ").blue().bold()),
            Status::Warning => ("warning", style("⚠").yellow().bold()),
        };
        let line = match self.format {
            OutputFormat::Human => format!("{} {}", symbol, message),
            OutputFormat::Json => status_message(name, message),
        };
        // Warnings go to stderr
        match kind {
            Status::Warning => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }

    pub fn success(&self, message: impl Display) {
        self.status(Status::Success, message);
    }

    pub fn info(&self, message: impl Display) {
        self.status(Status::Info, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.status(Status::Warning, message);
    }

    /// Print rows as a table. JSON mode prints nothing; commands emit their
    /// structured result with [`OutputWriter::result`] instead.
    pub fn table<T: Tabled>(&self, data: Vec<T>) {
        if self.format == OutputFormat::Json {
            return;
        }
        if data.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            let mut table = Table::new(data);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    pub fn data<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Human => self.data(&data)?,
            OutputFormat::Json => {
                let output = json!({
                    "status": "success",
                    "data": data,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }

    /// Write a document to `path`, or print it as the command result
    pub fn document<T: Serialize>(&self, data: &T, path: Option<&Path>) -> anyhow::Result<()> {
        match path {
            Some(path) => {
                fs::write(path, serde_json::to_string_pretty(data)?)?;
                self.success(format!("Written to {}", path.display()));
                Ok(())
            }
            None => self.result(data),
        }
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        match self.format {
            OutputFormat::Human => println!("{}: {}", style(key).bold(), value),
            OutputFormat::Json => {
                let entry = json!({ key.to_string(): value.to_string() });
                println!("{}", pretty(&entry));
            }
        }
    }

    pub fn section(&self, title: impl Display) {
        if self.format == OutputFormat::Human {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
