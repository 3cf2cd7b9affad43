//! Output formatting utilities

use clap::ValueEnum;
use docwarden_maint::{InvalidIdReport, KeywordDeleteReport, LengthReport, MaintResult, Outcome};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Human-readable rendering for the text format
pub trait Render {
    fn render(&self) -> String;
}

/// Print data in the chosen format
pub fn print<T: Serialize + Render>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => println!("{}", data.render()),
    }
    Ok(())
}

/// Print a maintenance result; returns whether the pass succeeded
pub fn print_outcome<T: Serialize + Render>(
    result: MaintResult<T>,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let outcome = Outcome::from(result);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => match (&outcome.data, &outcome.message) {
            (Some(data), _) => println!("{}", data.render()),
            (None, message) => eprintln!("Error: {}", message.as_deref().unwrap_or("unknown")),
        },
    }
    Ok(outcome.success)
}

fn list(label: &str, ids: &[String]) -> String {
    if ids.is_empty() {
        format!("{}: none", label)
    } else {
        format!("{} ({}): {}", label, ids.len(), ids.join(", "))
    }
}

impl Render for LengthReport {
    fn render(&self) -> String {
        [
            list("Removed empty", &self.removed_empty),
            list("Removed large", &self.removed_large),
            format!("Split documents: {}", self.split_large_count),
            list("Added fragments", &self.added_ids),
        ]
        .join("\n")
    }
}

impl Render for KeywordDeleteReport {
    fn render(&self) -> String {
        if self.deleted_ids.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n{}", self.message, list("Deleted", &self.deleted_ids))
        }
    }
}

impl Render for InvalidIdReport {
    fn render(&self) -> String {
        list("Removed invalid ids", &self.removed_ids)
    }
}
