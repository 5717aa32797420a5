//! `colist create` and `colist show`, plus list rendering.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use colist_core::{List, ListId, Timestamp};

use crate::peer::{ConnectArgs, Session};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Display name; unsafe characters are replaced.
    pub name: String,

    /// Emit the created list as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let list = session
            .create(&self.name)
            .with_context(|| format!("failed to create list '{}'", self.name))?;
        if self.json {
            return print_json(&list);
        }
        println!("✓ Created '{}'", list.name);
        println!("  id: {}", list.id.as_str().bold());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub list_id: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let list = session.open(&ListId::from(self.list_id.as_str()))?;
        if self.json {
            return print_json(&list);
        }
        print_list(&list);
        Ok(())
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "")]
    done: String,
    #[tabled(rename = "item")]
    text: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "updated")]
    updated: String,
}

pub(crate) fn print_json(list: &List) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(list).context("failed to serialize list JSON")?
    );
    Ok(())
}

pub(crate) fn print_list(list: &List) {
    let open = list.items.values().filter(|item| !item.complete).count();
    println!(
        "{} | {} open | {} done | updated {}",
        list.name.bold(),
        open,
        list.items.len() - open,
        format_timestamp(list.updated),
    );
    if list.items.is_empty() {
        println!("No items yet.");
        return;
    }

    let rows: Vec<ItemRow> = list
        .items_sorted()
        .into_iter()
        .map(|item| ItemRow {
            done: if item.complete {
                "✓".green().to_string()
            } else {
                "·".bright_black().to_string()
            },
            text: if item.complete {
                item.text.strikethrough().to_string()
            } else {
                item.text.clone()
            },
            id: item.id.to_string(),
            updated: format_timestamp(item.updated),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn format_timestamp(at: Timestamp) -> String {
    match at.to_datetime() {
        Some(datetime) => datetime
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => at.to_string(),
    }
}
