use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use vanstock_core::ItemId;
use vanstock_infra::Section;
use vanstock_inventory::{Price, ShortfallPolicy};

#[derive(Debug, Parser)]
#[command(name = "vanstock")]
#[command(about = "Vehicle stock for mobile technicians: stock levels, assemblies and reorders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./vanstock.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overrides config and VANSTOCK_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// What to do when a line asks for more than is in stock
    #[arg(long, global = true)]
    pub shortfall_policy: Option<ShortfallPolicy>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show stock, emptiest first
    Stock {
        #[command(flatten)]
        section: SectionArg,
        /// Filter by name or article number
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only items below half their target
        #[arg(long)]
        low: bool,
    },
    /// Record parts used on a job
    Assemble {
        #[command(flatten)]
        section: SectionArg,
        /// Commission (job or order reference)
        #[arg(short, long)]
        commission: String,
        /// Consumption as ITEM=QTY; an item without quantity uses its increment step
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// List recorded assemblies, newest first
    Assemblies,
    /// Suggest reorder quantities
    Reorder {
        #[command(flatten)]
        section: SectionArg,
        /// Skip the consumption-velocity advisor
        #[arg(long)]
        formula_only: bool,
        /// Override a suggestion as ITEM=QTY (repeatable)
        #[arg(long = "set", value_name = "ITEM=QTY")]
        overrides: Vec<String>,
        /// Print the mailto: link for the office e-mail
        #[arg(long)]
        mailto: bool,
    },
    /// Book a delivery
    Receive {
        #[command(flatten)]
        section: SectionArg,
        item: ItemId,
        quantity: u32,
    },
    /// Manage catalog items
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an item (starts with zero stock)
    Add {
        #[command(flatten)]
        section: SectionArg,
        #[arg(long)]
        name: String,
        #[arg(long)]
        article: String,
        /// List price, e.g. 45,50
        #[arg(long, default_value = "0")]
        price: Price,
        #[arg(long, default_value_t = 10)]
        target: u32,
        #[arg(long, default_value_t = 1)]
        step: u32,
    },
    /// Change an item; omitted fields keep their value
    Edit {
        #[command(flatten)]
        section: SectionArg,
        id: ItemId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        article: Option<String>,
        #[arg(long)]
        price: Option<Price>,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long)]
        step: Option<u32>,
    },
    /// Delete an item; recorded assemblies keep its name
    Remove {
        #[command(flatten)]
        section: SectionArg,
        id: ItemId,
    },
    /// List items by name (settings view)
    List {
        #[command(flatten)]
        section: SectionArg,
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SectionArg {
    /// Catalog: material, spare-parts or tools
    #[arg(long = "section", default_value = "material")]
    pub value: Section,
}

/// Parse `ITEM=QTY`. A bare `ITEM` yields `None` for the quantity.
pub fn parse_line(raw: &str) -> Result<(ItemId, Option<u32>), String> {
    let (id, qty) = match raw.split_once('=') {
        Some((id, qty)) => {
            let qty = qty
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid quantity in '{raw}': {e}"))?;
            (id, Some(qty))
        }
        None => (raw, None),
    };
    let id: ItemId = id.parse().map_err(|e| format!("invalid item in '{raw}': {e}"))?;
    Ok((id, qty))
}
