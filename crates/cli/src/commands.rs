use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use vanstock_core::Entity;
use vanstock_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};
use vanstock_infra::{
    Config, JsonFileStore, ReorderEmail, ReorderPlan, ReorderPlanner, Section, StockService, VelocityAdvisor,
};
use vanstock_infra::reorder_planner::PlanSource;
use vanstock_inventory::{
    AssemblyRequest, ConsumptionRequest, InventoryEvent, ItemDraft, ReorderContext, ReorderSuggestion,
    StockLedgerEngine,
};

use crate::args::{Cli, Command, ItemCommand, parse_line};
use crate::render;

type Bus = Arc<InMemoryEventBus<EventEnvelope<InventoryEvent>>>;
type Service = StockService<JsonFileStore, Bus>;

/// Resolve configuration: file and environment, then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(policy) = cli.shortfall_policy {
        config.shortfall_policy = policy;
    }
    Ok(config)
}

pub async fn run<W: Write>(cli: Cli, config: &Config, out: &mut W) -> Result<()> {
    debug!(data_dir = %config.data_dir.display(), "using data directory");

    let bus: Bus = Arc::new(InMemoryEventBus::new());
    let events = bus.subscribe();
    let service: Service = StockService::new(
        JsonFileStore::new(&config.data_dir),
        bus,
        StockLedgerEngine::new(config.shortfall_policy),
    );

    let json = cli.json;
    match cli.command {
        Command::Stock { section, search, low } => {
            let mut items = service.stock_view(section.value, &search)?;
            if low {
                items.retain(|i| i.is_low_stock());
            }
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
            } else {
                write!(out, "{}", render::stock_table(&items))?;
            }
        }
        Command::Assemble { section, commission, lines } => {
            let consumption = consumption_from(&service, section.value, &lines)?;
            let receipt = service
                .record_assembly(section.value, &AssemblyRequest::new(commission, consumption))
                .context("assembly not recorded")?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&receipt.assembly)?)?;
            } else {
                write!(out, "{}", render::assembly_summary(&receipt.assembly))?;
            }
        }
        Command::Assemblies => {
            let assemblies = service.assemblies()?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&assemblies)?)?;
            } else {
                write!(out, "{}", render::assemblies_list(&assemblies))?;
            }
        }
        Command::Reorder { section, formula_only, overrides, mailto } => {
            let (items, history) = service.reorder_inputs(section.value)?;
            let mut plan = if formula_only {
                ReorderPlan {
                    suggestions: ReorderContext::new(&items, &history).suggestions(),
                    source: PlanSource::Fallback("advisor disabled".to_string()),
                }
            } else {
                plan_with_advisor(config, &items, &history).await
            };
            apply_overrides(&mut plan.suggestions, &overrides)?;

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&plan.suggestions)?)?;
            } else {
                write!(out, "{}", render::reorder_table(&plan, &items))?;
            }
            if mailto {
                let email = ReorderEmail::compose(&plan.suggestions, &items).with_recipient(config.order_email.clone());
                writeln!(out, "{}", email.mailto_uri())?;
            }
        }
        Command::Receive { section, item, quantity } => {
            let item = service.receive_stock(section.value, &item, quantity)?;
            writeln!(
                out,
                "{}: Bestand jetzt {}/{}",
                item.name(),
                item.current_stock(),
                item.target_stock()
            )?;
        }
        Command::Item { command } => run_item(&service, command, json, out)?,
    }

    for envelope in events.drain() {
        debug!(
            event_type = envelope.payload().event_type(),
            stream = envelope.stream(),
            sequence = envelope.sequence_number(),
            "event published"
        );
        if !json {
            for notice in render::event_notices(envelope.payload()) {
                writeln!(out, "{notice}")?;
            }
        }
    }
    Ok(())
}

fn run_item<W: Write>(service: &Service, command: ItemCommand, json: bool, out: &mut W) -> Result<()> {
    match command {
        ItemCommand::Add { section, name, article, price, target, step } => {
            let draft = ItemDraft {
                name,
                article_number: article,
                list_price: price,
                target_stock: target,
                increment_step: step,
            };
            let item = service.create_item(section.value, &draft)?;
            writeln!(out, "Artikel hinzugefügt: {} ({})", item.name(), item.id())?;
        }
        ItemCommand::Edit { section, id, name, article, price, target, step } => {
            let current = service
                .items(section.value)?
                .into_iter()
                .find(|i| i.id() == &id)
                .with_context(|| format!("item {id} not found in {}", section.value))?;

            let mut draft = current.draft();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(article) = article {
                draft.article_number = article;
            }
            if let Some(price) = price {
                draft.list_price = price;
            }
            if let Some(target) = target {
                draft.target_stock = target;
            }
            if let Some(step) = step {
                draft.increment_step = step;
            }

            let item = service.revise_item(section.value, &id, &draft)?;
            writeln!(out, "Artikel aktualisiert: {}", item.name())?;
        }
        ItemCommand::Remove { section, id } => {
            let removed = service.remove_item(section.value, &id)?;
            writeln!(out, "Artikel gelöscht: {}", removed.name())?;
        }
        ItemCommand::List { section, search } => {
            let items = service.settings_view(section.value, &search)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
            } else {
                write!(out, "{}", render::stock_table(&items))?;
            }
        }
    }
    Ok(())
}

/// Build the consumption request; bare item ids take the item's increment step.
fn consumption_from(service: &Service, section: Section, lines: &[String]) -> Result<ConsumptionRequest> {
    let items = service.items(section)?;
    let mut request = ConsumptionRequest::new();

    for raw in lines {
        let (id, quantity) = parse_line(raw).map_err(anyhow::Error::msg)?;
        match quantity {
            Some(quantity) => {
                request.set(id, quantity);
            }
            None => {
                let item = items
                    .iter()
                    .find(|i| i.id() == &id)
                    .with_context(|| format!("item {id} not found in {section}"))?;
                request.select(item);
            }
        }
    }
    Ok(request)
}

async fn plan_with_advisor(
    config: &Config,
    items: &[vanstock_inventory::Item],
    history: &[vanstock_inventory::HistoricalConsumption],
) -> ReorderPlan {
    let planner = ReorderPlanner::new(
        VelocityAdvisor {
            lookback_days: config.lookback_days,
            coverage_days: config.coverage_days,
        },
        config.advisory_timeout,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let plan = planner.plan(items, history, Utc::now(), &cancel).await;
    watcher.abort();
    plan
}

/// Apply user edits (`ITEM=QTY`) to suggestions before they are shown or mailed.
fn apply_overrides(suggestions: &mut [ReorderSuggestion], overrides: &[String]) -> Result<()> {
    for raw in overrides {
        let (id, quantity) = parse_line(raw).map_err(anyhow::Error::msg)?;
        let Some(quantity) = quantity else {
            bail!("override '{raw}' needs a quantity (ITEM=QTY)");
        };
        let suggestion = suggestions
            .iter_mut()
            .find(|s| s.item_id == id)
            .with_context(|| format!("no suggestion for item {id}"))?;
        suggestion.reorder_quantity = quantity;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use vanstock_core::ItemId;

    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    async fn run_args(config: &Config, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("vanstock").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(cli, config, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn assemble_then_reorder_by_formula() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let text = run_args(&config, &["assemble", "-c", "AU-1", "1=3"]).await.unwrap();
        assert!(text.contains("Kommission AU-1"));
        assert!(text.contains("3x Rollenbock SPU (Art.-Nr.: 63637)"));

        let text = run_args(&config, &["reorder", "--formula-only", "--json"]).await.unwrap();
        let suggestions: Vec<ReorderSuggestion> = serde_json::from_str(&text).unwrap();
        assert_eq!(suggestions[0].item_id, ItemId::from("1"));
        assert_eq!(suggestions[0].reorder_quantity, 5);
    }

    #[tokio::test]
    async fn excluded_lines_are_reported_after_the_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let text = run_args(&config, &["assemble", "-c", "AU-4", "1=1", "5=2"]).await.unwrap();

        let saved = text.find("Montage gespeichert").unwrap();
        let warning = text
            .find("Nicht genügend Lagerbestand: Für Garagentor-Feder L700 sind nur noch 1 Stück verfügbar.")
            .unwrap();
        assert!(saved < warning);
        assert!(!text.contains("x Garagentor-Feder"));
    }

    #[tokio::test]
    async fn bare_item_uses_increment_step() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        run_args(&config, &["assemble", "-c", "AU-2", "3"]).await.unwrap();

        let text = run_args(&config, &["stock", "--search", "SML", "--json"]).await.unwrap();
        assert!(text.contains("\"currentStock\": 35"));
    }

    #[tokio::test]
    async fn overrides_and_mailto() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            order_email: Some("buero@example.de".to_string()),
            ..config_in(dir.path())
        };

        let text = run_args(&config, &["reorder", "--formula-only", "--set", "3=50", "--set", "4=0", "--mailto"])
            .await
            .unwrap();

        assert!(text.contains("50x Schrauben-Set TX-30"));
        assert!(!text.contains("Dübel"));
        assert!(text.contains("mailto:buero%40example.de?subject="));
    }

    #[tokio::test]
    async fn item_edit_keeps_unspecified_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        run_args(&config, &["item", "edit", "5", "--target", "6"]).await.unwrap();

        let text = run_args(&config, &["item", "list", "--search", "feder", "--json"]).await.unwrap();
        assert!(text.contains("\"targetStock\": 6"));
        assert!(text.contains("\"articleNumber\": \"FDR-L700\""));
        assert!(text.contains("\"currentStock\": 1"));
    }

    #[tokio::test]
    async fn missing_item_is_an_error_and_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let err = run_args(&config, &["assemble", "-c", "AU-3", "1=1", "Z=1"]).await.unwrap_err();
        assert!(format!("{err:#}").contains("item Z not found"));
        assert!(!dir.path().join("assemblies.json").exists());
    }
}
