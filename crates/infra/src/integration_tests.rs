//! Integration tests for the full stock pipeline.
//!
//! Tests: request → StockService → JsonFileStore → EventBus → subscriber,
//! then reorder planning and the e-mail built from it.
//!
//! Verifies:
//! - committed assemblies survive a restart and update the reorder suggestions
//! - failed calls leave files and subscribers untouched
//! - the advisory path never escapes the replenishment bounds

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::Utc;
    use tokio_util::sync::CancellationToken;

    use vanstock_core::ItemId;
    use vanstock_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};
    use vanstock_inventory::{
        ApplyError, AssemblyRequest, ConsumptionRequest, InventoryEvent, ShortfallPolicy, StockLedgerEngine,
        compute_reorder_quantities,
    };

    use crate::reorder_email::ReorderEmail;
    use crate::reorder_planner::{ReorderPlanner, VelocityAdvisor};
    use crate::section::Section;
    use crate::service::{ServiceError, StockService};
    use crate::snapshot_store::JsonFileStore;

    type Bus = Arc<InMemoryEventBus<EventEnvelope<InventoryEvent>>>;

    fn setup(dir: &std::path::Path, policy: ShortfallPolicy) -> (StockService<JsonFileStore, Bus>, Arc<Mutex<Vec<String>>>) {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        // Subscribe before anything is published.
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<()>();
        let bus_clone = bus.clone();
        let seen_clone = seen.clone();
        std::thread::spawn(move || {
            let sub = bus_clone.subscribe();
            let _ = ready_tx.send(());
            while let Ok(envelope) = sub.recv() {
                seen_clone.lock().unwrap().push(envelope.payload().event_type().to_string());
            }
        });
        let _ = ready_rx.recv_timeout(Duration::from_secs(1));

        let service = StockService::new(JsonFileStore::new(dir), bus, StockLedgerEngine::new(policy));
        (service, seen)
    }

    /// The subscriber thread handles events asynchronously.
    fn wait_for_processing() {
        std::thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn assembly_updates_stock_ledger_and_reorder_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let (service, seen) = setup(dir.path(), ShortfallPolicy::ExcludeLine);

        let receipt = service
            .record_assembly(
                Section::AssemblyMaterial,
                &AssemblyRequest::new("AU-1", ConsumptionRequest::new().with("1", 3)),
            )
            .unwrap();
        assert_eq!(receipt.assembly.items()[0].quantity_consumed, 3);

        wait_for_processing();
        assert_eq!(*seen.lock().unwrap(), vec!["inventory.assembly.recorded"]);

        // Fresh service over the same directory.
        let (restarted, _) = setup(dir.path(), ShortfallPolicy::ExcludeLine);
        let (items, history) = restarted.reorder_inputs(Section::AssemblyMaterial).unwrap();
        let rollenbock = items.iter().find(|i| i.id_typed().as_str() == "1").unwrap();
        assert_eq!(rollenbock.current_stock(), 5);
        assert_eq!(history.len(), 1);

        let suggestions = compute_reorder_quantities(&items, &history);
        assert_eq!(suggestions[0].item_id, ItemId::from("1"));
        assert_eq!(suggestions[0].reorder_quantity, 5);
    }

    #[test]
    fn abort_policy_rejects_whole_assembly_on_shortfall() {
        let dir = tempfile::tempdir().unwrap();
        let (service, seen) = setup(dir.path(), ShortfallPolicy::AbortTransaction);

        let err = service
            .record_assembly(
                Section::AssemblyMaterial,
                &AssemblyRequest::new("AU-2", ConsumptionRequest::new().with("1", 1).with("5", 5)),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Apply(ApplyError::InsufficientStock { available: 1, requested: 5, .. })
        ));
        wait_for_processing();
        assert!(seen.lock().unwrap().is_empty());
        assert!(!dir.path().join("items.json").exists());
        assert!(!dir.path().join("assemblies.json").exists());
    }

    #[test]
    fn sections_share_one_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = setup(dir.path(), ShortfallPolicy::ExcludeLine);

        service
            .record_assembly(Section::SpareParts, &AssemblyRequest::new("AU-3", ConsumptionRequest::new().with("sp-1", 1)))
            .unwrap();
        service
            .record_assembly(Section::AssemblyMaterial, &AssemblyRequest::new("AU-4", ConsumptionRequest::new().with("4", 10)))
            .unwrap();

        let commissions: Vec<_> = service
            .assemblies()
            .unwrap()
            .iter()
            .map(|a| a.commission().to_string())
            .collect();
        assert_eq!(commissions, vec!["AU-4", "AU-3"]);
        assert_eq!(service.items(Section::Tools).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn advised_reorder_stays_within_bounds_and_renders_email() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = setup(dir.path(), ShortfallPolicy::ExcludeLine);
        service
            .record_assembly(
                Section::AssemblyMaterial,
                &AssemblyRequest::new("AU-5", ConsumptionRequest::new().with("3", 40).with("5", 1)),
            )
            .unwrap();

        let (items, history) = service.reorder_inputs(Section::AssemblyMaterial).unwrap();
        let planner = ReorderPlanner::new(VelocityAdvisor::default(), Duration::from_secs(5));
        let plan = planner.plan(&items, &history, Utc::now(), &CancellationToken::new()).await;

        assert!(plan.is_advised());
        let formula = compute_reorder_quantities(&items, &history);
        for (advised, ceiling) in plan.suggestions.iter().zip(formula.iter()) {
            assert_eq!(advised.item_id, ceiling.item_id);
            assert!(advised.reorder_quantity <= ceiling.reorder_quantity);
        }

        let email = ReorderEmail::compose(&plan.suggestions, &items).with_recipient(Some("buero@example.de".to_string()));
        assert!(email.mailto_uri().starts_with("mailto:buero%40example.de?subject=Nachbestellung"));
        assert!(email.body().contains("(Art.-Nr.: FDR-L700)"));
    }
}
