use std::collections::HashMap;

use chrono::Duration;
use serde_json::json;

use crate::job::AiJob;
use crate::result::{AdvisoryError, AiResult, ProposedQuantity};
use crate::snapshot::{ItemSnapshot, StockSnapshot};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;
pub const DEFAULT_COVERAGE_DAYS: u32 = 30;

/// Consumption-velocity reorder advisor.
///
/// Model:
/// - Sum each item's consumption inside the lookback window ending at `as_of`.
/// - Daily rate = sum / lookback days.
/// - Propose enough stock to cover `coverage_days` at that rate, minus what is
///   on hand, rounded up to the item's increment step.
///
/// Items with no consumption in the window get no proposal.
#[derive(Debug, Clone)]
pub struct ConsumptionVelocityAdvisor {
    input: StockSnapshot,
    lookback_days: u32,
    coverage_days: u32,
}

impl ConsumptionVelocityAdvisor {
    pub fn new(input: StockSnapshot) -> Self {
        Self {
            input,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            coverage_days: DEFAULT_COVERAGE_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_coverage_days(mut self, days: u32) -> Self {
        self.coverage_days = days;
        self
    }

    fn consumed_in_window(&self) -> HashMap<&str, u64> {
        let window_start = self.input.as_of - Duration::days(i64::from(self.lookback_days));
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for entry in &self.input.history {
            if entry.date > window_start && entry.date <= self.input.as_of {
                *totals.entry(entry.item_id.as_str()).or_default() += u64::from(entry.quantity);
            }
        }
        totals
    }

    fn propose(&self, item: &ItemSnapshot, consumed: u64) -> ProposedQuantity {
        let lookback = u64::from(self.lookback_days);
        // Integer ceil of consumed * coverage / lookback.
        let projected = (consumed * u64::from(self.coverage_days)).div_ceil(lookback);
        let need = projected as i64 - i64::from(item.current_stock);

        let quantity = if need <= 0 {
            0
        } else {
            let step = i64::from(item.increment_step.max(1));
            (need + step - 1) / step * step
        };

        ProposedQuantity {
            item_id: item.item_id.clone(),
            quantity,
            daily_rate: consumed as f64 / lookback as f64,
        }
    }
}

impl AiJob for ConsumptionVelocityAdvisor {
    type Input = StockSnapshot;

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<AiResult, AdvisoryError> {
        if self.lookback_days == 0 {
            return Err(AdvisoryError::InvalidInput("lookback window must be at least one day".to_string()));
        }
        if self.coverage_days == 0 {
            return Err(AdvisoryError::InvalidInput("coverage horizon must be at least one day".to_string()));
        }

        let totals = self.consumed_in_window();
        let proposals: Vec<ProposedQuantity> = self
            .input
            .items
            .iter()
            .filter_map(|item| totals.get(item.item_id.as_str()).map(|c| self.propose(item, *c)))
            .collect();

        let samples = self.input.history.len();
        let confidence = (samples as f64 / 20.0).min(1.0);

        Ok(AiResult::new(proposals, confidence)
            .with_explanation(format!(
                "{} item(s) with consumption in the last {} days, sized to cover {} days",
                totals.len(),
                self.lookback_days,
                self.coverage_days
            ))
            .with_metadata(json!({
                "kind": "reorder.consumption_velocity",
                "lookback_days": self.lookback_days,
                "coverage_days": self.coverage_days,
                "samples": samples,
            })))
    }
}
