//! Runs the advisory estimator around the reorder calculator.
//!
//! The advisor is optional and untrusted. Whatever happens to it (error,
//! timeout, cancellation) the planner still answers, using the deterministic
//! formula, and any advice it does get passes the calculator's clamp.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vanstock_ai::{AdvisoryError, AiJob, AiResult, ConsumptionSnapshot, ConsumptionVelocityAdvisor, ItemSnapshot, StockSnapshot};
use vanstock_core::ItemId;
use vanstock_inventory::{AdvisedQuantity, HistoricalConsumption, Item, ReorderContext, ReorderSuggestion};

/// Source of advisory reorder quantities.
#[async_trait]
pub trait ReorderAdvisor: Send + Sync {
    async fn advise(&self, snapshot: StockSnapshot) -> Result<AiResult, AdvisoryError>;
}

/// Consumption-velocity model run on the blocking pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VelocityAdvisor {
    pub lookback_days: u32,
    pub coverage_days: u32,
}

impl Default for VelocityAdvisor {
    fn default() -> Self {
        Self {
            lookback_days: vanstock_ai::velocity::DEFAULT_LOOKBACK_DAYS,
            coverage_days: vanstock_ai::velocity::DEFAULT_COVERAGE_DAYS,
        }
    }
}

#[async_trait]
impl ReorderAdvisor for VelocityAdvisor {
    async fn advise(&self, snapshot: StockSnapshot) -> Result<AiResult, AdvisoryError> {
        let job = ConsumptionVelocityAdvisor::new(snapshot)
            .with_lookback_days(self.lookback_days)
            .with_coverage_days(self.coverage_days);

        tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| AdvisoryError::Internal(format!("advisor task failed: {e}")))?
    }
}

/// Where the final quantities came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    /// Advisor answered; its proposals were clamped, the formula filled gaps.
    Advised,
    /// Advisor unavailable; pure formula. Carries the reason.
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    pub suggestions: Vec<ReorderSuggestion>,
    pub source: PlanSource,
}

impl ReorderPlan {
    pub fn is_advised(&self) -> bool {
        matches!(self.source, PlanSource::Advised)
    }
}

#[derive(Debug, Clone)]
pub struct ReorderPlanner<A> {
    advisor: A,
    timeout: Duration,
}

impl<A> ReorderPlanner<A>
where
    A: ReorderAdvisor,
{
    pub fn new(advisor: A, timeout: Duration) -> Self {
        Self { advisor, timeout }
    }

    /// One suggestion per item, in item order.
    pub async fn plan(
        &self,
        items: &[Item],
        history: &[HistoricalConsumption],
        as_of: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ReorderPlan {
        let context = ReorderContext::new(items, history);
        let snapshot = snapshot_of(&context, as_of);
        debug!(items = snapshot.items.len(), history = snapshot.history.len(), "requesting reorder advice");

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(AdvisoryError::Cancelled),
            answer = tokio::time::timeout(self.timeout, self.advisor.advise(snapshot)) => {
                answer.unwrap_or(Err(AdvisoryError::TimedOut(self.timeout)))
            }
        };

        match outcome {
            Ok(result) => {
                let advice: Vec<AdvisedQuantity> = result
                    .proposals
                    .iter()
                    .map(|p| AdvisedQuantity {
                        item_id: ItemId::new(p.item_id.clone()),
                        quantity: p.quantity,
                    })
                    .collect();
                info!(
                    proposals = advice.len(),
                    confidence = result.confidence,
                    "reorder advice applied"
                );
                ReorderPlan {
                    suggestions: context.suggestions_with_advice(&advice),
                    source: PlanSource::Advised,
                }
            }
            Err(e) => {
                warn!(error = %e, "reorder advice unavailable, using replenishment formula");
                ReorderPlan {
                    suggestions: context.suggestions(),
                    source: PlanSource::Fallback(e.to_string()),
                }
            }
        }
    }
}

fn snapshot_of(context: &ReorderContext<'_>, as_of: DateTime<Utc>) -> StockSnapshot {
    let items = context
        .items()
        .iter()
        .map(|item| ItemSnapshot {
            item_id: item.id_typed().to_string(),
            current_stock: item.current_stock(),
            target_stock: item.target_stock(),
            increment_step: item.increment_step(),
        })
        .collect();

    let history = context
        .usable_history()
        .into_iter()
        .map(|h| ConsumptionSnapshot {
            item_id: h.item_id.to_string(),
            quantity: h.quantity_consumed,
            date: h.date,
        })
        .collect();

    StockSnapshot::new(as_of, items, history)
}
