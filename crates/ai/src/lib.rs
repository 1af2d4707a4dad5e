//! `vanstock-ai`
//!
//! **Responsibility:** advisory reorder estimation.
//!
//! This crate is **not** part of the stock domain:
//! - It must not depend on the inventory crate; inputs arrive as plain snapshots.
//! - It must not mutate stock.
//! - Its proposals are untrusted. Callers clamp them before use.

pub mod job;
pub mod result;
pub mod snapshot;
pub mod velocity;

pub use job::AiJob;
pub use result::{AdvisoryError, AiResult, ProposedQuantity};
pub use snapshot::{ConsumptionSnapshot, ItemSnapshot, StockSnapshot};
pub use velocity::ConsumptionVelocityAdvisor;
