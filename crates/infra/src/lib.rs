//! Infrastructure layer: configuration, snapshot persistence, service
//! orchestration and the advisory reorder pipeline.

pub mod config;
pub mod reorder_email;
pub mod reorder_planner;
pub mod section;
pub mod seed;
pub mod service;
pub mod snapshot_store;

mod integration_tests;

pub use config::{Config, ConfigError};
pub use reorder_email::ReorderEmail;
pub use reorder_planner::{PlanSource, ReorderAdvisor, ReorderPlan, ReorderPlanner, VelocityAdvisor};
pub use section::Section;
pub use service::{ServiceError, ServiceResult, StockService};
pub use snapshot_store::{InMemorySnapshotStore, JsonFileStore, SnapshotStore, StoreError};
