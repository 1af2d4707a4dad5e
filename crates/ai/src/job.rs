use crate::result::{AdvisoryError, AiResult};

/// One advisory inference unit.
///
/// Jobs receive a snapshot through their `Input` type. This crate stays
/// storage-agnostic: inputs are assembled by callers (infra).
pub trait AiJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;

    /// The snapshot the job will run inference on.
    fn input(&self) -> &Self::Input;

    /// Run inference and return proposals.
    ///
    /// Must not mutate stock.
    fn run(&self) -> Result<AiResult, AdvisoryError>;
}
