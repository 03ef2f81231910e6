//! The unit of work the pipeline driver sequences.

use wikiresearch_shared::{ResearchState, Result};

/// One step of the research pipeline.
///
/// A stage reads what it needs from the shared [`ResearchState`] and writes
/// its output back into it. Expected failures (empty input, provider faults)
/// are recorded in the state; an `Err` means something unexpected happened
/// and the driver abandons the run.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Human-readable progress message shown while the stage runs.
    fn label(&self) -> &'static str;

    async fn run(&self, state: &mut ResearchState) -> Result<()>;
}
