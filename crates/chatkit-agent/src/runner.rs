use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::{AgentEvent, AgentInput};

/// Seam between the request handler and whatever produces assistant output.
pub trait AgentRunner: Send + Sync {
    /// Spawn a run in the background and return its event receiver.
    ///
    /// The run stops emitting once `cancel` fires or the receiver is dropped.
    /// A receiver yields the events of exactly one run.
    fn spawn_run(&self, input: AgentInput, cancel: CancellationToken)
        -> mpsc::Receiver<AgentEvent>;
}
