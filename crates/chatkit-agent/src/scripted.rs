use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::runner::AgentRunner;
use crate::types::{AgentEvent, AgentInput};

/// Runner that replays a fixed list of events.
///
/// Stands in for the model in tests and offline demos. Every input it is
/// given is recorded and can be inspected with [`ScriptedRunner::inputs`].
#[derive(Clone)]
pub struct ScriptedRunner {
    events: Vec<AgentEvent>,
    delay: Duration,
    inputs: Arc<Mutex<Vec<AgentInput>>>,
}

impl ScriptedRunner {
    pub fn new(events: Vec<AgentEvent>) -> Self {
        Self {
            events,
            delay: Duration::ZERO,
            inputs: Arc::default(),
        }
    }

    /// A successful run streaming `chunks` as a single message.
    pub fn from_chunks(chunks: &[&str]) -> Self {
        let mut events = vec![AgentEvent::Started {
            run_id: "run_scripted".to_string(),
        }];
        events.extend(chunks.iter().map(|chunk| AgentEvent::delta(*chunk)));
        events.push(AgentEvent::MessageDone);
        events.push(AgentEvent::Completed { duration_ms: 0 });
        Self::new(events)
    }

    /// A run that streams `chunks` and then fails mid-message.
    pub fn failing(chunks: &[&str], message: impl Into<String>) -> Self {
        let mut events = vec![AgentEvent::Started {
            run_id: "run_scripted".to_string(),
        }];
        events.extend(chunks.iter().map(|chunk| AgentEvent::delta(*chunk)));
        events.push(AgentEvent::Error {
            message: message.into(),
        });
        Self::new(events)
    }

    /// Pause before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inputs(&self) -> Vec<AgentInput> {
        self.inputs
            .lock()
            .map(|inputs| inputs.clone())
            .unwrap_or_default()
    }
}

impl AgentRunner for ScriptedRunner {
    fn spawn_run(
        &self,
        input: AgentInput,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<AgentEvent> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input);
        }

        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        let events = self.events.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if cancel.is_cancelled() {
                    return;
                }

                let terminal = event.is_terminal();
                if tx.send(event).await.is_err() || terminal {
                    return;
                }
            }
        });

        rx
    }
}
