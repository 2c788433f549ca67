use chatkit_llm::Message;

/// What a run sees: the thread it answers in and the conversation so far.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInput {
    pub thread_id: String,
    /// Prior conversation, oldest first
    pub messages: Vec<Message>,
    /// Overrides the configured model for this run
    pub model: Option<String>,
}

impl AgentInput {
    pub fn new(thread_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}
