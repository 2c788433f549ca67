pub mod agent;
pub mod builder;
pub mod input;
pub mod runner;
pub mod scripted;
pub mod streaming;
pub mod types;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use input::to_agent_input;
pub use runner::AgentRunner;
pub use scripted::ScriptedRunner;
pub use streaming::{stream_agent_response, EventStream};
pub use types::{AgentConfig, AgentEvent, AgentInput, RunPhase};
