pub mod config;
pub mod events;
pub mod input;
pub mod phase;

pub use config::AgentConfig;
pub use events::AgentEvent;
pub use input::AgentInput;
pub use phase::RunPhase;
