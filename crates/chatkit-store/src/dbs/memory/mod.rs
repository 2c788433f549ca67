mod client;
mod log;

pub use client::MemoryStore;
