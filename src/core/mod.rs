pub mod filter;
pub mod journal;
pub mod orchestrator;
pub mod pipeline;
pub mod rotation;
pub mod scheduler;
pub mod store;
