pub mod actions;
pub mod catalog;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod remote;
pub mod runtime;
pub mod session;
pub mod surface;
pub mod upload;

pub use config::RuntimeConfig;
pub use runtime::{RuntimeSession, RuntimeSnapshot};
