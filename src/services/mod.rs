//! Long-lived services: the scan orchestrator and its scheduler.

pub mod scanner;

pub use scanner::{run_scheduler, Scanner};
