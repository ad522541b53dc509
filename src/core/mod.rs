// Core check logic: threshold ranges, evaluation and agent collection

pub mod config;
pub mod counter_client;
pub mod evaluator;
pub mod severity;
pub mod threshold;
pub mod validation;

// Re-export commonly used items
pub use config::{CheckConfig, ConfigOverrides, FileConfig};
pub use counter_client::{AgentClient, CounterRequest, CounterResultItem, CounterSource};
pub use evaluator::{CheckRun, PerformanceData};
pub use severity::Severity;
pub use threshold::{RangeSpec, Thresholds};
