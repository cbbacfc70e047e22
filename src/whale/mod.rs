mod cancel;
mod config;
mod detector;
mod entry;
mod error;
mod monitor;
mod seen;
mod types;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::{default_threshold, MonitorConfig};
pub use detector::ThresholdFilter;
pub use entry::{monitor_solana, monitor_solana_with};
pub use error::MonitorError;
pub use monitor::{MonitorLoop, MonitorReport, MonitorState, StopReason};
pub use seen::SeenSet;
pub use types::WhaleEvent;
