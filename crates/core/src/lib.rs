pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{OutreachError, OutreachResult};
pub use types::{Campaign, ConnectionRecord, ConnectionStatus, StatusRow, TimeRange};
