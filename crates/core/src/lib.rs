pub mod config;
pub mod target;
pub mod telemetry;

pub use config::{AccountConfig, Config, ConfigError, DebugConfig, LoggingConfig};
pub use target::{GroupChatTarget, MessageTarget, TargetError, TargetKind, UserTarget};
pub use telemetry::TelemetryError;
