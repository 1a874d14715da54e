//! TempSweep: periodically empties configured folders and keeps itself
//! registered to start at login, if the operator asked for it.

pub mod disk;
pub mod logging;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod utils;

pub use disk::temp_files::Cleaner;
pub use disk::{SweepFailure, SweepReport};
pub use scheduler::config::{ConfigError, DeleteMode, ScheduleConfig, TargetSpec};
pub use scheduler::Scheduler;
pub use services::{RegistrationState, StartupRegistrar};
pub use settings::AgentSettings;
