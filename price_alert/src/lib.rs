//! # Price Alert
//!
//! The electricity price monitoring pipeline. An [`Orchestrator`] collects a
//! price sample, updates the rolling analysis, asks the forecasting engine
//! for a short-term prediction calibrated by user feedback, and decides with
//! a [`NotificationPolicy`] whether the user should be alerted.
//!
//! ```no_run
//! use price_alert::{InMemoryStore, LogNotifier, MonitorConfig, Orchestrator, SyntheticCollector};
//! use std::sync::Arc;
//!
//! # async fn run() -> price_alert::Result<()> {
//! let config = MonitorConfig::default();
//! let orchestrator = Orchestrator::new(
//!     &config,
//!     Arc::new(SyntheticCollector::new(3.0, 0.2)),
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(LogNotifier),
//! )?;
//!
//! let report = orchestrator.run_cycle().await;
//! println!("{:?}", report.status);
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod collectors;
pub mod config;
pub mod error;
pub mod logging;
pub mod modules;
pub mod notifier;
pub mod orchestrator;
pub mod policy;
pub mod store;

pub use collaborators::{Notification, Notifier, PersistenceProvider, PriceCollector, StoreSession};
pub use collectors::{ReplayCollector, SyntheticCollector};
pub use config::{MonitorConfig, SyntheticFeedConfig, MAX_WINDOW_HOURS};
pub use error::{AlertError, Result};
pub use logging::init_logging;
pub use modules::{Module, ModuleContext, ModuleKind, ModuleRegistry};
pub use notifier::LogNotifier;
pub use orchestrator::{CycleReport, CycleStage, CycleStatus, Orchestrator};
pub use policy::{AlertReasons, NotificationPolicy, PolicyThresholds};
pub use store::{InMemorySession, InMemoryStore, Retention};
