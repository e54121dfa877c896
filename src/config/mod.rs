//! Configuration loading and management for the payroll engine.
//!
//! This module loads engine settings (the event's UTC offset and the
//! "undecided" time-range sentinels) and posting pay policies from YAML files.
//! Pay policies also arrive inline in calculation requests, so the same types
//! deserialize from JSON.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("UTC offset: {}", config.settings().offset());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceBasis, AllowanceDefaults, EngineSettings, PayPolicy, PostedPayType, PostedRate,
    PostingBenefits,
};
