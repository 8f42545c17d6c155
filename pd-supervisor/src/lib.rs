//! Supervisor (§4.8): owns the campaign output directory and the lifetime of
//! the executor, the test-file watcher, and the replay driver.

pub mod config;
pub mod invoke;
pub mod outdir;
pub mod priorities;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use supervisor::{run, CampaignReport};
