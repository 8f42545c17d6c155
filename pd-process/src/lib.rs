//! Process spawning shared by the supervisor (spawning the executor) and the
//! replay driver (spawning sequential replay children).

pub mod process;

pub use process::{ExitStatus, Process, ProcessBuilder};

use pd_common::PatchResult;

/// Initialize the process management subsystem: installs the SIGPIPE
/// handling every child-spawning call site relies on. Call once at startup,
/// before the first process is spawned.
pub fn initialize() -> PatchResult<()> {
    process::setup_signal_handlers()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_module_exports() {
        let _ = ProcessBuilder::new("test");
    }
}