use std::path::PathBuf;

/// Everything the supervisor needs to launch the primary executor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Full path to the executor binary.
    pub executor: PathBuf,
    /// `--libc=` model passed through unmodified.
    pub libc: String,
    /// Well-known scratch path the replay-side POSIX model writes its dump
    /// to; forwarded to the replay driver.
    pub dump_scratch_path: PathBuf,
}

impl SupervisorConfig {
    pub fn new(executor: PathBuf, libc: impl Into<String>, dump_scratch_path: PathBuf) -> Self {
        Self {
            executor,
            libc: libc.into(),
            dump_scratch_path,
        }
    }
}
