use std::path::PathBuf;

/// Everything the driver needs to shell out to the executor in replay mode,
/// independent of which test or which module is being replayed.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Full path to the executor binary (resolved from the installation
    /// directory named by the required environment variable, see §6).
    pub executor: PathBuf,
    /// `--libc=` model passed through unmodified.
    pub libc: String,
    /// Well-known scratch path the replay-side POSIX model writes its dump
    /// to. The driver serializes replays (§5) so a single fixed path never
    /// sees concurrent writers, but it is still configurable per the
    /// "parameterize the path per replay" refinement in §9.
    pub dump_scratch_path: PathBuf,
    /// Directory the executor wrote ktest files into (the primary run's
    /// `klee-out/`). The queue carries bare file names; this is joined with
    /// each name to build the `--replay-ktest-file` argument.
    pub ktest_dir: PathBuf,
}

impl ReplayConfig {
    pub fn new(executor: PathBuf, libc: impl Into<String>, dump_scratch_path: PathBuf, ktest_dir: PathBuf) -> Self {
        Self {
            executor,
            libc: libc.into(),
            dump_scratch_path,
            ktest_dir,
        }
    }
}
