//! Dump-file handling (§4.7, §6): after a replay exits, its observable-write
//! trace is moved from the well-known scratch path into that replay's output
//! directory, or an empty dump is substituted if the program wrote nothing.

use pd_common::{PatchError, PatchResult};
use std::path::{Path, PathBuf};

pub const DUMP_FILE_NAME: &str = "dump.txt";

/// Move (or create empty) the dump for one replay into `dest_dir`. Returns
/// the path of the collected dump.
pub fn collect_dump(scratch_path: &Path, dest_dir: &Path) -> PatchResult<PathBuf> {
    let dest = dest_dir.join(DUMP_FILE_NAME);
    if scratch_path.exists() {
        if std::fs::rename(scratch_path, &dest).is_err() {
            // scratch and dest may live on different filesystems.
            std::fs::copy(scratch_path, &dest).map_err(|e| {
                PatchError::filesystem(format!(
                    "failed to copy dump {} to {}: {e}",
                    scratch_path.display(),
                    dest.display()
                ))
            })?;
            let _ = std::fs::remove_file(scratch_path);
        }
    } else {
        std::fs::write(&dest, []).map_err(|e| {
            PatchError::filesystem(format!("failed to create empty dump {}: {e}", dest.display()))
        })?;
    }
    Ok(dest)
}

/// Two dumps differ iff any corresponding line is unequal or one stream is
/// longer than the other.
pub fn dumps_differ(a: &Path, b: &Path) -> PatchResult<bool> {
    let a_lines = read_lines(a)?;
    let b_lines = read_lines(b)?;
    if a_lines.len() != b_lines.len() {
        return Ok(true);
    }
    Ok(a_lines.iter().zip(b_lines.iter()).any(|(x, y)| x != y))
}

fn read_lines(path: &Path) -> PatchResult<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PatchError::filesystem(format!("failed to read dump {}: {e}", path.display())))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_scratch_file_yields_empty_dump() {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch-dump");
        let dest_dir = dir.path().join("PATCHED");
        std::fs::create_dir_all(&dest_dir).unwrap();

        let dump = collect_dump(&scratch, &dest_dir).unwrap();
        assert_eq!(std::fs::read_to_string(dump).unwrap(), "");
    }

    #[test]
    fn existing_scratch_file_is_moved_into_dest() {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch-dump");
        std::fs::write(&scratch, "line one\nline two\n").unwrap();
        let dest_dir = dir.path().join("ORIGINAL");
        std::fs::create_dir_all(&dest_dir).unwrap();

        let dump = collect_dump(&scratch, &dest_dir).unwrap();
        assert!(!scratch.exists());
        assert_eq!(std::fs::read_to_string(dump).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn identical_dumps_do_not_differ() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "x\ny\n").unwrap();
        std::fs::write(&b, "x\ny\n").unwrap();
        assert!(!dumps_differ(&a, &b).unwrap());
    }

    #[test]
    fn extra_trailing_line_counts_as_a_difference() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "x\ny\n").unwrap();
        std::fs::write(&b, "x\n").unwrap();
        assert!(dumps_differ(&a, &b).unwrap());
    }

    #[test]
    fn mismatched_line_counts_as_a_difference() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "x\ny\n").unwrap();
        std::fs::write(&b, "x\nz\n").unwrap();
        assert!(dumps_differ(&a, &b).unwrap());
    }
}
