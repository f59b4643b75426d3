use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{LayerstackError, LayerstackResult};

/// Maximum number of candidate names tried before giving up with
/// [`LayerstackError::PathResolutionExhausted`].
pub const MAX_PATH_PROBES: usize = 10_000;

/// Create `dir` and any missing parents. Already-existing directories are not an error.
pub fn ensure_dir(dir: &Path) -> LayerstackResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    Ok(())
}

/// Pick an output path in `directory` for `base.extension`.
///
/// With `overwrite` the unsuffixed path is returned whether or not it exists. Otherwise the
/// candidates `base.ext`, `base_1.ext`, `base_2.ext`, ... are probed and the first one that does
/// not exist is returned. `directory` is created first.
///
/// Probing is not atomic: another process may claim the returned path before it is written.
/// Use [`create_output_file`] when that matters.
#[tracing::instrument(skip(directory), fields(directory = %directory.as_ref().display()))]
pub fn resolve_output_path(
    directory: impl AsRef<Path>,
    base: &str,
    extension: &str,
    overwrite: bool,
) -> LayerstackResult<PathBuf> {
    let directory = directory.as_ref();
    validate_base(base)?;
    ensure_dir(directory)?;

    if overwrite {
        return Ok(candidate(directory, base, extension, 0));
    }
    probe_free_path(directory, base, extension, MAX_PATH_PROBES)
}

fn probe_free_path(
    directory: &Path,
    base: &str,
    extension: &str,
    limit: usize,
) -> LayerstackResult<PathBuf> {
    for n in 0..limit {
        let path = candidate(directory, base, extension, n);
        let exists = path
            .try_exists()
            .with_context(|| format!("failed to probe '{}'", path.display()))?;
        if !exists {
            tracing::debug!(path = %path.display(), probes = n + 1, "output path resolved");
            return Ok(path);
        }
    }
    Err(exhausted(directory, base, limit))
}

/// Resolve and open an output file in one step.
///
/// Without `overwrite` each candidate is opened with create-if-absent semantics, so two
/// concurrent callers never receive the same path; a candidate that appears between probes is
/// skipped. With `overwrite` the unsuffixed path is created or truncated.
pub fn create_output_file(
    directory: impl AsRef<Path>,
    base: &str,
    extension: &str,
    overwrite: bool,
) -> LayerstackResult<(PathBuf, File)> {
    let directory = directory.as_ref();
    validate_base(base)?;
    ensure_dir(directory)?;

    if overwrite {
        let path = candidate(directory, base, extension, 0);
        let file = File::create(&path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        return Ok((path, file));
    }
    claim_free_file(directory, base, extension, MAX_PATH_PROBES)
}

fn claim_free_file(
    directory: &Path,
    base: &str,
    extension: &str,
    limit: usize,
) -> LayerstackResult<(PathBuf, File)> {
    for n in 0..limit {
        let path = candidate(directory, base, extension, n);
        match File::options().write(true).create_new(true).open(&path) {
            Ok(file) => {
                tracing::debug!(path = %path.display(), probes = n + 1, "output file claimed");
                return Ok((path, file));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to create '{}'", path.display()))
                    .into());
            }
        }
    }
    Err(exhausted(directory, base, limit))
}

fn candidate(directory: &Path, base: &str, extension: &str, n: usize) -> PathBuf {
    let stem = if n == 0 {
        base.to_string()
    } else {
        format!("{base}_{n}")
    };
    if extension.is_empty() {
        directory.join(stem)
    } else {
        directory.join(format!("{stem}.{extension}"))
    }
}

fn validate_base(base: &str) -> LayerstackResult<()> {
    if base.trim().is_empty() {
        return Err(LayerstackError::validation("output filename must be non-empty"));
    }
    if base.contains(['/', '\\']) {
        return Err(LayerstackError::validation(format!(
            "output filename '{base}' must not contain path separators"
        )));
    }
    Ok(())
}

fn exhausted(directory: &Path, base: &str, probes: usize) -> LayerstackError {
    LayerstackError::PathResolutionExhausted {
        directory: directory.to_path_buf(),
        base: base.to_string(),
        probes,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/output/path.rs"]
mod tests;
