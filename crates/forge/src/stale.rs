//! Target staleness: modification-time comparison against dependency lists,
//! and extraction of dependency paths from `cc -MD`-style rule files.

use std::io;
use std::path::{Path, PathBuf};

/// Returns `true` if `target` must be rebuilt: it does not exist, or any
/// dependency is newer than it. A dependency that cannot be stat'd is a hard
/// error rather than a silent rebuild.
pub fn needs_rebuild(target: &Path, deps: &[PathBuf]) -> io::Result<bool> {
    let target_mtime = match std::fs::metadata(target) {
        Ok(meta) => meta.modified()?,
        Err(_) => return Ok(true),
    };

    for dep in deps {
        let meta = std::fs::metadata(dep).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!(
                    "dependency `{}` for target `{}` cannot be accessed: {err}",
                    dep.display(),
                    target.display()
                ),
            )
        })?;
        if meta.modified()? > target_mtime {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Extracts the whitespace-separated dependency paths after the first `:` of
/// a make-style rule line. A line with no `:` has no dependencies.
pub fn parse_depfile_line(line: &str) -> Vec<String> {
    let Some((_, rest)) = line.split_once(':') else {
        return Vec::new();
    };
    rest.split_whitespace()
        .filter(|token| *token != "\\")
        .map(str::to_owned)
        .collect()
}

/// Reads a `-MD`-style depfile, folding backslash line continuations before
/// extracting paths from each rule line.
pub fn read_depfile(path: &Path) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    let folded = text.replace("\\\r\n", " ").replace("\\\n", " ");
    Ok(folded.lines().flat_map(parse_depfile_line).collect())
}

#[cfg(test)]
#[path = "./stale_tests.rs"]
mod tests;
