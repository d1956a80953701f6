//! Caret-annotated error reports.
//!
//! Reconstructs the offending source line around an [`Error`]'s span and
//! renders it with its neighbours, a caret run under the failing token, and
//! the substituted message. The library only builds the text; printing it to
//! stderr and exiting is the caller's move.

use std::fmt::Write;
use std::path::Path;

use crate::error::Error;

/// Longest printable source line; anything beyond is cut at a character
/// boundary.
pub const MAX_RENDER_LINE: usize = 256;

/// Renders a full report for `err` against the source text it came from.
///
/// `origin` is the file name shown in the location line, when known. For
/// errors with no usable span (file-level failures), only the message line is
/// produced.
pub fn render(err: &Error, source: &str, origin: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "error[{}]: {}", err.kind, err);

    if source.is_empty() || (err.span.is_empty() && err.line_info.is_none()) {
        if let Some(origin) = origin {
            let _ = writeln!(out, "  --> {origin}");
        }
        return out;
    }

    let mut pos = (err.span.start as usize).min(source.len());
    while pos > 0 && !source.is_char_boundary(pos) {
        pos -= 1;
    }

    let line_start = match source[..pos].rfind('\n') {
        Some(i) => i + 1,
        None => 0,
    };
    let line_end = match source[pos..].find('\n') {
        Some(i) => pos + i,
        None => source.len(),
    };
    let line_num = source[..line_start].matches('\n').count() + 1;
    let column = pos - line_start + 1;

    if let Some(origin) = origin {
        let _ = writeln!(out, "  --> {origin}:{line_num}:{column}");
    }

    let gutter = digits(line_num + 1).max(3);

    if line_start > 0 {
        let prev_end = line_start - 1;
        let prev_start = match source[..prev_end].rfind('\n') {
            Some(i) => i + 1,
            None => 0,
        };
        let text = clamp(&source[prev_start..prev_end]);
        let _ = writeln!(out, "{:>gutter$} | {}", line_num - 1, text);
    }

    let _ = writeln!(
        out,
        "{:>gutter$} | {}",
        line_num,
        clamp(&source[line_start..line_end])
    );

    let caret_col = (pos - line_start).min(MAX_RENDER_LINE);
    let caret_len = err
        .span
        .len()
        .clamp(1, (line_end - pos).max(1))
        .min(MAX_RENDER_LINE - caret_col.min(MAX_RENDER_LINE - 1));
    let _ = writeln!(
        out,
        "{:>gutter$} | {}{}",
        "",
        " ".repeat(caret_col),
        "^".repeat(caret_len)
    );

    if line_end < source.len() {
        let next_start = line_end + 1;
        let next_end = match source[next_start..].find('\n') {
            Some(i) => next_start + i,
            None => source.len(),
        };
        if next_start < next_end {
            let text = clamp(&source[next_start..next_end]);
            let _ = writeln!(out, "{:>gutter$} | {}", line_num + 1, text);
        }
    }

    out
}

/// Convenience for file-backed parses: re-reads the file to recover the
/// source text for rendering. Chunked parsing keeps no copy of the input, and
/// on this path the process is about to exit anyway.
pub fn report(err: &Error, path: &Path) -> String {
    let source = std::fs::read_to_string(path).unwrap_or_default();
    let origin = path.display().to_string();
    render(err, &source, Some(&origin))
}

fn clamp(line: &str) -> &str {
    if line.len() <= MAX_RENDER_LINE {
        return line;
    }
    let mut cut = MAX_RENDER_LINE;
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }
    &line[..cut]
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

#[cfg(test)]
#[path = "./diag_tests.rs"]
mod tests;
