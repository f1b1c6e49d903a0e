//! Template-header stripping and line-number remapping.
//!
//! Legacy JavaScript files in the projects this tool targets open with a PHP
//! template block (`<?php ... ?>`) that injects server-side values before the
//! actual script. JS linters choke on it, so the header is stripped into a
//! temp file before linting and any reported line numbers are shifted back
//! to match the original file.

use std::path::Path;

/// Source with its leading template header removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedSource {
    /// The remaining source, starting at the first non-header line.
    pub content: String,
    /// Number of whole lines removed from the top of the file.
    pub offset: usize,
}

const OPEN_TAG: &str = "<?php";
const CLOSE_TAG: &str = "?>";

/// Strips a leading `<?php ... ?>` block from `source`.
///
/// The header must start at byte 0. The close tag and any whitespace directly
/// following it are consumed, and `offset` counts exactly the lines removed,
/// so `reported_line + offset` is the line in the original file.
///
/// Returns `None` when there is no header, or when the close tag never
/// appears (the file is then linted as-is).
pub fn strip_template_header(source: &str) -> Option<StrippedSource> {
    if !source.starts_with(OPEN_TAG) {
        return None;
    }

    let close = source.find(CLOSE_TAG)?;
    let header_end = close + CLOSE_TAG.len();

    // Consume whitespace after the close tag, stopping right after the last
    // newline so the remaining content starts at a line boundary.
    let rest = &source[header_end..];
    let trailing_ws = rest.len() - rest.trim_start().len();
    let consumed_ws = &rest[..trailing_ws];
    let last_newline = consumed_ws.rfind('\n').map(|i| i + 1).unwrap_or(0);

    let stripped_at = header_end + last_newline;
    let offset = source[..stripped_at].matches('\n').count();

    Some(StrippedSource {
        content: source[stripped_at..].to_string(),
        offset,
    })
}

/// Rewrites one line of linter output produced against a stripped temp file.
///
/// Looks for `temp_path:LINE` in the line, substitutes `original` for the
/// temp path, and adds `offset` to the line number. Lines that do not carry
/// a location still get the path substituted so no temp paths leak into the
/// report.
pub fn remap_line(line: &str, temp_path: &Path, original: &Path, offset: usize) -> String {
    let temp = temp_path.to_string_lossy();
    let Some(at) = line.find(temp.as_ref()) else {
        return line.to_string();
    };

    let after = &line[at + temp.len()..];
    let original = original.display();

    if let Some(rest) = after.strip_prefix(':') {
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(reported) = digits.parse::<usize>() {
            let tail = &rest[digits.len()..];
            return format!(
                "{}{}:{}{}",
                &line[..at],
                original,
                reported + offset,
                tail
            );
        }
    }

    format!("{}{}{}", &line[..at], original, after)
}
