//! Colored rendering of version diffs

use owo_colors::OwoColorize;

/// Colorize a plain unified diff
///
/// Hunk headers are cyan, additions green, deletions red and context dimmed.
/// File headers (`---`/`+++`) are bold.
pub fn colorize_unified(diff: &str) -> String {
    let mut output = String::with_capacity(diff.len() * 2);

    for line in diff.lines() {
        let styled = if line.starts_with("---") || line.starts_with("+++") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('\\') {
            line.yellow().to_string()
        } else {
            line.dimmed().to_string()
        };
        output.push_str("    ");
        output.push_str(&styled);
        output.push('\n');
    }

    output
}
