//! Compact, rustc-like diagnostics on stderr.

use colored::Colorize;
use genmachine::{Warning, line_col};

/// Render the `--> file:line:col` header, the offending line and a caret.
///
/// Without an offset only the file is named.
pub fn render_location(file: &str, source: &str, offset: Option<usize>) -> String {
    let Some(offset) = offset else {
        return format!("  {} {}", "-->".blue(), file);
    };
    let (line, col) = line_col(source, offset);
    let text = source.lines().nth(line - 1).unwrap_or("");
    let gutter = line.to_string().len();
    let pad = " ".repeat(gutter);
    format!(
        "{pad} {arrow} {file}:{line}:{col}\n{pad} {bar}\n{line} {bar} {text}\n{pad} {bar} {spaces}{caret}",
        arrow = "-->".blue(),
        bar = "|".blue(),
        spaces = " ".repeat(col - 1),
        caret = "^".red().bold(),
    )
}

pub fn report_error(file: &str, source: &str, offset: Option<usize>, message: &str) {
    eprintln!("{}: {}", "error".red().bold(), message.bold());
    eprintln!("{}", render_location(file, source, offset));
}

pub fn report_warning(file: &str, source: &str, generator: &str, warning: &Warning) {
    eprintln!(
        "{}: generator '{}': {}",
        "warning".yellow().bold(),
        generator,
        warning
    );
    if warning.offset().is_some() {
        eprintln!("{}", render_location(file, source, warning.offset()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_the_column() {
        colored::control::set_override(false);
        let src = "function* g() {\n    yield* xs;\n}\n";
        let rendered = render_location("gen.ts", src, Some(20));
        assert_eq!(
            rendered,
            "  --> gen.ts:2:5\n  |\n2 |     yield* xs;\n  |     ^"
        );
    }

    #[test]
    fn missing_offset_names_only_the_file() {
        colored::control::set_override(false);
        assert_eq!(render_location("gen.ts", "", None), "  --> gen.ts");
    }
}
