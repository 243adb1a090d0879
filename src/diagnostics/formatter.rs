//! Human-readable rendering of validation reports
//!
//! Renders a list of diagnostics to any [`termcolor::WriteColor`] sink,
//! coloring by severity. Plain-text rendering goes through the same path
//! with colors disabled (`termcolor::NoColor`).

use std::io::Write;

use termcolor::{Color, ColorSpec, NoColor, WriteColor};

use super::{Diagnostic, Severity};

fn severity_color(severity: Severity) -> Option<Color> {
    match severity {
        Severity::Critical => Some(Color::Red),
        Severity::Warning => Some(Color::Yellow),
        Severity::Info => Some(Color::Cyan),
    }
}

/// Write diagnostics to a color-capable sink, one per line
pub fn render<W: WriteColor>(out: &mut W, diagnostics: &[Diagnostic]) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut spec = ColorSpec::new();
        spec.set_fg(severity_color(diag.severity));
        if diag.severity == Severity::Critical {
            spec.set_bold(true);
        }
        out.set_color(&spec)?;
        write!(out, "{}", diag.severity.as_str())?;
        out.reset()?;
        match (diag.line, diag.column) {
            (Some(line), Some(column)) => {
                writeln!(out, " {} {}:{} {}", diag.code, line, column, diag.message)?
            }
            _ => writeln!(out, " {} {}", diag.code, diag.message)?,
        }
    }
    Ok(())
}

/// Render diagnostics to a plain string, without color escapes
pub fn render_plain(diagnostics: &[Diagnostic]) -> String {
    let mut sink = NoColor::new(Vec::new());
    // Writing to a Vec cannot fail.
    render(&mut sink, diagnostics).expect("in-memory write");
    String::from_utf8(sink.into_inner()).expect("diagnostics are valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    #[test]
    fn plain_rendering_lists_one_diagnostic_per_line() {
        let diags = vec![
            Diagnostic::new(DiagnosticCode::DuplicateId, "duplicate message id \"a\""),
            Diagnostic::new(DiagnosticCode::ShadowWarning, "message \"a\" shadows bundle"),
        ];
        let text = render_plain(&diags);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DUPLICATE_ID"));
        assert!(lines[1].starts_with("WARNING"));
    }

    #[test]
    fn located_diagnostics_render_line_and_column() {
        let mut diag = Diagnostic::new(DiagnosticCode::ParseError, "expected '='");
        diag.line = Some(3);
        diag.column = Some(7);
        let text = render_plain(&[diag]);
        assert!(text.contains("3:7"));
    }
}
