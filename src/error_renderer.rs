//! Error rendering using ariadne
//!
//! Diagnostics are drawn against the source text that produced them, with
//! the offending span underlined, related locations labelled and help notes
//! appended.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<function>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use mathbox::{execute_math_function, render_error};
///
/// let source = "def f(): return 1 / 0";
/// if let Err(e) = execute_math_function(source) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let diagnostic = error.to_diagnostic();
    let title = format!("{}: {}", error.kind(), diagnostic.message);
    render_diagnostic(source, &diagnostic, &title, writer, use_color)
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    title: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Ariadne works in characters, spans are in bytes.
    let to_chars = |range: &core::ops::Range<usize>| {
        let start = source.get(..range.start).map_or(0, |s| s.chars().count());
        let len = source.get(range.clone()).map_or(0, |s| s.chars().count());
        start..start + len
    };

    let primary = diag.span.as_ref().map(|span| to_chars(&span.0));
    let mut report = Report::build(kind, (SOURCE_ID, primary.clone().unwrap_or(0..0)))
        .with_message(title)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    if let Some(range) = primary {
        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_ID, range))
                .with_message(&diag.message)
                .with_color(color),
        );
    }

    for related in &diag.related {
        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_ID, to_chars(&related.span.0)))
                .with_message(&related.message)
                .with_color(color),
        );
    }

    for help_msg in &diag.help {
        report = report.with_help(help_msg);
    }

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
