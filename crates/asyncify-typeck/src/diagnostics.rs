//! Ariadne-based diagnostic rendering.
//!
//! Renders a `RewriteError` as a labelled report with its stable code and a
//! help line, or as a JSON object for `--json` consumers. Colour is off
//! unless requested so rendered output is stable.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use asyncify_common::span::LineIndex;
use rowan::TextRange;

use crate::error::RewriteError;

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// ANSI colours in ariadne output.
    pub color: bool,
    /// Emit JSON instead of ariadne output.
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text, no colours. Used by tests.
    pub fn colorless() -> Self {
        DiagnosticOptions {
            color: false,
            json: false,
        }
    }
}

// ── Span Helpers ───────────────────────────────────────────────────────

fn text_range_to_range(range: TextRange) -> Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    start..end
}

/// Clamp into the source and widen empty spans to one byte so ariadne has
/// something to underline.
fn clamp(range: Range<usize>, source_len: usize) -> Range<usize> {
    let start = range.start.min(source_len);
    let end = range.end.min(source_len).max(start);
    if start == end {
        start..end.saturating_add(1).min(source_len)
    } else {
        start..end
    }
}

fn label_text(err: &RewriteError) -> String {
    match err {
        RewriteError::Syntax { message, .. } => message.clone(),
        RewriteError::DestructuringNotImplemented { shape, .. } => {
            format!("this reads from a `{shape}`")
        }
    }
}

fn help_text(err: &RewriteError) -> &'static str {
    match err {
        RewriteError::Syntax { .. } => "the script must parse before it can be rewritten",
        RewriteError::DestructuringNotImplemented { .. } => {
            "bind the value to a name and read its members one by one"
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Render an error with ariadne.
pub fn render_diagnostic(
    err: &RewriteError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let source_len = source.len();
    let config = Config::default()
        .with_color(options.color)
        .with_index_type(IndexType::Byte);
    let span = (filename, clamp(text_range_to_range(err.span()), source_len));

    let mut builder = Report::build(ReportKind::Error, span.clone())
        .with_code(err.code())
        .with_message(err.to_string())
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message(label_text(err))
                .with_color(Color::Red),
        );

    if let RewriteError::Syntax {
        related: Some((message, related)),
        ..
    } = err
    {
        builder.add_label(
            Label::new((filename, clamp(text_range_to_range(*related), source_len)))
                .with_message(message)
                .with_color(Color::Blue),
        );
    }
    builder.set_help(help_text(err));

    let mut buf = Vec::new();
    builder
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Render an error as one JSON object.
pub fn render_json(err: &RewriteError, source: &str, filename: &str) -> serde_json::Value {
    let index = LineIndex::new(source);
    let span_json = |range: TextRange, label: String| {
        let (line, column) = index.line_col(range.start().into());
        serde_json::json!({
            "start": u32::from(range.start()),
            "end": u32::from(range.end()),
            "line": line,
            "column": column,
            "label": label,
        })
    };

    let mut spans = vec![span_json(err.span(), label_text(err))];
    if let RewriteError::Syntax {
        related: Some((message, related)),
        ..
    } = err
    {
        spans.push(span_json(*related, message.clone()));
    }

    serde_json::json!({
        "code": err.code(),
        "severity": "error",
        "message": err.to_string(),
        "file": filename,
        "spans": spans,
        "help": help_text(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_widens_empty_spans() {
        assert_eq!(clamp(3..3, 10), 3..4);
        assert_eq!(clamp(10..10, 10), 10..10);
        assert_eq!(clamp(4..40, 10), 4..10);
    }
}
