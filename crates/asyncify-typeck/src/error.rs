//! Compilation errors.
//!
//! Every error carries the `TextRange` where it was raised, so rendering
//! never has to rediscover the location.

use asyncify_common::span::Span;
use asyncify_parser::ParseError;
use rowan::{TextRange, TextSize};

/// The first fatal problem of a compilation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The parser rejected the script.
    #[error("{message}")]
    Syntax {
        message: String,
        span: TextRange,
        related: Option<(String, TextRange)>,
    },
    /// A destructuring pattern reads from a registry shape.
    #[error("destructuring a `{shape}` value is not supported")]
    DestructuringNotImplemented { shape: String, span: TextRange },
}

impl RewriteError {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            RewriteError::Syntax { .. } => "P0001",
            RewriteError::DestructuringNotImplemented { .. } => "ASYNC-10001",
        }
    }

    pub fn span(&self) -> TextRange {
        match self {
            RewriteError::Syntax { span, .. } => *span,
            RewriteError::DestructuringNotImplemented { span, .. } => *span,
        }
    }

    pub fn from_parse(err: &ParseError) -> Self {
        RewriteError::Syntax {
            message: err.message.clone(),
            span: span_to_range(err.span),
            related: err
                .related
                .as_ref()
                .map(|(message, span)| (message.clone(), span_to_range(*span))),
        }
    }
}

fn span_to_range(span: Span) -> TextRange {
    TextRange::new(TextSize::from(span.start), TextSize::from(span.end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_keep_message_and_location() {
        let parse = asyncify_parser::parse("f(");
        let err = RewriteError::from_parse(&parse.errors()[0]);
        assert_eq!(err.code(), "P0001");
        assert_eq!(err.to_string(), "expected `)`");
        assert_eq!(err.span(), TextRange::empty(TextSize::from(2)));
    }

    #[test]
    fn destructuring_message_names_the_shape() {
        let err = RewriteError::DestructuringNotImplemented {
            shape: "Database".to_string(),
            span: TextRange::new(6.into(), 14.into()),
        };
        assert_eq!(err.code(), "ASYNC-10001");
        assert_eq!(err.to_string(), "destructuring a `Database` value is not supported");
    }
}
