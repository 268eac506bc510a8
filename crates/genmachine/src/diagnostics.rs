//! Diagnostics for the genmachine crate
//!
//! Fatal conditions are split by pipeline stage: `ParseError` covers
//! everything found while building the IR, `LoweringError` covers
//! everything found while emitting the class. Both carry a byte offset into
//! the source text where one is known, so callers can point at the
//! offending construct. Non-fatal conditions are collected as `Warning`s.

use std::fmt;

use deno_ast::StartSourcePos;
use deno_ast::swc::common::Span;

/// Result type alias for the public pipeline entry points
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors raised while extracting a `GeneratorIR` from a generator function.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source text itself failed to parse
    #[error("syntax error: {message}")]
    Syntax {
        message: String,
        offset: Option<usize>,
    },

    /// A parameter uses a binding form that cannot become a state field
    #[error("unsupported parameter binding: {kind}")]
    UnsupportedParameterBinding {
        kind: &'static str,
        offset: Option<usize>,
    },

    /// A top-level declaration binds something other than a plain name
    #[error("unsupported local binding: {kind}")]
    UnsupportedLocalBinding {
        kind: &'static str,
        offset: Option<usize>,
    },

    /// A top-level declaration that cannot live across steps
    #[error("top-level {kind} declarations are not supported in a generator body")]
    UnsupportedDeclaration {
        kind: &'static str,
        offset: Option<usize>,
    },

    /// Two parameters or locals bind the same name
    #[error("duplicate binding '{name}' (shadowing is not supported)")]
    DuplicateBinding {
        name: String,
        offset: Option<usize>,
    },

    /// A statement holds a yield that no resumable shape reaches
    #[error("yield appears in a position that cannot be resumed")]
    UnsupportedYieldPosition { offset: Option<usize> },

    /// `yield*` delegation to another iterator
    #[error("delegating yield (`yield*`) is not supported")]
    DelegatedYield { offset: Option<usize> },

    /// A single top-level statement holds more than one yield
    #[error("statement contains {count} yield expressions; only one per statement is supported")]
    MultipleYields {
        count: usize,
        offset: Option<usize>,
    },

    /// `export default function* () {}` has no name to derive a class from
    #[error("generator declaration has no name")]
    AnonymousGenerator { offset: Option<usize> },
}

impl ParseError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { offset, .. }
            | ParseError::UnsupportedParameterBinding { offset, .. }
            | ParseError::UnsupportedLocalBinding { offset, .. }
            | ParseError::UnsupportedDeclaration { offset, .. }
            | ParseError::DuplicateBinding { offset, .. }
            | ParseError::UnsupportedYieldPosition { offset }
            | ParseError::DelegatedYield { offset }
            | ParseError::MultipleYields { offset, .. }
            | ParseError::AnonymousGenerator { offset } => *offset,
        }
    }

    pub(crate) fn parameter(kind: &'static str, span: Span) -> Self {
        ParseError::UnsupportedParameterBinding {
            kind,
            offset: span_offset(span),
        }
    }

    pub(crate) fn local(kind: &'static str, span: Span) -> Self {
        ParseError::UnsupportedLocalBinding {
            kind,
            offset: span_offset(span),
        }
    }
}

/// Errors raised while turning a `GeneratorIR` into class source text.
#[derive(Debug, thiserror::Error)]
pub enum LoweringError {
    /// A local's declared type has no entry in the default-value table
    #[error("local '{name}' is declared as {type_kind}, which has no default value")]
    UnsupportedDefaultType {
        name: String,
        type_kind: &'static str,
        offset: Option<usize>,
    },

    /// A parameter or local would overwrite the program counter field
    #[error("'{name}' collides with the reserved state field of the same name")]
    ReservedStateName {
        name: String,
        offset: Option<usize>,
    },

    /// The printer failed to write into its buffer
    #[error("failed to print generated code: {source}")]
    Print {
        #[source]
        source: std::io::Error,
    },

    #[error("printer produced non-UTF-8 output")]
    NonUtf8Output,
}

impl LoweringError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            LoweringError::UnsupportedDefaultType { offset, .. }
            | LoweringError::ReservedStateName { offset, .. } => *offset,
            LoweringError::Print { .. } | LoweringError::NonUtf8Output => None,
        }
    }
}

/// Any fatal condition surfaced by `compile`, `parse_ir` or `emit`.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lowering(#[from] LoweringError),
}

impl CompileError {
    /// Byte offset into the compiled source, if the error points at one
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::Parse(e) => e.offset(),
            CompileError::Lowering(e) => e.offset(),
        }
    }
}

/// A generator that failed to compile, alongside the reason.
#[derive(Debug, thiserror::Error)]
#[error("generator '{name}': {error}")]
pub struct CompileFailure {
    pub name: String,
    #[source]
    pub error: CompileError,
}

/// Convert a parsed span into a 0-based byte offset into the source text.
///
/// Synthesized nodes carry a dummy span and have no offset.
pub fn span_offset(span: Span) -> Option<usize> {
    if span.is_dummy() {
        return None;
    }
    let start = StartSourcePos::START_SOURCE_POS.as_byte_pos().0;
    Some(span.lo.0.saturating_sub(start) as usize)
}

/// 1-based line and column of a byte offset. Columns count characters.
///
/// An offset inside a multi-byte character points at that character.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

/// A non-fatal condition noticed while compiling one generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The yield sits inside a compound statement that is replayed whole
    NestedYield { offset: Option<usize> },

    /// A return inside a compound statement ends the generator unconditionally
    NestedReturn { offset: Option<usize> },

    /// Statements after the terminal return are never emitted
    UnreachableStatements { count: usize },

    /// The resume parameter was renamed to avoid a name the generator uses
    ResumeNameRenamed { from: String, to: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NestedYield { .. } => write!(
                f,
                "yield inside a compound statement; the whole statement is replayed on resume"
            ),
            Warning::NestedReturn { .. } => write!(
                f,
                "return inside a compound statement ends the state machine unconditionally"
            ),
            Warning::UnreachableStatements { count } => {
                write!(f, "{} statement(s) after the final return are dropped", count)
            }
            Warning::ResumeNameRenamed { from, to } => write!(
                f,
                "resume parameter '{}' collides with a name the generator uses; renamed to '{}'",
                from, to
            ),
        }
    }
}

impl Warning {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Warning::NestedYield { offset } | Warning::NestedReturn { offset } => *offset,
            Warning::UnreachableStatements { .. } | Warning::ResumeNameRenamed { .. } => None,
        }
    }
}

/// Warnings accumulated for a single generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningCollector {
    warnings: Vec<Warning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, warning: Warning) {
        tracing::debug!(%warning, "warning recorded");
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }
}

impl<'a> IntoIterator for &'a WarningCollector {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let src = "let a = 1;\nlet b = 2;\n";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (1, 5));
        assert_eq!(line_col(src, 11), (2, 1));
        assert_eq!(line_col(src, 15), (2, 5));
    }

    #[test]
    fn line_col_inside_a_character_points_at_it() {
        let src = "let é = 1;\nlet b = é;\n";
        // byte 5 is the second byte of the first `é`
        assert_eq!(line_col(src, 5), (1, 5));
        assert_eq!(line_col(src, 21), (2, 9));
    }

    #[test]
    fn line_col_clamps_past_end() {
        assert_eq!(line_col("ab", 40), (1, 3));
    }

    #[test]
    fn dummy_span_has_no_offset() {
        assert_eq!(span_offset(deno_ast::swc::common::DUMMY_SP), None);
    }

    #[test]
    fn failure_names_the_generator() {
        let failure = CompileFailure {
            name: "sum".to_string(),
            error: ParseError::UnsupportedYieldPosition { offset: None }.into(),
        };
        insta::assert_snapshot!(
            failure.to_string(),
            @"generator 'sum': yield appears in a position that cannot be resumed"
        );
    }

    #[test]
    fn warning_rendering() {
        let warning = Warning::ResumeNameRenamed {
            from: "value".to_string(),
            to: "value1".to_string(),
        };
        insta::assert_snapshot!(
            warning.to_string(),
            @"resume parameter 'value' collides with a name the generator uses; renamed to 'value1'"
        );
        let warning = Warning::UnreachableStatements { count: 2 };
        insta::assert_snapshot!(
            warning.to_string(),
            @"2 statement(s) after the final return are dropped"
        );
    }
}
