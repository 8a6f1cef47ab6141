use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with location
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Invalid number literal
    InvalidNumber { text: String, reason: &'static str },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// A statement that is well-formed but not allowed where it appears
    /// (`return` outside the function, `break` outside a loop, nested `def`).
    Misplaced { what: &'static str, context: &'static str },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                format!("expected {}, found {}", expected, found)
            }
            ParseErrorKind::InvalidNumber { text, reason } => {
                format!("invalid number literal '{}': {}", text, reason)
            }
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => format!(
                "nesting depth exceeds maximum of {} levels",
                max_depth
            ),
            ParseErrorKind::Misplaced { what, context } => {
                format!("'{}' {}", what, context)
            }
            ParseErrorKind::Other { message } => message.clone(),
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { .. } => ("P001", vec![]),
            ParseErrorKind::InvalidNumber { .. } => {
                ("P002", vec!["Check the number format".to_string()])
            }
            ParseErrorKind::MaxDepthExceeded { .. } => (
                "P003",
                vec!["Reduce nesting or simplify the expression".to_string()],
            ),
            ParseErrorKind::Misplaced { .. } => (
                "P004",
                vec!["Only one top-level function may be defined; loops and returns belong inside it".to_string()],
            ),
            ParseErrorKind::Other { .. } => ("P999", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: Some(self.span.clone()),
            related: vec![],
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message(),
            self.span.0.start,
            self.span.0.end
        )
    }
}

impl std::error::Error for ParseError {}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => ParseErrorKind::UnexpectedToken {
            expected: format_expected_rules(&positives),
            found: describe_found(source, span.0.start),
        },
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "something else".to_string();
    }

    // Group related rules into higher-level concepts
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::number | Rule::integer | Rule::float | Rule::imaginary => "number",
            Rule::identifier => "identifier",
            Rule::EOI => "end of input",
            Rule::expression
            | Rule::disjunction
            | Rule::comparison
            | Rule::arith
            | Rule::paren
            | Rule::list
            | Rule::neg
            | Rule::pos
            | Rule::invert
            | Rule::not_op
            | Rule::true_lit
            | Rule::false_lit
            | Rule::none_lit => "expression",
            Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::floor_div
            | Rule::modulo
            | Rule::pow
            | Rule::or_op
            | Rule::and_op
            | Rule::comp_op => "operator",
            Rule::call_op | Rule::attribute_op => "call or attribute access",
            Rule::assign_op | Rule::aug_op => "assignment",
            Rule::statement
            | Rule::funcdef
            | Rule::if_stmt
            | Rule::while_stmt
            | Rule::for_stmt
            | Rule::simple_stmts => "statement",
            Rule::block | Rule::suite | Rule::inline_suite => "indented block",
            Rule::parameters | Rule::parameter => "parameter",
            Rule::kw_if
            | Rule::kw_else
            | Rule::kw_elif
            | Rule::kw_in
            | Rule::kw_import
            | Rule::kw_def
            | Rule::kw_return => "keyword",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => "something else".to_string(),
    }
}

/// Describe what sits at `pos` in the source.
fn describe_found(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        None => "end of input".to_string(),
        Some('\n') | Some('\r') => "end of line".to_string(),
        Some(' ') | Some('\t') => "unexpected indentation".to_string(),
        Some(c) => format!("'{}'", c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "expression".to_string(),
                found: "')'".to_string(),
            },
            Span(10..20),
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.message.contains("expected expression"));
        assert!(diagnostic.message.contains("found ')'"));
        assert_eq!(diagnostic.code, Some("P001".to_string()));
    }

    #[test]
    fn test_format_expected_rules() {
        let rules = vec![Rule::integer, Rule::float];
        assert_eq!(format_expected_rules(&rules), "number");

        let rules = vec![Rule::identifier, Rule::EOI];
        assert_eq!(format_expected_rules(&rules), "identifier or end of input");
    }

    #[test]
    fn test_describe_found() {
        assert_eq!(describe_found("abc", 3), "end of input");
        assert_eq!(describe_found("a\nb", 1), "end of line");
        assert_eq!(describe_found("a)b", 1), "')'");
    }
}
