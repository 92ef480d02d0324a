//! Error types for rule loading and evaluation.

use thiserror::Error;

/// Errors that can occur while loading or evaluating a rule set.
///
/// Every variant names the rule source (`origin`) and, where one applies,
/// the section, so an operator can locate the faulty rule without replaying
/// the request.
#[derive(Debug, Error)]
pub enum RightsError {
    /// The rule source could not be opened or read.
    #[error("failed to load rights file {origin:?}: {source}")]
    Load {
        /// Path or label of the rule source.
        origin: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the rule source is not a header, key/value pair, comment or
    /// continuation.
    #[error("syntax error in rights file {origin:?} at line {line}: {message}")]
    Syntax {
        /// Path or label of the rule source.
        origin: String,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A rule section lacks one of the required keys.
    #[error("section {section:?} of rights file {origin:?} is missing required key {key:?}")]
    MissingKey {
        /// Path or label of the rule source.
        origin: String,
        /// Section (rule) name.
        section: String,
        /// The missing key.
        key: String,
    },

    /// A value in a rule section could not be turned into a template.
    #[error("error in section {section:?} of rights file {origin:?}, key {key:?}: {message}")]
    Interpolation {
        /// Path or label of the rule source.
        origin: String,
        /// Section (rule) name.
        section: String,
        /// Key whose value is malformed.
        key: String,
        /// What was wrong with the value.
        message: String,
    },

    /// A rule's pattern failed while evaluating a request.
    #[error("error in section {section:?} of rights file {origin:?}: {source}")]
    Evaluation {
        /// Path or label of the rule source.
        origin: String,
        /// Section (rule) name.
        section: String,
        /// What went wrong with the pattern.
        #[source]
        source: PatternError,
    },
}

impl RightsError {
    /// Whether this error comes from the rule definitions rather than the
    /// storage holding them.
    #[must_use]
    pub fn is_rule_definition(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::MissingKey { .. } | Self::Interpolation { .. }
        )
    }
}

/// Why a rule's pattern could not be evaluated for a given request.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {source}")]
    Regex {
        /// The rendered pattern that failed to compile.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A `{N}` placeholder refers to a capture group the identity pattern
    /// does not have.
    #[error("placeholder {{{index}}} refers to a missing capture group ({available} available)")]
    MissingGroup {
        /// Zero-based placeholder index.
        index: usize,
        /// Number of capture groups in the identity pattern.
        available: usize,
    },

    /// A `{N}` placeholder refers to an optional group that did not take part
    /// in the identity match.
    #[error("placeholder {{{index}}} refers to a capture group that did not participate in the match")]
    UnmatchedGroup {
        /// Zero-based placeholder index.
        index: usize,
    },

    /// The resource template has brace syntax that is neither a `{N}` / `{}`
    /// placeholder nor a doubled literal brace.
    #[error("malformed placeholder in {template:?}: {message}")]
    Placeholder {
        /// The template as authored.
        template: String,
        /// What was wrong with the braces.
        message: String,
    },
}

/// Result type for rights operations.
pub type RightsResult<T> = Result<T, RightsError>;
