//! Local validation of free-text search queries
//!
//! The search API rejects malformed `q` values with a 422 response. This module
//! applies the same syntax rules locally so a bad query fails before any request
//! is made, with the same message the API would have returned.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. forbidden characters
//! 2. wildcard placement
//! 3. operators at the start or end of the query
//! 4. operators used without keywords between them
//! 5. balanced parentheses and quotes
//! 6. `AND` and `OR` mixed at the same grouping level
//!
//! Custom rules added with [`QueryValidator::with_rule`] run after the built-in ones.

mod grouping;
mod rules;

use serde_json::Value;

pub use rules::{
    BalancedDelimiters, BoundaryOperators, ForbiddenCharacters, OperatorSequences, QueryRule,
    SameLevelOperators, WildcardPlacement,
};

/// Parameter name used in messages when none is configured
pub const DEFAULT_PARAMETER: &str = "q";

/// Syntax checker for search query strings
///
/// # Example
///
/// ```
/// use newscatcher_client_rs::QueryValidator;
///
/// let validator = QueryValidator::new();
///
/// let (is_valid, message) = validator.validate("\"machine learning\" AND python");
/// assert!(is_valid);
/// assert!(message.is_empty());
///
/// let (is_valid, message) = validator.validate("invalid [query]");
/// assert!(!is_valid);
/// assert!(message.contains("must not include"));
/// ```
pub struct QueryValidator {
    parameter: String,
    rules: Vec<Box<dyn QueryRule>>,
}

impl QueryValidator {
    /// Create a validator with the built-in rule set for the `q` parameter
    pub fn new() -> Self {
        Self::for_parameter(DEFAULT_PARAMETER)
    }

    /// Create a validator whose messages name `parameter` instead of `q`
    pub fn for_parameter<S: Into<String>>(parameter: S) -> Self {
        Self {
            parameter: parameter.into(),
            rules: vec![
                Box::new(ForbiddenCharacters),
                Box::new(WildcardPlacement),
                Box::new(BoundaryOperators),
                Box::new(OperatorSequences),
                Box::new(BalancedDelimiters),
                Box::new(SameLevelOperators),
            ],
        }
    }

    /// Append a rule that runs after all previously registered rules
    ///
    /// # Example
    ///
    /// ```
    /// use newscatcher_client_rs::QueryValidator;
    ///
    /// let validator = QueryValidator::new().with_rule(|query: &str, parameter: &str| {
    ///     if query.len() > 200 {
    ///         Err(format!("[{parameter}] parameter is too long"))
    ///     } else {
    ///         Ok(())
    ///     }
    /// });
    ///
    /// assert!(!validator.validate(&"a".repeat(201)).0);
    /// ```
    pub fn with_rule<R: QueryRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Name of the parameter reported in messages
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Validate a query string
    ///
    /// Returns `(true, "")` when the query is accepted, otherwise `false` and the
    /// message of the first rule that rejected it.
    pub fn validate(&self, query: &str) -> (bool, String) {
        match self.check(query) {
            Ok(()) => (true, String::new()),
            Err(message) => (false, message),
        }
    }

    /// Validate an untyped value, e.g. a query taken from a JSON request body
    ///
    /// Non-string values are reported as invalid rather than causing an error.
    pub fn validate_value(&self, value: &Value) -> (bool, String) {
        match value {
            Value::String(query) => self.validate(query),
            _ => (
                false,
                format!("[{}] parameter must be a string", self.parameter),
            ),
        }
    }

    /// Validate a query, returning the rejection message as the error
    pub fn check(&self, query: &str) -> Result<(), String> {
        if query.trim().is_empty() {
            return Err(format!("[{}] parameter should not be empty", self.parameter));
        }

        for rule in &self.rules {
            rule.check(query, &self.parameter)?;
        }

        Ok(())
    }
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryValidator")
            .field("parameter", &self.parameter)
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Validate `query` with the default rule set
///
/// Shorthand for `QueryValidator::new().validate(query)`.
pub fn validate_query(query: &str) -> (bool, String) {
    QueryValidator::new().validate(query)
}
