//! Built-in query rules

use std::sync::LazyLock;

use regex::Regex;

use super::grouping;

/// One validation step
///
/// Implemented for closures `Fn(&str, &str) -> Result<(), String>` taking the
/// query and the parameter name used in messages.
pub trait QueryRule: Send + Sync {
    /// Short identifier used in debug output
    fn name(&self) -> &str {
        "custom"
    }

    /// Return `Err(message)` if `query` must be rejected
    fn check(&self, query: &str, parameter: &str) -> Result<(), String>;
}

impl<F> QueryRule for F
where
    F: Fn(&str, &str) -> Result<(), String> + Send + Sync,
{
    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        self(query, parameter)
    }
}

const FORBIDDEN: [&str; 12] = [
    "[", "]", "/", "\\", "%5B", "%5D", "%2F", "%5C", ":", "%3A", "^", "%5E",
];

/// Escaped quote, allowed even though it contains a backslash
const ESCAPED_QUOTE: &str = "\\\"";

/// Rejects `[ ] / \ : ^` and their percent-encoded forms
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbiddenCharacters;

impl QueryRule for ForbiddenCharacters {
    fn name(&self) -> &str {
        "forbidden_characters"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        let stripped = query.replace(ESCAPED_QUOTE, "");
        if FORBIDDEN.iter().any(|c| stripped.contains(c)) {
            let listed = FORBIDDEN
                .iter()
                .map(|c| format!("'{}'", c.replace('\\', "\\\\")))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(format!(
                "[{parameter}] parameter must not include following characters [{listed}]. \
                 Please remove them from [{parameter}] parameter"
            ));
        }
        Ok(())
    }
}

static INVALID_WILDCARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*{2,}$|\s\*|^\*\S").expect("valid wildcard pattern"));

/// A wildcard must follow at least one letter or digit; a lone `*` is allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardPlacement;

impl QueryRule for WildcardPlacement {
    fn name(&self) -> &str {
        "wildcard_placement"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        if query == "*" || !INVALID_WILDCARD.is_match(query) {
            return Ok(());
        }
        Err(format!(
            "The wildcard (*) character in [{parameter}] parameter must be preceded \
             by at least one alphabet or number. Please modify the query."
        ))
    }
}

const WORD_OPERATORS: [&str; 3] = ["AND", "OR", "NOT"];

/// Operators that join two operands, in every spelling the API accepts
const BINARY_OPERATORS: [&str; 6] = ["OR", "||", "%7C%7C", "AND", "&&", "%26%26"];

const UNARY_OPERATORS: [&str; 6] = ["NOT", "!", "%21", "+", "%2B", "-"];

/// `+` and `-` also occur inside terms (`C++`, `COVID-`), so they only count
/// as a trailing operator when they stand alone
const IN_TERM_OPERATORS: [&str; 2] = ["+", "-"];

/// Trailing spellings in match order, paired with the operator they contain
static END_FORMS: LazyLock<Vec<(String, &'static str)>> = LazyLock::new(|| {
    let mut forms = Vec::new();
    for op in BINARY_OPERATORS.iter().chain(UNARY_OPERATORS.iter()) {
        forms.push((op.to_string(), *op));
        forms.push((format!("{op} "), *op));
    }
    for op in BINARY_OPERATORS {
        for suffix in ["(", " (", ")", " )"] {
            forms.push((format!("{op}{suffix}"), op));
        }
    }
    forms
});

fn is_word_operator(op: &str) -> bool {
    op.chars().all(|c| c.is_ascii_alphabetic())
}

/// Rejects queries that begin or end with a boolean operator
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryOperators;

impl BoundaryOperators {
    fn leading_word_operator(query: &str) -> Option<&str> {
        let (first, _) = query.split_once(char::is_whitespace)?;
        WORD_OPERATORS
            .iter()
            .any(|op| first.eq_ignore_ascii_case(op))
            .then_some(first)
    }

    fn trailing_operator(query: &str) -> Option<&'static str> {
        END_FORMS.iter().find_map(|(form, op)| {
            let head = query.strip_suffix(form.as_str())?;
            let before = head.chars().next_back();
            let standalone = before.is_none_or(|c| c.is_whitespace() || c == '(' || c == ')');
            let bounded = if is_word_operator(op) {
                before.is_none_or(|c| !c.is_alphanumeric())
            } else if IN_TERM_OPERATORS.contains(op) {
                standalone
            } else {
                true
            };
            bounded.then_some(*op)
        })
    }

    fn leading_operator(query: &str) -> Option<&'static str> {
        BINARY_OPERATORS
            .iter()
            .chain(UNARY_OPERATORS.iter())
            .find(|op| {
                let Some(rest) = query.strip_prefix(**op) else {
                    return false;
                };
                !is_word_operator(op) || rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
            })
            .copied()
    }
}

impl QueryRule for BoundaryOperators {
    fn name(&self) -> &str {
        "boundary_operators"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        if let Some(word) = Self::leading_word_operator(query) {
            return Err(format!(
                "Syntax error in input : unexpected  \"{word}\" at position 0!"
            ));
        }

        if let Some(op) = Self::trailing_operator(query) {
            return Err(format!(
                "[{parameter}] parameter ends with an operator {op}. \
                 Please remove an unused operator."
            ));
        }

        if let Some(op) = Self::leading_operator(query) {
            return Err(format!(
                "[{parameter}] parameter starts with an operator {op}. \
                 The query must not start with such operator. Please remove it."
            ));
        }

        Ok(())
    }
}

const INVALID_SEQUENCES: [&str; 31] = [
    " OR OR ",
    "%7C%7C %7C%7C",
    "|| ||",
    "|| (||",
    "||) ||",
    " AND AND ",
    "%26%26 %26%26",
    "&& &&",
    "&& (&&",
    "&&) &&",
    " NOT NOT ",
    "! !",
    "%21 %21",
    "- -",
    "--",
    " OR AND ",
    " AND OR ",
    "%7C%7C %26%26",
    "%26%26 %7C%7C",
    " OR (AND ",
    " AND (OR ",
    "%7C%7C (%26%26",
    "%26%26 (%7C%7C",
    " OR) AND ",
    " AND) OR ",
    "%7C%7C) %26%26",
    "%26%26) %7C%7C",
    "()",
    "%28%29",
    "(%29",
    "%28)",
];

/// Rejects operators with no keyword between them and empty groups
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorSequences;

impl QueryRule for OperatorSequences {
    fn name(&self) -> &str {
        "operator_sequences"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        let found = INVALID_SEQUENCES.iter().find(|seq| query.contains(**seq));

        match found {
            Some(seq) => Err(format!(
                "[{parameter}] parameter contains operator \"{}\" used without keywords. \
                 Please add keywords or remove one of the operators",
                seq.trim()
            )),
            None => Ok(()),
        }
    }
}

/// Every `(` must be closed and quotes must come in pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedDelimiters;

fn count_markers(query: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| query.matches(m).count()).sum()
}

impl QueryRule for BalancedDelimiters {
    fn name(&self) -> &str {
        "balanced_delimiters"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        if count_markers(query, &["(", "%28"]) != count_markers(query, &[")", "%29"]) {
            return Err(format!(
                "[{parameter}] parameter contains an unclosed round bracket \"(\" or \")\". \
                 Please close the bracket before proceeding."
            ));
        }

        if count_markers(query, &["\"", "%22"]) % 2 != 0 {
            return Err(format!(
                "[{parameter}] parameter contains an unclosed quote (\"). \
                 Please close the quote before proceeding."
            ));
        }

        Ok(())
    }
}

/// Rejects `AND` and `OR` combined at one level without grouping
///
/// Adjacent unquoted words are an implicit `AND`, so `AI OR artificial intelligence`
/// is ambiguous while `AI OR "artificial intelligence"` is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameLevelOperators;

impl QueryRule for SameLevelOperators {
    fn name(&self) -> &str {
        "same_level_operators"
    }

    fn check(&self, query: &str, parameter: &str) -> Result<(), String> {
        if grouping::has_same_level_ambiguity(query) {
            return Err(format!(
                "in [{parameter}] \"AND\" and \"OR\" operator not allowed at same level. \
                 Please use parentheses to group terms correctly, \
                 such as `(elon AND musk) OR twitter`"
            ));
        }
        Ok(())
    }
}
