//! Grouping analysis for the same-level operator rule
//!
//! The query is split into nested groups by parentheses. Within one group,
//! an explicit `AND` next to an `OR`, or an `OR` operand made of several
//! adjacent keywords (an implicit `AND`), makes precedence ambiguous.

#[derive(Debug, PartialEq)]
enum Node {
    Term,
    Phrase,
    Group(Vec<Node>),
    And,
    Or,
    Not,
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Phrase,
    Word(String),
}

/// Decode the percent-encoded forms of delimiters and symbolic operators
fn normalize(query: &str) -> String {
    query
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%22", "\"")
        .replace("%7C%7C", "||")
        .replace("%26%26", "&&")
        .replace("%21", "!")
}

fn tokenize(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                // An unterminated phrase swallows the rest of the query
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                }
                tokens.push(Token::Phrase);
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    tokens
}

/// Build the group tree, or `None` if parentheses do not match
fn parse(tokens: Vec<Token>) -> Option<Vec<Node>> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];

    for token in tokens {
        match token {
            Token::Open => stack.push(Vec::new()),
            Token::Close => {
                let group = stack.pop()?;
                stack.last_mut()?.push(Node::Group(group));
            }
            Token::Phrase => stack.last_mut()?.push(Node::Phrase),
            Token::Word(word) => {
                let node = match word.as_str() {
                    "AND" | "&&" => Node::And,
                    "OR" | "||" => Node::Or,
                    "NOT" | "!" => Node::Not,
                    _ => Node::Term,
                };
                stack.last_mut()?.push(node);
            }
        }
    }

    if stack.len() == 1 { stack.pop() } else { None }
}

/// Number of operands in an `OR` branch; `NOT` only modifies the next one
fn operand_count(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .filter(|n| matches!(n, Node::Term | Node::Phrase | Node::Group(_)))
        .count()
}

fn is_ambiguous(nodes: &[Node]) -> bool {
    let has_or = nodes.contains(&Node::Or);
    let has_and = nodes.contains(&Node::And);

    if has_or && has_and {
        return true;
    }

    if has_or
        && nodes
            .split(|n| *n == Node::Or)
            .any(|branch| operand_count(branch) > 1)
    {
        return true;
    }

    nodes.iter().any(|n| match n {
        Node::Group(inner) => is_ambiguous(inner),
        _ => false,
    })
}

/// Whether `AND` and `OR` are combined at one grouping level
///
/// Queries with unmatched parentheses are left to the delimiter rule and
/// reported as not ambiguous.
pub(crate) fn has_same_level_ambiguity(query: &str) -> bool {
    parse(tokenize(&normalize(query))).is_some_and(|nodes| is_ambiguous(&nodes))
}
