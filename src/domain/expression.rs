//! Tag expressions
//!
//! An expression is a tag name, an ordered sequence (every element must hold)
//! or a set of operators: `$all`, `$any` and `$not`. Expressions decode from
//! any serde format and from a small text syntax.
//!
//! # Examples
//!
//! ```
//! use codetags::domain::Expression;
//!
//! let expr = Expression::parse("abc AND NOT beta").unwrap();
//! assert_eq!(expr.to_string(), "abc AND NOT beta");
//! ```

use crate::error::{CodetagsError, Result};
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Expression abstract syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Single tag (e.g. "feature-1")
    Tag(String),

    /// Ordered sequence, true iff every element is true
    Sequence(Vec<Expression>),

    /// Operator map, true iff every operator holds
    Operators(Vec<Operator>),

    /// Absent value or a shape that cannot be evaluated
    Unsupported,
}

/// One entry of an operator map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `$all`: every element is true
    All(Vec<Expression>),

    /// `$any`: at least one element is true
    Any(Vec<Expression>),

    /// `$not`: the operand is false
    Not(Box<Expression>),

    /// Unknown key or malformed operand; poisons the whole map
    Invalid(String),
}

impl Expression {
    pub fn tag(name: impl Into<String>) -> Self {
        Expression::Tag(name.into())
    }

    pub fn sequence<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn all<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Operators(vec![Operator::All(
            items.into_iter().map(Into::into).collect(),
        )])
    }

    pub fn any<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Operators(vec![Operator::Any(
            items.into_iter().map(Into::into).collect(),
        )])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: impl Into<Expression>) -> Self {
        Expression::Operators(vec![Operator::Not(Box::new(inner.into()))])
    }

    /// Add an operator to this expression's operator map
    ///
    /// Any other expression becomes an `$all` operand next to `operator`.
    pub fn with(self, operator: Operator) -> Self {
        match self {
            Expression::Operators(mut ops) => {
                ops.push(operator);
                Expression::Operators(ops)
            }
            other => Expression::Operators(vec![Operator::All(vec![other]), operator]),
        }
    }

    /// Parse the text syntax into an Expression
    ///
    /// Supports: "tag", "a AND b", "a OR b", "NOT a" and parentheses.
    /// Operator precedence: NOT > AND > OR
    ///
    /// # Examples
    ///
    /// ```
    /// use codetags::domain::Expression;
    ///
    /// let expr = Expression::parse("a AND (b OR c)").unwrap();
    /// assert_eq!(
    ///     expr,
    ///     Expression::all([Expression::tag("a"), Expression::any(["b", "c"])])
    /// );
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut pos = 0;
        let result = parse_or(&tokens, &mut pos)?;

        // Ensure all tokens were consumed
        if pos != tokens.len() {
            return Err(CodetagsError::InvalidExpression(format!(
                "Unexpected {:?} at position {}",
                tokens[pos], pos
            )));
        }

        Ok(result)
    }
}

impl From<&str> for Expression {
    fn from(name: &str) -> Self {
        Expression::Tag(name.to_string())
    }
}

impl From<String> for Expression {
    fn from(name: String) -> Self {
        Expression::Tag(name)
    }
}

impl<E: Into<Expression>> From<Vec<E>> for Expression {
    fn from(items: Vec<E>) -> Self {
        Expression::sequence(items)
    }
}

impl<E: Into<Expression>> From<Option<E>> for Expression {
    fn from(value: Option<E>) -> Self {
        value.map(Into::into).unwrap_or(Expression::Unsupported)
    }
}

/// Renders the text syntax
///
/// Output parses back for expressions built by `parse`. Empty sequences and
/// operator maps, unsupported values, invalid operators and tags that are
/// keywords or contain characters outside the tag alphabet do not.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Tag(tag) => write!(f, "{}", tag),
            Expression::Sequence(items) => write_joined(f, items, " AND "),
            Expression::Operators(ops) => {
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{}", op)?;
                }
                Ok(())
            }
            Expression::Unsupported => write!(f, "<unsupported>"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::All(items) => write_joined(f, items, " AND "),
            Operator::Any(items) => {
                write!(f, "(")?;
                write_joined(f, items, " OR ")?;
                write!(f, ")")
            }
            Operator::Not(inner) if needs_group(inner) => write!(f, "NOT ({})", inner),
            Operator::Not(inner) => write!(f, "NOT {}", inner),
            Operator::Invalid(key) => write!(f, "<invalid {}>", key),
        }
    }
}

/// Whether `expr` must be parenthesized when nested
fn needs_group(expr: &Expression) -> bool {
    match expr {
        Expression::Sequence(items) => items.len() > 1,
        Expression::Operators(ops) => {
            !matches!(ops.as_slice(), [Operator::Any(_)] | [Operator::Not(_)])
        }
        _ => false,
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expression], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        if needs_group(item) {
            write!(f, "({})", item)?;
        } else {
            write!(f, "{}", item)?;
        }
    }
    Ok(())
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ExpressionVisitor)
    }
}

struct ExpressionVisitor;

impl<'de> Visitor<'de> for ExpressionVisitor {
    type Value = Expression;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a tag name, a sequence or an operator map")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Expression, E> {
        Ok(Expression::Tag(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Expression, E> {
        Ok(Expression::Tag(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Expression, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Expression>()? {
            items.push(item);
        }
        Ok(Expression::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Expression, A::Error> {
        let mut ops = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let op = match key.as_str() {
                "$all" => match map.next_value::<Expression>()? {
                    Expression::Sequence(items) => Operator::All(items),
                    _ => Operator::Invalid(key),
                },
                "$any" => match map.next_value::<Expression>()? {
                    Expression::Sequence(items) => Operator::Any(items),
                    _ => Operator::Invalid(key),
                },
                "$not" => Operator::Not(Box::new(map.next_value::<Expression>()?)),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    Operator::Invalid(key)
                }
            };
            ops.push(op);
        }
        Ok(Expression::Operators(ops))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Expression, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<Expression, E> {
        Ok(Expression::Unsupported)
    }
}

/// Token types for text parsing
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    And,
    Or,
    Not,
    Open,
    Close,
}

/// Tokenize an expression string
fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let spaced = text.replace('(', " ( ").replace(')', " ) ");

    for word in spaced.split_whitespace() {
        match word.to_uppercase().as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            "NOT" => tokens.push(Token::Not),
            "(" => tokens.push(Token::Open),
            ")" => tokens.push(Token::Close),
            _ => {
                // Tag characters: alphanumeric, hyphens, underscores, dots
                if !word
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
                {
                    return Err(CodetagsError::InvalidExpression(format!(
                        "Invalid tag: {}",
                        word
                    )));
                }
                tokens.push(Token::Tag(word.to_string()));
            }
        }
    }

    if tokens.is_empty() {
        return Err(CodetagsError::InvalidExpression("Empty expression".to_string()));
    }

    Ok(tokens)
}

/// Parse OR expressions (lowest precedence)
fn parse_or(tokens: &[Token], pos: &mut usize) -> Result<Expression> {
    let mut items = vec![parse_and(tokens, pos)?];

    while *pos < tokens.len() && tokens[*pos] == Token::Or {
        *pos += 1;
        items.push(parse_and(tokens, pos)?);
    }

    Ok(if items.len() == 1 {
        items.remove(0)
    } else {
        Expression::Operators(vec![Operator::Any(items)])
    })
}

/// Parse AND expressions (medium precedence)
fn parse_and(tokens: &[Token], pos: &mut usize) -> Result<Expression> {
    let mut items = vec![parse_not(tokens, pos)?];

    while *pos < tokens.len() && tokens[*pos] == Token::And {
        *pos += 1;
        items.push(parse_not(tokens, pos)?);
    }

    Ok(if items.len() == 1 {
        items.remove(0)
    } else {
        Expression::Operators(vec![Operator::All(items)])
    })
}

/// Parse NOT expressions (highest precedence)
fn parse_not(tokens: &[Token], pos: &mut usize) -> Result<Expression> {
    if *pos >= tokens.len() {
        return Err(CodetagsError::InvalidExpression(
            "Unexpected end of expression".to_string(),
        ));
    }

    if tokens[*pos] == Token::Not {
        *pos += 1;
        let inner = parse_not(tokens, pos)?; // NOT is right-associative
        Ok(Expression::not(inner))
    } else {
        parse_primary(tokens, pos)
    }
}

/// Parse primary expressions (tags and groups)
fn parse_primary(tokens: &[Token], pos: &mut usize) -> Result<Expression> {
    if *pos >= tokens.len() {
        return Err(CodetagsError::InvalidExpression(
            "Unexpected end of expression".to_string(),
        ));
    }

    match &tokens[*pos] {
        Token::Tag(tag) => {
            *pos += 1;
            Ok(Expression::Tag(tag.clone()))
        }
        Token::Open => {
            *pos += 1;
            let inner = parse_or(tokens, pos)?;
            if *pos >= tokens.len() || tokens[*pos] != Token::Close {
                return Err(CodetagsError::InvalidExpression(
                    "Missing closing parenthesis".to_string(),
                ));
            }
            *pos += 1;
            Ok(inner)
        }
        other => Err(CodetagsError::InvalidExpression(format!(
            "Expected tag, found {:?}",
            other
        ))),
    }
}
