//! Free-text filter expressions.
//!
//! ```text
//! `$.metadata.namespace` = 'ns' AND (`$.spec.type` LIKE 'que%' OR `$.status.ready` IS NULL)
//! ```
//!
//! Evaluation is three-valued (see [`Truth`]); [`Expression::eval`] collapses `Unknown` to `false`.

mod eval;
mod lexer;
mod parse;
mod types;

pub(crate) use eval::{as_f64, compare_nodes};
pub(crate) use lexer::{Tok, Token, tokenize};
pub(crate) use parse::parse_path;
pub use types::{CmpOp, Expr, LikePattern, Operand, Truth};

use crate::config::QueryLimits;
use crate::errors::CacheError;
use crate::field::FieldSource;

/// A compiled, immutable filter.
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn root(&self) -> &Expr {
        &self.root
    }

    /// Three-valued evaluation against `obj`.
    ///
    /// # Errors
    /// Returns `CacheError::Eval` when operand kinds cannot be compared. Missing fields are not errors.
    pub fn evaluate<S: FieldSource + ?Sized>(&self, obj: &S) -> Result<Truth, CacheError> {
        let node = obj.to_node();
        eval::eval_expr(&self.root, &node)
    }

    /// Boolean evaluation; `Unknown` is `false`.
    ///
    /// # Errors
    /// See [`Expression::evaluate`].
    pub fn eval<S: FieldSource + ?Sized>(&self, obj: &S) -> Result<bool, CacheError> {
        Ok(self.evaluate(obj)?.is_true())
    }
}

/// Compiles `text` with default [`QueryLimits`].
///
/// # Errors
/// `CacheError::Parse` for malformed text, `CacheError::IllegalOperator` for string or boolean ordering.
pub fn parse_filter_expression(text: &str) -> Result<Expression, CacheError> {
    parse_filter_expression_with(text, &QueryLimits::default())
}

/// Compiles `text` with explicit limits.
///
/// # Errors
/// See [`parse_filter_expression`].
pub fn parse_filter_expression_with(text: &str, limits: &QueryLimits) -> Result<Expression, CacheError> {
    let root = parse::Parser::new(text, limits)?.parse_expression()?;
    Ok(Expression { source: text.to_string(), root })
}
