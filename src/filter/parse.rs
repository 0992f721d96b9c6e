use regex::Regex;

use super::lexer::{Tok, Token, tokenize};
use super::types::{CmpOp, Expr, LikePattern, Operand};
use crate::config::QueryLimits;
use crate::errors::CacheError;
use crate::field::{FieldPath, Node};

/// Recursive-descent parser. Precedence, loosest first: `OR`, `AND`, `NOT`.
///
/// `AND`/`OR` chains are collected into flat lists; only `(` and `NOT` nest, up to
/// `QueryLimits::max_nesting_depth`.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
    limits: &'a QueryLimits,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &str, limits: &'a QueryLimits) -> Result<Self, CacheError> {
        if text.len() > limits.max_filter_len {
            return Err(CacheError::parse(limits.max_filter_len, format!("expression longer than {} bytes", limits.max_filter_len)));
        }
        Ok(Self { tokens: tokenize(text)?, pos: 0, end: text.len(), depth: 0, limits })
    }

    pub(crate) fn parse_expression(mut self) -> Result<Expr, CacheError> {
        if self.tokens.is_empty() {
            return Err(CacheError::parse(0, "empty expression"));
        }
        let expr = self.or_expr()?;
        if let Some(t) = self.peek_token() {
            return Err(CacheError::parse(t.offset, format!("unexpected trailing {:?}", t.tok)));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<(), CacheError> {
        if self.eat(tok) { Ok(()) } else { Err(CacheError::parse(self.offset(), format!("expected {tok:?}"))) }
    }

    fn or_expr(&mut self) -> Result<Expr, CacheError> {
        let mut terms = Vec::new();
        loop {
            match self.and_expr()? {
                Expr::Or(inner) => terms.extend(inner),
                term => terms.push(term),
            }
            if !self.eat(&Tok::Or) {
                break;
            }
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Expr::Or(terms) })
    }

    fn and_expr(&mut self) -> Result<Expr, CacheError> {
        let mut terms = Vec::new();
        loop {
            match self.not_expr()? {
                Expr::And(inner) => terms.extend(inner),
                term => terms.push(term),
            }
            if !self.eat(&Tok::And) {
                break;
            }
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Expr::And(terms) })
    }

    fn not_expr(&mut self) -> Result<Expr, CacheError> {
        if self.eat(&Tok::Not) {
            self.enter()?;
            let inner = self.not_expr()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.eat(&Tok::LParen) {
            self.enter()?;
            let inner = self.or_expr()?;
            self.expect(&Tok::RParen)?;
            self.depth -= 1;
            return Ok(inner);
        }
        self.predicate()
    }

    fn enter(&mut self) -> Result<(), CacheError> {
        self.depth += 1;
        if self.depth > self.limits.max_nesting_depth {
            return Err(CacheError::parse(
                self.offset(),
                format!("expression nested deeper than {}", self.limits.max_nesting_depth),
            ));
        }
        Ok(())
    }

    fn predicate(&mut self) -> Result<Expr, CacheError> {
        let lhs = self.operand()?;
        let op = match self.peek() {
            Some(Tok::Eq) => Some(CmpOp::Eq),
            Some(Tok::Ne) => Some(CmpOp::Ne),
            Some(Tok::Gt) => Some(CmpOp::Gt),
            Some(Tok::Gte) => Some(CmpOp::Gte),
            Some(Tok::Lt) => Some(CmpOp::Lt),
            Some(Tok::Lte) => Some(CmpOp::Lte),
            _ => None,
        };
        if let Some(op) = op {
            let at = self.offset();
            self.pos += 1;
            let rhs = self.operand()?;
            check_comparison(&lhs, op, &rhs, at)?;
            return Ok(Expr::Cmp { lhs, op, rhs });
        }
        match self.peek() {
            Some(Tok::Like) => {
                self.pos += 1;
                self.like(lhs, false)
            }
            Some(Tok::Is) => {
                self.pos += 1;
                let negated = self.eat(&Tok::Not);
                self.expect(&Tok::Null)?;
                Ok(Expr::IsNull { operand: lhs, negated })
            }
            Some(Tok::In) => {
                self.pos += 1;
                let haystack = self.operand()?;
                Ok(Expr::In { needle: lhs, haystack })
            }
            Some(Tok::Not) => {
                self.pos += 1;
                if self.eat(&Tok::Like) {
                    self.like(lhs, true)
                } else if self.eat(&Tok::In) {
                    let haystack = self.operand()?;
                    let inner = Expr::In { needle: lhs, haystack };
                    Ok(Expr::Not(Box::new(inner)))
                } else {
                    Err(CacheError::parse(self.offset(), "expected LIKE or IN after NOT"))
                }
            }
            _ => {
                if matches!(&lhs, Operand::Literal(n) if !matches!(n, Node::Bool(_) | Node::Null)) {
                    return Err(CacheError::parse(self.offset(), "expected an operator after value"));
                }
                Ok(Expr::Value(lhs))
            }
        }
    }

    fn like(&mut self, value: Operand, negated: bool) -> Result<Expr, CacheError> {
        let at = self.offset();
        let pattern = self.operand()?;
        for side in [&value, &pattern] {
            if side.literal().is_some_and(|n| !matches!(n, Node::Str(_) | Node::Null)) {
                return Err(CacheError::IllegalOperator(format!("LIKE requires string operands (offset {at})")));
            }
        }
        let compiled = match pattern.literal() {
            Some(Node::Str(p)) => Some(like_pattern(p)?),
            _ => None,
        };
        Ok(Expr::Like { value, pattern, compiled, negated })
    }

    fn operand(&mut self) -> Result<Operand, CacheError> {
        let at = self.offset();
        let tok = self.peek().cloned().ok_or_else(|| CacheError::parse(at, "unexpected end of expression"))?;
        self.pos += 1;
        Ok(match tok {
            Tok::Int(i) => Operand::Literal(Node::Int(i)),
            Tok::Float(f) => Operand::Literal(Node::Float(f)),
            Tok::Str(s) => Operand::Literal(Node::Str(s)),
            Tok::True => Operand::Literal(Node::Bool(true)),
            Tok::False => Operand::Literal(Node::Bool(false)),
            Tok::Null => Operand::Literal(Node::Null),
            Tok::Field(raw) => Operand::Field(parse_path(&raw, at, self.limits)?),
            other => return Err(CacheError::parse(at, format!("expected a value, found {other:?}"))),
        })
    }
}

/// Parses the contents of a backtick field reference, shifting error offsets to the enclosing text.
pub(crate) fn parse_path(raw: &str, at: usize, limits: &QueryLimits) -> Result<FieldPath, CacheError> {
    FieldPath::parse(raw, limits.max_path_depth).map_err(|e| match e {
        CacheError::Parse { offset, message } => CacheError::Parse { offset: at + 1 + offset, message },
        other => other,
    })
}

fn check_comparison(lhs: &Operand, op: CmpOp, rhs: &Operand, at: usize) -> Result<(), CacheError> {
    if !op.is_ordering() {
        return Ok(());
    }
    for side in [lhs, rhs] {
        match side.literal() {
            Some(Node::Str(_)) => {
                return Err(CacheError::IllegalOperator(format!(
                    "operator '{}' is not supported for strings (offset {at})",
                    op.symbol()
                )));
            }
            Some(Node::Bool(_)) => {
                return Err(CacheError::IllegalOperator(format!(
                    "operator '{}' is not supported for booleans (offset {at})",
                    op.symbol()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Translates a SQL `LIKE` pattern into an anchored regex: `%` is any run, `_` one character.
pub(crate) fn like_pattern(pattern: &str) -> Result<LikePattern, CacheError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');
    Ok(LikePattern { source: pattern.to_string(), regex: Regex::new(&re)? })
}
