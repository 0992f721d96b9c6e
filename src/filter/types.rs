use regex::Regex;

use crate::field::{FieldPath, Node};

/// Three-valued logic result. `Unknown` arises from `NULL` operands.
///
/// AND: `False` dominates, then `Unknown`. OR: `True` dominates, then `Unknown`.
/// NOT: swaps `True`/`False`, keeps `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Collapses `Unknown` to `false`.
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<bool> for Truth {
    fn from(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Leaf of a value expression: a scalar literal or a field reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Node),
    Field(FieldPath),
}

impl Operand {
    #[must_use]
    pub const fn literal(&self) -> Option<&Node> {
        match self {
            Self::Literal(n) => Some(n),
            Self::Field(_) => None,
        }
    }
}

/// `LIKE` pattern translated to an anchored regular expression.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pub(crate) source: String,
    pub(crate) regex: Regex,
}

impl LikePattern {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn matches(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// Bare operand used as a boolean (`TRUE`, `` `$.spec.enabled` ``).
    Value(Operand),
    Cmp { lhs: Operand, op: CmpOp, rhs: Operand },
    Like { value: Operand, pattern: Operand, compiled: Option<LikePattern>, negated: bool },
    IsNull { operand: Operand, negated: bool },
    In { needle: Operand, haystack: Operand },
    /// Conjunction of two or more terms; chains are kept flat.
    And(Vec<Expr>),
    /// Disjunction of two or more terms; chains are kept flat.
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

#[cfg(test)]
mod tests {
    use super::Truth::{False as F, True as T, Unknown as U};

    #[test]
    fn kleene_and_table() {
        let rows = [(T, T, T), (T, F, F), (T, U, U), (F, T, F), (F, F, F), (F, U, F), (U, T, U), (U, F, F), (U, U, U)];
        for (a, b, want) in rows {
            assert_eq!(a.and(b), want, "{a:?} AND {b:?}");
        }
    }

    #[test]
    fn kleene_or_table() {
        let rows = [(T, T, T), (T, F, T), (T, U, T), (F, T, T), (F, F, F), (F, U, U), (U, T, T), (U, F, U), (U, U, U)];
        for (a, b, want) in rows {
            assert_eq!(a.or(b), want, "{a:?} OR {b:?}");
        }
    }

    #[test]
    fn not_keeps_unknown() {
        assert_eq!(T.not(), F);
        assert_eq!(F.not(), T);
        assert_eq!(U.not(), U);
        assert!(!U.is_true());
    }
}
