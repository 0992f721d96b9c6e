use std::cmp::Ordering;

use super::parse::like_pattern;
use super::types::{CmpOp, Expr, Operand, Truth};
use crate::errors::CacheError;
use crate::field::Node;

static NULL: Node = Node::Null;

fn operand<'a>(op: &'a Operand, root: &'a Node) -> &'a Node {
    match op {
        Operand::Literal(n) => n,
        Operand::Field(path) => path.resolve(root).unwrap_or(&NULL),
    }
}

pub(crate) fn eval_expr(expr: &Expr, root: &Node) -> Result<Truth, CacheError> {
    match expr {
        Expr::Value(op) => match operand(op, root) {
            Node::Bool(b) => Ok(Truth::from(*b)),
            Node::Null => Ok(Truth::Unknown),
            other => Err(CacheError::Eval(format!("{} is not a boolean", kind_name(other)))),
        },
        Expr::Cmp { lhs, op, rhs } => compare(operand(lhs, root), *op, operand(rhs, root)),
        Expr::Like { value, pattern, compiled, negated } => {
            let t = match (operand(value, root), operand(pattern, root)) {
                (Node::Null, _) | (_, Node::Null) => Truth::Unknown,
                (Node::Str(s), Node::Str(p)) => match compiled {
                    Some(c) => Truth::from(c.matches(s)),
                    None => Truth::from(like_pattern(p)?.matches(s)),
                },
                (a, b) => {
                    return Err(CacheError::Eval(format!(
                        "LIKE requires strings, found {} and {}",
                        kind_name(a),
                        kind_name(b)
                    )));
                }
            };
            Ok(if *negated { t.not() } else { t })
        }
        Expr::IsNull { operand: op, negated } => {
            let is_null = operand(op, root).is_null();
            Ok(Truth::from(is_null != *negated))
        }
        Expr::In { needle, haystack } => {
            let Some(wanted) = operand(needle, root).display_string() else {
                return Ok(Truth::Unknown);
            };
            match operand(haystack, root) {
                Node::List(items) => {
                    Ok(Truth::from(items.iter().any(|n| n.display_string().as_deref() == Some(wanted.as_str()))))
                }
                _ => Ok(Truth::Unknown),
            }
        }
        Expr::And(terms) => {
            let mut acc = Truth::True;
            for t in terms {
                acc = acc.and(eval_expr(t, root)?);
                if acc == Truth::False {
                    break;
                }
            }
            Ok(acc)
        }
        Expr::Or(terms) => {
            let mut acc = Truth::False;
            for t in terms {
                acc = acc.or(eval_expr(t, root)?);
                if acc == Truth::True {
                    break;
                }
            }
            Ok(acc)
        }
        Expr::Not(e) => Ok(eval_expr(e, root)?.not()),
    }
}

/// Numeric-aware comparison shared with the orderer. `None` means incomparable kinds.
pub(crate) fn compare_nodes(a: &Node, b: &Node) -> Option<Ordering> {
    match (a, b) {
        (Node::Int(x), Node::Int(y)) => Some(x.cmp(y)),
        (Node::UInt(x), Node::UInt(y)) => Some(x.cmp(y)),
        (Node::Int(x), Node::UInt(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        (Node::UInt(x), Node::Int(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        (Node::Str(x), Node::Str(y)) => Some(x.cmp(y)),
        (Node::Bool(x), Node::Bool(y)) => Some(x.cmp(y)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64(n: &Node) -> Option<f64> {
    match n {
        Node::Int(i) => Some(*i as f64),
        Node::UInt(u) => Some(*u as f64),
        Node::Float(f) => Some(*f),
        _ => None,
    }
}

pub(crate) const fn kind_name(n: &Node) -> &'static str {
    match n {
        Node::Null => "null",
        Node::Bool(_) => "boolean",
        Node::Int(_) | Node::UInt(_) | Node::Float(_) => "number",
        Node::Str(_) => "string",
        Node::List(_) => "array",
        Node::Struct(_) => "object",
    }
}

fn compare(a: &Node, op: CmpOp, b: &Node) -> Result<Truth, CacheError> {
    if a.is_null() || b.is_null() {
        return Ok(Truth::Unknown);
    }
    let restricted = matches!((a, b), (Node::Str(_), Node::Str(_)) | (Node::Bool(_), Node::Bool(_)));
    if restricted && op.is_ordering() {
        return Err(CacheError::Eval(format!("operator '{}' is not supported for {}s", op.symbol(), kind_name(a))));
    }
    let Some(ord) = compare_nodes(a, b) else {
        if as_f64(a).is_some() && as_f64(b).is_some() {
            // NaN on either side
            return Ok(Truth::Unknown);
        }
        return Err(CacheError::Eval(format!("cannot compare {} with {}", kind_name(a), kind_name(b))));
    };
    Ok(Truth::from(match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_pairs_compare_exactly() {
        let big = Node::Int(i64::MAX);
        let bigger = Node::UInt(i64::MAX as u64 + 1);
        assert_eq!(compare_nodes(&big, &bigger), Some(Ordering::Less));
        // Both round to the same f64, but integral comparison keeps them apart.
        assert_eq!(compare(&Node::Int(9_007_199_254_740_993), CmpOp::Eq, &Node::Int(9_007_199_254_740_992)).unwrap(), Truth::False);
    }

    #[test]
    fn mixed_numeric_coerces() {
        assert_eq!(compare(&Node::Int(1), CmpOp::Eq, &Node::Float(1.0)).unwrap(), Truth::True);
        assert_eq!(compare(&Node::Float(2.5), CmpOp::Gt, &Node::UInt(2)).unwrap(), Truth::True);
    }

    #[test]
    fn kind_mismatch_is_eval_error() {
        assert!(matches!(compare(&Node::Str("1".into()), CmpOp::Eq, &Node::Int(1)), Err(CacheError::Eval(_))));
        assert!(matches!(compare(&Node::Str("b".into()), CmpOp::Gt, &Node::Str("a".into())), Err(CacheError::Eval(_))));
    }

    #[test]
    fn nan_is_unknown() {
        assert_eq!(compare(&Node::Float(f64::NAN), CmpOp::Eq, &Node::Int(1)).unwrap(), Truth::Unknown);
    }
}
