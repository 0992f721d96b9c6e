//! Multi-key ordering built from order-by text such as `` `$.metadata.name` DESC, `$.spec.type` ``.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::config::QueryLimits;
use crate::errors::CacheError;
use crate::field::{FieldPath, FieldSource, Node};
use crate::filter::{Tok, Token, as_f64, compare_nodes, parse_path, tokenize};

static NULL: Node = Node::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub path: FieldPath,
    pub direction: Direction,
}

/// Stable comparator over a list of keys applied in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orderer {
    keys: Vec<OrderKey>,
}

impl Orderer {
    #[must_use]
    pub fn new(keys: Vec<OrderKey>) -> Self {
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[OrderKey] {
        &self.keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two objects on every key; `Equal` when all keys tie.
    pub fn compare<S: FieldSource + ?Sized>(&self, a: &S, b: &S) -> Ordering {
        let (na, nb) = (a.to_node(), b.to_node());
        for key in &self.keys {
            let va = key.path.resolve(&na).unwrap_or(&NULL);
            let vb = key.path.resolve(&nb).unwrap_or(&NULL);
            let ord = directed(key.direction, order_values(va, vb));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Sorts in place. Each object's key values are resolved once; ties keep their input order.
    pub fn sort<T: FieldSource>(&self, items: &mut Vec<T>) {
        if self.keys.is_empty() || items.len() < 2 {
            return;
        }
        let mut decorated: Vec<(Vec<Node>, T)> = items
            .drain(..)
            .map(|item| {
                let values = {
                    let node = item.to_node();
                    self.keys.iter().map(|k| k.path.resolve(&node).cloned().unwrap_or(Node::Null)).collect()
                };
                (values, item)
            })
            .collect();
        decorated.sort_by(|(va, _), (vb, _)| {
            for (i, key) in self.keys.iter().enumerate() {
                let ord = directed(key.direction, order_values(&va[i], &vb[i]));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        items.extend(decorated.into_iter().map(|(_, item)| item));
    }
}

const fn directed(direction: Direction, ord: Ordering) -> Ordering {
    match direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

/// Total order over values: NULL first, numbers by magnitude, strings lexicographic,
/// `false < true`, and unrelated kinds by kind rank.
#[must_use]
pub fn order_values(a: &Node, b: &Node) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    if let Some(ord) = compare_nodes(a, b) {
        return ord;
    }
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return OrderedFloat(x).cmp(&OrderedFloat(y));
    }
    kind_rank(a).cmp(&kind_rank(b))
}

const fn kind_rank(n: &Node) -> u8 {
    match n {
        Node::Null => 0,
        Node::Bool(_) => 1,
        Node::Int(_) | Node::UInt(_) | Node::Float(_) => 2,
        Node::Str(_) => 3,
        Node::List(_) => 4,
        Node::Struct(_) => 5,
    }
}

/// Builds an orderer with default limits. `None` or blank text orders nothing.
///
/// # Errors
/// Returns `CacheError::OrderBy` or `CacheError::Parse` for malformed text.
pub fn build_orderer(spec: Option<&str>) -> Result<Orderer, CacheError> {
    build_orderer_with(spec, &QueryLimits::default())
}

/// # Errors
/// See [`build_orderer`].
pub fn build_orderer_with(spec: Option<&str>, limits: &QueryLimits) -> Result<Orderer, CacheError> {
    let Some(text) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Orderer::default());
    };
    let tokens = tokenize(text)?;
    let mut keys = Vec::new();
    let mut iter = tokens.into_iter().peekable();
    loop {
        let path = match iter.next() {
            Some(Token { tok: Tok::Field(raw), offset }) => parse_path(&raw, offset, limits)?,
            Some(Token { tok, offset }) => {
                return Err(CacheError::OrderBy(format!("expected a field reference at offset {offset}, found {tok:?}")));
            }
            None => return Err(CacheError::OrderBy(format!("dangling ',' in '{text}'"))),
        };
        let direction = match iter.peek().map(|t| &t.tok) {
            Some(Tok::Asc) => {
                iter.next();
                Direction::Asc
            }
            Some(Tok::Desc) => {
                iter.next();
                Direction::Desc
            }
            _ => Direction::Asc,
        };
        keys.push(OrderKey { path, direction });
        match iter.next() {
            None => break,
            Some(Token { tok: Tok::Comma, .. }) => {}
            Some(Token { tok, offset }) => {
                return Err(CacheError::OrderBy(format!("unexpected {tok:?} at offset {offset}")));
            }
        }
    }
    if keys.len() > limits.max_order_keys {
        log::warn!("order-by has {} keys; using the first {}", keys.len(), limits.max_order_keys);
        keys.truncate(limits.max_order_keys);
    }
    Ok(Orderer { keys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_directions() {
        let o = build_orderer(Some("`$.a` desc, `$.b`, `$['c']` ASC")).unwrap();
        let dirs: Vec<Direction> = o.keys().iter().map(|k| k.direction).collect();
        assert_eq!(dirs, vec![Direction::Desc, Direction::Asc, Direction::Asc]);
        assert_eq!(o.keys()[2].path.as_str(), "$['c']");
    }

    #[test]
    fn blank_spec_is_noop() {
        assert!(build_orderer(None).unwrap().is_empty());
        assert!(build_orderer(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn malformed_specs_rejected() {
        for bad in ["$.a", "`$.a`,", "`$.a` UP", "`$.a` `$.b`", "ASC"] {
            assert!(build_orderer(Some(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn too_many_keys_truncated() {
        let limits = QueryLimits { max_order_keys: 1, ..QueryLimits::default() };
        let o = build_orderer_with(Some("`$.a`, `$.b`"), &limits).unwrap();
        assert_eq!(o.keys().len(), 1);
    }

    #[test]
    fn nulls_sort_first_and_numbers_coerce() {
        let mut v = vec![json!({"n": 2.5}), json!({}), json!({"n": 2}), json!({"n": 10})];
        build_orderer(Some("`$.n`")).unwrap().sort(&mut v);
        assert_eq!(v, vec![json!({}), json!({"n": 2}), json!({"n": 2.5}), json!({"n": 10})]);
    }

    #[test]
    fn booleans_false_before_true() {
        assert_eq!(order_values(&Node::Bool(false), &Node::Bool(true)), Ordering::Less);
    }

    #[test]
    fn compare_agrees_with_sort() {
        let o = build_orderer(Some("`$.k` DESC")).unwrap();
        assert_eq!(o.compare(&json!({"k": 1}), &json!({"k": 2})), Ordering::Greater);
    }
}
