//! Query execution: index scan, filter, order, page.

use crate::config::QueryLimits;
use crate::errors::CacheError;
use crate::field::{FieldPath, FieldSource, Node};
use crate::filter::{CmpOp, Expr, Expression, Operand, parse_filter_expression_with};
use crate::order::build_orderer_with;
use crate::page::page;
use crate::store::{And, IndexedStore, Predicate};
use std::sync::Arc;

/// A compiled filter plus the index key suffix implied by it.
#[derive(Debug, Clone, Default)]
pub struct BuiltFilter {
    pub expression: Option<Expression>,
    pub key_suffix: String,
}

/// Compiles `text` and derives a key suffix from its top-level `AND`ed equality constraints.
///
/// `key_paths` are tried in order; each constrained path contributes its string value, and
/// extraction stops at the first unconstrained one. Every element is followed by `/` unless
/// all paths were constrained. The filter itself is still applied, so the suffix only narrows the scan.
///
/// # Errors
/// Any compile error from [`parse_filter_expression_with`], or `CacheError::Parse` for a malformed key path.
pub fn build_filter(text: Option<&str>, key_paths: &[&str]) -> Result<BuiltFilter, CacheError> {
    build_filter_with(text, key_paths, &QueryLimits::default())
}

/// # Errors
/// See [`build_filter`].
pub fn build_filter_with(text: Option<&str>, key_paths: &[&str], limits: &QueryLimits) -> Result<BuiltFilter, CacheError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(BuiltFilter::default());
    };
    let expression = parse_filter_expression_with(text, limits)?;
    let mut conjuncts = Vec::new();
    collect_conjuncts(expression.root(), &mut conjuncts);

    let mut elements = Vec::new();
    for raw in key_paths {
        let path = FieldPath::parse(raw, limits.max_path_depth)?;
        match conjuncts.iter().find_map(|c| equality_value(c, &path)) {
            Some(v) => elements.push(v),
            None => break,
        }
    }
    let mut key_suffix = String::new();
    let complete = elements.len() == key_paths.len();
    for v in &elements {
        key_suffix.push_str(v);
        if !complete {
            key_suffix.push('/');
        }
    }
    Ok(BuiltFilter { expression: Some(expression), key_suffix })
}

fn collect_conjuncts<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::And(terms) => {
            for t in terms {
                collect_conjuncts(t, out);
            }
        }
        other => out.push(other),
    }
}

fn equality_value<'a>(expr: &'a Expr, path: &FieldPath) -> Option<&'a str> {
    let Expr::Cmp { lhs, op: CmpOp::Eq, rhs } = expr else {
        return None;
    };
    match (lhs, rhs) {
        (Operand::Field(p), Operand::Literal(Node::Str(s))) | (Operand::Literal(Node::Str(s)), Operand::Field(p))
            if p.steps() == path.steps() =>
        {
            Some(s.as_str())
        }
        _ => None,
    }
}

/// One page of results and the number of matches before paging.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub total: usize,
    pub items: Vec<Arc<T>>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub index: String,
    /// Key prefix scanned on `index`; the filter's key suffix is appended.
    pub prefix: String,
    pub filter: Option<String>,
    pub key_paths: Vec<String>,
    pub order_by: Option<String>,
    pub offset: Option<i64>,
    pub first: Option<i64>,
}

/// Runs `request` against `store` with default limits. `view` is ANDed ahead of the filter.
///
/// # Errors
/// Compile errors for the filter or order-by text, `CacheError::NoSuchIndex`, or evaluation errors.
pub fn execute<T: FieldSource>(
    store: &IndexedStore<T>,
    request: &QueryRequest,
    view: Option<&dyn Predicate<T>>,
) -> Result<Page<T>, CacheError> {
    execute_with(store, request, view, &QueryLimits::default())
}

/// # Errors
/// See [`execute`].
pub fn execute_with<T: FieldSource>(
    store: &IndexedStore<T>,
    request: &QueryRequest,
    view: Option<&dyn Predicate<T>>,
    limits: &QueryLimits,
) -> Result<Page<T>, CacheError> {
    let started = std::time::Instant::now();
    let key_paths: Vec<&str> = request.key_paths.iter().map(String::as_str).collect();
    let built = build_filter_with(request.filter.as_deref(), &key_paths, limits)?;
    let orderer = build_orderer_with(request.order_by.as_deref(), limits)?;

    let key = format!("{}{}", request.prefix, built.key_suffix);
    let filter = built.expression.as_ref().map(|e| e as &dyn Predicate<T>);
    let predicate = And::of([view, filter]);
    let mut matched = store.list(&request.index, &key, Some(&predicate))?;
    orderer.sort(&mut matched);

    let total = matched.len();
    let items = page(&matched, request.offset, request.first).to_vec();
    log::trace!(
        "query index={} key='{}' total={} returned={} elapsed_us={}",
        request.index,
        key,
        total,
        items.len(),
        started.elapsed().as_micros()
    );
    Ok(Page { total, items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_from_leading_constraints() {
        let keys = ["$.metadata.namespace", "$.metadata.name"];
        let f = build_filter(Some("`$.metadata.namespace` = 'ns1' AND `$.spec.x` = 1"), &keys).unwrap();
        assert_eq!(f.key_suffix, "ns1/");
        let f = build_filter(Some("`$.metadata.name` = 'a.b' AND 'ns1' = `$['metadata']['namespace']`"), &keys).unwrap();
        assert_eq!(f.key_suffix, "ns1/a.b");
    }

    #[test]
    fn no_suffix_under_or_or_gap() {
        let keys = ["$.metadata.namespace", "$.metadata.name"];
        let f = build_filter(Some("`$.metadata.namespace` = 'a' OR `$.metadata.namespace` = 'b'"), &keys).unwrap();
        assert_eq!(f.key_suffix, "");
        let f = build_filter(Some("`$.metadata.name` = 'x.y'"), &keys).unwrap();
        assert_eq!(f.key_suffix, "");
        assert!(f.expression.is_some());
    }

    #[test]
    fn blank_filter_has_no_expression() {
        let f = build_filter(Some("  "), &[]).unwrap();
        assert!(f.expression.is_none());
        assert!(build_filter(Some("`$.a` = "), &[]).is_err());
    }
}
