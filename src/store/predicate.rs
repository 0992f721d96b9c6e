use crate::errors::CacheError;
use crate::field::FieldSource;
use crate::filter::Expression;

/// Post-retrieval test applied to each object a lookup returns.
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// # Errors
    /// Implementations propagate evaluation failures; the lookup aborts on the first one.
    fn test(&self, obj: &T) -> Result<bool, CacheError>;
}

impl<T: FieldSource + ?Sized> Predicate<T> for Expression {
    fn test(&self, obj: &T) -> Result<bool, CacheError> {
        self.eval(obj)
    }
}

/// Adapts a closure into a [`Predicate`].
pub struct FnPredicate<F>(pub F);

impl<T: ?Sized, F> Predicate<T> for FnPredicate<F>
where
    F: Fn(&T) -> Result<bool, CacheError> + Send + Sync,
{
    fn test(&self, obj: &T) -> Result<bool, CacheError> {
        (self.0)(obj)
    }
}

/// Conjunction of predicates, evaluated left to right and stopping at the first `false`.
/// An empty conjunction accepts everything.
pub struct And<'a, T: ?Sized> {
    parts: Vec<&'a dyn Predicate<T>>,
}

impl<'a, T: ?Sized> And<'a, T> {
    /// Builds a conjunction from optional parts; absent parts are dropped.
    pub fn of<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a dyn Predicate<T>>>,
    {
        Self { parts: parts.into_iter().flatten().collect() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<T: ?Sized> Predicate<T> for And<'_, T> {
    fn test(&self, obj: &T) -> Result<bool, CacheError> {
        for p in &self.parts {
            if !p.test(obj)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter_expression;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn and_short_circuits() {
        let calls = AtomicUsize::new(0);
        let no = FnPredicate(|_: &serde_json::Value| Ok::<_, CacheError>(false));
        let counted = FnPredicate(|_: &serde_json::Value| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CacheError>(true)
        });
        let both = And::of([Some(&no as &dyn Predicate<serde_json::Value>), Some(&counted as &dyn Predicate<serde_json::Value>)]);
        assert!(!both.test(&json!({})).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn absent_parts_are_dropped() {
        let expr = parse_filter_expression("`$.a` = 1").unwrap();
        let p = And::of([None, Some(&expr as &dyn Predicate<serde_json::Value>)]);
        assert!(p.test(&json!({"a": 1})).unwrap());
        assert!(!p.test(&json!({"a": 2})).unwrap());
        assert!(And::<serde_json::Value>::of([None, None]).test(&json!(null)).unwrap());
    }
}
