use std::fmt;

use super::node::Node;
use crate::errors::CacheError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Name(String),
    Index(usize),
}

/// A compiled `$.a.b['c'][0]` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    steps: Vec<Step>,
}

impl FieldPath {
    /// Parses a path rooted at `$`. Dotted and bracketed steps may be mixed.
    ///
    /// # Errors
    /// Returns `CacheError::Parse` for malformed paths or paths deeper than `max_depth`.
    pub fn parse(text: &str, max_depth: usize) -> Result<Self, CacheError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.first() != Some(&'$') {
            return Err(CacheError::parse(0, format!("path '{text}' must start with '$'")));
        }
        let mut steps = Vec::new();
        let mut i = 1;
        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && !matches!(chars[end], '.' | '[' | ']') {
                        end += 1;
                    }
                    if end == start {
                        return Err(CacheError::parse(i, format!("empty step in path '{text}'")));
                    }
                    steps.push(Step::Name(chars[start..end].iter().collect()));
                    i = end;
                }
                '[' => {
                    let (step, next) = parse_bracket(&chars, i, text)?;
                    steps.push(step);
                    i = next;
                }
                c => {
                    return Err(CacheError::parse(i, format!("unexpected '{c}' in path '{text}'")));
                }
            }
            if steps.len() > max_depth {
                return Err(CacheError::parse(i, format!("path '{text}' exceeds depth {max_depth}")));
            }
        }
        Ok(Self { raw: text.to_string(), steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks the path; any missing step yields `None`.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        let mut cur = root;
        for step in &self.steps {
            cur = match step {
                Step::Name(name) => cur.member(name)?,
                Step::Index(idx) => cur.element(*idx)?,
            };
        }
        Some(cur)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_bracket(chars: &[char], open: usize, text: &str) -> Result<(Step, usize), CacheError> {
    let mut i = open + 1;
    match chars.get(i) {
        Some(&q @ ('\'' | '"')) => {
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != q {
                i += 1;
            }
            if i >= chars.len() {
                return Err(CacheError::parse(open, format!("unterminated quote in path '{text}'")));
            }
            let name: String = chars[start..i].iter().collect();
            i += 1;
            if chars.get(i) != Some(&']') {
                return Err(CacheError::parse(i, format!("expected ']' in path '{text}'")));
            }
            Ok((Step::Name(name), i + 1))
        }
        Some(c) if c.is_ascii_digit() => {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            let idx = digits
                .parse::<usize>()
                .map_err(|e| CacheError::parse(start, format!("bad index '{digits}': {e}")))?;
            if chars.get(i) != Some(&']') {
                return Err(CacheError::parse(i, format!("expected ']' in path '{text}'")));
            }
            Ok((Step::Index(idx), i + 1))
        }
        _ => Err(CacheError::parse(i, format!("expected quoted name or index in path '{text}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::record()
            .plain("FooStr", "Bar")
            .field("metadata", "object_meta", Node::record().plain("namespace", "foo"))
            .plain("items", vec![Node::from("a"), Node::from("b")])
            .plain("dotted.key", 7)
            .build()
    }

    #[test]
    fn dotted_and_bracket_steps_agree() {
        let n = sample();
        let a = FieldPath::parse("$.FooStr", 32).unwrap();
        let b = FieldPath::parse("$['FooStr']", 32).unwrap();
        assert_eq!(a.resolve(&n), b.resolve(&n));
        assert_eq!(a.resolve(&n), Some(&Node::Str("Bar".into())));
    }

    #[test]
    fn bracket_allows_special_characters() {
        let n = sample();
        let p = FieldPath::parse("$[\"dotted.key\"]", 32).unwrap();
        assert_eq!(p.resolve(&n), Some(&Node::Int(7)));
    }

    #[test]
    fn index_steps_walk_lists() {
        let n = sample();
        assert_eq!(FieldPath::parse("$.items[1]", 32).unwrap().resolve(&n), Some(&Node::Str("b".into())));
        assert_eq!(FieldPath::parse("$.items[5]", 32).unwrap().resolve(&n), None);
    }

    #[test]
    fn native_name_fallback() {
        let n = sample();
        let p = FieldPath::parse("$.object_meta.namespace", 32).unwrap();
        assert_eq!(p.resolve(&n), Some(&Node::Str("foo".into())));
    }

    #[test]
    fn missing_steps_resolve_to_none() {
        let n = sample();
        assert_eq!(FieldPath::parse("$.FooStr.Sub", 32).unwrap().resolve(&n), None);
        assert_eq!(FieldPath::parse("$.Nope", 32).unwrap().resolve(&n), None);
    }

    #[test]
    fn root_path_resolves_to_object() {
        let n = sample();
        assert_eq!(FieldPath::parse("$", 32).unwrap().resolve(&n), Some(&n));
    }

    #[test]
    fn malformed_paths_rejected() {
        for bad in ["FooStr", "$.", "$..a", "$['a'", "$[a]", "$.a]"] {
            assert!(FieldPath::parse(bad, 32).is_err(), "{bad}");
        }
        assert!(FieldPath::parse("$.a.b.c", 2).is_err());
    }
}
