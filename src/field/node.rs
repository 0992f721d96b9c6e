use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Generic value tree that filter and order paths are walked against.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<Node>),
    Struct(Vec<Field>),
}

/// A struct member carrying both its serialized (wire) name and its native field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub wire: String,
    pub native: String,
    pub value: Node,
}

impl Node {
    #[must_use]
    pub fn record() -> Record {
        Record::default()
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks a member up by wire name, then by native name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Node> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|f| f.wire == name)
                .or_else(|| fields.iter().find(|f| f.native == name))
                .map(|f| &f.value),
            _ => None,
        }
    }

    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Node> {
        match self {
            Self::List(items) => items.get(index),
            _ => None,
        }
    }

    /// String form used by `IN` membership tests.
    #[must_use]
    pub fn display_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::UInt(u) => Some(u.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::List(_) | Self::Struct(_) => None,
        }
    }
}

/// Builder for `Node::Struct`.
#[derive(Debug, Default)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    #[must_use]
    pub fn field(mut self, wire: &str, native: &str, value: impl Into<Node>) -> Self {
        self.fields.push(Field { wire: wire.to_string(), native: native.to_string(), value: value.into() });
        self
    }

    /// A member whose wire and native names coincide.
    #[must_use]
    pub fn plain(self, name: &str, value: impl Into<Node>) -> Self {
        self.field(name, name, value)
    }

    #[must_use]
    pub fn build(self) -> Node {
        Node::Struct(self.fields)
    }
}

impl From<Record> for Node {
    fn from(r: Record) -> Self {
        r.build()
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u64> for Node {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for Node {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<&BTreeMap<String, String>> for Node {
    fn from(map: &BTreeMap<String, String>) -> Self {
        Self::Struct(
            map.iter()
                .map(|(k, v)| Field { wire: k.clone(), native: k.clone(), value: Node::Str(v.clone()) })
                .collect(),
        )
    }
}

impl From<&serde_json::Value> for Node {
    fn from(v: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Self::Null,
            J::Bool(b) => Self::Bool(*b),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            J::String(s) => Self::Str(s.clone()),
            J::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            J::Object(map) => Self::Struct(
                map.iter()
                    .map(|(k, v)| Field { wire: k.clone(), native: k.clone(), value: Self::from(v) })
                    .collect(),
            ),
        }
    }
}

/// Capability to expose an object as a `Node` tree for path resolution.
pub trait FieldSource {
    fn to_node(&self) -> Cow<'_, Node>;
}

impl FieldSource for Node {
    fn to_node(&self) -> Cow<'_, Node> {
        Cow::Borrowed(self)
    }
}

impl FieldSource for serde_json::Value {
    fn to_node(&self) -> Cow<'_, Node> {
        Cow::Owned(Node::from(self))
    }
}

impl<T: FieldSource + ?Sized> FieldSource for Arc<T> {
    fn to_node(&self) -> Cow<'_, Node> {
        (**self).to_node()
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn to_node(&self) -> Cow<'_, Node> {
        (**self).to_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_prefers_wire_name() {
        let n = Node::record().field("metadata", "object_meta", Node::record().plain("namespace", "foo")).build();
        assert!(n.member("metadata").is_some());
        assert!(n.member("object_meta").is_some());
        assert!(n.member("ObjectMeta").is_none());
    }

    #[test]
    fn wire_name_shadows_native_name_of_other_field() {
        let n = Node::record().field("name", "display", "wire").field("title", "name", "native").build();
        assert_eq!(n.member("name"), Some(&Node::Str("wire".into())));
    }

    #[test]
    fn json_numbers_keep_integral_kind() {
        let v = serde_json::json!({"a": 1, "b": 1.5, "c": u64::MAX});
        let n = Node::from(&v);
        assert_eq!(n.member("a"), Some(&Node::Int(1)));
        assert_eq!(n.member("b"), Some(&Node::Float(1.5)));
        assert_eq!(n.member("c"), Some(&Node::UInt(u64::MAX)));
    }
}
