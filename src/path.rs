//! Field paths
//!
//! A field path is the ordered list of field names leading from a document
//! root to a (possibly nested) field. It renders as a dot-joined string, which
//! is also how the search engine addresses nested fields.

use std::fmt;

use serde_json::{Map, Value};

/// Ordered sequence of field names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Create an empty path (the document root)
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a path from segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a dot-joined path
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self::new(dotted.split('.'))
    }

    /// Append a field name
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Remove the last field name
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Returns true for the document root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, if any
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Dot-joined rendering used as an engine field address
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Navigate a JSON document along this path.
    ///
    /// Returns `None` if any intermediate node is missing or is not an object.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut node = document;
        for segment in &self.segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Collect every value reachable along this path.
    ///
    /// Arrays encountered along the way fan out, so `tags.name` over
    /// `{"tags": [{"name": "a"}, {"name": "b"}]}` yields both names.
    pub fn collect<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![document];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match node {
                    Value::Object(map) => {
                        if let Some(child) = map.get(segment) {
                            next.push(child);
                        }
                    }
                    Value::Array(items) => {
                        for item in items {
                            if let Some(child) = item.as_object().and_then(|m| m.get(segment)) {
                                next.push(child);
                            }
                        }
                    }
                    _ => {}
                }
            }
            current = next;
        }

        let mut flattened = Vec::with_capacity(current.len());
        for value in current {
            match value {
                Value::Array(items) => flattened.extend(items.iter()),
                other => flattened.push(other),
            }
        }
        flattened
    }

    /// Insert a value at this path, creating intermediate objects.
    ///
    /// Non-object intermediate values are replaced.
    pub fn insert(&self, target: &mut Map<String, Value>, value: Value) {
        let Some((last, parents)) = self.segments.split_last() else {
            return;
        };

        let mut node = target;
        for segment in parents {
            let entry = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        node.insert(last.clone(), value);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dotted_rendering() {
        let path = FieldPath::new(["listing", "listing_urn"]);
        assert_eq!(path.dotted(), "listing.listing_urn");
        assert_eq!(path.to_string(), "listing.listing_urn");
        assert_eq!(FieldPath::parse("listing.listing_urn"), path);
        assert!(FieldPath::parse("").is_root());
    }

    #[test]
    fn test_push_pop() {
        let mut path = FieldPath::root();
        path.push("property");
        path.push("bedrooms");
        assert_eq!(path.dotted(), "property.bedrooms");
        assert_eq!(path.pop().as_deref(), Some("bedrooms"));
        assert_eq!(path.dotted(), "property");
    }

    #[test]
    fn test_resolve_nested() {
        let doc = json!({"listing": {"listing_urn": "listing:1"}});
        let path = FieldPath::parse("listing.listing_urn");
        assert_eq!(path.resolve(&doc), Some(&json!("listing:1")));
        assert_eq!(FieldPath::parse("listing.missing").resolve(&doc), None);
    }

    #[test]
    fn test_collect_fans_out_arrays() {
        let doc = json!({"tags": [{"name": "a"}, {"name": "b"}], "ids": [1, 2]});
        let names = FieldPath::parse("tags.name").collect(&doc);
        assert_eq!(names, vec![&json!("a"), &json!("b")]);
        assert_eq!(FieldPath::parse("ids").collect(&doc).len(), 2);
    }

    #[test]
    fn test_insert_creates_parents() {
        let mut target = Map::new();
        FieldPath::parse("property.bedrooms").insert(&mut target, json!([1]));
        assert_eq!(Value::Object(target), json!({"property": {"bedrooms": [1]}}));
    }
}
