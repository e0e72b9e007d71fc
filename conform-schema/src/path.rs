// Node locations

use serde::Serialize;
use std::fmt;

/// One step from a container to a child: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Location of a node relative to the validation root.
///
/// Rendered JSONPath-style: `$` for the root, `$.list[1].name` below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// A new path one level below this one
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Self(segments)
    }

    /// The last segment, if any
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert!(Path::root().is_root());
        assert_eq!(Path::root().to_string(), "$");
    }

    #[test]
    fn test_nested_display() {
        let path = Path::root().child("orders").child(3).child("sku");
        assert_eq!(path.to_string(), "$.orders[3].sku");
        assert_eq!(path.last(), Some(&Segment::Key("sku".to_string())));
    }

    #[test]
    fn test_child_does_not_mutate_parent() {
        let parent = Path::root().child("a");
        let _ = parent.child(0);
        assert_eq!(parent.segments().len(), 1);
    }

    #[test]
    fn test_serialize_segments() {
        let path = Path::root().child("list").child(0);
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["list", 0])
        );
    }
}
