/// ID-based handle system for safe ownership management
/// Documents and editors are referenced by handle, never by pointer
use std::fmt;

/// Unique identifier for an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub usize);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({})", self.0)
    }
}

/// Unique identifier for an editor (a view into a document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub usize);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Editor({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id() {
        let id1 = DocumentId(0);
        let id2 = DocumentId(1);
        assert_ne!(id1, id2);
        assert_eq!(format!("{}", id1), "Document(0)");
    }

    #[test]
    fn test_id_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        let id = EditorId(42);
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
