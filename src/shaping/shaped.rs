use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::links::LinkDto;

pub const LINKS_KEY: &str = "links";

/// Ordered key/value output of a shaping pass.
///
/// Keys keep insertion order when serialized, independent of how
/// `serde_json::Map` is configured. Links, when attached, always come last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedObject {
    entries: Vec<(&'static str, Value)>,
    links: Option<Vec<LinkDto>>,
}

impl ShapedObject {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            links: None,
        }
    }

    /// Set `key`, keeping its position if it is already present.
    pub fn insert(&mut self, key: &'static str, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    /// Output keys in serialization order, `links` included when attached.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .map(|(key, _)| *key)
            .chain(self.links.as_ref().map(|_| LINKS_KEY))
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.links.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn links(&self) -> Option<&[LinkDto]> {
        self.links.as_deref()
    }

    pub fn set_links(&mut self, links: Vec<LinkDto>) {
        self.links = Some(links);
    }

    pub fn with_links(mut self, links: Vec<LinkDto>) -> Self {
        self.set_links(links);
        self
    }
}

impl Serialize for ShapedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        if let Some(links) = &self.links {
            map.serialize_entry(LINKS_KEY, links)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_insertion_order() {
        let mut shaped = ShapedObject::default();
        shaped.insert("zeta", json!(1));
        shaped.insert("alpha", json!("a"));
        shaped.insert("mid", json!({ "nested": [1, 2] }));

        let text = serde_json::to_string(&shaped).unwrap();
        assert_eq!(text, r#"{"zeta":1,"alpha":"a","mid":{"nested":[1,2]}}"#);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut shaped = ShapedObject::default();
        shaped.insert("id", json!("a"));
        shaped.insert("name", json!("b"));
        shaped.insert("id", json!("c"));

        assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(shaped.get("id"), Some(&json!("c")));
    }

    #[test]
    fn links_are_appended_last() {
        let mut shaped = ShapedObject::default();
        shaped.insert("id", json!("t_1"));
        let shaped = shaped.with_links(vec![LinkDto::new("/tags/t_1", "self", "GET")]);

        assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["id", "links"]);
        let text = serde_json::to_string(&shaped).unwrap();
        assert_eq!(
            text,
            r#"{"id":"t_1","links":[{"href":"/tags/t_1","rel":"self","method":"GET"}]}"#
        );
    }
}
