//! Static collection registration.
//!
//! Collections are registered explicitly, either by library callers or from
//! the `[[collection]]` tables of `lectern.toml`. Declaration order is kept:
//! it is the order collections are indexed and listed in.

use super::definition::{CollectionDefinition, DefinitionError, ParsedCollection};

#[derive(Debug, Default, Clone)]
pub struct Registry {
    collections: Vec<ParsedCollection>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a definition.
    ///
    /// Two collections cannot share a root directory: both would write the
    /// same generated index.
    pub fn register(
        &mut self,
        definition: CollectionDefinition,
    ) -> Result<&ParsedCollection, DefinitionError> {
        let parsed = definition.parse()?;
        if self.collections.iter().any(|c| c.root_dir == parsed.root_dir) {
            return Err(DefinitionError::DuplicateCollection(parsed.root_dir));
        }
        let index = self.collections.len();
        self.collections.push(parsed);
        Ok(&self.collections[index])
    }

    /// Look up by id, name, export name or root directory.
    pub fn get(&self, reference: &str) -> Option<&ParsedCollection> {
        self.collections.iter().find(|c| c.is_named(reference))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedCollection> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ParsedCollection;
    type IntoIter = std::slice::Iter<'a, ParsedCollection>;

    fn into_iter(self) -> Self::IntoIter {
        self.collections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::pattern::PathPattern;

    #[test]
    fn test_register_keeps_order() {
        let mut registry = Registry::new();
        registry
            .register(CollectionDefinition::new(PathPattern::root("pages").any()))
            .unwrap();
        registry
            .register(CollectionDefinition::new(PathPattern::root("docs").any()).name("Docs"))
            .unwrap();

        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Pages", "Docs"]);
        assert_eq!(registry.get("docs").unwrap().name, "Docs");
        assert!(registry.get("posts").is_none());
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let mut registry = Registry::new();
        registry
            .register(CollectionDefinition::new(PathPattern::root("pages").any()))
            .unwrap();
        let err = registry
            .register(CollectionDefinition::new(PathPattern::root("./pages/").raw(r".*\.md")))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateCollection(root) if root == "pages"));
        assert_eq!(registry.len(), 1);
    }
}
