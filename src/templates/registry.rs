//! Template registry
//!
//! Keeps every template registered by a loader, grouped by the file it came
//! from. Both levels preserve insertion order, which is the order templates are
//! emitted in the concatenated document.

use indexmap::IndexMap;

use super::dom::Element;

/// A registered top-level element and the text that followed it in its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub element: Element,
    pub tail: String,
}

/// Templates of a single file, by name
pub type FileTemplates = IndexMap<String, Template>;

#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    files: IndexMap<String, FileTemplates>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `file`, created empty on first use
    pub fn slot_mut(&mut self, file: &str) -> &mut FileTemplates {
        self.files.entry(file.to_string()).or_default()
    }

    pub fn slot(&self, file: &str) -> Option<&FileTemplates> {
        self.files.get(file)
    }

    pub fn get(&self, file: &str, name: &str) -> Option<&Template> {
        self.files.get(file)?.get(name)
    }

    /// All templates, file insertion order then template insertion order
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.files.values().flat_map(IndexMap::values)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn template_count(&self) -> usize {
        self.files.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.template_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(tag: &str) -> Template {
        Template {
            element: Element::new(tag),
            tail: String::new(),
        }
    }

    #[test]
    fn test_slot_is_created_once() {
        let mut registry = TemplateRegistry::new();
        registry.slot_mut("a.xml");
        registry.slot_mut("a.xml");
        assert_eq!(registry.file_count(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_templates_keep_insertion_order() {
        let mut registry = TemplateRegistry::new();
        registry.slot_mut("b.xml").insert("z".into(), template("z"));
        registry.slot_mut("a.xml").insert("y".into(), template("y"));
        registry.slot_mut("b.xml").insert("x".into(), template("x"));

        let tags: Vec<&str> = registry
            .templates()
            .map(|t| t.element.name.as_str())
            .collect();
        assert_eq!(tags, vec!["z", "x", "y"]);
        assert_eq!(registry.template_count(), 3);
        assert!(registry.get("a.xml", "y").is_some());
        assert!(registry.get("a.xml", "z").is_none());
    }
}
