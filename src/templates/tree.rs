//! XML tree building and template registration

use super::dom::{Element, Node};
use super::error::{Result, TemplateError};
use super::registry::{Template, TemplateRegistry};
use crate::logger;

/// Attribute naming a top-level template
pub const NAME_TEMPLATE_DIRECTIVE: &str = "t-name";

/// Result of registering the templates of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    /// Every top-level element of the file was registered
    Merged(Element),
    /// Registration stopped at `name`, which the file's slot already held.
    /// Templates before it in this file stay registered.
    DuplicateDetected { tree: Element, name: String },
}

impl TreeOutcome {
    pub const fn tree(&self) -> &Element {
        match self {
            Self::Merged(tree) | Self::DuplicateDetected { tree, .. } => tree,
        }
    }

    pub fn into_tree(self) -> Element {
        match self {
            Self::Merged(tree) | Self::DuplicateDetected { tree, .. } => tree,
        }
    }

    pub fn duplicate(&self) -> Option<&str> {
        match self {
            Self::Merged(_) => None,
            Self::DuplicateDetected { name, .. } => Some(name),
        }
    }
}

/// Parse `source` into an element tree with all comments removed
pub fn parse_document(file_name: &str, source: &[u8]) -> Result<Element> {
    Element::parse(source).map_err(|e| {
        logger::log_error(&format!("Could not parse file {file_name}: {e}"));
        TemplateError::Parse {
            file: file_name.to_string(),
            source: e,
        }
    })
}

/// Parse `source` and register its top-level elements under `file_name`.
///
/// A template is named by its `t-name` attribute, or `anonymous_template_<k>`
/// where `k` is the number of templates the file's slot already holds. The
/// text following a template in its file is registered with it, and the
/// namespace declarations of the file's root that it uses are copied onto it.
pub fn compute_xml_tree(
    registry: &mut TemplateRegistry,
    file_name: &str,
    source: &[u8],
) -> Result<TreeOutcome> {
    let root = parse_document(file_name, source)?;
    let slot = registry.slot_mut(file_name);

    let mut duplicate = None;
    let mut nodes = root.children.iter().peekable();
    while let Some(node) = nodes.next() {
        let Node::Element(template) = node else {
            continue;
        };

        let name = template.attribute(NAME_TEMPLATE_DIRECTIVE).map_or_else(
            || format!("anonymous_template_{}", slot.len()),
            ToString::to_string,
        );
        if slot.contains_key(&name) {
            duplicate = Some(name);
            break;
        }

        let tail = match nodes.peek() {
            Some(Node::Text(text)) => text.clone(),
            _ => String::new(),
        };
        let mut element = template.clone();
        element.bind_namespaces(&root.namespaces);
        slot.insert(name, Template { element, tail });
    }

    Ok(match duplicate {
        Some(name) => TreeOutcome::DuplicateDetected { tree: root, name },
        None => TreeOutcome::Merged(root),
    })
}
