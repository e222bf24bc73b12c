//! Template concatenation
//!
//! Merges every template of a registry under one root element whose tag is
//! borrowed from the first file of the load.

use xml::EmitterConfig;

use super::checksum::Checksum;
use super::dom::{Element, Node};
use super::error::{Result, TemplateError};
use super::reader::SourceReader;
use super::registry::TemplateRegistry;
use super::tree;
use crate::logger;

/// Output of one concatenation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenation {
    /// Serialized document, UTF-8, no XML declaration
    pub xml: Vec<u8>,
    /// SHA-1 hex digest of the raw bytes of every file read, in order
    pub checksum: String,
}

impl Concatenation {
    pub fn into_text(self) -> Result<String> {
        Ok(String::from_utf8(self.xml)?)
    }
}

pub struct Concatenator<R> {
    reader: R,
}

impl<R: SourceReader> Concatenator<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Load `files` into `registry` and serialize everything it holds.
    ///
    /// Templates registered by earlier calls are emitted again: the output
    /// covers the whole registry, not only the files of this call.
    pub fn concat<S: AsRef<str>>(
        &self,
        registry: &mut TemplateRegistry,
        files: &[S],
    ) -> Result<Concatenation> {
        let mut checksum = Checksum::new();
        let mut root: Option<Element> = None;

        for file in files {
            let file = file.as_ref();
            let contents = self.reader.read(file).map_err(|e| TemplateError::Io {
                file: file.to_string(),
                source: e,
            })?;
            checksum.update(&contents);

            let outcome = tree::compute_xml_tree(registry, file, &contents)?;
            if let Some(name) = outcome.duplicate() {
                logger::log_info(&format!(
                    "Template {name} already registered for {file}, skipping the rest of the file"
                ));
            }

            if root.is_none() {
                root = Some(synthesize_root(&outcome.into_tree()));
            }
        }

        let Some(mut root) = root else {
            return Ok(Concatenation {
                xml: Vec::new(),
                checksum: checksum.hexdigest(),
            });
        };

        for template in registry.templates() {
            root.children.push(Node::Element(template.element.clone()));
            if !template.tail.is_empty() {
                root.push_text(&template.tail);
            }
        }

        Ok(Concatenation {
            xml: serialize(&root)?,
            checksum: checksum.hexdigest(),
        })
    }
}

/// Empty element carrying the tag and namespace declarations of `source`
fn synthesize_root(source: &Element) -> Element {
    let mut root = Element::new(source.name.as_str());
    root.namespaces.clone_from(&source.namespaces);
    root
}

fn serialize(root: &Element) -> Result<Vec<u8>> {
    let mut writer = EmitterConfig::new()
        .write_document_declaration(false)
        .pad_self_closing(false)
        .create_writer(Vec::new());
    root.write(&mut writer)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::testing::MemoryReader;

    const APP: &str = r#"<templates>
    <!-- root component -->
    <div t-name="App" class="app"><Header/></div>
    <span t-name="Footer">bye</span>
</templates>"#;

    const HEADER: &str = r#"<odoo><header t-name="Header">hi</header></odoo>"#;

    fn child_tags(xml: &[u8]) -> (String, Vec<(String, Option<String>)>) {
        let root = Element::parse(xml).unwrap();
        let children = root
            .child_elements()
            .map(|e| {
                (
                    e.name.clone(),
                    e.attribute(tree::NAME_TEMPLATE_DIRECTIVE).map(ToString::to_string),
                )
            })
            .collect();
        (root.name, children)
    }

    #[test]
    fn test_empty_file_list() {
        let concatenator = Concatenator::new(MemoryReader::default());
        let mut registry = TemplateRegistry::new();
        let files: [&str; 0] = [];

        let result = concatenator.concat(&mut registry, &files).unwrap();
        assert!(result.xml.is_empty());
        assert_eq!(result.checksum, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_single_file_two_named_templates() {
        let reader =
            MemoryReader::default().with("t.xml", r#"<root><a t-name="x"/><b t-name="y"/></root>"#);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let result = concatenator.concat(&mut registry, &["t.xml"]).unwrap();
        let text = result.into_text().unwrap();
        assert!(text.starts_with("<root"));

        let (root, children) = child_tags(text.as_bytes());
        assert_eq!(root, "root");
        assert_eq!(
            children,
            vec![
                ("a".to_string(), Some("x".to_string())),
                ("b".to_string(), Some("y".to_string())),
            ]
        );
    }

    #[test]
    fn test_root_tag_comes_from_first_file() {
        let reader = MemoryReader::default()
            .with("app.xml", APP)
            .with("header.xml", HEADER);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let result = concatenator
            .concat(&mut registry, &["app.xml", "header.xml"])
            .unwrap();
        let (root, children) = child_tags(&result.xml);
        assert_eq!(root, "templates");
        let names: Vec<_> = children.into_iter().filter_map(|(_, n)| n).collect();
        assert_eq!(names, vec!["App", "Footer", "Header"]);
    }

    #[test]
    fn test_anonymous_template_in_output() {
        let reader = MemoryReader::default().with("t.xml", "<templates><div>plain</div></templates>");
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let result = concatenator.concat(&mut registry, &["t.xml"]).unwrap();
        assert!(registry.get("t.xml", "anonymous_template_0").is_some());

        let (root, children) = child_tags(&result.xml);
        assert_eq!(root, "templates");
        assert_eq!(children, vec![("div".to_string(), None)]);
    }

    #[test]
    fn test_checksum_covers_raw_bytes_in_order() {
        let reader = MemoryReader::default()
            .with("app.xml", APP)
            .with("header.xml", HEADER);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let result = concatenator
            .concat(&mut registry, &["app.xml", "header.xml"])
            .unwrap();

        let mut expected = Checksum::new();
        expected.update(format!("{APP}{HEADER}").as_bytes());
        assert_eq!(result.checksum, expected.hexdigest());
    }

    #[test]
    fn test_comments_not_in_output() {
        let reader = MemoryReader::default().with("app.xml", APP);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let text = concatenator
            .concat(&mut registry, &["app.xml"])
            .unwrap()
            .into_text()
            .unwrap();
        assert!(!text.contains("root component"));
        assert!(!text.starts_with("<?xml"));
    }

    #[test]
    fn test_second_load_adds_no_duplicates() {
        let reader = MemoryReader::default()
            .with("app.xml", APP)
            .with("header.xml", HEADER);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();
        let files = ["app.xml", "header.xml"];

        let first = concatenator.concat(&mut registry, &files).unwrap();
        let second = concatenator.concat(&mut registry, &files).unwrap();

        assert_eq!(registry.template_count(), 3);
        assert_eq!(first.xml, second.xml);
        assert_eq!(first.checksum, second.checksum);
    }

    #[test]
    fn test_earlier_loads_are_emitted_again() {
        let reader = MemoryReader::default()
            .with("app.xml", APP)
            .with("header.xml", HEADER);
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        concatenator.concat(&mut registry, &["app.xml"]).unwrap();
        let result = concatenator.concat(&mut registry, &["header.xml"]).unwrap();

        let (root, children) = child_tags(&result.xml);
        assert_eq!(root, "odoo");
        let names: Vec<_> = children.into_iter().filter_map(|(_, n)| n).collect();
        assert_eq!(names, vec!["App", "Footer", "Header"]);
    }

    #[test]
    fn test_malformed_file_fails_the_load() {
        let reader = MemoryReader::default()
            .with("app.xml", APP)
            .with("bad.xml", "<templates><div t-name=\"x\"></templates>");
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let err = concatenator
            .concat(&mut registry, &["app.xml", "bad.xml"])
            .unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref file, .. } if file == "bad.xml"));
    }

    #[test]
    fn test_missing_file_fails_the_load() {
        let concatenator = Concatenator::new(MemoryReader::default());
        let mut registry = TemplateRegistry::new();

        let err = concatenator
            .concat(&mut registry, &["missing.xml"])
            .unwrap_err();
        assert!(matches!(err, TemplateError::Io { ref file, .. } if file == "missing.xml"));
    }

    #[test]
    fn test_text_inside_and_between_templates_survives() {
        let reader = MemoryReader::default().with(
            "t.xml",
            r#"<templates><p t-name="X"><b>Total:</b> <t t-esc="amount"/> EUR</p> tail <y t-name="Y"/></templates>"#,
        );
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let text = concatenator
            .concat(&mut registry, &["t.xml"])
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(
            text,
            r#"<templates><p t-name="X"><b>Total:</b> <t t-esc="amount"/> EUR</p> tail <y t-name="Y"/></templates>"#
        );
    }

    #[test]
    fn test_namespaced_attributes_keep_their_prefix() {
        let reader = MemoryReader::default()
            .with(
                "app.xml",
                r##"<templates><svg t-name="I" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#cart"/></svg><t t-name="S" xml:space="preserve"/></templates>"##,
            )
            .with(
                "icons.xml",
                r#"<odoo xmlns:t="urn:t"><t:icon t-name="Cart" t:size="2"/></odoo>"#,
            );
        let concatenator = Concatenator::new(reader);
        let mut registry = TemplateRegistry::new();

        let text = concatenator
            .concat(&mut registry, &["app.xml", "icons.xml"])
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(
            text,
            r##"<templates><svg xmlns:xlink="http://www.w3.org/1999/xlink" t-name="I"><use xlink:href="#cart"/></svg><t t-name="S" xml:space="preserve"/><t:icon xmlns:t="urn:t" t-name="Cart" t:size="2"/></templates>"##
        );
    }
}
