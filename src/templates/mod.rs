//! QWeb template concatenation
//!
//! Parses XML template files, registers their top-level elements by name and
//! merges everything registered so far under one synthesized root element.
//!
//! - `dom`: element tree that keeps names and text as written
//! - `reader`: raw file access (`SourceReader`, `FsReader`)
//! - `checksum`: SHA-1 digest over the raw file bytes of one load
//! - `tree`: parsing and per-file template registration
//! - `registry`: ordered file -> name -> element mapping
//! - `concat`: the concatenation routine
//! - `store`: registry + concatenator owned by the running server

mod checksum;
mod concat;
mod dom;
mod error;
mod reader;
mod registry;
mod store;
mod tree;

pub use checksum::Checksum;
pub use concat::{Concatenation, Concatenator};
pub use dom::{Element, Node, ParseError};
pub use error::{Result, TemplateError};
pub use reader::{FsReader, SourceReader};
pub use registry::{Template, TemplateRegistry};
pub use store::TemplateStore;
pub use tree::{compute_xml_tree, parse_document, TreeOutcome, NAME_TEMPLATE_DIRECTIVE};
