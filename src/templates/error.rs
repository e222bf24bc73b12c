//! Template loading error types

use thiserror::Error;

use super::dom::ParseError;

/// Errors raised while loading and concatenating template files
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to serialize concatenated templates: {0}")]
    Serialize(#[from] xml::writer::Error),

    #[error("Concatenated templates are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
