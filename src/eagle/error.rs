//! Error types for EAGLE file operations.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for EAGLE operations.
pub type EagleResult<T> = Result<T, EagleError>;

/// Coarse classification of an [`EagleError`].
///
/// Both kinds are recoverable per file: a caller loading many files logs the
/// failure and carries on with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input does not conform to the expected grammar.
    Format,
    /// The underlying file could not be read or written.
    Io,
}

/// Errors that can occur during EAGLE file operations.
#[derive(Debug, Error)]
pub enum EagleError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document is not well-formed XML.
    #[error("Malformed XML: {message}")]
    Xml {
        /// Parser message, including line and column.
        message: String,
    },

    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute value could not be parsed.
    #[error("<{element}> has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Offending value.
        value: String,
    },

    /// A required child element is absent.
    #[error("<{parent}> is missing required element <{element}>")]
    MissingElement {
        /// Element that was expected.
        element: String,
        /// Element it was expected in.
        parent: String,
    },

    /// An element appeared where the grammar does not allow it.
    #[error("Unexpected element <{element}> inside <{parent}>")]
    UnexpectedElement {
        /// Element that was found.
        element: String,
        /// Enclosing element.
        parent: String,
    },

    /// Wrong file type (e.g., opened a board as a library).
    #[error("Wrong file type: expected {expected}, got {actual}")]
    WrongFileType {
        /// Expected file type.
        expected: String,
        /// Actual file type detected.
        actual: String,
    },

    /// Interchange document could not be encoded or decoded.
    #[error("Interchange document error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// Interchange document has an unsupported header.
    #[error("Unsupported interchange document: {message}")]
    UnsupportedDocument {
        /// Description of what's wrong.
        message: String,
    },

    /// A format error raised while loading a specific file.
    #[error("{path}: {source}")]
    InFile {
        /// File being loaded.
        path: PathBuf,
        /// The format error.
        #[source]
        source: Box<EagleError>,
    },
}

impl EagleError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing attribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attribute(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates a missing element error.
    pub fn missing_element(element: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::MissingElement {
            element: element.into(),
            parent: parent.into(),
        }
    }

    /// Creates an unexpected element error.
    pub fn unexpected_element(element: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            element: element.into(),
            parent: parent.into(),
        }
    }

    /// Creates a wrong file type error.
    pub fn wrong_file_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::WrongFileType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an unsupported document error.
    pub fn unsupported_document(message: impl Into<String>) -> Self {
        Self::UnsupportedDocument {
            message: message.into(),
        }
    }

    /// Attaches the file being loaded to a format error.
    ///
    /// I/O errors already carry their path and are returned unchanged.
    #[must_use]
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::FileRead { .. } | Self::FileWrite { .. } | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileRead { .. } | Self::FileWrite { .. } => ErrorKind::Io,
            Self::InFile { source, .. } => source.kind(),
            _ => ErrorKind::Format,
        }
    }

    /// Returns true if the input did not conform to the grammar.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

impl From<roxmltree::Error> for EagleError {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}
