use miette::Diagnostic;
use thiserror::Error;

/// Main error type for imp operations
#[derive(Error, Diagnostic, Debug)]
pub enum ImpError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(imp::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(imp::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(imp::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Collection error: {message}")]
    #[diagnostic(code(imp::collect))]
    Collection {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Package error: {message}")]
    #[diagnostic(code(imp::package))]
    Package {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Descriptor error in {path}: {message}")]
    #[diagnostic(code(imp::descriptor))]
    Descriptor {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Image error with {path}: {message}")]
    #[diagnostic(code(imp::image))]
    Image {
        path: std::path::PathBuf,
        message: String,
    },
}

impl ImpError {
    /// Validation error without help text.
    pub fn validation(message: impl Into<String>) -> Self {
        ImpError::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Package precondition error with help text.
    pub fn package(message: impl Into<String>, help: impl Into<String>) -> Self {
        ImpError::Package {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImpError>;
