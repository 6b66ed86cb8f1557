use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for spritely operations
#[derive(Error, Diagnostic, Debug)]
pub enum SpritelyError {
    #[error("IO error: {0}")]
    #[diagnostic(code(spritely::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(spritely::io))]
    Io {
        path: PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(spritely::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(spritely::config))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid sprite directive: {message}")]
    #[diagnostic(code(spritely::directive))]
    DirectiveParse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("sprite tool exited with code {code}: {stderr}")]
    #[diagnostic(code(spritely::execution))]
    Execution {
        code: i32,
        stderr: String,
    },

    #[error("sprite tool reported an error: {stdout}")]
    #[diagnostic(code(spritely::tool))]
    ToolReported {
        stdout: String,
    },

    #[error("no generated output matching {pattern} under {root}")]
    #[diagnostic(code(spritely::locate))]
    NoOutputFound {
        root: PathBuf,
        pattern: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, SpritelyError>;
