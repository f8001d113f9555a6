//! Error enum
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Http(reqwest::Error),
    Persist(tempfile::PersistError),
    /// Input document could not be understood.
    Parse {
        context: String,
        message: String,
    },
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    UnknownFeature(String),
    UnknownEntry(String),
    InvalidTransition(String),
    Custom(String),
}

impl Error {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Serde(e) => write!(f, "json error: {}", e),
            Error::Http(e) => write!(f, "http error: {}", e),
            Error::Persist(e) => write!(f, "could not persist file: {}", e),
            Error::Parse { context, message } => write!(f, "{}: {}", context, message),
            Error::MissingAttribute { element, attribute } => {
                write!(f, "{} is missing required attribute `{}`", element, attribute)
            }
            Error::UnknownFeature(name) => write!(f, "no handler registered for feature `{}`", name),
            Error::UnknownEntry(id) => write!(f, "no entry with id `{}`", id),
            Error::InvalidTransition(msg) => write!(f, "invalid transition: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Serde(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Persist(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Http(e)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Error {
        Error::Persist(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
