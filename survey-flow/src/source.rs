//! Where question sequences come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use survey_flow_types::{QuestionSequence, SequenceError};
use tracing::debug;

/// File extension of stored sessions.
pub const SESSION_EXTENSION: &str = "json";

/// Error type for fetching a question sequence.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown session {0:?}")]
    UnknownSession(String),

    #[error("Invalid session id {0:?}")]
    InvalidSessionId(String),

    #[error("Session {session:?}: {source}")]
    Payload {
        session: String,
        #[source]
        source: SequenceError,
    },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn payload(session: impl Into<String>, source: SequenceError) -> Self {
        Self::Payload {
            session: session.into(),
            source,
        }
    }

    /// Whether the session simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownSession(_))
    }
}

/// The one-time fetch of a session's questions.
pub trait QuestionSource {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError>;
}

impl<T: QuestionSource + ?Sized> QuestionSource for &T {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError> {
        (**self).fetch(session_id)
    }
}

impl<T: QuestionSource + ?Sized> QuestionSource for Box<T> {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError> {
        (**self).fetch(session_id)
    }
}

/// Sessions stored as `<root>/<session_id>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, SourceError> {
        let valid = !session_id.is_empty()
            && !session_id.contains(['/', '\\'])
            && !session_id.contains("..");
        if !valid {
            return Err(SourceError::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.root.join(format!("{session_id}.{SESSION_EXTENSION}")))
    }
}

impl QuestionSource for DirectorySource {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError> {
        let path = self.path_for(session_id)?;
        let payload = match std::fs::read_to_string(&path) {
            Ok(payload) => payload,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::UnknownSession(session_id.to_string()));
            }
            Err(err) => return Err(SourceError::io(path, err)),
        };
        let sequence = QuestionSequence::from_json(&payload)
            .map_err(|err| SourceError::payload(session_id, err))?;
        debug!(session_id, path = %path.display(), questions = sequence.len(), "fetched session");
        Ok(sequence)
    }
}

/// A single payload file, whatever the session id.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionSource for FileSource {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError> {
        let payload =
            std::fs::read_to_string(&self.path).map_err(|err| SourceError::io(&self.path, err))?;
        QuestionSequence::from_json(&payload).map_err(|err| SourceError::payload(session_id, err))
    }
}

/// In-memory sessions.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    sessions: HashMap<String, QuestionSequence>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session_id: impl Into<String>, sequence: QuestionSequence) -> Self {
        self.sessions.insert(session_id.into(), sequence);
        self
    }
}

impl QuestionSource for StaticSource {
    fn fetch(&self, session_id: &str) -> Result<QuestionSequence, SourceError> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| SourceError::UnknownSession(session_id.to_string()))
    }
}
