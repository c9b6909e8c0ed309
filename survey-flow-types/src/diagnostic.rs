use std::fmt;

/// Identifier of a presentation template, e.g. `yes_no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateId(&'static str);

impl TemplateId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The bare identifier.
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// The key under which the template store holds this template.
    pub fn key(&self) -> String {
        format!("{}_template", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A non-fatal problem found while rendering a question.
///
/// Diagnostics never block navigation: the affected question renders as an
/// empty fragment and still waits for a submit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("Question {index}: template {} not found", .template.key())]
    TemplateNotFound { index: usize, template: TemplateId },

    #[error("Question {index}: question type {code:?} not supported")]
    UnsupportedType { index: usize, code: String },

    #[error("Question {index}: template {} is malformed: {reason}", .template.key())]
    MalformedTemplate {
        index: usize,
        template: TemplateId,
        reason: String,
    },
}

impl Diagnostic {
    /// Index of the question the diagnostic was recorded for.
    pub fn index(&self) -> usize {
        match self {
            Self::TemplateNotFound { index, .. }
            | Self::UnsupportedType { index, .. }
            | Self::MalformedTemplate { index, .. } => *index,
        }
    }
}
