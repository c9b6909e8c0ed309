//! Core types for the survey-flow crate.
//!
//! This crate provides the data model shared by the navigation core and its
//! front-ends:
//! - `TypeCode` and `QuestionType` - The closed set of question types
//! - `Question` and `Parameters` - Individual questions as fetched
//! - `QuestionSequence` - The immutable, ordered list of a session's questions
//! - `TemplateId` and `Diagnostic` - Template identifiers and non-fatal render problems

mod type_code;
pub use type_code::{QuestionType, TypeCode, UnknownTypeCode};

mod question;
pub use question::{FORMAT_KEY, MULTIPLE_SELECTION_KEY, Parameters, Question};

mod sequence;
pub use sequence::QuestionSequence;

mod diagnostic;
pub use diagnostic::{Diagnostic, TemplateId};

mod error;
pub use error::SequenceError;
