//! # survey-flow
//!
//! Question navigation and interaction state machine for linear surveys.
//!
//! A session walks a [`QuestionSequence`] one question at a time:
//!
//! 1. the question's type is resolved to a template ([`registry`]),
//! 2. the template is rendered into a [`Fragment`] ([`TemplateRenderer`]),
//! 3. a completion rule is bound to the fragment ([`InteractionBinder`]),
//! 4. when the rule fires, the [`NavigationController`] advances the cursor
//!    and repeats, until it reaches [`NavigationState::Done`].
//!
//! Missing templates and unknown question types never stop a session: the
//! question renders empty, a [`Diagnostic`] is recorded, and a submit still
//! moves on.
//!
//! ## Usage
//!
//! ```rust
//! use survey_flow::{BundledTemplates, Interaction, NavigationController, NavigationState};
//! use survey_flow::{Question, QuestionSequence, TypeCode};
//!
//! let sequence = QuestionSequence::new(vec![
//!     Question::new(TypeCode::YesNo).with_prompt("Coffee?"),
//! ]);
//! let mut controller = NavigationController::with_store(sequence, BundledTemplates::new());
//!
//! let yes = controller.fragment().unwrap().find("Yes").unwrap().id;
//! controller.interact(Interaction::Click(yes));
//!
//! assert_eq!(controller.state(), NavigationState::Done);
//! ```
//!
//! ## Front-ends
//!
//! Front-ends implement [`SurveyFrontend`]:
//! - [`ScriptedSession`] - replays scripted steps, for tests
//! - `survey-flow-tui` - terminal front-end built on ratatui

pub use survey_flow_types::*;

mod fragment;
pub use fragment::{Control, ControlId, ControlKind, Fragment, FragmentLine};

pub mod registry;
pub use registry::{UnsupportedType, resolve_template, template_for};

mod template;
pub use template::{Template, TemplateError};

mod store;
pub use store::{
    BundledTemplates, DirectoryTemplates, LayeredTemplates, MapTemplates, TEMPLATE_EXTENSION,
    TemplateStore,
};

mod render;
pub use render::{Rendered, TemplateRenderer};

mod binder;
pub use binder::{
    Binding, CompletionRule, DEFAULT_DROPDOWN_PLACEHOLDER, Interaction, InteractionBinder, Key,
    Reaction, Widget,
};

mod navigation;
pub use navigation::{NavigationController, NavigationState, RenderToken};

mod source;
pub use source::{
    DirectorySource, FileSource, QuestionSource, SESSION_EXTENSION, SourceError, StaticSource,
};

mod frontend;
pub use frontend::{SurveyFrontend, run_session};

// Scripted front-end for driving sessions without user interaction
mod scripted;
pub use scripted::{ScriptError, ScriptedSession, Step};
