//! Scripted front-end for driving sessions without a terminal.
//!
//! `ScriptedSession` plays a fixed list of steps against a controller. Steps
//! that name a control by label are resolved against whatever fragment is
//! displayed when the step runs.
//!
//! # Example
//!
//! ```rust
//! use survey_flow::{BundledTemplates, NavigationController, NavigationState, ScriptedSession};
//! use survey_flow::{Question, QuestionSequence, TypeCode};
//!
//! let sequence = QuestionSequence::new(vec![
//!     Question::new(TypeCode::YesNo).with_prompt("Ready?"),
//!     Question::new(TypeCode::ShortText).with_prompt("Name?"),
//! ]);
//! let mut controller = NavigationController::with_store(sequence, BundledTemplates::new());
//!
//! let state = controller
//!     .run(
//!         &ScriptedSession::new()
//!             .click_label("Yes")
//!             .type_text("Ada")
//!             .confirm(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(state, NavigationState::Done);
//! ```

use std::cell::RefCell;

use crate::binder::{Interaction, Key, Reaction};
use crate::fragment::ControlId;
use crate::frontend::SurveyFrontend;
use crate::navigation::{NavigationController, NavigationState};
use crate::store::TemplateStore;

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Click the first control with this label.
    ClickLabel(String),
    /// Click a control by id.
    Click(ControlId),
    /// Type into the first text control.
    Type(String),
    /// Press the confirm key in the first text control.
    Confirm,
    /// Use the explicit submit action.
    Submit,
    /// Render the current question again.
    Rerender,
    /// Dispatch an arbitrary interaction.
    Interact(Interaction),
}

/// Error type for ScriptedSession.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Step {step}: no control labelled {label:?} in {state}")]
    MissingControl {
        step: usize,
        label: String,
        state: NavigationState,
    },

    #[error("Step {step}: no text control in {state}")]
    NoTextControl { step: usize, state: NavigationState },

    #[error("Step {step}: the session is already done")]
    AlreadyDone { step: usize },
}

/// A front-end that replays pre-recorded steps.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    steps: Vec<Step>,
    reactions: RefCell<Vec<Reaction>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn click_label(self, label: impl Into<String>) -> Self {
        self.step(Step::ClickLabel(label.into()))
    }

    pub fn click(self, id: ControlId) -> Self {
        self.step(Step::Click(id))
    }

    pub fn type_text(self, text: impl Into<String>) -> Self {
        self.step(Step::Type(text.into()))
    }

    pub fn confirm(self) -> Self {
        self.step(Step::Confirm)
    }

    pub fn submit(self) -> Self {
        self.step(Step::Submit)
    }

    pub fn rerender(self) -> Self {
        self.step(Step::Rerender)
    }

    pub fn interact(self, interaction: Interaction) -> Self {
        self.step(Step::Interact(interaction))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Reactions of the last run, one per dispatched step.
    pub fn reactions(&self) -> Vec<Reaction> {
        self.reactions.borrow().clone()
    }

    /// Play every step against `controller`.
    pub fn play<S: TemplateStore>(
        &self,
        controller: &mut NavigationController<S>,
    ) -> Result<Vec<Reaction>, ScriptError> {
        let mut reactions = Vec::with_capacity(self.steps.len());
        for (step, action) in self.steps.iter().enumerate() {
            if controller.is_done() {
                return Err(ScriptError::AlreadyDone { step });
            }
            if let Step::Rerender = action {
                controller.render_current();
                continue;
            }
            let interactions = resolve(controller, step, action)?;
            for interaction in interactions {
                reactions.push(controller.interact(interaction));
            }
        }
        Ok(reactions)
    }
}

/// Turn a step into interactions against the displayed fragment.
fn resolve<S>(
    controller: &NavigationController<S>,
    step: usize,
    action: &Step,
) -> Result<Vec<Interaction>, ScriptError> {
    let state = controller.state();
    let text_control = || {
        controller
            .fragment()
            .and_then(|f| f.controls().iter().find(|c| c.kind.accepts_text()))
            .map(|c| c.id)
            .ok_or(ScriptError::NoTextControl { step, state })
    };

    let interactions = match action {
        Step::ClickLabel(label) => {
            let id = controller
                .fragment()
                .and_then(|f| f.find(label))
                .map(|c| c.id)
                .ok_or_else(|| ScriptError::MissingControl {
                    step,
                    label: label.clone(),
                    state,
                })?;
            vec![Interaction::Click(id)]
        }
        Step::Click(id) => vec![Interaction::Click(*id)],
        Step::Type(text) => {
            let control = text_control()?;
            text.chars()
                .map(|c| Interaction::Key {
                    control,
                    key: Key::Char(c),
                })
                .collect()
        }
        Step::Confirm => vec![Interaction::Key {
            control: text_control()?,
            key: Key::Confirm,
        }],
        Step::Submit => vec![Interaction::Submit],
        Step::Interact(interaction) => vec![interaction.clone()],
        Step::Rerender => Vec::new(),
    };
    Ok(interactions)
}

impl SurveyFrontend for ScriptedSession {
    type Error = ScriptError;

    fn run<S: TemplateStore>(
        &self,
        controller: &mut NavigationController<S>,
    ) -> Result<NavigationState, Self::Error> {
        let reactions = self.play(controller)?;
        *self.reactions.borrow_mut() = reactions;
        Ok(controller.state())
    }
}
