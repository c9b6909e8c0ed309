//! The navigation state machine.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use survey_flow_types::{Diagnostic, Question, QuestionSequence};
use tracing::{debug, info};

use crate::binder::{Binding, Interaction, InteractionBinder, Reaction, Widget};
use crate::fragment::Fragment;
use crate::render::TemplateRenderer;
use crate::store::TemplateStore;

/// Position of the cursor over a question sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    /// Question `i` is displayed and waiting for completion.
    Rendering(usize),
    /// The cursor ran past the last question.
    Done,
}

impl NavigationState {
    /// The initial state for a sequence of `len` questions.
    pub fn start(len: usize) -> Self {
        if len == 0 { Self::Done } else { Self::Rendering(0) }
    }

    /// The state after the current question completes.
    ///
    /// Strictly linear: `Rendering(i)` becomes `Rendering(i + 1)`, or `Done`
    /// past the end. `Done` stays `Done`.
    pub fn advance(self, len: usize) -> Self {
        match self {
            Self::Rendering(i) if i + 1 < len => Self::Rendering(i + 1),
            _ => Self::Done,
        }
    }

    /// Index of the displayed question.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Rendering(i) => Some(i),
            Self::Done => None,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendering(i) => write!(f, "Rendering({i})"),
            Self::Done => f.write_str("Done"),
        }
    }
}

/// Generation stamp of one render.
///
/// Interactions are dispatched with the token of the render they were made
/// against; anything carrying an older token is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderToken(u64);

impl RenderToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Owns the cursor of one survey session and drives the
/// render, bind, wait, advance loop.
pub struct NavigationController<S> {
    sequence: QuestionSequence,
    renderer: TemplateRenderer<S>,
    binder: InteractionBinder,
    state: NavigationState,
    binding: Option<Binding<'static>>,
    token: RenderToken,
    /// Written by the live binding's completion callback.
    completed: Rc<Cell<Option<RenderToken>>>,
    diagnostics: Vec<Diagnostic>,
}

impl<S: TemplateStore> NavigationController<S> {
    /// Start a session over `sequence` with the default binder.
    pub fn with_store(sequence: QuestionSequence, store: S) -> Self {
        Self::new(sequence, TemplateRenderer::new(store), InteractionBinder::new())
    }

    /// Start a session; the first question is rendered immediately.
    pub fn new(
        sequence: QuestionSequence,
        renderer: TemplateRenderer<S>,
        binder: InteractionBinder,
    ) -> Self {
        let state = NavigationState::start(sequence.len());
        info!(questions = sequence.len(), "survey session started");
        let mut controller = Self {
            sequence,
            renderer,
            binder,
            state,
            binding: None,
            token: RenderToken(0),
            completed: Rc::new(Cell::new(None)),
            diagnostics: Vec::new(),
        };
        if state.is_done() {
            info!("survey session finished");
        } else {
            controller.render_current();
        }
        controller
    }

    /// Render and bind the current question again.
    ///
    /// The previous fragment and binding are dropped first, so interactions
    /// stamped with an earlier token can never complete the question.
    /// In `Done` nothing is rendered.
    pub fn render_current(&mut self) -> RenderToken {
        self.binding = None;
        self.completed.set(None);
        self.token = self.token.next();

        let Some(index) = self.state.index() else {
            return self.token;
        };
        let Some(question) = self.sequence.get(index) else {
            return self.token;
        };

        let rendered = self.renderer.render_question(index, question);
        if let Some(diagnostic) = rendered.diagnostic
            && !self.diagnostics.contains(&diagnostic)
        {
            self.diagnostics.push(diagnostic);
        }

        let completed = Rc::clone(&self.completed);
        let token = self.token;
        self.binding = Some(self.binder.bind(rendered.fragment, question, move || {
            completed.set(Some(token));
        }));
        debug!(state = %self.state, token = token.0, "question bound");
        self.token
    }

    /// Dispatch an interaction made against the render `token`.
    ///
    /// Stale tokens and interactions in `Done` are ignored. When the
    /// interaction completes the question, the controller advances.
    pub fn dispatch(&mut self, token: RenderToken, interaction: Interaction) -> Reaction {
        if token != self.token {
            debug!(
                stale = token.0,
                current = self.token.0,
                "ignoring interaction from an earlier render"
            );
            return Reaction::Ignored;
        }
        let Some(binding) = self.binding.as_mut() else {
            return Reaction::Ignored;
        };
        let reaction = binding.handle(interaction);
        if self.completed.take() == Some(self.token) {
            self.advance();
        }
        reaction
    }

    /// Dispatch an interaction against the current render.
    pub fn interact(&mut self, interaction: Interaction) -> Reaction {
        self.dispatch(self.token, interaction)
    }

    fn advance(&mut self) {
        let from = self.state;
        self.state = from.advance(self.sequence.len());
        debug!(%from, to = %self.state, "advanced");
        if self.state.is_done() {
            self.binding = None;
            info!(questions = self.sequence.len(), "survey session finished");
        } else {
            self.render_current();
        }
    }
}

impl<S> NavigationController<S> {
    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn sequence(&self) -> &QuestionSequence {
        &self.sequence
    }

    /// The displayed question.
    pub fn current_question(&self) -> Option<&Question> {
        self.state.index().and_then(|i| self.sequence.get(i))
    }

    /// The displayed fragment.
    pub fn fragment(&self) -> Option<&Fragment> {
        self.binding.as_ref().map(Binding::fragment)
    }

    pub fn binding(&self) -> Option<&Binding<'static>> {
        self.binding.as_ref()
    }

    /// Widgets attached to the displayed fragment.
    pub fn widgets(&self) -> &[Widget] {
        match &self.binding {
            Some(binding) => binding.widgets(),
            None => &[],
        }
    }

    /// Token of the latest render.
    pub fn token(&self) -> RenderToken {
        self.token
    }

    /// Diagnostics recorded so far, in the order they occurred.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `(answered, total)` questions.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sequence.len();
        (self.state.index().unwrap_or(total), total)
    }
}

impl<S> fmt::Debug for NavigationController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationController")
            .field("state", &self.state)
            .field("token", &self.token)
            .field("questions", &self.sequence.len())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_advance_are_linear() {
        assert_eq!(NavigationState::start(0), NavigationState::Done);
        assert_eq!(NavigationState::start(2), NavigationState::Rendering(0));

        let s = NavigationState::Rendering(0).advance(2);
        assert_eq!(s, NavigationState::Rendering(1));
        assert_eq!(s.advance(2), NavigationState::Done);
        assert_eq!(NavigationState::Done.advance(2), NavigationState::Done);
    }

    #[test]
    fn state_display() {
        assert_eq!(NavigationState::Rendering(3).to_string(), "Rendering(3)");
        assert_eq!(NavigationState::Done.to_string(), "Done");
    }

    #[test]
    fn tokens_increase() {
        let t = RenderToken(1);
        assert!(t.next() > t);
    }
}
