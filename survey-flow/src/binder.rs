//! Completion rules: deciding which interaction answers a question.
//!
//! Every question type falls into one of three categories:
//!
//! - single trigger (`YN`, `OS`, `R_`, `L_`): any click on an option, button
//!   or submit control selects it and completes the question;
//! - choice (`MC`): option clicks toggle selection, and in single-selection
//!   mode selecting an option also completes;
//! - submit only (everything else, unknown types included): only the generic
//!   submit completes.
//!
//! The generic submit is available in every category: an explicit
//! [`Interaction::Submit`], a click on a `@submit` control, or the confirm key
//! inside a single-line text control.

use std::fmt;

use survey_flow_types::{Question, TypeCode};
use tracing::debug;

use crate::fragment::{ControlId, ControlKind, Fragment};

/// Placeholder shown by dropdowns before a choice is made.
pub const DEFAULT_DROPDOWN_PLACEHOLDER: &str = "Select an option";

/// The completion rule attached to a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRule {
    /// One click on any clickable control completes.
    SingleTrigger,
    /// Multiple choice, one selection; selecting completes.
    SingleChoice,
    /// Multiple choice, many selections; only a submit completes.
    MultiChoice,
    /// Only a submit completes.
    SubmitOnly,
}

impl CompletionRule {
    /// Pick the rule for a question from its type and parameters.
    pub fn for_question(question: &Question) -> Self {
        match question.type_code() {
            Some(TypeCode::YesNo | TypeCode::OpinionScale | TypeCode::Rating | TypeCode::Legal) => {
                Self::SingleTrigger
            }
            Some(TypeCode::MultipleChoice) if question.parameters().multiple_selection() => {
                Self::MultiChoice
            }
            Some(TypeCode::MultipleChoice) => Self::SingleChoice,
            _ => Self::SubmitOnly,
        }
    }
}

/// A key pressed inside a text control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    /// The confirm key (Enter).
    Confirm,
}

/// A user event directed at the current fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click(ControlId),
    Key { control: ControlId, key: Key },
    /// Replace the value of a control, e.g. a date picked from a calendar or
    /// an entry chosen from a dropdown.
    SetValue { control: ControlId, value: String },
    /// The explicit submit action of the fragment's submission boundary.
    Submit,
}

/// What an interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing changed.
    Ignored,
    /// Control state changed; the question is still open.
    Updated,
    /// The question was answered and `on_complete` has run.
    Completed,
}

impl Reaction {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A third-party widget a front-end should attach to a control.
///
/// The core only passes configuration through; it never interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    DatePicker {
        control: ControlId,
        /// The question's declared date format.
        format: Option<String>,
    },
    Dropdown {
        control: ControlId,
        placeholder: String,
        allow_clear: bool,
    },
}

impl Widget {
    pub fn control(&self) -> ControlId {
        match self {
            Self::DatePicker { control, .. } | Self::Dropdown { control, .. } => *control,
        }
    }
}

/// Attaches completion rules and widgets to rendered fragments.
#[derive(Debug, Clone)]
pub struct InteractionBinder {
    dropdown_placeholder: String,
}

impl Default for InteractionBinder {
    fn default() -> Self {
        Self {
            dropdown_placeholder: DEFAULT_DROPDOWN_PLACEHOLDER.to_string(),
        }
    }
}

impl InteractionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder of attached dropdowns.
    pub fn with_dropdown_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.dropdown_placeholder = placeholder.into();
        self
    }

    /// Bind `fragment` for `question`.
    ///
    /// `on_complete` runs at most once, when the rule's condition is met.
    pub fn bind<'a>(
        &self,
        fragment: Fragment,
        question: &Question,
        on_complete: impl FnOnce() + 'a,
    ) -> Binding<'a> {
        let rule = CompletionRule::for_question(question);
        let widgets = self.widgets(&fragment, question);
        debug!(?rule, widgets = widgets.len(), "bound fragment");
        Binding {
            fragment,
            rule,
            widgets,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn widgets(&self, fragment: &Fragment, question: &Question) -> Vec<Widget> {
        let mut widgets = Vec::new();
        if question.type_code() == Some(TypeCode::Date)
            && let Some(date) = fragment.first_of(ControlKind::Date)
        {
            widgets.push(Widget::DatePicker {
                control: date.id,
                format: question.parameters().format().map(str::to_string),
            });
        }
        widgets.extend(
            fragment
                .controls()
                .iter()
                .filter(|c| c.kind == ControlKind::Select)
                .map(|c| Widget::Dropdown {
                    control: c.id,
                    placeholder: self.dropdown_placeholder.clone(),
                    allow_clear: true,
                }),
        );
        widgets
    }
}

/// A fragment with its completion rule attached.
///
/// Once the rule has fired the binding is spent and ignores everything.
pub struct Binding<'a> {
    fragment: Fragment,
    rule: CompletionRule,
    widgets: Vec<Widget>,
    on_complete: Option<Box<dyn FnOnce() + 'a>>,
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("rule", &self.rule)
            .field("widgets", &self.widgets)
            .field("spent", &self.is_spent())
            .finish_non_exhaustive()
    }
}

impl Binding<'_> {
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn rule(&self) -> CompletionRule {
        self.rule
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Whether `on_complete` has already run.
    pub fn is_spent(&self) -> bool {
        self.on_complete.is_none()
    }

    /// Apply an interaction.
    pub fn handle(&mut self, interaction: Interaction) -> Reaction {
        if self.is_spent() {
            return Reaction::Ignored;
        }
        match interaction {
            Interaction::Submit => self.complete(),
            Interaction::Click(id) => self.click(id),
            Interaction::Key { control, key } => self.key(control, key),
            Interaction::SetValue { control, value } => self.set_value(control, value),
        }
    }

    fn click(&mut self, id: ControlId) -> Reaction {
        let Some(control) = self.fragment.control(id) else {
            return Reaction::Ignored;
        };
        let kind = control.kind;
        let was_selected = control.selected;

        match (self.rule, kind) {
            (CompletionRule::SingleTrigger, kind) if kind.is_clickable() => {
                self.set_selected(id, true);
                self.complete()
            }
            (CompletionRule::SingleChoice, ControlKind::Option) => {
                if was_selected {
                    self.set_selected(id, false);
                    return Reaction::Updated;
                }
                for control in self.fragment.controls_mut() {
                    if control.kind == ControlKind::Option {
                        control.selected = false;
                    }
                }
                self.set_selected(id, true);
                self.complete()
            }
            (CompletionRule::MultiChoice, ControlKind::Option) => {
                self.set_selected(id, !was_selected);
                Reaction::Updated
            }
            (_, ControlKind::Submit) => self.complete(),
            _ => Reaction::Ignored,
        }
    }

    fn key(&mut self, id: ControlId, key: Key) -> Reaction {
        let Some(control) = self.fragment.control_mut(id) else {
            return Reaction::Ignored;
        };
        if !control.kind.accepts_text() {
            return Reaction::Ignored;
        }
        match key {
            Key::Confirm if control.kind.is_single_line() => return self.complete(),
            Key::Confirm => control.value.push('\n'),
            Key::Char(c) => control.value.push(c),
            Key::Backspace => {
                if control.value.pop().is_none() {
                    return Reaction::Ignored;
                }
            }
        }
        if control.kind == ControlKind::Textarea {
            control.height = control.height.max(control.content_lines());
        }
        Reaction::Updated
    }

    fn set_value(&mut self, id: ControlId, value: String) -> Reaction {
        let Some(control) = self.fragment.control_mut(id) else {
            return Reaction::Ignored;
        };
        match control.kind {
            ControlKind::Select => {
                control.selected = !value.is_empty();
                control.value = value;
            }
            kind if kind.accepts_text() => {
                control.value = value;
                if kind == ControlKind::Textarea {
                    control.height = control.height.max(control.content_lines());
                }
            }
            _ => return Reaction::Ignored,
        }
        Reaction::Updated
    }

    fn set_selected(&mut self, id: ControlId, selected: bool) {
        if let Some(control) = self.fragment.control_mut(id) {
            control.selected = selected;
        }
    }

    fn complete(&mut self) -> Reaction {
        match self.on_complete.take() {
            Some(on_complete) => {
                on_complete();
                Reaction::Completed
            }
            None => Reaction::Ignored,
        }
    }
}
