//! Focus handling and the mapping from key presses to interactions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use survey_flow::{
    Control, ControlKind, Fragment, Interaction, Key, RenderToken, Widget,
};

/// What the front-end should do with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hand an interaction to the controller.
    Dispatch(Interaction),
    /// Abort the session.
    Cancel,
    /// Leave the completion screen.
    Finish,
    /// Redraw only.
    Nothing,
}

/// Per-render view state: which control has focus.
///
/// The state belongs to one render; when the controller renders again the
/// focus resets to the first control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    token: RenderToken,
    focus: usize,
}

impl ViewState {
    pub fn new(token: RenderToken) -> Self {
        Self { token, focus: 0 }
    }

    /// The render this view was built for.
    pub fn token(&self) -> RenderToken {
        self.token
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Follow the controller to a new render.
    pub fn sync(&mut self, token: RenderToken) {
        if token != self.token {
            *self = Self::new(token);
        }
    }

    /// The focused control of `fragment`.
    pub fn focused<'f>(&self, fragment: &'f Fragment) -> Option<&'f Control> {
        fragment.controls().get(self.focus)
    }

    /// Map a key press to an action.
    ///
    /// `fragment` is `None` once the session is done.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        fragment: Option<&Fragment>,
        widgets: &[Widget],
    ) -> Action {
        let Some(fragment) = fragment else {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc => Action::Finish,
                _ => Action::Nothing,
            };
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let count = fragment.controls().len();
        let focused = self.focused(fragment);

        match key.code {
            KeyCode::Esc => Action::Cancel,
            KeyCode::Char('c') if ctrl => Action::Cancel,
            KeyCode::Char('s') if ctrl => Action::Dispatch(Interaction::Submit),
            KeyCode::Up | KeyCode::BackTab => {
                if count > 0 {
                    self.focus = (self.focus + count - 1) % count;
                }
                Action::Nothing
            }
            KeyCode::Down | KeyCode::Tab => {
                if count > 0 {
                    self.focus = (self.focus + 1) % count;
                }
                Action::Nothing
            }
            KeyCode::Enter => match focused {
                // A blank question can still be submitted.
                None => Action::Dispatch(Interaction::Submit),
                Some(c) if c.kind.is_clickable() => Action::Dispatch(Interaction::Click(c.id)),
                Some(c) if c.kind.accepts_text() => Action::Dispatch(Interaction::Key {
                    control: c.id,
                    key: Key::Confirm,
                }),
                Some(_) => Action::Nothing,
            },
            KeyCode::Left | KeyCode::Right => match focused {
                Some(c) if c.kind == ControlKind::Select => {
                    let allow_clear = widgets.iter().any(|w| {
                        matches!(w, Widget::Dropdown { control, allow_clear: true, .. } if *control == c.id)
                    });
                    let forward = key.code == KeyCode::Right;
                    match cycle(&c.options, &c.value, forward, allow_clear) {
                        Some(value) => Action::Dispatch(Interaction::SetValue {
                            control: c.id,
                            value,
                        }),
                        None => Action::Nothing,
                    }
                }
                _ => Action::Nothing,
            },
            KeyCode::Char(ch) if !ctrl => match focused {
                Some(c) if c.kind.accepts_text() => Action::Dispatch(Interaction::Key {
                    control: c.id,
                    key: Key::Char(ch),
                }),
                _ => Action::Nothing,
            },
            KeyCode::Backspace => match focused {
                Some(c) if c.kind.accepts_text() => Action::Dispatch(Interaction::Key {
                    control: c.id,
                    key: Key::Backspace,
                }),
                _ => Action::Nothing,
            },
            _ => Action::Nothing,
        }
    }
}

/// Next dropdown entry after `current`. With clearing allowed the empty
/// entry sits before the first option.
fn cycle(options: &[String], current: &str, forward: bool, allow_clear: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let mut entries: Vec<&str> = Vec::with_capacity(options.len() + 1);
    if allow_clear {
        entries.push("");
    }
    entries.extend(options.iter().map(String::as_str));

    let len = entries.len();
    let position = entries.iter().position(|e| *e == current);
    let next = match (position, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    Some(entries[next].to_string())
}
