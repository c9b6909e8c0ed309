//! Rendered output of a single question.

use std::fmt;

/// Index of a control inside its fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an interactive element.
///
/// Templates declare controls with a line starting with `@<name>`,
/// e.g. `@option {{choice}}` or `@submit OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// A selectable answer option.
    Option,
    /// An action button (yes/no, accept/decline).
    Button,
    /// Single-line text input.
    Input,
    /// Multi-line text input.
    Textarea,
    /// Single-line date input, paired with a date picker.
    Date,
    /// Dropdown; the label lists `|`-separated options.
    Select,
    /// File path input.
    File,
    /// Explicit submit action.
    Submit,
}

impl ControlKind {
    pub const ALL: [ControlKind; 8] = [
        ControlKind::Option,
        ControlKind::Button,
        ControlKind::Input,
        ControlKind::Textarea,
        ControlKind::Date,
        ControlKind::Select,
        ControlKind::File,
        ControlKind::Submit,
    ];

    /// The name used after `@` in templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::Option => "option",
            Self::Button => "button",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Date => "date",
            Self::Select => "select",
            Self::File => "file",
            Self::Submit => "submit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Controls the confirm key submits from.
    pub fn is_single_line(self) -> bool {
        matches!(self, Self::Input | Self::Date | Self::File)
    }

    /// Controls that accept typed text.
    pub fn accepts_text(self) -> bool {
        matches!(self, Self::Input | Self::Textarea | Self::Date | Self::File)
    }

    /// Controls a click acts on directly.
    pub fn is_clickable(self) -> bool {
        matches!(self, Self::Option | Self::Button | Self::Submit)
    }
}

/// One interactive element of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: ControlId,
    pub kind: ControlKind,
    pub label: String,
    /// Visual "selected" state of options and buttons.
    pub selected: bool,
    /// Current text of inputs, or the chosen entry of a dropdown.
    pub value: String,
    /// Visible rows of a text area.
    pub height: u16,
    /// Entries of a dropdown.
    pub options: Vec<String>,
}

impl Control {
    fn new(id: ControlId, kind: ControlKind, label: &str) -> Self {
        let (label, options) = if kind == ControlKind::Select {
            let options = label
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (String::new(), options)
        } else {
            (label.trim().to_string(), Vec::new())
        };
        Self {
            id,
            kind,
            label,
            selected: false,
            value: String::new(),
            height: 1,
            options,
        }
    }

    /// Number of lines the current value spans.
    pub fn content_lines(&self) -> u16 {
        let lines = self.value.split('\n').count();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }
}

/// A line of a fragment: literal text, or the position of a control.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentLine {
    Text(String),
    Control(ControlId),
}

/// Rendered, renderable output of one question.
///
/// A fragment is replaced as a whole on every render; it is never merged
/// with the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    lines: Vec<FragmentLine>,
    controls: Vec<Control>,
}

/// Output of the template engine before it is split into lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    Control(ControlKind),
}

impl Fragment {
    /// The fragment shown when a question cannot be rendered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[FragmentLine] {
        &self.lines
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id.0)
    }

    pub(crate) fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.controls.get_mut(id.0)
    }

    pub(crate) fn controls_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.controls.iter_mut()
    }

    /// Find the first control with the given label.
    pub fn find(&self, label: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.label == label)
    }

    /// Find the first control of the given kind.
    pub fn first_of(&self, kind: ControlKind) -> Option<&Control> {
        self.controls.iter().find(|c| c.kind == kind)
    }

    /// Labels of all selected controls, in order.
    pub fn selected_labels(&self) -> Vec<&str> {
        self.controls
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.label.as_str())
            .collect()
    }

    /// Plain text of the fragment, controls shown as `[label]`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                FragmentLine::Text(text) => text.clone(),
                FragmentLine::Control(id) => match self.control(*id) {
                    Some(c) if c.kind == ControlKind::Select => format!("[{}]", c.options.join("|")),
                    Some(c) => format!("[{}]", c.label),
                    None => String::new(),
                },
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Assemble a fragment from engine output.
    ///
    /// A control segment always opens a new line; the remainder of that line
    /// becomes the control's label. Blank lines around the content are dropped.
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        let mut fragment = Self::default();
        let mut line = String::new();
        let mut pending: Option<ControlKind> = None;

        for segment in segments {
            match segment {
                Segment::Text(text) => {
                    let mut parts = text.split('\n');
                    if let Some(first) = parts.next() {
                        line.push_str(first);
                    }
                    for part in parts {
                        fragment.finish_line(&mut line, &mut pending);
                        line.push_str(part);
                    }
                }
                Segment::Control(kind) => {
                    if !line.is_empty() || pending.is_some() {
                        fragment.finish_line(&mut line, &mut pending);
                    }
                    pending = Some(kind);
                }
            }
        }
        if !line.is_empty() || pending.is_some() {
            fragment.finish_line(&mut line, &mut pending);
        }

        fragment.trim_blank_lines();
        fragment
    }

    fn finish_line(&mut self, line: &mut String, pending: &mut Option<ControlKind>) {
        let text = std::mem::take(line);
        match pending.take() {
            Some(kind) => {
                let id = ControlId(self.controls.len());
                self.controls.push(Control::new(id, kind, &text));
                self.lines.push(FragmentLine::Control(id));
            }
            None => self.lines.push(FragmentLine::Text(text.trim_end().to_string())),
        }
    }

    fn trim_blank_lines(&mut self) {
        let blank = |line: &FragmentLine| matches!(line, FragmentLine::Text(t) if t.trim().is_empty());
        while self.lines.last().is_some_and(blank) {
            self.lines.pop();
        }
        let leading = self.lines.iter().take_while(|l| blank(l)).count();
        self.lines.drain(..leading);
    }
}
