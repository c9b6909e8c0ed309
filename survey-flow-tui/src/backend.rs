//! Ratatui front-end implementation for the SurveyFrontend trait.
//!
//! Shows one question per screen with a progress indicator, the rendered
//! fragment and its controls, and keyboard focus handling.

use std::io::{self, Stdout, Write};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use survey_flow::{
    Control, ControlKind, FragmentLine, NavigationController, NavigationState, SurveyFrontend,
    TemplateStore, Widget,
};
use thiserror::Error;
use tracing::debug;

use crate::view::{Action, ViewState};

/// Error type for the terminal front-end.
#[derive(Debug, Error)]
pub enum TuiError {
    /// The respondent left the session (e.g., pressed Esc).
    #[error("Survey cancelled by user")]
    Cancelled,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup/restore error.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl TuiError {
    /// Check if this error represents user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub text: Color,
    pub highlight: Color,
    pub selected: Color,
    pub error: Color,
    pub success: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            secondary: Color::Blue,
            text: Color::White,
            highlight: Color::Yellow,
            selected: Color::Magenta,
            error: Color::Red,
            success: Color::Green,
            border: Color::Gray,
        }
    }
}

/// Ratatui-based terminal front-end.
///
/// Presents the controller's current fragment, one question per screen,
/// and feeds key presses back to the controller as interactions.
#[derive(Debug, Clone)]
pub struct TuiFrontend {
    /// Title shown at the top of the screen.
    title: String,
    /// Color theme for the UI.
    theme: Theme,
}

impl Default for TuiFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiFrontend {
    /// Create a new front-end with default settings.
    pub fn new() -> Self {
        Self {
            title: "Survey".to_string(),
            theme: Theme::default(),
        }
    }

    /// Set the title shown at the top of the screen.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set a custom color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
        enable_raw_mode().map_err(|e| TuiError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        enter_screen(&mut stdout)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), TuiError> {
        disable_raw_mode().map_err(|e| TuiError::Terminal(e.to_string()))?;
        leave_screen(terminal.backend_mut())?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn event_loop<S: TemplateStore>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        controller: &mut NavigationController<S>,
    ) -> Result<NavigationState, TuiError> {
        let mut view = ViewState::new(controller.token());

        loop {
            view.sync(controller.token());
            let shown: &NavigationController<S> = controller;
            terminal.draw(|frame| {
                if shown.is_done() {
                    draw_completion(frame, &self.theme);
                } else {
                    draw_ui(frame, self, shown, &view);
                }
            })?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match view.handle_key(key, controller.fragment(), controller.widgets()) {
                Action::Dispatch(interaction) => {
                    let reaction = controller.dispatch(view.token(), interaction);
                    debug!(?reaction, state = %controller.state(), "key dispatched");
                }
                Action::Cancel => return Err(TuiError::Cancelled),
                Action::Finish => return Ok(controller.state()),
                Action::Nothing => {}
            }
        }
    }
}

/// Switch to the alternate screen. Only key events are read, so mouse
/// capture stays off.
fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen)
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen)
}

fn control_line<'a>(control: &'a Control, focused: bool, widget: Option<&'a Widget>, theme: &Theme) -> Vec<Line<'a>> {
    let marker = if focused { "► " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme.highlight).bold()
    } else if control.selected {
        Style::default().fg(theme.selected).bold()
    } else {
        Style::default().fg(theme.text)
    };
    let hint_style = Style::default().fg(theme.border);

    match control.kind {
        ControlKind::Option => {
            let check = if control.selected { "(●)" } else { "( )" };
            vec![Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{check} {}", control.label), label_style),
            ])]
        }
        ControlKind::Button | ControlKind::Submit => vec![Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("[ {} ]", control.label), label_style),
        ])],
        ControlKind::Input | ControlKind::File | ControlKind::Date => {
            let (placeholder, hint) = match (control.kind, widget) {
                (ControlKind::Date, Some(Widget::DatePicker { format, .. })) => (
                    format.clone().unwrap_or_default(),
                    format.as_ref().map(|f| format!("  date: {f}")),
                ),
                (ControlKind::File, _) => (control.label.clone(), Some("  path".to_string())),
                _ => (control.label.clone(), None),
            };
            let mut spans = vec![Span::raw(marker), Span::styled("> ", label_style)];
            if control.value.is_empty() {
                spans.push(Span::styled(placeholder, hint_style));
            } else {
                spans.push(Span::styled(control.value.clone(), Style::default().fg(theme.text)));
            }
            if let Some(hint) = hint {
                spans.push(Span::styled(hint, hint_style));
            }
            vec![Line::from(spans)]
        }
        ControlKind::Textarea => {
            let mut rows: Vec<&str> = control.value.split('\n').collect();
            while rows.len() < usize::from(control.height) {
                rows.push("");
            }
            rows.into_iter()
                .enumerate()
                .map(|(i, row)| {
                    let prefix = if i == 0 { marker } else { "  " };
                    Line::from(vec![
                        Span::raw(prefix),
                        Span::styled("│ ", label_style),
                        Span::styled(row.to_string(), Style::default().fg(theme.text)),
                    ])
                })
                .collect()
        }
        ControlKind::Select => {
            let placeholder = match widget {
                Some(Widget::Dropdown { placeholder, .. }) => placeholder.as_str(),
                _ => "",
            };
            let shown = if control.value.is_empty() {
                Span::styled(placeholder.to_string(), hint_style)
            } else {
                Span::styled(control.value.clone(), label_style)
            };
            vec![Line::from(vec![
                Span::raw(marker),
                Span::styled("◂ ", label_style),
                shown,
                Span::styled(" ▸", label_style),
                Span::styled(format!("  ({} options)", control.options.len()), hint_style),
            ])]
        }
    }
}

fn draw_ui<S>(
    frame: &mut Frame,
    frontend: &TuiFrontend,
    controller: &NavigationController<S>,
    view: &ViewState,
) {
    let theme = &frontend.theme;
    let area = frame.area();

    // Main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Progress bar
            Constraint::Min(10),   // Content
            Constraint::Length(2), // Diagnostics
            Constraint::Length(3), // Help
        ])
        .split(area);

    let header = Paragraph::new(frontend.title.clone())
        .style(Style::default().fg(theme.primary).bold())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(header, chunks[0]);

    // Progress - thin bar with text
    let (answered, total) = controller.progress();
    let current = (answered + 1).min(total);
    let progress_text = format!(" {current} / {total} ");

    let progress_area = chunks[1];
    let bar_width = progress_area.width.saturating_sub(2);
    let text_width = u16::try_from(progress_text.chars().count()).unwrap_or(u16::MAX);
    let ratio = if total == 0 {
        1.0
    } else {
        current as f32 / total as f32
    };
    let filled_width = (ratio * f32::from(bar_width)) as u16;
    let bar_x = progress_area.x + 1;
    let bar_y = progress_area.y;

    let track = Paragraph::new("─".repeat(usize::from(bar_width)))
        .style(Style::default().fg(theme.border));
    frame.render_widget(track, Rect::new(bar_x, bar_y, bar_width, 1));
    if filled_width > 0 {
        let filled = Paragraph::new("━".repeat(usize::from(filled_width)))
            .style(Style::default().fg(theme.primary));
        frame.render_widget(filled, Rect::new(bar_x, bar_y, filled_width, 1));
    }
    let text_x = bar_x + bar_width.saturating_sub(text_width) / 2;
    let text = Paragraph::new(progress_text).style(Style::default().fg(theme.secondary));
    frame.render_widget(text, Rect::new(text_x, bar_y + 1, text_width, 1));

    // Content: the fragment, line by line
    let title = controller
        .current_question()
        .and_then(|q| q.type_code())
        .map_or(" Question ".to_string(), |code| format!(" {} ", code.display_name()));
    let mut lines: Vec<Line> = Vec::new();
    if let Some(fragment) = controller.fragment() {
        for line in fragment.lines() {
            match line {
                FragmentLine::Text(text) => lines.push(Line::styled(
                    text.as_str(),
                    Style::default().fg(theme.text),
                )),
                FragmentLine::Control(id) => {
                    let Some(control) = fragment.control(*id) else {
                        continue;
                    };
                    let widget = controller.widgets().iter().find(|w| w.control() == *id);
                    lines.extend(control_line(control, view.focus() == id.0, widget, theme));
                }
            }
        }
        if fragment.is_empty() {
            lines.push(Line::styled(
                "(nothing to show - press Enter to continue)",
                Style::default().fg(theme.border),
            ));
        }
    }
    let content = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(title)
            .title_style(Style::default().fg(theme.highlight)),
    );
    frame.render_widget(content, chunks[2]);

    // Diagnostics for the displayed question
    let index = controller.state().index();
    let problems: Vec<String> = controller
        .diagnostics()
        .iter()
        .filter(|d| Some(d.index()) == index)
        .map(ToString::to_string)
        .collect();
    if !problems.is_empty() {
        let warning = Paragraph::new(problems.join("; "))
            .style(Style::default().fg(theme.error).bold())
            .alignment(Alignment::Center);
        frame.render_widget(warning, chunks[3]);
    }

    // Help bar
    let focused = controller.fragment().and_then(|f| view.focused(f));
    let help_text = match focused.map(|c| c.kind) {
        Some(ControlKind::Option | ControlKind::Button | ControlKind::Submit) => {
            "↑/↓: Move  Enter: Choose  Ctrl+S: Submit  Esc: Cancel"
        }
        Some(ControlKind::Textarea) => "Type to answer  Enter: New line  Ctrl+S: Submit  Esc: Cancel",
        Some(ControlKind::Select) => "←/→: Change  ↑/↓: Move  Ctrl+S: Submit  Esc: Cancel",
        Some(_) => "Type to answer  Enter: Submit  ↑/↓: Move  Esc: Cancel",
        None => "Enter: Continue  Esc: Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(theme.border))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(help, chunks[4]);
}

fn draw_completion(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.success))
        .title(" Complete ")
        .title_style(Style::default().fg(theme.success).bold());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new("All questions answered!\n\nPress Enter to finish.")
        .style(Style::default().fg(theme.text))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    let centered = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(3),
            Constraint::Percentage(40),
        ])
        .split(inner);

    frame.render_widget(paragraph, centered[1]);
}

impl SurveyFrontend for TuiFrontend {
    type Error = TuiError;

    fn run<S: TemplateStore>(
        &self,
        controller: &mut NavigationController<S>,
    ) -> Result<NavigationState, Self::Error> {
        let mut terminal = self.setup_terminal()?;
        let result = self.event_loop(&mut terminal, controller);
        self.restore_terminal(&mut terminal)?;
        result
    }
}
