//! # survey-flow-tui
//!
//! Terminal front-end for survey-flow sessions, built on ratatui and crossterm.
//!
//! ```rust,ignore
//! use survey_flow::{BundledTemplates, NavigationController};
//! use survey_flow_tui::TuiFrontend;
//!
//! let mut controller = NavigationController::with_store(sequence, BundledTemplates::new());
//! controller.run(&TuiFrontend::new().with_title("Customer survey"))?;
//! ```
//!
//! ## Keys
//! - `↑`/`↓`/`Tab` - move focus between controls
//! - `Enter` - click the focused option or button, confirm inside a text input
//! - `←`/`→` - cycle the entries of a dropdown
//! - `Ctrl+S` - submit the current question
//! - `Esc` - cancel the session

mod backend;
pub use backend::{Theme, TuiError, TuiFrontend};

mod view;
pub use view::{Action, ViewState};
