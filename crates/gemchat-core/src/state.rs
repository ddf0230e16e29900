//! UI-agnostic session state types
//!
//! These are shared by every front end and carry no terminal or widget types.

use serde::{Deserialize, Serialize};

/// One recorded question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Label of the toggle control: the theme it switches to.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Dark => "Light",
            Theme::Light => "Dark",
        }
    }
}

/// The mutable UI state of one running session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_input: String,
    pub last_answer: Option<String>,
    pub is_loading: bool,
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_defaults() {
        let state = SessionState::default();
        assert_eq!(state.current_input, "");
        assert_eq!(state.last_answer, None);
        assert!(!state.is_loading);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn test_theme_toggle_and_label() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle_label(), "Light");
        assert_eq!(Theme::Light.toggle_label(), "Dark");
    }
}
