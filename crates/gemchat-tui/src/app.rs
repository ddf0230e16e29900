use std::sync::Arc;

use gemchat_core::{ChatError, ChatSession, Generate, GenerateResponse};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    History,
}

/// The one request allowed in flight, with the question it was sent for.
struct PendingRequest {
    question: String,
    handle: JoinHandle<Result<GenerateResponse, ChatError>>,
}

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,
    pub session: ChatSession,

    // Input state
    pub input_cursor: usize, // char index into the session input

    // History panel state
    pub history_state: ListState,

    // Answer pane state
    pub answer_scroll: u16,
    pub animation_frame: u8,

    // Areas from the last render, for mouse hit-testing
    pub history_area: Option<Rect>,
    pub answer_area: Option<Rect>,
    pub ask_area: Option<Rect>,

    client: Arc<dyn Generate>,
    pending: Option<PendingRequest>,
}

impl App {
    pub fn new(client: Arc<dyn Generate>) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,
            session: ChatSession::new(),

            input_cursor: 0,
            history_state: ListState::default(),

            answer_scroll: 0,
            animation_frame: 0,

            history_area: None,
            answer_area: None,
            ask_area: None,

            client,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Submit the current input on a background task. Blank input and a
    /// second submit while one is in flight do nothing.
    pub fn submit(&mut self) -> bool {
        let Some(question) = self.session.begin_submit() else {
            return false;
        };
        info!(question_chars = question.chars().count(), "submitting question");

        let client = Arc::clone(&self.client);
        let prompt = question.clone();
        let handle = tokio::spawn(async move { client.generate(&prompt).await });

        self.pending = Some(PendingRequest { question, handle });
        self.answer_scroll = 0;
        true
    }

    /// Apply the request outcome if it has finished; never blocks.
    pub async fn poll_pending(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished());
        if finished {
            self.finish_pending().await;
        }
    }

    /// Wait for the in-flight request, if any, and apply its outcome.
    pub async fn finish_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let outcome = match pending.handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ChatError::Interrupted(e.to_string())),
        };
        self.session.complete_submit(pending.question, outcome);
        self.input_cursor = 0;
        self.answer_scroll = 0;
    }

    pub fn tick_animation(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn focus_history(&mut self) {
        self.focus = FocusPane::History;
        if self.history_state.selected().is_none() && !self.session.history().is_empty() {
            self.history_state.select(Some(0));
        }
    }

    pub fn focus_input(&mut self) {
        self.focus = FocusPane::Input;
    }

    pub fn toggle_focus(&mut self) {
        match self.focus {
            FocusPane::Input => self.focus_history(),
            FocusPane::History => self.focus_input(),
        }
    }

    pub fn history_nav_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            let i = self.history_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.history_state.select(Some(i));
        }
    }

    pub fn history_nav_up(&mut self) {
        if !self.session.history().is_empty() {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Show a past answer again.
    pub fn recall_history(&mut self, index: usize) {
        if self.session.select_history_entry(index) {
            self.history_state.select(Some(index));
            self.input_cursor = 0;
            self.answer_scroll = 0;
        }
    }

    pub fn recall_selected_history(&mut self) {
        if let Some(i) = self.history_state.selected() {
            self.recall_history(i);
        }
    }

    /// Remove one entry, keeping the list selection on a valid row.
    pub fn delete_history(&mut self, index: usize) {
        if self.session.delete_history_entry(index).is_none() {
            return;
        }
        let len = self.session.history().len();
        match self.history_state.selected() {
            _ if len == 0 => self.history_state.select(None),
            Some(i) if i >= len => self.history_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn delete_selected_history(&mut self) {
        if let Some(i) = self.history_state.selected() {
            self.delete_history(i);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.session.toggle_theme();
    }

    pub fn scroll_answer_down(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(lines);
    }

    pub fn scroll_answer_up(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(lines);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use gemchat_core::{Exchange, Theme, SOMETHING_WENT_WRONG};
    use std::sync::Mutex;

    /// Answers every question with `"answer to <question>"` unless told to fail.
    pub(crate) struct EchoGenerator {
        pub fail: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl EchoGenerator {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                fail: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generate for EchoGenerator {
        async fn generate(&self, question: &str) -> Result<GenerateResponse, ChatError> {
            self.calls.lock().unwrap().push(question.to_string());
            if self.fail {
                return Err(ChatError::Interrupted("connection reset".to_string()));
            }
            Ok(GenerateResponse::from_text(&format!("answer to {}", question)))
        }
    }

    pub(crate) fn test_app() -> App {
        App::new(EchoGenerator::new())
    }

    pub(crate) async fn ask(app: &mut App, question: &str) {
        app.session.set_input(question);
        assert!(app.submit());
        app.finish_pending().await;
    }

    #[tokio::test]
    async fn test_submit_runs_in_background() {
        let generator = EchoGenerator::new();
        let mut app = App::new(generator.clone());
        app.session.set_input("2+2?");
        app.input_cursor = 4;

        assert!(app.submit());
        assert!(app.session.is_loading());
        assert!(app.has_pending());

        app.finish_pending().await;

        assert!(!app.has_pending());
        assert!(!app.session.is_loading());
        assert_eq!(app.session.last_answer(), Some("answer to 2+2?"));
        assert_eq!(app.session.history(), &[Exchange::new("2+2?", "answer to 2+2?")]);
        assert_eq!(app.input_cursor, 0);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_loading_is_ignored() {
        let generator = EchoGenerator::new();
        let mut app = App::new(generator.clone());
        app.session.set_input("first");
        assert!(app.submit());

        app.session.set_input("second");
        assert!(!app.submit());

        app.finish_pending().await;
        assert_eq!(generator.call_count(), 1);
        assert_eq!(app.session.history().len(), 1);
        assert_eq!(app.session.history()[0].question, "first");
    }

    #[tokio::test]
    async fn test_failed_request_shows_fallback() {
        let mut app = App::new(EchoGenerator::failing());
        app.session.set_input("hi");
        app.submit();
        app.finish_pending().await;

        assert_eq!(app.session.last_answer(), Some(SOMETHING_WENT_WRONG));
        assert!(app.session.history().is_empty());
        assert_eq!(app.session.input(), "");
    }

    #[tokio::test]
    async fn test_poll_pending_waits_for_completion() {
        let mut app = test_app();
        app.session.set_input("q");
        app.submit();

        while app.has_pending() {
            tokio::task::yield_now().await;
            app.poll_pending().await;
        }
        assert_eq!(app.session.last_answer(), Some("answer to q"));
    }

    #[tokio::test]
    async fn test_delete_selected_adjusts_selection() {
        let mut app = test_app();
        for q in ["a", "b", "c"] {
            ask(&mut app, q).await;
        }
        app.focus_history();
        app.history_nav_down();
        app.history_nav_down();
        assert_eq!(app.history_state.selected(), Some(2));

        app.delete_selected_history();
        assert_eq!(app.history_state.selected(), Some(1));
        let questions: Vec<&str> = app.session.history().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["c", "b"]);

        app.delete_selected_history();
        app.delete_selected_history();
        assert!(app.session.history().is_empty());
        assert_eq!(app.history_state.selected(), None);
    }

    #[tokio::test]
    async fn test_recall_selected_history() {
        let mut app = test_app();
        ask(&mut app, "old").await;
        ask(&mut app, "new").await;
        app.session.set_input("draft");
        app.input_cursor = 5;

        app.focus_history();
        app.history_nav_down();
        app.recall_selected_history();

        assert_eq!(app.session.last_answer(), Some("answer to old"));
        assert_eq!(app.session.input(), "");
        assert_eq!(app.input_cursor, 0);
        assert_eq!(app.session.history().len(), 2);
    }

    #[test]
    fn test_toggled_theme_does_not_carry_over() {
        let mut app = test_app();
        app.toggle_theme();
        assert_eq!(app.session.theme(), Theme::Light);

        let fresh = test_app();
        assert_eq!(fresh.session.theme(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_delete_unselected_entry_keeps_selection_valid() {
        let mut app = test_app();
        ask(&mut app, "a").await;
        ask(&mut app, "b").await;
        app.history_state.select(Some(1));

        app.delete_history(0);

        assert_eq!(app.session.history(), &[Exchange::new("a", "answer to a")]);
        assert_eq!(app.history_state.selected(), Some(0));
    }

    #[test]
    fn test_tick_only_animates_while_loading() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.session.set_input("q");
        app.session.begin_submit();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 2);
    }
}
