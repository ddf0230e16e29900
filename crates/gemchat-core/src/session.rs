use tracing::{debug, error, info};

use crate::ai::{extract_answer, Generate, GenerateResponse};
use crate::error::ChatError;
use crate::state::{Exchange, SessionState, Theme};

/// Answer shown when the call itself fails.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

/// Owns the session state and the history, newest exchange first.
///
/// Submitting is split into [`ChatSession::begin_submit`] and
/// [`ChatSession::complete_submit`] so an event loop can keep the request in
/// flight on its own task; [`ChatSession::submit`] runs both back to back.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    state: SessionState,
    history: Vec<Exchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.state.current_input
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.state.last_answer.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.current_input = text.into();
    }

    /// Direct access for character-level editing.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.state.current_input
    }

    /// Gates a submit of the current input.
    ///
    /// Returns the question to send, or `None` when the input is blank or a
    /// request is already outstanding. On `Some` the session is loading and
    /// the previous answer is cleared.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.state.is_loading {
            debug!("submit ignored: request already in flight");
            return None;
        }
        if self.state.current_input.trim().is_empty() {
            return None;
        }

        self.state.is_loading = true;
        self.state.last_answer = None;
        Some(self.state.current_input.clone())
    }

    /// Applies the outcome of the request started by `begin_submit`.
    pub fn complete_submit(
        &mut self,
        question: String,
        outcome: Result<GenerateResponse, ChatError>,
    ) {
        match outcome {
            Ok(response) => {
                let answer = extract_answer(&response);
                info!(answer_chars = answer.chars().count(), "answer received");
                self.history.insert(0, Exchange::new(question, answer.clone()));
                self.state.last_answer = Some(answer);
            }
            Err(e) => {
                error!(error = %e, "generate request failed");
                self.state.last_answer = Some(SOMETHING_WENT_WRONG.to_string());
            }
        }

        self.state.is_loading = false;
        self.state.current_input.clear();
    }

    /// Submits the current input and waits for the answer. Returns whether a
    /// request was issued.
    pub async fn submit<G>(&mut self, generator: &G) -> bool
    where
        G: Generate + ?Sized,
    {
        let Some(question) = self.begin_submit() else {
            return false;
        };

        let outcome = generator.generate(&question).await;
        self.complete_submit(question, outcome);
        true
    }

    /// Removes and returns the exchange at `index`; out of range is a no-op.
    pub fn delete_history_entry(&mut self, index: usize) -> Option<Exchange> {
        if index >= self.history.len() {
            debug!(index, len = self.history.len(), "delete ignored: no such entry");
            return None;
        }
        let removed = self.history.remove(index);
        info!(index, remaining = self.history.len(), "history entry deleted");
        Some(removed)
    }

    /// Shows the answer of the exchange at `index` again without re-asking.
    pub fn select_history_entry(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index) else {
            return false;
        };
        self.state.last_answer = Some(entry.answer.clone());
        self.state.current_input.clear();
        true
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.theme = self.state.theme.toggled();
        info!(theme = self.state.theme.as_str(), "theme toggled");
        self.state.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    enum Reply {
        Body(serde_json::Value),
        Fail,
    }

    struct StubGenerator {
        reply: Reply,
        calls: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn answering(text: &str) -> Self {
            Self::with_body(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }))
        }

        fn with_body(body: serde_json::Value) -> Self {
            Self {
                reply: Reply::Body(body),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Reply::Fail,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generate for StubGenerator {
        async fn generate(&self, question: &str) -> Result<GenerateResponse, ChatError> {
            self.calls.lock().unwrap().push(question.to_string());
            match &self.reply {
                Reply::Body(body) => Ok(serde_json::from_value(body.clone())?),
                Reply::Fail => Err(ChatError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_submit_records_answer() {
        let generator = StubGenerator::answering("4");
        let mut session = ChatSession::new();
        session.set_input("2+2?");

        assert!(session.submit(&generator).await);

        assert_eq!(session.last_answer(), Some("4"));
        assert_eq!(session.history(), &[Exchange::new("2+2?", "4")]);
        assert_eq!(session.input(), "");
        assert!(!session.is_loading());
        assert_eq!(generator.calls(), vec!["2+2?".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let generator = StubGenerator::answering("seeded");
        let mut session = ChatSession::new();
        session.set_input("seed");
        session.submit(&generator).await;
        let before_history = session.history().to_vec();

        for blank in ["", "   ", "\t\n "] {
            session.set_input(blank);
            assert!(!session.submit(&generator).await);
            assert_eq!(session.history(), before_history.as_slice());
            assert_eq!(session.last_answer(), Some("seeded"));
            assert_eq!(session.input(), blank);
        }
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_text_records_no_response() {
        let generator = StubGenerator::with_body(json!({ "candidates": [] }));
        let mut session = ChatSession::new();
        session.set_input("hello");

        session.submit(&generator).await;

        assert_eq!(session.last_answer(), Some("No response"));
        assert_eq!(session.history(), &[Exchange::new("hello", "No response")]);
    }

    #[tokio::test]
    async fn test_failure_keeps_history() {
        let mut session = ChatSession::new();
        session.set_input("first");
        session.submit(&StubGenerator::answering("one")).await;

        session.set_input("second");
        assert!(session.submit(&StubGenerator::failing()).await);

        assert_eq!(session.last_answer(), Some(SOMETHING_WENT_WRONG));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.input(), "");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let mut session = ChatSession::new();
        for (question, answer) in [("a", "1"), ("b", "2"), ("c", "3")] {
            session.set_input(question);
            session.submit(&StubGenerator::answering(answer)).await;
        }

        let questions: Vec<&str> = session.history().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_begin_submit_sets_loading_and_clears_answer() {
        let mut session = ChatSession::new();
        session.set_input("q1");
        let question = session.begin_submit().unwrap();
        session.complete_submit(question, Ok(GenerateResponse::from_text("a1")));

        session.set_input(" q2 ");
        assert_eq!(session.begin_submit().as_deref(), Some(" q2 "));
        assert!(session.is_loading());
        assert_eq!(session.last_answer(), None);
        assert_eq!(session.input(), " q2 ");
    }

    #[test]
    fn test_submit_while_loading_is_blocked() {
        let mut session = ChatSession::new();
        session.set_input("first");
        let question = session.begin_submit().unwrap();

        session.set_input("second");
        assert_eq!(session.begin_submit(), None);
        assert!(session.is_loading());

        session.complete_submit(question, Ok(GenerateResponse::from_text("done")));
        assert_eq!(session.history(), &[Exchange::new("first", "done")]);
        assert_eq!(session.input(), "");
    }

    #[tokio::test]
    async fn test_delete_history_entry() {
        let mut session = ChatSession::new();
        for question in ["a", "b", "c"] {
            session.set_input(question);
            session.submit(&StubGenerator::answering("x")).await;
        }

        let removed = session.delete_history_entry(1).unwrap();
        assert_eq!(removed.question, "b");
        let questions: Vec<&str> = session.history().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["c", "a"]);

        assert_eq!(session.delete_history_entry(2), None);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_select_history_entry() {
        let mut session = ChatSession::new();
        session.set_input("old");
        session.submit(&StubGenerator::answering("old answer")).await;
        session.set_input("new");
        session.submit(&StubGenerator::answering("new answer")).await;
        session.set_input("draft");

        assert!(session.select_history_entry(1));

        assert_eq!(session.last_answer(), Some("old answer"));
        assert_eq!(session.input(), "");
        assert_eq!(session.history()[0].question, "new");
        assert_eq!(session.history().len(), 2);

        assert!(!session.select_history_entry(5));
        assert_eq!(session.last_answer(), Some("old answer"));
    }

    #[test]
    fn test_toggle_theme_touches_nothing_else() {
        let mut session = ChatSession::new();
        session.set_input("typing");

        assert_eq!(session.toggle_theme(), Theme::Light);
        assert_eq!(session.toggle_theme(), Theme::Dark);
        assert_eq!(session.input(), "typing");
        assert_eq!(session.last_answer(), None);
    }
}
