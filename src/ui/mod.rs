//! Client-side controller for the question form.
//!
//! The form has two states, `Idle` and `Busy`. Both submit triggers (a click or
//! an Enter key press) go through [`AskController::dispatch`]. Presentation is
//! delegated to a [`View`]; the relay call to a [`RelayTransport`].

use async_trait::async_trait;
use thiserror::Error;

pub mod terminal;
pub mod transport;

pub use terminal::TerminalView;
pub use transport::HttpRelayTransport;

pub const EMPTY_QUESTION_MESSAGE: &str = "Por favor, digite uma pergunta antes de pesquisar.";
pub const IDLE_LABEL: &str = "Pesquisar";
pub const BUSY_LABEL: &str = "Pensando...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Busy,
}

impl UiState {
    pub fn submit_label(self) -> &'static str {
        match self {
            UiState::Idle => IDLE_LABEL,
            UiState::Busy => BUSY_LABEL,
        }
    }

    /// Input field and submit control are only usable while idle.
    pub fn inputs_enabled(self) -> bool {
        self == UiState::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger<'a> {
    Click,
    Key(&'a str),
}

impl Trigger<'_> {
    pub fn is_submit(&self) -> bool {
        match self {
            Trigger::Click => true,
            Trigger::Key(key) => *key == "Enter",
        }
    }
}

/// What ends up in the answer area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Answer(String),
    Error(String),
}

impl Rendered {
    pub fn is_error(&self) -> bool {
        matches!(self, Rendered::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Rendered::Answer(text) | Rendered::Error(text) => text,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Human-readable text for the answer area. Never carries raw technical detail.
    pub fn user_message(&self) -> String {
        let detail = match self {
            TransportError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            TransportError::Status { status, .. } => {
                format!("O servidor respondeu com status {status}")
            }
            TransportError::Network(_) => "Não foi possível contactar o servidor".to_string(),
            TransportError::Decode(_) => "O servidor enviou uma resposta inválida".to_string(),
        };
        format!(
            "Erro: {}. Verifique o console e se o backend está online.",
            detail.trim_end_matches('.')
        )
    }
}

#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, TransportError>;
}

/// Presentation side of the form.
pub trait View {
    /// Toggle disabled inputs, loading indicator and submit label for `state`.
    fn apply_state(&mut self, state: UiState);
    fn clear(&mut self);
    fn render(&mut self, rendered: &Rendered);
}

/// Holds the form in `Busy` and returns it to `Idle` when dropped, even on unwind.
struct BusyGuard<'a, V: View> {
    state: &'a mut UiState,
    view: &'a mut V,
}

impl<'a, V: View> BusyGuard<'a, V> {
    fn enter(state: &'a mut UiState, view: &'a mut V) -> Self {
        *state = UiState::Busy;
        view.apply_state(UiState::Busy);
        Self { state, view }
    }
}

impl<V: View> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        *self.state = UiState::Idle;
        self.view.apply_state(UiState::Idle);
    }
}

pub struct AskController<T, V> {
    transport: T,
    view: V,
    state: UiState,
}

impl<T: RelayTransport, V: View> AskController<T, V> {
    pub fn new(transport: T, mut view: V) -> Self {
        view.apply_state(UiState::Idle);
        Self {
            transport,
            view,
            state: UiState::Idle,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Handle one trigger against the current input text.
    ///
    /// Returns what was rendered, or `None` when the trigger was ignored.
    pub async fn dispatch(&mut self, trigger: Trigger<'_>, input: &str) -> Option<Rendered> {
        if !trigger.is_submit() || self.state == UiState::Busy {
            return None;
        }

        let question = input.trim();
        if question.is_empty() {
            let rendered = Rendered::Error(EMPTY_QUESTION_MESSAGE.to_string());
            self.view.clear();
            self.view.render(&rendered);
            return Some(rendered);
        }

        let busy = BusyGuard::enter(&mut self.state, &mut self.view);
        busy.view.clear();

        let rendered = match self.transport.ask(question).await {
            Ok(answer) => Rendered::Answer(answer),
            Err(err) => {
                tracing::warn!(error = %err, "Relay call failed");
                Rendered::Error(err.user_message())
            }
        };
        busy.view.render(&rendered);
        Some(rendered)
    }
}
