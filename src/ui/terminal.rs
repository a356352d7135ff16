use std::io::{self, Stderr, Stdout, Write};

use crossterm::style::Stylize;
use crossterm::tty::IsTty;

use crate::ui::{Rendered, UiState, View};

/// Escape control characters so answer text cannot drive the terminal.
///
/// Newlines and tabs pass through; everything else in the control range is
/// written as its escaped form (`\u{1b}`, `\r`, ...).
pub fn escape_control(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' | '\t' => out.push(c),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}

/// Terminal rendering of the form: answers on `out`, status and errors on `err`.
pub struct TerminalView<O: Write, E: Write> {
    out: O,
    err: E,
    color: bool,
    state: UiState,
}

impl TerminalView<Stdout, Stderr> {
    pub fn stdio() -> Self {
        let color = io::stderr().is_tty();
        Self::new(io::stdout(), io::stderr(), color)
    }
}

impl<O: Write, E: Write> TerminalView<O, E> {
    pub fn new(out: O, err: E, color: bool) -> Self {
        Self {
            out,
            err,
            color,
            state: UiState::Idle,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> View for TerminalView<O, E> {
    fn apply_state(&mut self, state: UiState) {
        if self.state == UiState::Idle && state == UiState::Busy {
            let _ = writeln!(self.err, "{}", state.submit_label());
        }
        self.state = state;
    }

    fn clear(&mut self) {}

    fn render(&mut self, rendered: &Rendered) {
        let text = escape_control(rendered.text());
        match rendered {
            Rendered::Answer(_) => {
                let _ = writeln!(self.out, "{text}");
                let _ = self.out.flush();
            }
            Rendered::Error(_) if self.color => {
                let _ = writeln!(self.err, "{}", text.as_str().red());
            }
            Rendered::Error(_) => {
                let _ = writeln!(self.err, "{text}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> TerminalView<Vec<u8>, Vec<u8>> {
        TerminalView::new(Vec::new(), Vec::new(), false)
    }

    #[test]
    fn markup_is_printed_literally() {
        let mut v = view();
        v.render(&Rendered::Answer("<img src=x onerror=alert(1)>".to_string()));
        let (out, err) = v.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "<img src=x onerror=alert(1)>\n");
        assert!(err.is_empty());
    }

    #[test]
    fn escape_sequences_are_neutralised() {
        assert_eq!(escape_control("a\x1b[2Jb"), "a\\u{1b}[2Jb");
        assert_eq!(escape_control("line\r\nnext\tcol"), "line\\r\nnext\tcol");
    }

    #[test]
    fn errors_go_to_stderr() {
        let mut v = TerminalView::new(Vec::new(), Vec::new(), true);
        v.render(&Rendered::Error("Erro: x".to_string()));
        let (out, err) = v.into_inner();
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            format!("{}\n", "Erro: x".red())
        );
    }

    #[test]
    fn errors_are_plain_without_color() {
        let mut v = view();
        v.render(&Rendered::Error("Erro: x".to_string()));
        let (_, err) = v.into_inner();
        assert_eq!(String::from_utf8(err).unwrap(), "Erro: x\n");
    }

    #[test]
    fn busy_shows_progress_label_once() {
        let mut v = view();
        v.apply_state(UiState::Busy);
        assert_eq!(v.state(), UiState::Busy);
        v.apply_state(UiState::Idle);
        let (_, err) = v.into_inner();
        assert_eq!(String::from_utf8(err).unwrap(), "Pensando...\n");
    }
}
