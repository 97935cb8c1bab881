use super::components::{
    input::MessageInput,
    transcript::{Entry, Transcript},
    Component,
};
use crate::client::{ChatReply, ChatRequest, ClientError};
use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{block::Title, Block, Borders, Clear, Paragraph},
};
use tracing::{error, warn};
use uuid::Uuid;

/// Reply shown when a request fails for any reason
const FALLBACK_REPLY: &str = "Oops! Something went wrong. Please try again.";

/// A request ready to be dispatched by the host
#[derive(Debug, Clone)]
pub struct OutboundChat {
    pub id: Uuid,
    pub request: ChatRequest,
}

/// Completion of a dispatched request
#[derive(Debug)]
pub struct ChatOutcome {
    pub id: Uuid,
    pub result: Result<ChatReply, ClientError>,
}

/// The request the widget is currently waiting on
#[derive(Debug, Clone)]
struct PendingRequest {
    id: Uuid,
    typing_id: String,
}

/// Popup chat widget wiring the transcript, input and session state together.
///
/// The widget itself is synchronous: `submit` hands an [`OutboundChat`] to the
/// host for dispatch, and the host feeds the completion back through
/// [`ChatWidget::apply_outcome`]. At most one request is in flight at a time;
/// submits while one is pending are ignored.
pub struct ChatWidget {
    open: bool,
    session_id: Option<String>,
    pending: Option<PendingRequest>,
    transcript: Transcript,
    input: MessageInput,

    // Hit areas recorded at render time for mouse handling
    launcher_area: Rect,
    close_area: Rect,
    send_area: Rect,
    input_area: Rect,
}

impl ChatWidget {
    pub fn new(max_entries: usize) -> Self {
        Self {
            open: false,
            session_id: None,
            pending: None,
            transcript: Transcript::new().with_max_entries(max_entries),
            input: MessageInput::new(),
            launcher_area: Rect::default(),
            close_area: Rect::default(),
            send_area: Rect::default(),
            input_area: Rect::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Identifier of the current conversation, once the server has named one
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Show the popup and hide the launcher
    pub fn open_popup(&mut self) {
        self.open = true;
        self.input.set_focus(true);
    }

    /// Hide the popup and show the launcher again. An in-flight request keeps
    /// running and the transcript and session are kept as they are.
    pub fn close_popup(&mut self) {
        self.open = false;
        self.input.set_focus(false);
    }

    /// Turn the current input into an outbound request.
    ///
    /// Returns `None` without touching anything when a request is already in
    /// flight or when the trimmed input is empty. Otherwise the trimmed text
    /// is appended to the transcript, the input is cleared, and a typing
    /// placeholder is shown until the outcome arrives.
    pub fn submit(&mut self) -> Option<OutboundChat> {
        if self.pending.is_some() {
            return None;
        }

        let message = self.input.get_content().trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.transcript.push(Entry::user(message.clone()));
        self.input.clear();
        let typing_id = self.transcript.push(Entry::typing());

        let id = Uuid::new_v4();
        self.pending = Some(PendingRequest { id, typing_id });

        Some(OutboundChat {
            id,
            request: ChatRequest {
                message,
                session_id: self.session_id.clone(),
            },
        })
    }

    /// Fold a completed request back into the widget state.
    ///
    /// On success the session identifier is taken from the reply and the
    /// response is appended; on failure a fixed apology is appended instead
    /// and the session is left unchanged. Either way the typing placeholder
    /// for this request is removed first.
    pub fn apply_outcome(&mut self, outcome: ChatOutcome) {
        let pending = match self.pending.take() {
            Some(pending) if pending.id == outcome.id => pending,
            Some(pending) => {
                warn!("Ignoring outcome for unknown request {}", outcome.id);
                self.pending = Some(pending);
                return;
            }
            None => {
                warn!("Ignoring outcome with no request pending: {}", outcome.id);
                return;
            }
        };

        self.transcript.remove(&pending.typing_id);

        match outcome.result {
            Ok(reply) => {
                self.session_id = Some(reply.session_id);
                self.transcript.push(Entry::bot(reply.response));
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                self.transcript.push(Entry::bot(FALLBACK_REPLY.to_string()));
            }
        }
    }

    pub async fn handle_key_event(&mut self, event: KeyEvent) -> Result<Option<OutboundChat>> {
        if !self.open {
            if matches!(event.code, KeyCode::Char('o') | KeyCode::Enter) {
                self.open_popup();
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Enter => return Ok(self.submit()),
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => {
                self.transcript.handle_key_event(event).await?;
            }
            _ => self.input.handle_key_event(event).await?,
        }

        Ok(None)
    }

    pub async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<Option<OutboundChat>> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.open {
                    if contains(self.launcher_area, event.column, event.row) {
                        self.open_popup();
                    }
                    return Ok(None);
                }

                if contains(self.close_area, event.column, event.row) {
                    self.close_popup();
                } else if contains(self.send_area, event.column, event.row) {
                    return Ok(self.submit());
                } else if contains(self.input_area, event.column, event.row) {
                    self.input.set_focus(true);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                if self.open {
                    self.transcript.handle_mouse_event(event).await?;
                }
            }
            _ => {}
        }

        Ok(None)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.open {
            self.render_popup(frame, area, theme);
        } else {
            self.render_launcher(frame, area, theme);
        }
    }

    fn render_launcher(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let pill = anchored_rect(12, 3, area);
        self.launcher_area = pill;

        let launcher = Paragraph::new("Chat")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).style(theme.launcher_style()))
            .style(theme.launcher_style());
        frame.render_widget(launcher, pill);
    }

    fn render_popup(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = anchored_rect(46, 18, area);

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Support Chat")
            .title(Title::from(" ✕ ").alignment(Alignment::Right))
            .style(theme.base_style());
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        // The close control sits in the top border, just left of the corner
        self.close_area = Rect::new(popup.right().saturating_sub(4), popup.y, 3, 1);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(3), // Input row
            ])
            .split(inner);

        self.transcript.render(frame, chunks[0], theme);

        let input_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(8)])
            .split(chunks[1]);

        self.input_area = input_row[0];
        self.input.render(frame, input_row[0], theme);

        self.send_area = input_row[1];
        self.render_send_button(frame, input_row[1], theme);
    }

    fn render_send_button(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = if self.is_pending() {
            theme.placeholder_style()
        } else {
            theme.launcher_style()
        };

        let button = Paragraph::new("Send")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).style(theme.border_style()))
            .style(style);
        frame.render_widget(button, area);
    }
}

/// Anchor a rect of the given size to the bottom-right corner of `r`,
/// keeping one cell of margin
fn anchored_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width.saturating_sub(2));
    let height = height.min(r.height.saturating_sub(2));
    Rect::new(
        r.right().saturating_sub(width + 1),
        r.bottom().saturating_sub(height + 1),
        width,
        height,
    )
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::transcript::EntryKind;

    fn widget() -> ChatWidget {
        ChatWidget::new(100)
    }

    fn type_text(widget: &mut ChatWidget, text: &str) {
        for c in text.chars() {
            widget.input.insert(c);
        }
    }

    fn kinds(widget: &ChatWidget) -> Vec<EntryKind> {
        widget.transcript.iter().map(|entry| entry.kind).collect()
    }

    fn ok_outcome(id: Uuid, response: &str, session_id: &str) -> ChatOutcome {
        ChatOutcome {
            id,
            result: Ok(ChatReply {
                response: response.to_string(),
                session_id: session_id.to_string(),
            }),
        }
    }

    fn err_outcome(id: Uuid) -> ChatOutcome {
        ChatOutcome {
            id,
            result: Err(ClientError::ApiError("connection refused".to_string())),
        }
    }

    #[test]
    fn test_open_and_close_popup() {
        let mut widget = widget();
        assert!(!widget.is_open());

        widget.open_popup();
        assert!(widget.is_open());
        assert!(widget.input.has_focus());

        widget.close_popup();
        assert!(!widget.is_open());
        assert!(!widget.input.has_focus());
    }

    #[test]
    fn test_submit_builds_request_and_updates_transcript() {
        let mut widget = widget();
        type_text(&mut widget, "  hello there  ");

        let outbound = widget.submit().expect("submit should produce a request");
        assert_eq!(outbound.request.message, "hello there");
        assert_eq!(outbound.request.session_id, None);

        assert_eq!(kinds(&widget), vec![EntryKind::User, EntryKind::Typing]);
        assert_eq!(widget.transcript.iter().next().unwrap().text, "hello there");
        assert_eq!(widget.input.get_content(), "");
        assert!(widget.is_pending());
    }

    #[test]
    fn test_submit_ignores_empty_input() {
        let mut widget = widget();
        type_text(&mut widget, "   ");

        assert!(widget.submit().is_none());
        assert!(widget.transcript.is_empty());
        assert_eq!(widget.input.get_content(), "   ");
        assert!(!widget.is_pending());
    }

    #[test]
    fn test_submit_ignored_while_pending() {
        let mut widget = widget();
        type_text(&mut widget, "first");
        widget.submit().unwrap();

        type_text(&mut widget, "again");
        assert!(widget.submit().is_none());

        assert_eq!(widget.transcript.len(), 2);
        assert_eq!(widget.input.get_content(), "again");
    }

    #[test]
    fn test_success_outcome_replaces_placeholder() {
        let mut widget = widget();
        type_text(&mut widget, "hello");
        let outbound = widget.submit().unwrap();

        widget.apply_outcome(ok_outcome(outbound.id, "Hi there!", "abc123"));

        assert_eq!(kinds(&widget), vec![EntryKind::User, EntryKind::Bot]);
        assert_eq!(widget.transcript.iter().last().unwrap().text, "Hi there!");
        assert_eq!(widget.session_id(), Some("abc123"));
        assert!(!widget.is_pending());
    }

    #[test]
    fn test_failure_outcome_shows_fallback() {
        let mut widget = widget();
        type_text(&mut widget, "hello");
        let outbound = widget.submit().unwrap();

        widget.apply_outcome(err_outcome(outbound.id));

        assert_eq!(kinds(&widget), vec![EntryKind::User, EntryKind::Bot]);
        assert_eq!(widget.transcript.iter().last().unwrap().text, FALLBACK_REPLY);
        assert_eq!(widget.session_id(), None);
        assert!(!widget.is_pending());
    }

    #[test]
    fn test_failure_keeps_established_session() {
        let mut widget = widget();
        type_text(&mut widget, "hello");
        let outbound = widget.submit().unwrap();
        widget.apply_outcome(ok_outcome(outbound.id, "Hi there!", "abc123"));

        type_text(&mut widget, "how are you?");
        let outbound = widget.submit().unwrap();
        widget.apply_outcome(err_outcome(outbound.id));

        assert_eq!(widget.session_id(), Some("abc123"));
    }

    #[test]
    fn test_session_id_flows_into_next_request() {
        let mut widget = widget();
        type_text(&mut widget, "hello");
        let outbound = widget.submit().unwrap();
        widget.apply_outcome(ok_outcome(outbound.id, "Hi there!", "abc123"));

        type_text(&mut widget, "how are you?");
        let outbound = widget.submit().unwrap();
        assert_eq!(outbound.request.session_id, Some("abc123".to_string()));
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let mut widget = widget();
        type_text(&mut widget, "hello");
        widget.submit().unwrap();

        widget.apply_outcome(ok_outcome(Uuid::new_v4(), "stray", "zzz999"));

        assert!(widget.is_pending());
        assert_eq!(kinds(&widget), vec![EntryKind::User, EntryKind::Typing]);
        assert_eq!(widget.session_id(), None);
    }

    #[test]
    fn test_outcome_without_pending_request_is_ignored() {
        let mut widget = widget();
        widget.apply_outcome(ok_outcome(Uuid::new_v4(), "stray", "zzz999"));

        assert!(widget.transcript.is_empty());
        assert_eq!(widget.session_id(), None);
    }
}
