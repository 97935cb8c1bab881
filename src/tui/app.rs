use crate::client::ChatClient;
use crate::config::Config;
use crate::tui::{
    events::Event,
    styles::Theme,
    widget::{ChatOutcome, ChatWidget, OutboundChat},
    Frame,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Paragraph};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    /// The chat widget filling the main area
    pub widget: ChatWidget,

    /// Client for the chat service
    pub client: Arc<ChatClient>,

    /// Current theme for styling
    pub theme: Theme,

    /// Event sender for reporting completed requests
    pub event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config, event_sender: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            should_quit: false,
            size: Rect::default(),
            widget: ChatWidget::new(config.max_entries),
            client: Arc::new(ChatClient::new(config.base_url.clone())),
            theme: Theme::default(),
            event_sender,
        }
    }

    /// Handle incoming events
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => {
                if self.is_quit_key(&key_event) {
                    self.should_quit = true;
                    return Ok(true);
                }

                if let Some(outbound) = self.widget.handle_key_event(key_event).await? {
                    self.dispatch(outbound);
                }
            }

            Event::Mouse(mouse_event) => {
                if let Some(outbound) = self.widget.handle_mouse_event(mouse_event).await? {
                    self.dispatch(outbound);
                }
            }

            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
            }

            Event::Tick => {}

            Event::Chat(outcome) => {
                self.widget.apply_outcome(outcome);
            }
        }

        Ok(self.should_quit)
    }

    /// Ctrl+C always quits; `q` quits while the popup is closed
    fn is_quit_key(&self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char('q') => !self.widget.is_open(),
            _ => false,
        }
    }

    /// Send the request in the background and report back as an event
    fn dispatch(&self, outbound: OutboundChat) {
        let client = self.client.clone();
        let sender = self.event_sender.clone();

        tokio::spawn(async move {
            let result = client.send(&outbound.request).await;
            let outcome = ChatOutcome {
                id: outbound.id,
                result,
            };
            if sender.send(Event::Chat(outcome)).is_err() {
                error!("Event channel closed before the chat outcome was delivered");
            }
        });
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.size());

        let background = Block::default().style(self.theme.base_style());
        frame.render_widget(background, chunks[0]);

        self.widget.render(frame, chunks[0], &self.theme);

        self.render_status_bar(frame, chunks[1]);
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.widget.is_open() {
            "Enter to send | Esc to close | Ctrl+C to quit"
        } else {
            "o to open chat | q to quit"
        };

        let status_text = match self.widget.session_id() {
            Some(session_id) => {
                format!("{} | {} | session {}", hints, self.client.base_url(), session_id)
            }
            None => format!("{} | {}", hints, self.client.base_url()),
        };

        let status_paragraph = Paragraph::new(status_text).style(self.theme.status_bar_style());

        frame.render_widget(status_paragraph, area);
    }
}
