use super::{Component, ComponentState};
use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::collections::VecDeque;
use uuid::Uuid;

/// Text shown in place of the reply while a request is in flight
pub const TYPING_INDICATOR: &str = "Typing...";

/// Kind of transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Bot,
    Typing,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::User => write!(f, "You"),
            // The typing placeholder reads as a bot message
            EntryKind::Bot | EntryKind::Typing => write!(f, "Bot"),
        }
    }
}

/// A single conversation entry
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub kind: EntryKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Entry {
    pub fn new(kind: EntryKind, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            text,
            timestamp: Local::now(),
        }
    }

    pub fn user(text: String) -> Self {
        Self::new(EntryKind::User, text)
    }

    pub fn bot(text: String) -> Self {
        Self::new(EntryKind::Bot, text)
    }

    pub fn typing() -> Self {
        Self::new(EntryKind::Typing, TYPING_INDICATOR.to_string())
    }
}

/// Scrollable list of conversation entries
pub struct Transcript {
    state: ComponentState,
    entries: VecDeque<Entry>,
    max_entries: usize,
    scroll_offset: usize,
    auto_scroll: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            entries: VecDeque::new(),
            max_entries: 1000,
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Append an entry and return its id so it can be removed later.
    /// Every append pins the view back to the newest entry.
    pub fn push(&mut self, entry: Entry) -> String {
        let id = entry.id.clone();
        self.entries.push_back(entry);

        while self.len() > self.max_entries {
            self.entries.pop_front();
        }

        self.auto_scroll = true;
        id
    }

    /// Remove the entry with the given id, if still present
    pub fn remove(&mut self, id: &str) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Scroll up, unpinning the view from the bottom
    pub fn scroll_up(&mut self, lines: usize) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Scroll down; the next render re-pins once the bottom is reached
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    fn page_height(&self) -> usize {
        self.state.size.height.saturating_sub(2).max(1) as usize
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for Transcript {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        match event.code {
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(self.page_height()),
            KeyCode::PageDown => self.scroll_down(self.page_height()),
            _ => {}
        }
        Ok(())
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_up(1),
            MouseEventKind::ScrollDown => self.scroll_down(1),
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Conversation")
            .style(theme.border_style());
        let inner = block.inner(area);

        let mut lines = Vec::new();
        for entry in self.iter() {
            lines.extend(entry_lines(entry, inner.width as usize, theme));
        }

        let total_lines = lines.len();
        let viewport = inner.height as usize;
        let max_scroll = total_lines.saturating_sub(viewport);
        if self.auto_scroll {
            self.scroll_offset = max_scroll;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_scroll);
            if self.scroll_offset == max_scroll {
                self.auto_scroll = true;
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, area);

        self.state.size = area;
    }
}

/// Lay out one entry as a dim header line followed by its wrapped text.
/// Entry text always becomes plain spans, never terminal markup.
fn entry_lines(entry: &Entry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let label_style = match entry.kind {
        EntryKind::User => theme.user_style(),
        EntryKind::Bot | EntryKind::Typing => theme.bot_style(),
    };
    let text_style = match entry.kind {
        EntryKind::Typing => theme.placeholder_style(),
        _ => theme.text_style(),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(entry.timestamp.format("%H:%M").to_string(), theme.dim_style()),
        Span::raw(" "),
        Span::styled(entry.kind.to_string(), label_style),
    ])];

    let wrap_width = width.saturating_sub(2).max(1);
    for wrapped in textwrap::wrap(&entry.text, wrap_width) {
        lines.push(Line::from(Span::styled(
            format!("  {}", wrapped),
            text_style,
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_removable_id() {
        let mut transcript = Transcript::new();
        let id = transcript.push(Entry::typing());
        assert_eq!(transcript.len(), 1);

        transcript.remove(&id);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_harmless() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::user("hello".to_string()));
        transcript.remove("not-an-id");
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_push_evicts_oldest_beyond_cap() {
        let mut transcript = Transcript::new().with_max_entries(2);
        transcript.push(Entry::user("one".to_string()));
        transcript.push(Entry::user("two".to_string()));
        transcript.push(Entry::user("three".to_string()));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.iter().next().unwrap().text, "two");
    }

    #[test]
    fn test_push_repins_to_bottom() {
        let mut transcript = Transcript::new();
        transcript.push(Entry::bot("hello".to_string()));

        transcript.scroll_up(1);
        assert!(!transcript.auto_scroll());

        transcript.push(Entry::bot("world".to_string()));
        assert!(transcript.auto_scroll());
    }

    #[test]
    fn test_typing_entry_uses_indicator_text() {
        let entry = Entry::typing();
        assert_eq!(entry.kind, EntryKind::Typing);
        assert_eq!(entry.text, TYPING_INDICATOR);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EntryKind::User.to_string(), "You");
        assert_eq!(EntryKind::Bot.to_string(), "Bot");
        assert_eq!(EntryKind::Typing.to_string(), "Bot");
    }

    #[test]
    fn test_entry_lines_wrap_long_text() {
        let theme = Theme::default();
        let entry = Entry::bot("a long reply that will not fit on one line".to_string());
        let lines = entry_lines(&entry, 20, &theme);

        // Header line plus at least two wrapped text lines
        assert!(lines.len() >= 3);
    }
}
