use super::{Component, ComponentState};
use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Single line message input with cursor editing
pub struct MessageInput {
    state: ComponentState,
    content: String,
    cursor: usize,
    placeholder: String,
}

impl MessageInput {
    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            content: String::new(),
            cursor: 0,
            placeholder: "Type your message...".to_string(),
        }
    }

    pub fn get_content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor
    pub fn insert(&mut self, c: char) {
        let index = self.byte_index();
        self.content.insert(index, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index();
        self.content.remove(index);
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.content.chars().count() {
            let index = self.byte_index();
            self.content.remove(index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    /// Byte offset of the cursor into the content
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.content.len())
    }
}

impl Default for MessageInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for MessageInput {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        match event.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_to_start(),
            KeyCode::End => self.move_to_end(),
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .style(if self.state.has_focus {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area);

        // Shift the visible window so the cursor stays in view
        let cursor_x = UnicodeWidthStr::width(&self.content[..self.byte_index()]) as u16;
        let visible = inner.width.saturating_sub(1);
        let shift = cursor_x.saturating_sub(visible);

        let paragraph = if self.content.is_empty() {
            Paragraph::new(self.placeholder.as_str()).style(theme.placeholder_style())
        } else {
            Paragraph::new(self.content.as_str()).style(theme.text_style())
        };
        frame.render_widget(paragraph.block(block).scroll((0, shift)), area);

        if self.state.has_focus {
            frame.set_cursor(inner.x + cursor_x - shift, inner.y);
        }

        self.state.size = area;
    }

    fn has_focus(&self) -> bool {
        self.state.has_focus
    }

    fn set_focus(&mut self, focus: bool) {
        self.state.has_focus = focus;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(input: &mut MessageInput, text: &str) {
        for c in text.chars() {
            input.insert(c);
        }
    }

    #[test]
    fn test_insert_appends_at_cursor() {
        let mut input = MessageInput::new();
        type_text(&mut input, "hello");
        assert_eq!(input.get_content(), "hello");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = MessageInput::new();
        type_text(&mut input, "helo");
        input.move_left();
        input.insert('l');
        assert_eq!(input.get_content(), "hello");
    }

    #[test]
    fn test_backspace_removes_before_cursor() {
        let mut input = MessageInput::new();
        type_text(&mut input, "hello!");
        input.backspace();
        assert_eq!(input.get_content(), "hello");

        input.move_to_start();
        input.backspace();
        assert_eq!(input.get_content(), "hello");
    }

    #[test]
    fn test_delete_removes_under_cursor() {
        let mut input = MessageInput::new();
        type_text(&mut input, "hxello");
        input.move_to_start();
        input.move_right();
        input.delete();
        assert_eq!(input.get_content(), "hello");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = MessageInput::new();
        type_text(&mut input, "héllo");
        input.backspace();
        input.backspace();
        assert_eq!(input.get_content(), "hél");

        input.move_to_start();
        input.move_right();
        input.delete();
        assert_eq!(input.get_content(), "hl");
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut input = MessageInput::new();
        type_text(&mut input, "hi");
        input.clear();
        assert_eq!(input.get_content(), "");

        input.insert('a');
        assert_eq!(input.get_content(), "a");
    }
}
