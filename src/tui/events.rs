use crate::tui::widget::ChatOutcome;
use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// Completed chat request
    Chat(ChatOutcome),
}

/// Event handler for managing input events
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// Tick interval for periodic events
    tick_interval: Duration,
}

impl EventHandler {
    /// Create a new event handler and start reading terminal input
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tick_interval = Duration::from_millis(100); // 10 FPS

        let input_sender = sender.clone();
        tokio::task::spawn_blocking(move || loop {
            match crossterm::event::poll(Duration::from_millis(50)) {
                Ok(true) => match crossterm::event::read() {
                    Ok(event) => {
                        if let Some(event) = convert_crossterm_event(event) {
                            if input_sender.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Err(_) => break,
                },
                Ok(false) => {
                    if input_sender.is_closed() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        Self {
            receiver,
            sender,
            tick_interval,
        }
    }

    /// Get the next event, falling back to a tick when input is quiet
    pub async fn next(&mut self) -> Option<Event> {
        match timeout(self.tick_interval, self.receiver.recv()).await {
            Ok(event) => event,
            Err(_) => Some(Event::Tick),
        }
    }

    /// Send an internal event
    pub fn send(&self, event: Event) -> Result<()> {
        self.sender.send(event)?;
        Ok(())
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm events to application events
fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key_event) => Some(Event::Key(key_event)),
        CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sent_events_are_delivered() {
        let mut handler = EventHandler::new();
        handler.send(Event::Resize(80, 24)).unwrap();

        match handler.next().await {
            Some(Event::Resize(width, height)) => {
                assert_eq!((width, height), (80, 24));
            }
            other => panic!("expected resize event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_next_falls_back_to_tick() {
        let mut handler = EventHandler::new();
        assert!(matches!(handler.next().await, Some(Event::Tick)));
    }
}
