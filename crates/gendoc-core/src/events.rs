use crate::writer::{Event, Writer};

/// Records the event stream instead of rendering it. Consecutive text is
/// merged into one event.
#[derive(Debug, Default)]
pub struct EventWriter {
    events: Vec<Event>,
}

impl EventWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Writer for EventWriter {
    fn emit(&mut self, event: Event) {
        if let Event::Text { text } = &event {
            if let Some(Event::Text { text: last }) = self.events.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.events.push(event);
    }

    fn resolve_link(&mut self, placeholder: &str, id: &str) {
        for event in &mut self.events {
            if let Event::InternalLink { target, .. } = event {
                if target == placeholder {
                    *target = id.to_string();
                }
            }
        }
    }

    fn trim(&mut self) {
        if let Some(Event::Text { text }) = self.events.last_mut() {
            let end = text.trim_end().len();
            text.truncate(end);
            if text.is_empty() {
                self.events.pop();
            }
        }
        if let Some(Event::Text { text }) = self.events.first_mut() {
            let start = text.len() - text.trim_start().len();
            text.replace_range(..start, "");
            if text.is_empty() {
                self.events.remove(0);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn ends_with_newline(&self) -> bool {
        matches!(self.events.last(), Some(Event::Text { text }) if text.ends_with('\n'))
    }
}
