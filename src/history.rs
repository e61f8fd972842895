/// Session history as seen by the gallery: push entries, read the address bar.
pub trait History {
    /// Adds an entry after the current one, dropping any forward entries.
    /// Never produces a [`PopStateEvent`].
    fn push_state(&mut self, state: &str, title: &str, url: &str);
    /// Path currently shown in the address bar.
    fn location(&self) -> &str;
    /// Title of the current entry.
    fn title(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// `None` for the entry created by loading a page.
    pub state: Option<String>,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Delivered when back/forward traversal lands on an entry.
pub struct PopStateEvent {
    pub state: Option<String>,
}

/// In-process back/forward stack with browser semantics.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl HistoryStack {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                state: None,
                title: title.to_string(),
                url: url.to_string(),
            }],
            index: 0,
        }
    }

    /// Starts over as if `url` had been loaded fresh from the address bar.
    pub fn reload(&mut self, url: &str, title: &str) {
        *self = Self::new(url, title);
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<PopStateEvent> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(self.pop_event())
    }

    pub fn forward(&mut self) -> Option<PopStateEvent> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(self.pop_event())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn pop_event(&self) -> PopStateEvent {
        let state = self.current().state.clone();
        tracing::debug!(url = %self.current().url, ?state, "popstate");
        PopStateEvent { state }
    }
}

impl History for HistoryStack {
    fn push_state(&mut self, state: &str, title: &str, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            state: Some(state.to_string()),
            title: title.to_string(),
            url: url.to_string(),
        });
        self.index += 1;
        tracing::debug!(url, title, entries = self.len(), "pushState");
    }

    fn location(&self) -> &str {
        &self.current().url
    }

    fn title(&self) -> &str {
        &self.current().title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_entry_pops_without_state() {
        let mut h = HistoryStack::new("/gallery/", "Album");
        h.push_state("pushed", "Photo 1", "/gallery/photo/1");

        let ev = h.back().expect("one entry behind");
        assert_eq!(ev, PopStateEvent { state: None });
        assert_eq!(h.location(), "/gallery/");
        assert_eq!(h.title(), "Album");
    }

    #[test]
    fn pushed_entries_pop_with_their_state() {
        let mut h = HistoryStack::new("/gallery/", "Album");
        h.push_state("pushed", "Photo 1", "/gallery/photo/1");
        h.push_state("pushed", "Photo 2", "/gallery/photo/2");

        let ev = h.back().expect("back to photo 1");
        assert_eq!(ev.state.as_deref(), Some("pushed"));
        assert_eq!(h.location(), "/gallery/photo/1");

        let ev = h.forward().expect("forward to photo 2");
        assert_eq!(ev.state.as_deref(), Some("pushed"));
        assert_eq!(h.location(), "/gallery/photo/2");
        assert_eq!(h.title(), "Photo 2");
    }

    #[test]
    fn push_drops_forward_entries() {
        let mut h = HistoryStack::new("/g/", "Album");
        h.push_state("pushed", "Photo 1", "/g/photo/1");
        h.push_state("pushed", "Photo 2", "/g/photo/2");
        h.back();
        h.push_state("pushed", "Photo 5", "/g/photo/5");

        assert!(!h.can_go_forward());
        assert_eq!(h.len(), 3);
        assert_eq!(h.location(), "/g/photo/5");
    }

    #[test]
    fn traversal_stops_at_the_ends() {
        let mut h = HistoryStack::new("/g/", "Album");
        assert_eq!(h.back(), None);
        assert_eq!(h.forward(), None);
        assert_eq!(h.location(), "/g/");
    }

    #[test]
    fn reload_discards_the_session() {
        let mut h = HistoryStack::new("/g/", "Album");
        h.push_state("pushed", "Photo 1", "/g/photo/1");
        h.reload("/other/photo/2", "Other");

        assert_eq!(h.len(), 1);
        assert_eq!(h.current().state, None);
        assert_eq!(h.location(), "/other/photo/2");
    }
}
