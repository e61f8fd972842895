/// Callbacks emitted by a gallery popup, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent {
    /// The displayed photo changed while the popup was open (zero-based).
    Changed(usize),
    Opened,
    Closed,
}

/// Commands a popup gallery accepts.
pub trait Gallery {
    /// Shows the popup at its current index. No-op when already open.
    fn open(&mut self);
    /// Moves to `index` (zero-based). Out-of-range indices wrap around.
    fn go_to(&mut self, index: usize);
    /// Hides the popup. No-op when already closed.
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn current_index(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open/index state of a popup over `len` photos, queuing its callbacks.
#[derive(Debug, Default)]
pub struct GalleryCursor {
    len: usize,
    index: usize,
    open: bool,
    events: Vec<GalleryEvent>,
}

impl GalleryCursor {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Default::default()
        }
    }

    /// Opens on the clicked photo. Always reports the photo, even if it was
    /// already the current one, so the click is recorded in history.
    pub fn open_at(&mut self, index: usize) {
        if self.len == 0 {
            return;
        }
        self.open();
        self.index = self.wrap(index);
        self.events.push(GalleryEvent::Changed(self.index));
    }

    pub fn next(&mut self) {
        if self.open && self.len > 0 {
            self.go_to((self.index + 1) % self.len);
        }
    }

    pub fn prev(&mut self) {
        if self.open && self.len > 0 {
            self.go_to((self.index + self.len - 1) % self.len);
        }
    }

    /// Drains callbacks queued since the last call.
    pub fn take_events(&mut self) -> Vec<GalleryEvent> {
        std::mem::take(&mut self.events)
    }

    fn wrap(&self, index: usize) -> usize {
        index % self.len
    }
}

impl Gallery for GalleryCursor {
    fn open(&mut self) {
        if self.open || self.len == 0 {
            return;
        }
        self.open = true;
        self.events.push(GalleryEvent::Opened);
    }

    fn go_to(&mut self, index: usize) {
        if self.len == 0 {
            return;
        }
        let index = self.wrap(index);
        if index == self.index {
            return;
        }
        self.index = index;
        if self.open {
            self.events.push(GalleryEvent::Changed(index));
        }
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.events.push(GalleryEvent::Closed);
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn current_index(&self) -> usize {
        self.index
    }

    fn len(&self) -> usize {
        self.len
    }
}
