use crate::gallery::{Gallery, GalleryEvent};
use crate::history::{History, PopStateEvent};
use crate::route::{self, NavigationState};

/// State payload attached to every entry this controller pushes.
pub const PUSHED_STATE: &str = "pushed";

/// Keeps the gallery popup and the address bar pointing at the same photo.
///
/// Inbound: back/forward traversal and page loads are turned into gallery
/// commands. Outbound: gallery callbacks are turned into history pushes.
#[derive(Debug)]
pub struct HistorySyncController {
    base_path: String,
    page_title: String,
    gallery_open: bool,
}

impl HistorySyncController {
    /// `location` is the path the page was loaded at, `page_title` the title
    /// restored when the gallery closes.
    pub fn new(location: &str, page_title: &str) -> Self {
        Self {
            base_path: route::derive_state_from_location(location).base_path,
            page_title: page_title.to_string(),
            gallery_open: false,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn is_gallery_open(&self) -> bool {
        self.gallery_open
    }

    /// Re-derives the base path after the page was loaded at a new location.
    pub fn reload(&mut self, location: &str) {
        self.base_path = route::derive_state_from_location(location).base_path;
    }

    pub fn apply_state_to_gallery(&self, state: &NavigationState, gallery: &mut dyn Gallery) {
        match state.current_index {
            Some(number) => {
                tracing::debug!(number, "showing photo from location");
                gallery.open();
                gallery.go_to(number - 1);
            }
            None => gallery.close(),
        }
    }

    pub fn on_pop_state(&self, event: &PopStateEvent, location: &str, gallery: &mut dyn Gallery) {
        if event.state.is_none() {
            return;
        }
        let state = route::derive_state_from_location(location);
        self.apply_state_to_gallery(&state, gallery);
    }

    pub fn on_gallery_index_changed(&self, index: usize, history: &mut dyn History) {
        let number = index + 1;
        let url = route::photo_path(&self.base_path, number);
        push_unless_current(history, &route::photo_title(number), &url);
    }

    pub fn on_gallery_closed(&mut self, history: &mut dyn History) {
        self.gallery_open = false;
        let url = self.base_path.clone();
        push_unless_current(history, &self.page_title, &url);
    }

    pub fn on_gallery_opened(&mut self) {
        self.gallery_open = true;
    }

    /// Applies the address bar once the album is loaded; opens deep links.
    pub fn initialize_from_current_location(&self, location: &str, gallery: &mut dyn Gallery) {
        tracing::info!(location, base = %self.base_path, "initializing gallery from location");
        let state = route::derive_state_from_location(location);
        self.apply_state_to_gallery(&state, gallery);
    }

    /// Routes one gallery callback to its handler.
    pub fn dispatch(&mut self, event: GalleryEvent, history: &mut dyn History) {
        match event {
            GalleryEvent::Changed(index) => self.on_gallery_index_changed(index, history),
            GalleryEvent::Opened => self.on_gallery_opened(),
            GalleryEvent::Closed => self.on_gallery_closed(history),
        }
    }
}

/// Skips the push when the address bar already shows `url`. Callbacks fired
/// while applying a traversal always land here.
fn push_unless_current(history: &mut dyn History, title: &str, url: &str) {
    if history.location() == url {
        return;
    }
    history.push_state(PUSHED_STATE, title, url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::GalleryCursor;
    use crate::history::HistoryStack;

    fn pump(sync: &mut HistorySyncController, gallery: &mut GalleryCursor, history: &mut HistoryStack) {
        for event in gallery.take_events() {
            sync.dispatch(event, history);
        }
    }

    #[derive(Default)]
    struct RecordingGallery {
        calls: Vec<String>,
        open: bool,
        index: usize,
    }

    impl Gallery for RecordingGallery {
        fn open(&mut self) {
            self.calls.push("open".into());
            self.open = true;
        }
        fn go_to(&mut self, index: usize) {
            self.calls.push(format!("goTo {}", index));
            self.index = index;
        }
        fn close(&mut self) {
            self.calls.push("close".into());
            self.open = false;
        }
        fn is_open(&self) -> bool {
            self.open
        }
        fn current_index(&self) -> usize {
            self.index
        }
        fn len(&self) -> usize {
            10
        }
    }

    #[test]
    fn deep_link_opens_at_zero_based_index() {
        let sync = HistorySyncController::new("/gallery/photo/3", "Album");
        assert_eq!(sync.base_path(), "/gallery/");

        let mut gallery = RecordingGallery::default();
        sync.initialize_from_current_location("/gallery/photo/3", &mut gallery);
        assert_eq!(gallery.calls, vec!["open", "goTo 2"]);
    }

    #[test]
    fn plain_location_closes_the_gallery() {
        let sync = HistorySyncController::new("/gallery/", "Album");
        let mut gallery = RecordingGallery::default();
        sync.initialize_from_current_location("/gallery/", &mut gallery);
        assert_eq!(gallery.calls, vec!["close"]);
    }

    #[test]
    fn stateless_popstate_is_ignored() {
        let sync = HistorySyncController::new("/gallery/", "Album");
        let mut gallery = RecordingGallery::default();
        sync.on_pop_state(&PopStateEvent { state: None }, "/gallery/photo/4", &mut gallery);
        assert!(gallery.calls.is_empty());
    }

    #[test]
    fn applying_the_same_state_twice_is_idempotent() {
        let sync = HistorySyncController::new("/gallery/", "Album");
        let state = route::derive_state_from_location("/gallery/photo/4");
        let mut gallery = GalleryCursor::new(6);

        sync.apply_state_to_gallery(&state, &mut gallery);
        let first = (gallery.is_open(), gallery.current_index());
        gallery.take_events();

        sync.apply_state_to_gallery(&state, &mut gallery);
        assert_eq!((gallery.is_open(), gallery.current_index()), first);
        assert_eq!(first, (true, 3));
        assert!(gallery.take_events().is_empty());
    }

    #[test]
    fn index_change_pushes_photo_entry_without_popstate() {
        let mut history = HistoryStack::new("/gallery/photo/2", "Photo 2");
        let sync = HistorySyncController::new(history.location(), "Album");

        sync.on_gallery_index_changed(4, &mut history);

        let entry = history.current();
        assert_eq!(entry.url, "/gallery/photo/5");
        assert_eq!(entry.title, "Photo 5");
        assert_eq!(entry.state.as_deref(), Some(PUSHED_STATE));
        assert!(!history.can_go_forward());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn closing_restores_base_path_and_page_title() {
        let mut history = HistoryStack::new("/gallery/", "Album");
        let mut sync = HistorySyncController::new(history.location(), "Album");
        let mut gallery = GalleryCursor::new(5);

        gallery.open_at(1);
        pump(&mut sync, &mut gallery, &mut history);
        assert!(sync.is_gallery_open());
        assert_eq!(history.location(), "/gallery/photo/2");

        gallery.close();
        pump(&mut sync, &mut gallery, &mut history);
        assert!(!sync.is_gallery_open());
        assert_eq!(history.location(), "/gallery/");
        assert_eq!(history.title(), "Album");
        assert_eq!(history.current().state.as_deref(), Some(PUSHED_STATE));
    }

    #[test]
    fn back_and_forward_drive_the_gallery_without_new_entries() {
        let mut history = HistoryStack::new("/gallery/", "Album");
        let mut sync = HistorySyncController::new(history.location(), "Album");
        let mut gallery = GalleryCursor::new(5);
        sync.initialize_from_current_location(history.location(), &mut gallery);

        gallery.open_at(0);
        pump(&mut sync, &mut gallery, &mut history);
        gallery.next();
        pump(&mut sync, &mut gallery, &mut history);
        gallery.close();
        pump(&mut sync, &mut gallery, &mut history);
        assert_eq!(history.len(), 4);

        // Back to photo 2 reopens the gallery there.
        let ev = history.back().expect("entry behind");
        sync.on_pop_state(&ev, history.location(), &mut gallery);
        pump(&mut sync, &mut gallery, &mut history);
        assert!(gallery.is_open());
        assert_eq!(gallery.current_index(), 1);
        assert!(sync.is_gallery_open());

        // Back to photo 1.
        let ev = history.back().expect("entry behind");
        sync.on_pop_state(&ev, history.location(), &mut gallery);
        pump(&mut sync, &mut gallery, &mut history);
        assert_eq!(gallery.current_index(), 0);

        // Back to the load entry: no state, gallery left as is.
        let ev = history.back().expect("load entry");
        sync.on_pop_state(&ev, history.location(), &mut gallery);
        assert!(gallery.is_open());

        // Forward all the way to the closed entry.
        for _ in 0..3 {
            let ev = history.forward().expect("entry ahead");
            sync.on_pop_state(&ev, history.location(), &mut gallery);
            pump(&mut sync, &mut gallery, &mut history);
        }
        assert!(!gallery.is_open());
        assert!(!sync.is_gallery_open());
        assert_eq!(history.location(), "/gallery/");
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn deep_link_past_the_end_is_corrected_in_history() {
        let mut history = HistoryStack::new("/gallery/photo/7", "Album");
        let mut sync = HistorySyncController::new(history.location(), "Album");
        let mut gallery = GalleryCursor::new(5);

        sync.initialize_from_current_location(history.location(), &mut gallery);
        pump(&mut sync, &mut gallery, &mut history);

        assert_eq!(gallery.current_index(), 1);
        assert_eq!(history.location(), "/gallery/photo/2");
    }

    #[test]
    fn deep_link_does_not_duplicate_the_loaded_entry() {
        let mut history = HistoryStack::new("/gallery/photo/3", "Album");
        let mut sync = HistorySyncController::new(history.location(), "Album");
        let mut gallery = GalleryCursor::new(5);

        sync.initialize_from_current_location(history.location(), &mut gallery);
        pump(&mut sync, &mut gallery, &mut history);

        assert!(gallery.is_open());
        assert_eq!(gallery.current_index(), 2);
        assert_eq!(history.len(), 1);
    }
}
