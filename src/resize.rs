use std::time::{Duration, Instant};

/// Delay between the last width change of a burst and the relayout.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
/// Options passed to every collage layout pass.
pub struct LayoutParams {
    pub target_row_height: f32,
    pub allow_partial_last_row: bool,
    pub fade_speed_ms: u64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            target_row_height: 290.0,
            allow_partial_last_row: true,
            fade_speed_ms: 200,
        }
    }
}

/// Container that arranges the album thumbnails.
pub trait CollageLayout {
    /// Recomputes the arrangement for the current container width. Safe to
    /// call repeatedly.
    fn layout(&mut self, params: LayoutParams);
    /// Makes every item transparent until the next layout.
    fn hide_items(&mut self);
}

/// Indicator shown while the album is loading.
pub trait LoadingIndicator {
    fn hide(&mut self);
}

/// Single-slot deadline. Scheduling replaces whatever was pending.
#[derive(Debug, Default)]
pub struct PendingTimer {
    deadline: Option<Instant>,
}

impl PendingTimer {
    pub fn schedule_after(&mut self, now: Instant, delay: Duration) {
        self.cancel_if_pending();
        self.deadline = Some(now + delay);
    }

    /// Returns `true` if a deadline was dropped.
    pub fn cancel_if_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the deadline once it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Relayouts the collage after genuine viewport width changes.
///
/// Height-only resizes (mobile toolbars showing and hiding while scrolling)
/// are ignored. A burst of width changes is coalesced into one relayout
/// `delay` after the last change; the items stay hidden until then.
#[derive(Debug)]
pub struct ResizeLayoutController {
    viewport_width: u32,
    delay: Duration,
    params: LayoutParams,
    timer: PendingTimer,
}

impl ResizeLayoutController {
    pub fn new(viewport_width: u32, delay: Duration, params: LayoutParams) -> Self {
        Self {
            viewport_width,
            delay,
            params,
            timer: PendingTimer::default(),
        }
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Returns `true` when the width change was accepted.
    pub fn on_resize(&mut self, new_width: u32, now: Instant, layout: &mut dyn CollageLayout) -> bool {
        if new_width == self.viewport_width {
            return false;
        }
        tracing::debug!(from = self.viewport_width, to = new_width, "viewport width changed");
        self.viewport_width = new_width;
        layout.hide_items();
        self.timer.schedule_after(now, self.delay);
        true
    }

    /// Runs the pending relayout if its deadline passed. Returns `true` if it ran.
    pub fn poll(&mut self, now: Instant, layout: &mut dyn CollageLayout) -> bool {
        if !self.timer.fire_if_due(now) {
            return false;
        }
        tracing::debug!(width = self.viewport_width, "debounced relayout");
        layout.layout(self.params);
        true
    }

    /// Time left before the pending relayout, if any.
    pub fn time_until_relayout(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    /// First layout once every image is loaded: no debounce. Hides the
    /// loading indicator and then runs `init`, which sets up the gallery.
    pub fn initial_layout(
        &mut self,
        layout: &mut dyn CollageLayout,
        spinner: &mut dyn LoadingIndicator,
        init: impl FnOnce(),
    ) {
        tracing::info!(width = self.viewport_width, "initial collage layout");
        layout.layout(self.params);
        spinner.hide();
        init();
    }
}
