use crate::gallery::{GalleryEvent, ImageLoader, Key};
use crate::manifest::GalleryItem;

/// Page-session viewer state. Owned exclusively by the controller; the grid
/// renderer only raises open requests into it.
#[derive(Debug, Clone)]
pub struct GalleryState {
    pub items: Vec<GalleryItem>,
    /// Only meaningful while `is_open`.
    pub current_index: usize,
    pub is_open: bool,
}

/// What the host shows in the overlay for the current index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxDisplay {
    pub src: String,
    pub alt: String,
    /// 1-based position over the total, e.g. `"3 / 8"`.
    pub counter: String,
}

/// Full-viewport overlay state machine: `Closed` or `Open(index)` with
/// wraparound navigation over the manifest order. Every entry into the open
/// state refreshes the display and preloads both neighbors so navigation
/// feels instantaneous.
#[derive(Debug)]
pub struct LightboxController {
    state: GalleryState,
    swipe_threshold: f64,
    scroll_locked: bool,
    overlay_visible: bool,
    display: Option<LightboxDisplay>,
}

impl LightboxController {
    pub fn new(items: Vec<GalleryItem>, swipe_threshold: f64) -> Self {
        Self {
            state: GalleryState {
                items,
                current_index: 0,
                is_open: false,
            },
            swipe_threshold,
            scroll_locked: false,
            overlay_visible: false,
            display: None,
        }
    }

    /// Opens at `index`. Ignored for an empty manifest (no cells exist to
    /// click) and for out-of-range indices.
    pub fn open(&mut self, index: usize, images: &mut dyn ImageLoader) {
        if index >= self.state.items.len() {
            return;
        }
        self.state.current_index = index;
        self.state.is_open = true;
        self.scroll_locked = true;
        self.overlay_visible = true;
        self.show(images);
    }

    pub fn close(&mut self) {
        self.state.is_open = false;
        self.scroll_locked = false;
        self.overlay_visible = false;
        self.display = None;
    }

    pub fn next(&mut self, images: &mut dyn ImageLoader) {
        if !self.state.is_open {
            return;
        }
        self.state.current_index = (self.state.current_index + 1) % self.state.items.len();
        self.show(images);
    }

    pub fn prev(&mut self, images: &mut dyn ImageLoader) {
        if !self.state.is_open {
            return;
        }
        let len = self.state.items.len();
        self.state.current_index = (self.state.current_index + len - 1) % len;
        self.show(images);
    }

    /// Dispatches one event. Input other than a cell click is ignored while
    /// closed.
    pub fn handle(&mut self, event: &GalleryEvent, images: &mut dyn ImageLoader) {
        match *event {
            GalleryEvent::CellClicked(index) => self.open(index, images),
            _ if !self.state.is_open => {}
            GalleryEvent::KeyPressed(Key::Escape) => self.close(),
            GalleryEvent::KeyPressed(Key::ArrowRight) => self.next(images),
            GalleryEvent::KeyPressed(Key::ArrowLeft) => self.prev(images),
            GalleryEvent::SwipeDetected { start_x, end_x } => {
                let delta = start_x - end_x;
                if delta.abs() > self.swipe_threshold {
                    if delta > 0.0 {
                        // Leftward swipe advances.
                        self.next(images);
                    } else {
                        self.prev(images);
                    }
                }
            }
            GalleryEvent::NextClicked => self.next(images),
            GalleryEvent::PrevClicked => self.prev(images),
            GalleryEvent::CloseClicked | GalleryEvent::BackdropClicked => self.close(),
            _ => {}
        }
    }

    fn show(&mut self, images: &mut dyn ImageLoader) {
        let index = self.state.current_index;
        let total = self.state.items.len();
        let item = &self.state.items[index];
        let alt = if item.alt.is_empty() {
            format!("Image {}", index + 1)
        } else {
            item.alt.clone()
        };
        self.display = Some(LightboxDisplay {
            src: item.src.clone(),
            alt,
            counter: format!("{} / {}", index + 1, total),
        });

        // Warm both neighbors so the next transition displays from cache.
        images.request(&self.state.items[(index + 1) % total].src);
        images.request(&self.state.items[(index + total - 1) % total].src);
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn display(&self) -> Option<&LightboxDisplay> {
        self.display.as_ref()
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Whether the overlay is exposed to assistive technology (the inverse
    /// of `aria-hidden`).
    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }
}
