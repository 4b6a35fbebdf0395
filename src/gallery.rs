use crate::manifest::GalleryItem;
use thiserror::Error;

/// User-visible copy for the two non-grid outcomes, shown inline in place of
/// the grid.
pub const NO_IMAGES_MESSAGE: &str = "No images found. Add photos to the /photos folder.";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading gallery. Please ensure gallery.json exists.";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Host capability standing in for the manifest fetch. Implementations must
/// bypass any HTTP cache (a regenerated manifest has to be observed on
/// reload) and report any non-success status as [`FetchError::Status`].
pub trait ManifestSource {
    fn fetch(&self) -> Result<Vec<GalleryItem>, FetchError>;
}

/// Host capability standing in for image loading. `request` begins an async
/// load; completion is reported back as [`GalleryEvent::ImageLoaded`].
/// Requesting an already-cached source is a cheap no-op on the host side,
/// which is what makes neighbor preloading effective.
pub trait ImageLoader {
    fn request(&mut self, src: &str);
}

/// Host capability standing in for viewport-proximity observation: arrange
/// for [`GalleryEvent::VisibilityEntered`] to fire once `cell` scrolls
/// within `margin_px` of the viewport, then detach.
pub trait VisibilityWatcher {
    fn notify_on_enter(&mut self, cell: usize, margin_px: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
}

/// The complete input set of the viewer. Hosts translate platform events
/// into these and dispatch them synchronously to the renderer and the
/// lightbox controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    CellClicked(usize),
    VisibilityEntered(usize),
    ImageLoaded {
        index: usize,
        width: u32,
        height: u32,
    },
    KeyPressed(Key),
    /// Raw horizontal gesture endpoints; classification happens in the
    /// lightbox controller.
    SwipeDetected {
        start_x: f64,
        end_x: f64,
    },
    NextClicked,
    PrevClicked,
    CloseClicked,
    /// Click on the overlay background, not on the image itself.
    BackdropClicked,
}

/// Space reservation for one grid cell, as a height fraction of the cell
/// width (`h / w`). Unknown dimensions reserve a square that is corrected
/// once the real image reports its natural size, so the final layout always
/// converges to the true ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectBox {
    pub height_fraction: f64,
    pub known: bool,
}

impl AspectBox {
    pub fn square() -> Self {
        Self {
            height_fraction: 1.0,
            known: false,
        }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::square();
        }
        Self {
            height_fraction: f64::from(height) / f64::from(width),
            known: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPhase {
    Loading,
    Loaded,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub src: String,
    pub alt: String,
    pub aspect: AspectBox,
    pub phase: CellPhase,
    requested: bool,
}

impl Cell {
    fn new(index: usize, item: &GalleryItem) -> Self {
        let alt = if item.alt.is_empty() {
            format!("Image {}", index + 1)
        } else {
            item.alt.clone()
        };
        let aspect = match (item.w, item.h) {
            (Some(w), Some(h)) => AspectBox::from_dimensions(w, h),
            _ => AspectBox::square(),
        };
        Self {
            src: item.src.clone(),
            alt,
            aspect,
            phase: CellPhase::Loading,
            requested: false,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src
            && self.alt == other.alt
            && self.aspect == other.aspect
            && self.phase == other.phase
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryView {
    Loading,
    Failed(&'static str),
    Empty(&'static str),
    Grid(Vec<Cell>),
}

#[derive(Debug, Clone, Copy)]
pub struct GalleryOptions {
    /// Cells at the top of the manifest that load immediately.
    pub eager_count: usize,
    /// Viewport proximity, in pixels, at which deferred cells start loading.
    pub lazy_margin_px: u32,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            eager_count: 6,
            lazy_margin_px: 50,
        }
    }
}

impl From<&crate::config::ViewerConfig> for GalleryOptions {
    fn from(viewer: &crate::config::ViewerConfig) -> Self {
        Self {
            eager_count: viewer.eager_count,
            lazy_margin_px: viewer.lazy_margin_px,
        }
    }
}

/// Builds and maintains the grid over a fetched manifest. Owns no lightbox
/// state: cell clicks surface as open requests carrying the manifest index,
/// which shares the lightbox's index space.
#[derive(Debug)]
pub struct GalleryRenderer {
    options: GalleryOptions,
    items: Vec<GalleryItem>,
    view: GalleryView,
}

impl GalleryRenderer {
    pub fn new(options: GalleryOptions) -> Self {
        Self {
            options,
            items: Vec::new(),
            view: GalleryView::Loading,
        }
    }

    /// Fetches the manifest and builds the grid, kicking off eager loads and
    /// visibility watches. Fetch failures and empty manifests become
    /// user-visible view states; nothing propagates past this boundary.
    pub fn load(
        &mut self,
        source: &dyn ManifestSource,
        images: &mut dyn ImageLoader,
        watcher: &mut dyn VisibilityWatcher,
    ) {
        let items = match source.fetch() {
            Ok(items) => items,
            Err(err) => {
                eprintln!("[gallery] manifest load failed: {}", err);
                self.items.clear();
                self.view = GalleryView::Failed(LOAD_ERROR_MESSAGE);
                return;
            }
        };
        if items.is_empty() {
            self.items = items;
            self.view = GalleryView::Empty(NO_IMAGES_MESSAGE);
            return;
        }

        let mut cells: Vec<Cell> = items
            .iter()
            .enumerate()
            .map(|(index, item)| Cell::new(index, item))
            .collect();
        for (index, cell) in cells.iter_mut().enumerate() {
            if index < self.options.eager_count {
                images.request(&cell.src);
                cell.requested = true;
            } else {
                watcher.notify_on_enter(index, self.options.lazy_margin_px);
            }
        }
        self.items = items;
        self.view = GalleryView::Grid(cells);
    }

    /// Dispatches one event against the grid. Returns the manifest index to
    /// open in the lightbox when the event was a click on a live cell.
    pub fn handle(&mut self, event: &GalleryEvent, images: &mut dyn ImageLoader) -> Option<usize> {
        let cells = match &mut self.view {
            GalleryView::Grid(cells) => cells,
            _ => return None,
        };
        match *event {
            GalleryEvent::CellClicked(index) if index < cells.len() => Some(index),
            GalleryEvent::VisibilityEntered(index) => {
                if let Some(cell) = cells.get_mut(index) {
                    if !cell.requested {
                        cell.requested = true;
                        images.request(&cell.src);
                    }
                }
                None
            }
            GalleryEvent::ImageLoaded {
                index,
                width,
                height,
            } => {
                if let Some(cell) = cells.get_mut(index) {
                    cell.phase = CellPhase::Loaded;
                    if !cell.aspect.known {
                        cell.aspect = AspectBox::from_dimensions(width, height);
                    }
                }
                None
            }
            _ => None,
        }
    }

    pub fn view(&self) -> &GalleryView {
        &self.view
    }

    /// The loaded manifest, immutable after `load`. The lightbox controller
    /// is constructed over a clone of this.
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub struct StaticSource(pub Vec<GalleryItem>);

    impl ManifestSource for StaticSource {
        fn fetch(&self) -> Result<Vec<GalleryItem>, FetchError> {
            Ok(self.0.clone())
        }
    }

    pub struct FailingSource(pub u16);

    impl ManifestSource for FailingSource {
        fn fetch(&self) -> Result<Vec<GalleryItem>, FetchError> {
            Err(FetchError::Status(self.0))
        }
    }

    #[derive(Default)]
    pub struct RecordingLoader {
        pub requests: Vec<String>,
    }

    impl ImageLoader for RecordingLoader {
        fn request(&mut self, src: &str) {
            self.requests.push(src.to_string());
        }
    }

    #[derive(Default)]
    pub struct RecordingWatcher {
        pub watches: Vec<(usize, u32)>,
    }

    impl VisibilityWatcher for RecordingWatcher {
        fn notify_on_enter(&mut self, cell: usize, margin_px: u32) {
            self.watches.push((cell, margin_px));
        }
    }

    pub fn item(src: &str, dims: Option<(u32, u32)>) -> GalleryItem {
        GalleryItem {
            src: src.to_string(),
            w: dims.map(|(w, _)| w),
            h: dims.map(|(_, h)| h),
            alt: src.trim_end_matches(".jpg").to_string(),
        }
    }
}
