//! Static photo-gallery toolkit.
//!
//! Two halves share one wire contract (`gallery.json`): a batch generator
//! that scans a photo tree, converts raw-camera files, and emits the ordered
//! manifest; and a platform-agnostic viewer model (masonry grid + lightbox)
//! that a host shell drives through small capability traits.

pub mod config;
pub mod convert;
pub mod extractor;
pub mod gallery;
pub mod lightbox;
pub mod manifest;
pub mod scanner;
