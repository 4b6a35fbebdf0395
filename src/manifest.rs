use crate::extractor;
use crate::scanner;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;

/// One manifest entry, exactly as serialized to `gallery.json`. `w` and `h`
/// are both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub src: String,
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub alt: String,
}

/// A manifest entry plus its sort keys. The keys order the manifest and are
/// then discarded; they never reach the serialized output.
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub item: GalleryItem,
    pub mtime: SystemTime,
    pub filename: String,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scans `photos_dir`, extracts every discovered file, and returns the
/// ordered manifest. Zero discovered images or all-failed extraction is an
/// empty manifest, not an error.
pub fn build(
    root: &Path,
    photos_dir: &Path,
    jpeg_quality: u8,
) -> Result<Vec<GalleryItem>, ManifestError> {
    println!("[scan] scanning {}", photos_dir.display());
    let files = scanner::scan(photos_dir)?;
    if files.is_empty() {
        eprintln!("[scan] no images found");
        return Ok(Vec::new());
    }
    println!("[scan] found {} images, processing", files.len());

    let mut pending: Vec<PendingItem> = files
        .par_iter()
        .filter_map(|path| extractor::extract(root, path, jpeg_quality))
        .collect();
    if pending.is_empty() {
        eprintln!("[manifest] every image failed extraction");
    }

    sort_newest_first(&mut pending);
    Ok(pending.into_iter().map(|pending| pending.item).collect())
}

/// Newest first: modification time descending, filename descending to break
/// ties. Deterministic for a fixed directory state regardless of extraction
/// order.
pub fn sort_newest_first(items: &mut [PendingItem]) {
    items.sort_by(|a, b| {
        b.mtime
            .cmp(&a.mtime)
            .then_with(|| b.filename.cmp(&a.filename))
    });
}

/// Serializes the manifest and atomically replaces `path`: the JSON lands in
/// a temp file in the same directory, then a rename swaps it in, so readers
/// never observe a truncated manifest.
pub fn write(items: &[GalleryItem], path: &Path) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(items)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gallery.json".into());
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name));
    fs::write(&tmp_path, json.as_bytes())?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
