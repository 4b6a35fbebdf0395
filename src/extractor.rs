use crate::convert;
use crate::manifest::{GalleryItem, PendingItem};
use crate::scanner;
use std::fs;
use std::path::{Component, Path};

/// Builds the manifest entry for one discovered file, converting raw-camera
/// files to a JPEG sibling first. Every per-file failure is logged and
/// absorbed as `None` so one bad file never aborts the batch.
pub fn extract(root: &Path, path: &Path, jpeg_quality: u8) -> Option<PendingItem> {
    let ext = scanner::lowercase_extension(path).unwrap_or_default();

    let display_path = if ext == scanner::RAW_EXTENSION {
        match convert::ensure_jpeg_sibling(path, jpeg_quality) {
            Ok(jpeg_path) => jpeg_path,
            Err(err) => {
                eprintln!("[convert] skipping {}: {}", path.display(), err);
                return None;
            }
        }
    } else {
        path.to_path_buf()
    };

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            eprintln!("[scan] skipping {}: {}", path.display(), err);
            return None;
        }
    };
    let mtime = match metadata.modified() {
        Ok(mtime) => mtime,
        Err(err) => {
            eprintln!("[scan] skipping {}: {}", path.display(), err);
            return None;
        }
    };

    // Dimension probing is best-effort: the viewer falls back to a square
    // placeholder and corrects itself once the real image loads.
    let dimensions = match image::image_dimensions(&display_path) {
        Ok(dims) => Some(dims),
        Err(err) => {
            eprintln!(
                "[scan] no dimensions for {}: {}",
                display_path.display(),
                err
            );
            None
        }
    };

    let alt = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Some(PendingItem {
        item: GalleryItem {
            src: relative_src(root, &display_path),
            w: dimensions.map(|(w, _)| w),
            h: dimensions.map(|(_, h)| h),
            alt,
        },
        mtime,
        filename,
    })
}

/// Path relative to the serving root, forward slashes on every platform.
pub fn relative_src(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
pub(crate) fn unix_mtime(item: &PendingItem) -> u64 {
    item.mtime
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn extracts_dimensions_and_label() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photos/trips/sunset.png");
        write_png(&path, 4, 2);

        let pending = extract(tmp.path(), &path, 92).unwrap();
        assert_eq!(pending.item.src, "photos/trips/sunset.png");
        assert_eq!(pending.item.alt, "sunset");
        assert_eq!(pending.item.w, Some(4));
        assert_eq!(pending.item.h, Some(2));
        assert_eq!(pending.filename, "sunset.png");
        assert!(unix_mtime(&pending) > 0);
    }

    #[test]
    fn unreadable_image_still_yields_item_without_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        fs::write(&path, "definitely not a jpeg").unwrap();

        let pending = extract(tmp.path(), &path, 92).unwrap();
        assert_eq!(pending.item.src, "broken.jpg");
        assert_eq!(pending.item.w, None);
        assert_eq!(pending.item.h, None);
    }

    #[test]
    fn raw_file_with_sibling_points_at_the_jpeg() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("shot.cr2");
        fs::write(&raw, "raw bytes").unwrap();
        write_png(&tmp.path().join("shot.jpg"), 6, 3);

        let pending = extract(tmp.path(), &raw, 92).unwrap();
        assert_eq!(pending.item.src, "shot.jpg");
        // Sort key and label still come from the original file.
        assert_eq!(pending.filename, "shot.cr2");
        assert_eq!(pending.item.alt, "shot");
        assert_eq!(pending.item.w, Some(6));
        assert_eq!(pending.item.h, Some(3));
    }

    #[test]
    fn unconvertible_raw_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("shot.cr2");
        fs::write(&raw, "raw bytes").unwrap();

        assert!(extract(tmp.path(), &raw, 92).is_none());
    }

    #[test]
    fn missing_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        assert!(extract(tmp.path(), &tmp.path().join("gone.jpg"), 92).is_none());
    }
}
