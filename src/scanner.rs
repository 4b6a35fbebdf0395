use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the scanner recognizes, lowercase. `cr2` is the raw-camera
/// format; it is converted to a JPEG sibling before reaching the manifest.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif", "cr2"];

pub const RAW_EXTENSION: &str = "cr2";

pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_recognized(path: &Path) -> bool {
    match lowercase_extension(path) {
        Some(ext) => RECOGNIZED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Recursively collects recognized image files under `root`. A missing root
/// is not an error: it yields an empty list after a warning. Walk failures
/// (unreadable directories and the like) propagate to the caller.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    if !root.is_dir() {
        eprintln!("[scan] photos directory not found: {}", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && is_recognized(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_root_yields_empty() {
        let tmp = TempDir::new().unwrap();
        let files = scan(&tmp.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn finds_recognized_files_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("top.jpg"), "x").unwrap();
        fs::write(tmp.path().join("a/mid.PNG"), "x").unwrap();
        fs::write(nested.join("deep.cr2"), "x").unwrap();
        fs::write(nested.join("notes.txt"), "x").unwrap();
        fs::write(nested.join("noext"), "x").unwrap();

        let mut files = scan(tmp.path()).unwrap();
        files.sort();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["deep.cr2", "mid.PNG", "top.jpg"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_recognized(Path::new("photo.JPEG")));
        assert!(is_recognized(Path::new("photo.Cr2")));
        assert!(!is_recognized(Path::new("photo.tiff")));
        assert!(!is_recognized(Path::new("photo")));
    }
}
