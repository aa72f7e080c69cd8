use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One step of a directory walk.
#[derive(Debug)]
pub enum WalkEvent {
    Directory(PathBuf),
    Image(PathBuf),
    /// A file whose extension is not in the image list; never opened.
    Other(PathBuf),
    Error(walkdir::Error),
}

/// Lazily walk `root`, classifying each entry.
pub fn walk<'a>(root: &Path, extensions: &'a [String]) -> impl Iterator<Item = WalkEvent> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| match entry {
            Ok(entry) => {
                let is_dir = entry.file_type().is_dir();
                let path = entry.into_path();
                if is_dir {
                    WalkEvent::Directory(path)
                } else if is_image_path(&path, extensions) {
                    WalkEvent::Image(path)
                } else {
                    WalkEvent::Other(path)
                }
            }
            Err(e) => WalkEvent::Error(e),
        })
}

/// Make `root` absolute against the working directory without following
/// symlinks, dropping `.` components so stored paths stay clean.
pub fn absolute_root(root: &Path) -> io::Result<PathBuf> {
    Ok(std::path::absolute(root)?.components().collect())
}

/// Case-insensitive extension check.
pub fn is_image_path(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            extensions.iter().any(|e| e.to_lowercase() == ext_lower)
        }
        None => false,
    }
}

/// Basename of the directory holding `path`, empty at the filesystem root.
pub fn directory_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
