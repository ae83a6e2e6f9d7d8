//! The upload directory: a flat folder of shared files.
//!
//! Every path handed to the filesystem is produced by
//! [`UploadDir::contained_path`], which is the single place that decides
//! whether a client-supplied name stays inside the directory.

mod error;
mod size;

pub use error::{StorageError, StorageResult};
pub use size::human_readable_size;

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Folder name used when no upload directory is configured.
pub const DEFAULT_FOLDER: &str = "uploads";

/// A file stored in the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl StoredFile {
    /// Size formatted for display.
    pub fn human_size(&self) -> String {
        human_readable_size(self.size)
    }

    /// Modification time formatted for display.
    pub fn modified_display(&self) -> String {
        self.modified.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Handle to the upload directory.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Open the upload directory, creating it if needed.
    ///
    /// The stored root is canonical so containment checks compare like with like.
    pub fn create(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))?;
        let root = path.canonicalize().map_err(|e| StorageError::io(path, e))?;
        Ok(Self { root })
    }

    /// Absolute path of the directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied relative path inside the directory.
    ///
    /// Rejects absolute paths and `..` components outright. If the target
    /// already exists it is canonicalized, so a symlink pointing outside the
    /// directory is rejected too. The target does not have to exist.
    pub fn contained_path(&self, relative: &str) -> StorageResult<PathBuf> {
        let rel = Path::new(relative);
        let mut has_normal = false;
        for component in rel.components() {
            match component {
                Component::Normal(_) => has_normal = true,
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::path_escape(relative));
                }
            }
        }
        if !has_normal {
            return Err(StorageError::invalid_filename(relative));
        }

        let joined = self.root.join(rel);
        match joined.canonicalize() {
            Ok(resolved) if resolved.starts_with(&self.root) => Ok(resolved),
            Ok(_) => Err(StorageError::path_escape(relative)),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(StorageError::io(joined, e)),
            // A dangling symlink would let a write land wherever it points
            Err(_) if joined.symlink_metadata().is_ok() => Err(StorageError::path_escape(relative)),
            Err(_) => Ok(joined),
        }
    }

    /// Path an upload named `client_name` should be written to.
    ///
    /// Only the base name of `client_name` is kept.
    pub fn upload_path(&self, client_name: &str) -> StorageResult<(String, PathBuf)> {
        let name = sanitize_filename(client_name)?;
        let path = self.contained_path(&name)?;
        Ok((name, path))
    }

    /// Path of an existing regular file, for downloading.
    pub fn existing_file(&self, name: &str) -> StorageResult<PathBuf> {
        let path = self.contained_path(name)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(path),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(StorageError::io(path, e)),
            // Missing, or a path through a regular file
            _ => Err(StorageError::not_found(name)),
        }
    }

    /// List stored files, newest first.
    ///
    /// Hidden files and anything that is not a regular file are skipped. So
    /// are names that are not valid UTF-8 and entries that vanish before they
    /// can be stat'ed.
    pub fn list_files(&self) -> StorageResult<Vec<StoredFile>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, e))?;

        let mut files: Vec<StoredFile> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                // Not reachable through a download URL, so not listed
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(raw) => {
                        tracing::debug!(name = ?raw, "Skipping non-UTF-8 file name");
                        return None;
                    }
                };
                if name.starts_with('.') {
                    return None;
                }
                // Raced with a delete, or unreadable: skip
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some(StoredFile {
                    name,
                    size: meta.len(),
                    modified: DateTime::<Local>::from(modified),
                })
            })
            .collect();

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }
}

/// Reduce a client-supplied filename to its base name.
///
/// Both `/` and `\` count as separators since browsers on Windows may send
/// full paths.
pub fn sanitize_filename(client_name: &str) -> StorageResult<String> {
    let base = client_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." {
        return Err(StorageError::invalid_filename(client_name));
    }
    Ok(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, UploadDir) {
        let temp = TempDir::new().unwrap();
        let dir = UploadDir::create(temp.path().join("uploads")).unwrap();
        (temp, dir)
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
            .unwrap();
    }

    #[test]
    fn test_create_makes_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("uploads");
        let dir = UploadDir::create(&path).unwrap();
        assert!(dir.root().is_dir());
        assert!(dir.root().is_absolute());
    }

    #[test]
    fn test_sanitize_keeps_base_name() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("../../evil.txt").unwrap(), "evil.txt");
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\photo.jpg").unwrap(),
            "photo.jpg"
        );
        assert_eq!(sanitize_filename("/etc/passwd").unwrap(), "passwd");
    }

    #[test]
    fn test_sanitize_rejects_empty_base() {
        assert!(matches!(
            sanitize_filename(""),
            Err(StorageError::InvalidFilename { .. })
        ));
        assert!(sanitize_filename("dir/").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("a/.").is_err());
    }

    #[test]
    fn test_contained_path_rejects_parent_dir() {
        let (_temp, dir) = setup();
        assert!(matches!(
            dir.contained_path("../secret.txt"),
            Err(StorageError::PathEscape { .. })
        ));
        assert!(matches!(
            dir.contained_path("a/../../secret.txt"),
            Err(StorageError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_contained_path_rejects_absolute() {
        let (_temp, dir) = setup();
        assert!(matches!(
            dir.contained_path("/etc/passwd"),
            Err(StorageError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_contained_path_allows_missing_file() {
        let (_temp, dir) = setup();
        let path = dir.contained_path("new.txt").unwrap();
        assert_eq!(path, dir.root().join("new.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_contained_path_rejects_symlink_escape() {
        let (temp, dir) = setup();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, b"secret").unwrap();
        std::os::unix::fs::symlink(&outside, dir.root().join("link.txt")).unwrap();

        assert!(matches!(
            dir.contained_path("link.txt"),
            Err(StorageError::PathEscape { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_contained_path_rejects_dangling_symlink() {
        let (temp, dir) = setup();
        let target = temp.path().join("not-yet-created.txt");
        std::os::unix::fs::symlink(&target, dir.root().join("trap.txt")).unwrap();

        assert!(matches!(
            dir.upload_path("trap.txt"),
            Err(StorageError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_upload_path_strips_directories() {
        let (_temp, dir) = setup();
        let (name, path) = dir.upload_path("../../evil.txt").unwrap();
        assert_eq!(name, "evil.txt");
        assert_eq!(path, dir.root().join("evil.txt"));
        assert!(path.starts_with(dir.root()));
    }

    #[test]
    fn test_existing_file_not_found() {
        let (_temp, dir) = setup();
        assert!(matches!(
            dir.existing_file("doesnotexist.txt"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_existing_file_through_regular_file_is_not_found() {
        let (_temp, dir) = setup();
        fs::write(dir.root().join("plain.txt"), b"x").unwrap();
        assert!(matches!(
            dir.existing_file("plain.txt/inner"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_existing_file_rejects_directory() {
        let (_temp, dir) = setup();
        fs::create_dir(dir.root().join("sub")).unwrap();
        assert!(matches!(
            dir.existing_file("sub"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_files_sorted_newest_first() {
        let (_temp, dir) = setup();
        for (name, age) in [("old.txt", 300), ("newest.txt", 10), ("middle.txt", 100)] {
            let path = dir.root().join(name);
            fs::write(&path, name).unwrap();
            set_mtime(&path, age);
        }

        let names: Vec<_> = dir
            .list_files()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["newest.txt", "middle.txt", "old.txt"]);
    }

    #[test]
    fn test_list_files_skips_hidden_and_directories() {
        let (_temp, dir) = setup();
        fs::write(dir.root().join(".DS_Store"), b"x").unwrap();
        fs::write(dir.root().join("visible.txt"), b"hello").unwrap();
        fs::create_dir(dir.root().join("folder")).unwrap();

        let files = dir.list_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "visible.txt");
        assert_eq!(files[0].size, 5);
        assert_eq!(files[0].human_size(), "5.0 B");
    }

    #[cfg(unix)]
    #[test]
    fn test_list_files_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp, dir) = setup();
        let raw = OsStr::from_bytes(b"bad\xff.txt");
        // Some filesystems refuse such names outright
        if fs::write(dir.root().join(raw), b"x").is_err() {
            return;
        }
        fs::write(dir.root().join("good.txt"), b"y").unwrap();

        let names: Vec<_> = dir
            .list_files()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["good.txt"]);
    }

    #[test]
    fn test_list_files_empty() {
        let (_temp, dir) = setup();
        assert!(dir.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_modified_display_format() {
        let file = StoredFile {
            name: "a".to_string(),
            size: 0,
            modified: Local::now(),
        };
        let shown = file.modified_display();
        // YYYY-MM-DD HH:MM
        assert_eq!(shown.len(), 16);
        assert_eq!(&shown[4..5], "-");
        assert_eq!(&shown[10..11], " ");
    }
}
