//! Small filesystem helpers shared by the file-backed stores.

use std::io;
use std::path::Path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Prefix of transient files written before an atomic rename.
pub const TEMP_PREFIX: &str = ".tmp-";

/// Names starting with `.` are store-internal and never listed.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Write `bytes` to `path` so that readers see either the old file or the
/// complete new one, never a torn write.
///
/// The data goes to a hidden temporary file in the same directory, is synced,
/// and then renamed over `path`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    let tmp = dir.join(format!("{TEMP_PREFIX}{}", uuid::Uuid::now_v7()));

    let result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        // Best effort: the temp file is hidden from listings either way.
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

/// Sorted names of the visible entries in `dir`.
pub async fn list_visible(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(name) = entry.file_name().into_string() {
            if !is_hidden(&name) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        write_atomic(&dir.path().join("a"), b"1").await.unwrap();
        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(!entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX));
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn list_visible_skips_hidden_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a", ".hidden", ".tmp-123"] {
            fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        assert_eq!(list_visible(dir.path()).await.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden(".DS_Store"));
        assert!(!is_hidden("doc"));
    }
}
