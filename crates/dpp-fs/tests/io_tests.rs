//! Behavioural tests for the local filesystem collaborator

use dpp_fs::{Filesystem, LocalFs, NormalizedPath, write_atomic};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn root(temp: &TempDir) -> NormalizedPath {
    NormalizedPath::new(temp.path())
}

#[tokio::test]
async fn test_create_dir_all_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let dir = root(&temp).join("base/.dpp");
    let fs = LocalFs::new();

    assert!(!fs.is_dir(&dir).await);
    fs.create_dir_all(&dir).await.unwrap();
    fs.create_dir_all(&dir).await.unwrap();
    assert!(fs.is_dir(&dir).await);
}

#[tokio::test]
async fn test_is_dir_false_for_files() {
    let temp = TempDir::new().unwrap();
    let file = root(&temp).join("plain.txt");
    std::fs::write(file.to_native(), "x").unwrap();

    assert!(!LocalFs::new().is_dir(&file).await);
}

#[tokio::test]
async fn test_write_text_overwrites_whole_file() {
    let temp = TempDir::new().unwrap();
    let file = root(&temp).join("state_vim.vim");
    let fs = LocalFs::new();

    fs.write_text(&file, "first line\nsecond line").await.unwrap();
    fs.write_text(&file, "short").await.unwrap();

    assert_eq!(fs.read_text(&file).await.unwrap(), "short");
}

#[tokio::test]
async fn test_write_text_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let file = root(&temp).join("cache_vim.vim");

    LocalFs::new().write_text(&file, "[[],{}]").await.unwrap();

    let names: Vec<String> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cache_vim.vim".to_string()]);
}

#[tokio::test]
async fn test_read_missing_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let file = root(&temp).join("missing.vim");

    let err = LocalFs::new().read_text(&file).await.unwrap_err();
    assert!(err.to_string().contains("missing.vim"), "got: {}", err);
}

#[test]
fn test_write_atomic_creates_parent() {
    let temp = TempDir::new().unwrap();
    let file = root(&temp).join("nested/dir/file.vim");

    write_atomic(&file, b"let g:x = 1").unwrap();

    assert_eq!(
        std::fs::read_to_string(file.to_native()).unwrap(),
        "let g:x = 1"
    );
}
