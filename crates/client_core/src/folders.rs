//! Lookup of per-order input folders by their number.

use std::path::{Path, PathBuf};

use shared::error::VectorizeError;
use tracing::debug;

pub const INPUT_IMAGE_NAME: &str = "input.png";

/// Folder prefix for a typed identifier; marketplace suffixes after `-` are ignored.
pub fn batch_prefix(identifier: &str) -> &str {
    let identifier = identifier.trim();
    identifier.split('-').next().unwrap_or(identifier)
}

/// Names of the subfolders of `base` that start with the identifier's prefix, sorted.
pub fn find_batch_folders(base: &Path, identifier: &str) -> Result<Vec<String>, VectorizeError> {
    if identifier.trim().is_empty() {
        return Err(VectorizeError::validation("enter a folder number first"));
    }
    if base.as_os_str().is_empty() {
        return Err(VectorizeError::validation(
            "set the input base folder in the settings first",
        ));
    }

    let prefix = batch_prefix(identifier);
    if prefix.is_empty() {
        return Err(VectorizeError::validation(format!(
            "folder number '{}' has nothing before the first '-'",
            identifier.trim()
        )));
    }
    debug!(prefix, base = %base.display(), "searching batch folders");

    let entries = std::fs::read_dir(base).map_err(|err| {
        VectorizeError::filesystem(
            format!("failed to read input base folder {}: {err}", base.display()),
            Some(base.to_path_buf()),
        )
    })?;

    let mut matches: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(prefix))
        .collect();
    matches.sort();

    if matches.is_empty() {
        return Err(VectorizeError::filesystem(
            format!("no subfolder with number {prefix} found"),
            Some(base.to_path_buf()),
        ));
    }
    Ok(matches)
}

/// `<base>/<folder>/input.png`, which must exist.
pub fn resolve_input_image(base: &Path, folder: &str) -> Result<PathBuf, VectorizeError> {
    let target = base.join(folder);
    let image = target.join(INPUT_IMAGE_NAME);
    if !image.is_file() {
        return Err(VectorizeError::filesystem(
            format!(
                "'{INPUT_IMAGE_NAME}' was not found in folder {}",
                target.display()
            ),
            Some(target),
        ));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use shared::error::ErrorKind;

    use super::*;

    fn base_with(folders: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for folder in folders {
            std::fs::create_dir_all(dir.path().join(folder)).expect("mkdir");
        }
        dir
    }

    #[test]
    fn strips_suffix_after_hyphen() {
        assert_eq!(batch_prefix(" 302-1234567-7654321 "), "302");
        assert_eq!(batch_prefix("4711"), "4711");
    }

    #[test]
    fn finds_matching_folders_in_order() {
        let base = base_with(&["4711_mueller", "4711_b", "4712", "0815"]);
        std::fs::write(base.path().join("4711.txt"), b"file, not folder").expect("write");
        let found = find_batch_folders(base.path(), "4711-02").expect("found");
        assert_eq!(found, vec!["4711_b".to_string(), "4711_mueller".to_string()]);
    }

    #[test]
    fn no_match_is_a_filesystem_error() {
        let base = base_with(&["0815"]);
        let err = find_batch_folders(base.path(), "4711").expect_err("none");
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }

    #[test]
    fn empty_identifier_or_base_is_a_validation_error() {
        let base = base_with(&[]);
        assert_eq!(
            find_batch_folders(base.path(), "  ").expect_err("empty").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            find_batch_folders(Path::new(""), "4711").expect_err("no base").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn leading_hyphen_does_not_match_every_folder() {
        let base = base_with(&["4711", "0815"]);
        let err = find_batch_folders(base.path(), "-12").expect_err("empty prefix");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn requires_input_png() {
        let base = base_with(&["4711"]);
        assert_eq!(
            resolve_input_image(base.path(), "4711").expect_err("missing").kind(),
            ErrorKind::Filesystem
        );
        std::fs::write(base.path().join("4711").join(INPUT_IMAGE_NAME), b"png").expect("write");
        assert_eq!(
            resolve_input_image(base.path(), "4711").expect("found"),
            base.path().join("4711").join(INPUT_IMAGE_NAME)
        );
    }
}
