//! Saving answers to disk.
//!
//! One file per run, named `{title}_{YYYYMMDD}.{ext}` in the output directory.
//! Writes go to a `.part` sibling first and are renamed into place, so the
//! final name either holds the whole answer or is untouched. An existing file
//! with the same name is replaced.

use crate::config::WebsumConfig;
use chrono::{Local, NaiveDate};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("could not create output directory {}: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error saving content to file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A saved answer. Created once per run and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub title: String,
    pub date: NaiveDate,
    pub content: String,
}

/// `{title}_{YYYYMMDD}.{ext}`. The title is used as given; sanitize it first.
pub fn artifact_file_name(title: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", title, date.format("%Y%m%d"), extension)
}

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Save `content` under today's local date.
pub fn save_artifact(
    cfg: &WebsumConfig,
    title: &str,
    content: &str,
) -> Result<SavedArtifact, PersistError> {
    save_artifact_on(cfg, title, content, Local::now().date_naive())
}

/// Save `content` stamped with an explicit `date`.
pub fn save_artifact_on(
    cfg: &WebsumConfig,
    title: &str,
    content: &str,
    date: NaiveDate,
) -> Result<SavedArtifact, PersistError> {
    let dir = &cfg.output_directory;
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        dir: dir.clone(),
        source,
    })?;

    let path = dir.join(artifact_file_name(title, date, &cfg.artifact_extension));
    write_replacing(&path, content.as_bytes()).map_err(|source| PersistError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = content.len(), "artifact saved");

    Ok(SavedArtifact {
        path,
        title: title.to_string(),
        date,
        content: content.to_string(),
    })
}

/// Write to `path.part`, fsync, then rename over `path`. The temp file is
/// removed if anything fails.
fn write_replacing(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = (|| -> io::Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_in(dir: &Path) -> WebsumConfig {
        WebsumConfig {
            output_directory: dir.to_path_buf(),
            ..WebsumConfig::default()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn file_name_format() {
        assert_eq!(
            artifact_file_name("Policy Summary", day(), "txt"),
            "Policy Summary_20240307.txt"
        );
    }

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/tmp/a_20240307.txt"));
        assert_eq!(p.to_string_lossy(), "/tmp/a_20240307.txt.part");
    }

    #[test]
    fn creates_nested_output_dir_and_writes() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("a").join("b");
        let cfg = cfg_in(&out);
        let saved = save_artifact_on(&cfg, "Title", "body text", day()).unwrap();
        assert_eq!(saved.path, out.join("Title_20240307.txt"));
        assert_eq!(fs::read_to_string(&saved.path).unwrap(), "body text");
        assert!(!temp_path(&saved.path).exists());
    }

    #[test]
    fn same_title_same_day_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let first = save_artifact_on(&cfg, "Same", "a much longer first answer", day()).unwrap();
        let second = save_artifact_on(&cfg, "Same", "second", day()).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(fs::read_to_string(&second.path).unwrap(), "second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn utf8_content_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let saved = save_artifact_on(&cfg, "Été", "résumé — ✓", day()).unwrap();
        assert_eq!(fs::read_to_string(&saved.path).unwrap(), "résumé — ✓");
    }

    #[test]
    fn custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(dir.path());
        cfg.artifact_extension = "md".to_string();
        let saved = save_artifact_on(&cfg, "Notes", "x", day()).unwrap();
        assert!(saved.path.ends_with("Notes_20240307.md"));
    }

    #[test]
    fn output_dir_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();
        let cfg = cfg_in(&blocker.join("out"));
        let err = save_artifact_on(&cfg, "T", "x", day()).unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }

    #[test]
    fn uses_todays_date() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(dir.path());
        let saved = save_artifact(&cfg, "Today", "x").unwrap();
        let expected = artifact_file_name("Today", saved.date, "txt");
        assert!(saved.path.ends_with(expected));
    }
}
