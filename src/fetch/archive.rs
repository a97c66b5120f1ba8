// SYNOID Reels Download Archive
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The yt-dlp archive format: one `<extractor> <id>` per line. An identifier
// recorded here is never fetched again.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name kept inside each collection directory.
pub const ARCHIVE_FILE_NAME: &str = "downloaded_history.txt";

/// Something that can be fetched: the archive key plus where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchItem {
    pub extractor: String,
    pub id: String,
    pub url: String,
}

impl FetchItem {
    pub fn new(extractor: &str, id: &str, url: &str) -> Self {
        Self {
            extractor: extractor.to_lowercase(),
            id: id.to_string(),
            url: url.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{} {}", self.extractor, self.id)
    }
}

#[derive(Debug, Clone)]
pub struct DownloadArchive {
    path: PathBuf,
    entries: HashSet<String>,
}

impl DownloadArchive {
    /// Load `path`; a missing file is an empty archive.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) => parse_entries(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read download archive {:?}", path))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Archive for a collection directory.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(ARCHIVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: &FetchItem) -> bool {
        self.entries.contains(&item.key())
    }

    /// Re-read from disk; the downloader may have appended lines itself.
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::load(&self.path)?;
        Ok(())
    }

    /// Append `item` unless it is already present.
    pub fn record(&mut self, item: &FetchItem) -> Result<()> {
        let key = item.key();
        if self.entries.contains(&key) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create archive directory {:?}", parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open download archive {:?}", self.path))?;
        writeln!(file, "{}", key)
            .with_context(|| format!("Failed to append to download archive {:?}", self.path))?;
        self.entries.insert(key);
        Ok(())
    }

    /// Items not yet recorded, in their original order.
    pub fn pending<'a>(&self, items: &'a [FetchItem]) -> Vec<&'a FetchItem> {
        items.iter().filter(|i| !self.contains(i)).collect()
    }
}

fn parse_entries(text: &str) -> HashSet<String> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(extractor), Some(id)) => Some(format!("{} {}", extractor.to_lowercase(), id)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_archive_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DownloadArchive::in_dir(dir.path()).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn test_parse_skips_junk_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ARCHIVE_FILE_NAME);
        std::fs::write(&path, "tiktok 7301\n\n  \nTikTok 7302 trailing\nbroken\n").unwrap();
        let archive = DownloadArchive::load(&path).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.contains(&FetchItem::new("tiktok", "7302", "u")));
    }

    #[test]
    fn test_record_persists_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![
            FetchItem::new("tiktok", "1", "https://a"),
            FetchItem::new("tiktok", "2", "https://b"),
        ];
        let mut archive = DownloadArchive::in_dir(dir.path()).unwrap();
        assert_eq!(archive.pending(&items).len(), 2);
        archive.record(&items[0]).unwrap();
        archive.record(&items[0]).unwrap();

        let reloaded = DownloadArchive::in_dir(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.pending(&items), vec![&items[1]]);
        let text = std::fs::read_to_string(reloaded.path()).unwrap();
        assert_eq!(text, "tiktok 1\n");
    }
}
