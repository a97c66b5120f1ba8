// SYNOID Reels Fetch
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod archive;
pub mod http;
pub mod ytdlp;

pub use archive::{DownloadArchive, FetchItem, ARCHIVE_FILE_NAME};
pub use ytdlp::{download_collection, download_file, fetch_items, DownloadOutcome, FetchOptions, YtDlpCommand};
