// Parallel document loading with encoding fallback.

use anyhow::{Context, Error, Result};
use chrono::{DateTime, Local};
use dashmap::DashMap;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build_pbar;
use crate::config::Config;
use crate::minhash::HashFamily;
use crate::shingle;

/// A loaded document: stable id (filename), source path, MinHash signature,
/// and source-file statistics. Text and shingles are ephemeral; only the
/// signature and stats survive loading.
pub struct Document {
    pub id: String,
    pub path: PathBuf,
    pub signature: Vec<u32>,
    pub stats: FileStats,
}

/// Statistics of the source file as found on disk, independent of any
/// preview cap applied to the analyzed text.
#[derive(Debug, Clone)]
pub struct FileStats {
    pub total_lines: usize,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

pub struct LoadResult {
    /// Documents sorted by id, so indices double as a deterministic order.
    pub documents: Vec<Document>,
    /// Per-file outcome lines for the run log, sorted by filename.
    pub outcomes: Vec<String>,
    pub skipped: usize,
}

/// All `*.txt` files directly under `input_dir`, sorted by name.
pub fn list_text_files(input_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory {:?}", input_dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decode raw bytes: strict UTF-8 first, latin-1 for anything else. Latin-1
/// maps all 256 byte values, so legacy single-byte files can never fail to
/// decode; only a filesystem-level read error excludes a file.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => encoding_rs::mem::decode_latin1(&err.into_bytes()).into_owned(),
    }
}

/// Lines in the raw file, counting a trailing line without a newline.
fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(&last) if last != b'\n' => newlines + 1,
        _ => newlines,
    }
}

/// Stable document id for a path: the filename, lossily decoded so files
/// with non-UTF-8 names still get usable, distinct ids.
fn doc_id(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Read a file, decoding with fallback and honoring the optional preview
/// cap on lines read. File statistics always describe the whole file, not
/// the capped preview.
pub fn read_document(
    path: &Path,
    max_preview_lines: Option<usize>,
) -> Result<(String, FileStats), Error> {
    let metadata = fs::metadata(path).with_context(|| format!("failed to stat {:?}", path))?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    let stats = FileStats {
        total_lines: count_lines(&bytes),
        size_bytes: metadata.len(),
        modified: DateTime::<Local>::from(
            metadata
                .modified()
                .with_context(|| format!("failed to read mtime of {:?}", path))?,
        ),
    };
    let text = decode_text(bytes);

    let text = match max_preview_lines {
        Some(max_lines) => text.lines().take(max_lines).collect::<Vec<&str>>().join("\n"),
        None => text,
    };
    Ok((text, stats))
}

/// Read, shingle, and sign every document in the input directory. Reading
/// and signature computation run on the rayon pool with no shared mutable
/// state per document; a failed file is logged and skipped, never fatal.
pub fn load_documents(config: &Config, family: &HashFamily) -> Result<LoadResult, Error> {
    let files = list_text_files(&config.input_dir)?;
    let pbar = build_pbar(files.len(), "Processing files");
    let outcomes: DashMap<String, String> = DashMap::new();

    let loaded: Vec<Option<Document>> = files
        .par_iter()
        .map(|path| {
            let id = doc_id(path);

            let result = match read_document(path, config.max_preview_lines) {
                Ok((text, stats)) => {
                    let shingles = shingle::shingle_set(&text, config.shingle_k);
                    let signature = family.signature(&shingles);
                    if shingles.is_empty() {
                        outcomes.insert(
                            id.clone(),
                            format!("Processed {} (empty shingle set, sentinel signature)", id),
                        );
                    } else {
                        outcomes
                            .insert(id.clone(), format!("Processed {} ({} shingles)", id, shingles.len()));
                    }
                    Some(Document {
                        id,
                        path: path.clone(),
                        signature,
                        stats,
                    })
                }
                Err(e) => {
                    outcomes.insert(id.clone(), format!("Skipped {}: {:#}", id, e));
                    None
                }
            };
            pbar.inc(1);
            result
        })
        .collect();
    pbar.finish_and_clear();

    let mut documents: Vec<Document> = loaded.into_iter().flatten().collect();
    // files come in sorted, but grouping determinism rides on this order
    documents.sort_by(|a, b| a.id.cmp(&b.id));
    let skipped = files.len() - documents.len();

    let mut outcome_lines: Vec<(String, String)> = outcomes.into_iter().collect();
    outcome_lines.sort();

    Ok(LoadResult {
        documents,
        outcomes: outcome_lines.into_iter().map(|(_, line)| line).collect(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_decode_utf8_passthrough() {
        assert_eq!(decode_text("καλημέρα".as_bytes().to_vec()), "καλημέρα");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is 'é' in latin-1 but invalid UTF-8
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(bytes), "café");
    }

    #[test]
    fn test_decode_never_fails_on_arbitrary_bytes() {
        // latin-1 maps every byte, control range included
        let bytes = vec![0x81, 0x8D, 0x8F, 0x90, 0x9D];
        assert_eq!(decode_text(bytes), "\u{81}\u{8D}\u{8F}\u{90}\u{9D}");
    }

    #[test]
    fn test_preview_cap_limits_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        let mut file = fs::File::create(&path).unwrap();
        for i in 0..10 {
            writeln!(file, "line {}", i).unwrap();
        }

        let (capped, _) = read_document(&path, Some(3)).unwrap();
        assert_eq!(capped, "line 0\nline 1\nline 2");
        let (full, stats) = read_document(&path, None).unwrap();
        assert_eq!(full.lines().count(), 10);
        // stats describe the whole file even when the preview is capped
        assert_eq!(stats.total_lines, 10);
        assert_eq!(stats.size_bytes, full.len() as u64);
    }

    #[test]
    fn test_line_count_handles_missing_trailing_newline() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"one\ntwo\n"), 2);
        assert_eq!(count_lines(b"one\ntwo"), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_filenames_get_distinct_ids() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let first = PathBuf::from(OsString::from_vec(b"/corpus/one_\xFF.txt".to_vec()));
        let second = PathBuf::from(OsString::from_vec(b"/corpus/two_\xFF.txt".to_vec()));
        let id_a = doc_id(&first);
        let id_b = doc_id(&second);
        assert_ne!(id_a, id_b);
        assert!(id_a.starts_with("one_"));
        assert!(id_b.starts_with("two_"));
    }

    #[test]
    fn test_list_text_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "notes.md", "c.txt"] {
            fs::write(dir.path().join(name), "content").unwrap();
        }
        let files = list_text_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_missing_input_dir_is_an_error() {
        assert!(list_text_files(Path::new("/nonexistent/dedup-input")).is_err());
    }
}
