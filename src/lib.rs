//! Near-duplicate detection for text corpora: MinHash signatures + LSH
//! banding find duplicate clusters in a directory of documents without
//! O(n²) exact comparison.

pub mod cluster;
pub mod config;
pub mod loader;
pub mod lsh;
pub mod minhash;
pub mod report;
pub mod shingle;

pub use config::{read_config, Config};
pub use report::{OutputMode, RunSummary};

use anyhow::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;

use cluster::SimilarPair;
use minhash::HashFamily;

// Debug logging macro - only prints when config.debug is true
#[macro_export]
macro_rules! debug_println {
    ($config:expr, $($arg:tt)*) => {
        if $config.debug {
            println!($($arg)*);
        }
    };
}

pub(crate) fn build_pbar(total: usize, message: &str) -> ProgressBar {
    let pbar = ProgressBar::new(total as u64);
    pbar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .expect("static progress template")
            .progress_chars("=> "),
    );
    pbar.set_message(message.to_string());
    pbar
}

/// Execute a full deduplication run: load + sign documents in parallel,
/// index, verify candidates, cluster, and materialize outputs. Clears any
/// previous output under `config.output_dir` first.
pub fn run(config: &Config, mode: OutputMode) -> Result<RunSummary, Error> {
    config.validate()?;
    report::prepare_output_dir(&config.output_dir)?;
    let mut log = report::RunLog::create(&config.output_dir)?;

    let family = HashFamily::new(config.num_perm, config.seed);

    log.log(&format!(
        "Phase 1: Processing files from {:?}...",
        config.input_dir
    ))?;
    let loaded = loader::load_documents(config, &family)?;
    for line in &loaded.outcomes {
        log.log_quiet(line)?;
    }
    let total_files = loaded.documents.len() + loaded.skipped;
    log.log(&format!(
        "Found {} text files ({} processed, {} skipped)",
        total_files,
        loaded.documents.len(),
        loaded.skipped
    ))?;

    log.log("Phase 2: Finding similar documents...")?;
    let mut index = lsh::LshIndex::new(config.num_bands, config.rows_per_band(), config.seed);
    for (idx, doc) in loaded.documents.iter().enumerate() {
        index.insert(idx as u32, &doc.signature);
    }
    let candidates = index.candidate_pairs();
    debug_println!(
        config,
        "LSH index: {} buckets, {} candidate pairs",
        index.bucket_count(),
        candidates.len()
    );

    let mut similar_pairs = Vec::new();
    for &(a, b) in &candidates {
        let similarity = minhash::estimate_similarity(
            &loaded.documents[a as usize].signature,
            &loaded.documents[b as usize].signature,
        );
        if similarity >= config.similarity_threshold {
            log.log_quiet(&format!(
                "Found similar files: '{}' and '{}' (similarity: {:.1}%)",
                loaded.documents[a as usize].id,
                loaded.documents[b as usize].id,
                similarity * 100.0
            ))?;
            similar_pairs.push(SimilarPair { a, b, similarity });
        }
    }

    log.log("Phase 3: Creating similarity groups...")?;
    let doc_ids: Vec<String> = loaded.documents.iter().map(|d| d.id.clone()).collect();
    let assignment = cluster::build_groups(&doc_ids, &similar_pairs);

    log.log("Phase 4: Organizing files...")?;
    let paths_by_id: HashMap<String, PathBuf> = loaded
        .documents
        .iter()
        .map(|d| (d.id.clone(), d.path.clone()))
        .collect();
    let stats_by_id: HashMap<String, loader::FileStats> = loaded
        .documents
        .iter()
        .map(|d| (d.id.clone(), d.stats.clone()))
        .collect();
    report::write_outputs(
        &config.output_dir,
        mode,
        &assignment,
        &paths_by_id,
        &stats_by_id,
        &mut log,
    )?;

    let summary = RunSummary {
        total_files,
        processed: loaded.documents.len(),
        skipped: loaded.skipped,
        candidate_pairs: candidates.len(),
        similar_pairs: similar_pairs.len(),
        groups: assignment.groups.len(),
        grouped_files: assignment.groups.iter().map(|g| g.len()).sum(),
        unique_files: assignment.unique.len(),
    };
    log.log_summary(&summary)?;

    Ok(summary)
}
