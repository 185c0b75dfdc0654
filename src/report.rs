// Output materialization: directory layout, CSV report, timestamped run log.

use anyhow::{Context, Error, Result};
use chrono::Local;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cluster::GroupAssignment;
use crate::loader::FileStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Full layout: unique/ plus one similar/similar_group_N/ per cluster.
    Organize,
    /// Deduplicated view only: representatives and unique files in unique/.
    ReportOnly,
}

/// Counts emitted at the end of every run so silent data loss is observable.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub candidate_pairs: usize,
    pub similar_pairs: usize,
    pub groups: usize,
    pub grouped_files: usize,
    pub unique_files: usize,
}

/// Timestamped run log: phase boundaries and per-file outcomes go to disk,
/// the important ones to the console as well.
pub struct RunLog {
    file: File,
    path: PathBuf,
    start: Instant,
}

impl RunLog {
    pub fn create(output_dir: &Path) -> Result<Self, Error> {
        let filename = format!(
            "deduplication_log_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = output_dir.join(filename);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to create run log {:?}", path))?;
        writeln!(
            file,
            "Text Deduplication Process Log\nStarted at: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(Self {
            file,
            path,
            start: Instant::now(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&mut self, message: &str) -> Result<(), Error> {
        writeln!(
            self.file,
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
        .context("failed to write to run log")
    }

    /// Log to both the console and the log file.
    pub fn log(&mut self, message: &str) -> Result<(), Error> {
        println!("{}", message);
        self.write_entry(message)
    }

    /// Log to the file only (per-file noise).
    pub fn log_quiet(&mut self, message: &str) -> Result<(), Error> {
        self.write_entry(message)
    }

    pub fn log_summary(&mut self, summary: &RunSummary) -> Result<(), Error> {
        let mut block = String::new();
        block.push('\n');
        block.push_str(&"=".repeat(50));
        block.push_str("\nPROCESSING SUMMARY\n");
        block.push_str(&"=".repeat(50));
        block.push_str(&format!(
            "\nTotal duration: {:?}\n\
             Total files found: {}\n\
             Files processed: {}\n\
             Files skipped: {}\n\
             Candidate pairs: {}\n\
             Similar pairs accepted: {}\n\
             Similar groups found: {}\n\
             Files in similar groups: {}\n\
             Unique files: {}",
            self.start.elapsed(),
            summary.total_files,
            summary.processed,
            summary.skipped,
            summary.candidate_pairs,
            summary.similar_pairs,
            summary.groups,
            summary.grouped_files,
            summary.unique_files,
        ));
        self.log(&block)
    }
}

/// Clear any prior output and recreate the base directory. Explicit
/// precondition for reproducible directory side effects on re-runs.
pub fn prepare_output_dir(output_dir: &Path) -> Result<(), Error> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)
            .with_context(|| format!("failed to clear output directory {:?}", output_dir))?;
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {:?}", output_dir))?;
    Ok(())
}

fn copy_into(src: &Path, dest_dir: &Path) -> Result<(), Error> {
    let file_name = src
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid source path {:?}", src))?;
    // copy, never move: the source corpus stays intact
    fs::copy(src, dest_dir.join(file_name))
        .with_context(|| format!("failed to copy {:?} into {:?}", src, dest_dir))?;
    Ok(())
}

/// Per-group metadata file listing each member's source-file statistics,
/// written next to the copies so a group can be reviewed without going back
/// to the original corpus.
fn write_group_info(
    group_dir: &Path,
    group_number: usize,
    group: &[String],
    stats_by_id: &HashMap<String, FileStats>,
) -> Result<(), Error> {
    let path = group_dir.join("_group_info.txt");
    let mut file =
        File::create(&path).with_context(|| format!("failed to create {:?}", path))?;

    writeln!(file, "Similar Group {}", group_number)?;
    writeln!(file, "{}\n", "=".repeat(50))?;
    for id in group {
        let stats = stats_by_id
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("no file stats recorded for document {}", id))?;
        writeln!(file, "File: {}", id)?;
        writeln!(file, "Total lines: {}", stats.total_lines)?;
        writeln!(file, "Size: {} bytes", stats.size_bytes)?;
        writeln!(
            file,
            "Last modified: {}\n",
            stats.modified.format("%Y-%m-%d %H:%M:%S")
        )?;
    }
    Ok(())
}

fn lookup_similarity(assignment: &GroupAssignment, a: &str, b: &str) -> Option<f32> {
    assignment
        .pair_similarities
        .get(&(a.to_string(), b.to_string()))
        .or_else(|| {
            assignment
                .pair_similarities
                .get(&(b.to_string(), a.to_string()))
        })
        .copied()
}

/// CSV report: one row per representative/match pair (the representative is
/// the lexicographically first group member), plus one row per unique
/// document with empty match columns. Members only transitively linked to
/// the representative have no direct verified pair; their percentage cell
/// stays blank.
fn write_csv_report(
    output_dir: &Path,
    assignment: &GroupAssignment,
) -> Result<PathBuf, Error> {
    let csv_path = output_dir.join("similarity_report.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("failed to create CSV report {:?}", csv_path))?;

    writer.write_record(["document_id", "similar_document_id", "similarity_percentage"])?;

    for group in &assignment.groups {
        let representative = &group[0];
        for member in &group[1..] {
            let percentage = lookup_similarity(assignment, representative, member)
                .map(|sim| format!("{:.1}", sim * 100.0))
                .unwrap_or_default();
            writer.write_record([representative.as_str(), member.as_str(), &percentage])?;
        }
    }
    for id in &assignment.unique {
        writer.write_record([id.as_str(), "", ""])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write CSV report {:?}", csv_path))?;
    Ok(csv_path)
}

/// Materialize the final grouping. Any failure here is fatal: results would
/// otherwise be silently lost.
pub fn write_outputs(
    output_dir: &Path,
    mode: OutputMode,
    assignment: &GroupAssignment,
    paths_by_id: &HashMap<String, PathBuf>,
    stats_by_id: &HashMap<String, FileStats>,
    log: &mut RunLog,
) -> Result<(), Error> {
    let source_path = |id: &str| -> Result<&PathBuf, Error> {
        paths_by_id
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("no source path recorded for document {}", id))
    };

    let unique_dir = output_dir.join("unique");
    fs::create_dir_all(&unique_dir)
        .with_context(|| format!("failed to create {:?}", unique_dir))?;

    match mode {
        OutputMode::Organize => {
            let similar_dir = output_dir.join("similar");
            fs::create_dir_all(&similar_dir)
                .with_context(|| format!("failed to create {:?}", similar_dir))?;

            for (i, group) in assignment.groups.iter().enumerate() {
                let group_dir = similar_dir.join(format!("similar_group_{}", i + 1));
                fs::create_dir_all(&group_dir)
                    .with_context(|| format!("failed to create {:?}", group_dir))?;
                write_group_info(&group_dir, i + 1, group, stats_by_id)?;
                for id in group {
                    copy_into(source_path(id)?, &group_dir)?;
                    log.log_quiet(&format!("Copied similar file: {} -> similar_group_{}", id, i + 1))?;
                }
            }
        }
        OutputMode::ReportOnly => {
            // representatives stand in for their whole group
            for group in &assignment.groups {
                copy_into(source_path(&group[0])?, &unique_dir)?;
                log.log_quiet(&format!("Copied representative file: {} -> unique", group[0]))?;
            }
        }
    }

    for id in &assignment.unique {
        copy_into(source_path(id)?, &unique_dir)?;
        log.log_quiet(&format!("Copied unique file: {} -> unique", id))?;
    }

    let csv_path = write_csv_report(output_dir, assignment)?;
    log.log(&format!("Similarity report written to {:?}", csv_path))?;

    Ok(())
}
