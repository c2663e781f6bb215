//! Run counters and progress display for a load

use super::coordinator::RunState;
use crate::store::SendOutcome;
use crate::util::truncate_str;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// Counters accumulated over one sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    /// Entries consumed from the archive, whatever their outcome
    pub documents_processed: usize,
    /// Documents the store accepted
    pub documents_sent: usize,
    /// Documents the store rejected or never answered for
    pub documents_failed: usize,
    /// Entries skipped because their content was not valid UTF-8
    pub documents_undecodable: usize,
    /// Sum of declared entry sizes
    pub total_bytes: u64,
    /// Wall-clock time of the run in seconds
    pub elapsed_seconds: f64,
    pub docs_per_second: f64,
}

impl LoadStats {
    /// Calculate documents per second
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.docs_per_second = self.documents_processed as f64 / self.elapsed_seconds;
        }
    }

    /// One-line summary: count, bytes, elapsed time
    pub fn summary_line(&self) -> String {
        format!(
            "{} RDF files processed, {} bytes, {:.1}s ({} stored, {} failed, {} undecodable)",
            self.documents_processed,
            self.total_bytes,
            self.elapsed_seconds,
            self.documents_sent,
            self.documents_failed,
            self.documents_undecodable
        )
    }
}

/// Progress tracker owned by the coordinator for the duration of a run
pub struct LoadProgress {
    /// Progress spinner (None in quiet mode)
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
    stats: LoadStats,
}

impl LoadProgress {
    pub fn new(quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} documents {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
            stats: LoadStats::default(),
        }
    }

    /// Record a document handed to the store
    pub fn document_sent(&mut self, key: &str, bytes: u64, outcome: &SendOutcome) {
        if outcome.is_success() {
            self.stats.documents_sent += 1;
        } else {
            self.stats.documents_failed += 1;
        }
        self.consumed(key, bytes);
    }

    /// Record an entry whose content could not be decoded
    pub fn document_undecodable(&mut self, key: &str, bytes: u64) {
        self.stats.documents_undecodable += 1;
        self.consumed(key, bytes);
    }

    fn consumed(&mut self, key: &str, bytes: u64) {
        self.stats.documents_processed += 1;
        self.stats.total_bytes += bytes;

        if let Some(ref pb) = self.progress_bar {
            pb.set_position(self.stats.documents_processed as u64);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                self.stats.documents_processed as f64 / elapsed
            } else {
                0.0
            };
            pb.set_message(format!(
                "{:.1} docs/s | {} failed | {}",
                rate,
                self.stats.documents_failed,
                truncate_str(key, 40)
            ));
        }
    }

    /// Documents consumed so far
    pub fn documents_processed(&self) -> usize {
        self.stats.documents_processed
    }

    /// Current statistics with elapsed time filled in
    pub fn get_stats(&self) -> LoadStats {
        let mut stats = self.stats.clone();
        stats.elapsed_seconds = self.start_time.elapsed().as_secs_f64();
        stats.update_rate();
        stats
    }

    /// Close the spinner and return the final statistics
    pub fn finish(self, state: RunState) -> LoadStats {
        let stats = self.get_stats();
        if let Some(pb) = self.progress_bar {
            match state {
                RunState::Failed => pb.abandon_with_message("Failed"),
                _ => pb.finish_with_message(format!(
                    "Done! {} stored, {} failed, {:.1} docs/s",
                    stats.documents_sent, stats.documents_failed, stats.docs_per_second
                )),
            }
        }
        stats
    }
}
