//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::engine::{max_workers, ScanOptions, DEFAULT_BATCH_SIZE};
use crate::report::OutputFormat;
use crate::tagger::DuplicatePolicy;

/// Tag flow log records from a dstport/protocol lookup table and count the results.
#[derive(Parser, Debug, Clone)]
#[command(name = "flowtag")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Lookup table CSV (dstport,protocol,tag). The first row is always skipped
    #[arg(long, value_name = "FILE", env = "FLOWTAG_LOOKUP", default_value = "./lookup.csv")]
    pub lookup: PathBuf,

    /// Flow log file, one whitespace-separated record per line
    #[arg(long = "flow-logs", value_name = "FILE", env = "FLOWTAG_FLOW_LOGS", default_value = "./flow_logs.txt")]
    pub flow_logs: PathBuf,

    /// Report destination; `-` writes to stdout
    #[arg(short, long, value_name = "FILE", env = "FLOWTAG_OUTPUT", default_value = "./output.txt")]
    pub output: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// How to count a lookup key that carries several tags
    #[arg(long = "duplicate-tags", value_enum, default_value = "fan-out")]
    pub duplicate_tags: DuplicatePolicy,

    /// Scan worker threads (1 scans on the main thread)
    #[arg(short, long, env = "FLOWTAG_WORKERS", default_value = "1")]
    pub workers: usize,

    /// Lines per batch handed to a worker
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            policy: self.duplicate_tags,
            workers: self.workers.clamp(1, max_workers()),
            batch_size: self.batch_size.max(1),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
