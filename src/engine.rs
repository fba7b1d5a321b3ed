// Streaming scan of a flow log against a lookup table.
//
// With one worker the log is read and tagged on the calling thread. With more,
// a reader feeds line batches over a bounded channel and every worker keeps a
// private Aggregator; partitions are merged once the channel drains.

use crossbeam_channel::{bounded, Sender};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::thread;
use tracing::{debug, info, trace};

use crate::error::{FlowTagError, Result};
use crate::lookup::LookupTable;
use crate::parser;
use crate::stats::{Aggregator, ScanStats};
use crate::tagger::{DuplicatePolicy, Tagger};

pub const DEFAULT_BATCH_SIZE: usize = 4096;

const WORKERS_PER_CORE: usize = 4;

/// Upper bound on scan workers: a few per available core.
pub fn max_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_mul(WORKERS_PER_CORE)
}

/// Output path meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub policy: DuplicatePolicy,
    pub workers: usize,
    pub batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            policy: DuplicatePolicy::FanOut,
            workers: 1,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub aggregator: Aggregator,
    pub stats: ScanStats,
}

impl ScanOutcome {
    fn observe_line(&mut self, tagger: &Tagger<'_>, line_no: usize, line: &str) {
        self.stats.lines_read += 1;
        match parser::parse(line) {
            Ok(record) => {
                let tagged = tagger.tag(&record);
                trace!(line = line_no, port = tagged.key.port, protocol = tagged.key.protocol, tags = ?tagged.tags, "tagged record");
                self.aggregator.update(&tagged);
                self.stats.records_accepted += 1;
            }
            Err(reason) => {
                debug!(line = line_no, ?reason, "skipping flow log line");
                self.stats.lines_skipped += 1;
            }
        }
    }

    fn merge(&mut self, other: ScanOutcome) {
        self.aggregator.merge(other.aggregator);
        self.stats.merge(other.stats);
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| FlowTagError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens both inputs up front, loads the table, then scans the flow log.
pub fn run(lookup_path: &Path, flow_log_path: &Path, options: &ScanOptions) -> Result<ScanOutcome> {
    let lookup_file = open(lookup_path)?;
    let flow_file = open(flow_log_path)?;

    let table = LookupTable::from_reader(BufReader::new(lookup_file), lookup_path)?;
    let outcome = scan(BufReader::new(flow_file), flow_log_path, &table, options)?;

    info!(
        path = %flow_log_path.display(),
        lines_read = outcome.stats.lines_read,
        records_accepted = outcome.stats.records_accepted,
        lines_skipped = outcome.stats.lines_skipped,
        distinct_tags = outcome.aggregator.tag_counts().len(),
        distinct_port_protocols = outcome.aggregator.port_protocol_counts().len(),
        "flow log scanned"
    );
    Ok(outcome)
}

pub fn scan<R: BufRead>(
    reader: R,
    path: &Path,
    table: &LookupTable,
    options: &ScanOptions,
) -> Result<ScanOutcome> {
    let tagger = Tagger::new(table, options.policy);
    let workers = options.workers.min(max_workers());
    if workers <= 1 {
        scan_sequential(reader, path, &tagger)
    } else {
        scan_parallel(reader, path, tagger, workers, options.batch_size.max(1))
    }
}

fn read_error(path: &Path, line: usize, source: io::Error) -> FlowTagError {
    FlowTagError::Read {
        path: path.to_path_buf(),
        line,
        source,
    }
}

fn scan_sequential<R: BufRead>(reader: R, path: &Path, tagger: &Tagger<'_>) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| read_error(path, idx + 1, source))?;
        outcome.observe_line(tagger, idx + 1, &line);
    }
    Ok(outcome)
}

type Batch = Vec<(usize, String)>;

fn feed<R: BufRead>(reader: R, path: &Path, sender: Sender<Batch>, batch_size: usize) -> Result<()> {
    let mut batch = Vec::with_capacity(batch_size);
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| read_error(path, idx + 1, source))?;
        batch.push((idx + 1, line));
        if batch.len() == batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            sender
                .send(full)
                .map_err(|_| FlowTagError::Worker("all scan workers exited early".into()))?;
        }
    }
    if !batch.is_empty() {
        sender
            .send(batch)
            .map_err(|_| FlowTagError::Worker("all scan workers exited early".into()))?;
    }
    Ok(())
}

fn scan_parallel<R: BufRead>(
    reader: R,
    path: &Path,
    tagger: Tagger<'_>,
    workers: usize,
    batch_size: usize,
) -> Result<ScanOutcome> {
    let (tx, rx) = bounded::<Batch>(workers.saturating_mul(2));

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                scope.spawn(move || {
                    let mut partition = ScanOutcome::default();
                    for batch in rx.iter() {
                        for (line_no, line) in &batch {
                            partition.observe_line(&tagger, *line_no, line);
                        }
                    }
                    debug!(worker, lines = partition.stats.lines_read, "scan worker finished");
                    partition
                })
            })
            .collect();
        drop(rx);

        // tx is moved into feed and dropped when it returns, which closes the channel.
        let fed = feed(reader, path, tx, batch_size);

        let partitions: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        fed?;

        let mut merged = ScanOutcome::default();
        for partition in partitions {
            let partition =
                partition.map_err(|_| FlowTagError::Worker("scan worker panicked".into()))?;
            merged.merge(partition);
        }
        Ok(merged)
    })
}

/// Writes `report` to `path`, or to stdout when `path` is `-`.
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    let write_err = |source: io::Error| FlowTagError::Write {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new(STDOUT_PATH) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(report.as_bytes()).map_err(write_err)?;
        return lock.flush().map_err(write_err);
    }

    std::fs::write(path, report).map_err(write_err)?;
    info!(path = %path.display(), bytes = report.len(), "report written");
    Ok(())
}
