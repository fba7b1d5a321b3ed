// Lookup table: (dstport, protocol) -> tags, read from a 3-column CSV.
// The first row is a header and is never inspected.

use multimap::MultiMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{FlowTagError, Result};
use crate::models::domain::{LookupKey, UNTAGGED};
use crate::parser::parse_decimal;

const LOOKUP_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_loaded: usize,
    pub rows_discarded: usize,
}

#[derive(Debug, Clone)]
pub struct LookupTable {
    entries: MultiMap<LookupKey, String>,
    stats: LoadStats,
}

impl LookupTable {
    pub fn new() -> Self {
        LookupTable {
            entries: MultiMap::new(),
            stats: LoadStats::default(),
        }
    }

    /// Builds the table from raw CSV rows, header included.
    pub fn build<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = LookupTable::new();
        for (idx, row) in rows.into_iter().enumerate().skip(1) {
            table.add_row(idx + 1, row.as_ref());
        }
        table
    }

    /// Streams the lookup file at `path` into a table.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| FlowTagError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut table = LookupTable::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| FlowTagError::Read {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            if idx == 0 {
                continue;
            }
            table.add_row(idx + 1, &line);
        }

        info!(
            path = %path.display(),
            rows_loaded = table.stats.rows_loaded,
            rows_discarded = table.stats.rows_discarded,
            distinct_keys = table.distinct_keys(),
            "lookup table loaded"
        );
        Ok(table)
    }

    fn add_row(&mut self, line_no: usize, row: &str) {
        let fields: Vec<&str> = row.trim().split(',').map(str::trim).collect();
        if fields.len() != LOOKUP_FIELDS {
            debug!(line = line_no, fields = fields.len(), "discarding lookup row: wrong field count");
            self.stats.rows_discarded += 1;
            return;
        }

        let port = match parse_decimal::<u16>(fields[0]) {
            Some(port) => port,
            None => {
                debug!(line = line_no, port = fields[0], "discarding lookup row: bad port");
                self.stats.rows_discarded += 1;
                return;
            }
        };

        self.insert(LookupKey::new(port, fields[1]), fields[2]);
    }

    /// Appends `tag` to the tags stored under `key`.
    pub fn insert(&mut self, key: LookupKey, tag: &str) {
        self.entries.insert(key, tag.to_string());
        self.stats.rows_loaded += 1;
    }

    /// Every tag stored under `key`, in insertion order. Empty if the key is absent.
    pub fn tags_for(&self, key: &LookupKey) -> &[String] {
        self.entries
            .get_vec(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First tag stored under `key`, or [`UNTAGGED`].
    pub fn tag_for(&self, key: &LookupKey) -> &str {
        self.entries
            .get(key)
            .map(String::as_str)
            .unwrap_or(UNTAGGED)
    }

    pub fn distinct_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new()
    }
}
