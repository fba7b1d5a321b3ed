use std::collections::HashMap;

use crate::models::domain::PortProtocol;
use crate::tagger::Tagged;

/// Running tag and port/protocol distributions for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    tag_counts: HashMap<String, u64>,
    port_protocol_counts: HashMap<PortProtocol, u64>,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            tag_counts: HashMap::new(),
            port_protocol_counts: HashMap::new(),
        }
    }

    pub fn observe(&mut self, tag: &str, key: PortProtocol) {
        self.bump_tag(tag);
        self.bump_pair(key);
    }

    /// Records one accepted record: every tag once, the port/protocol pair once.
    pub fn update(&mut self, tagged: &Tagged<'_>) {
        match tagged.tags.split_first() {
            Some((first, rest)) => {
                self.observe(first, tagged.key);
                for tag in rest {
                    self.bump_tag(tag);
                }
            }
            None => self.bump_pair(tagged.key),
        }
    }

    fn bump_pair(&mut self, key: PortProtocol) {
        *self.port_protocol_counts.entry(key).or_insert(0) += 1;
    }

    fn bump_tag(&mut self, tag: &str) {
        match self.tag_counts.get_mut(tag) {
            Some(count) => *count += 1,
            None => {
                self.tag_counts.insert(tag.to_string(), 1);
            }
        }
    }

    /// Folds another partition's counts into this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (tag, count) in other.tag_counts {
            *self.tag_counts.entry(tag).or_insert(0) += count;
        }
        for (key, count) in other.port_protocol_counts {
            *self.port_protocol_counts.entry(key).or_insert(0) += count;
        }
    }

    pub fn tag_counts(&self) -> &HashMap<String, u64> {
        &self.tag_counts
    }

    pub fn port_protocol_counts(&self) -> &HashMap<PortProtocol, u64> {
        &self.port_protocol_counts
    }

    pub fn total_tags(&self) -> u64 {
        self.tag_counts.values().sum()
    }

    pub fn total_port_protocols(&self) -> u64 {
        self.port_protocol_counts.values().sum()
    }
}

/// Line accounting for a flow log scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines_read: u64,
    pub records_accepted: u64,
    pub lines_skipped: u64,
}

impl ScanStats {
    pub fn merge(&mut self, other: ScanStats) {
        self.lines_read += other.lines_read;
        self.records_accepted += other.records_accepted;
        self.lines_skipped += other.lines_skipped;
    }
}
