use clap::ValueEnum;

use crate::lookup::LookupTable;
use crate::models::domain::{LookupKey, ParsedRecord, PortProtocol, UNTAGGED};
use crate::protocol;

/// What to count when a lookup key carries more than one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Count every stored tag once per matching record
    #[default]
    FanOut,
    /// Count only the first tag inserted for the key
    First,
}

/// Outcome of tagging a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<'a> {
    pub key: PortProtocol,
    pub tags: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct Tagger<'a> {
    table: &'a LookupTable,
    policy: DuplicatePolicy,
}

impl<'a> Tagger<'a> {
    pub fn new(table: &'a LookupTable, policy: DuplicatePolicy) -> Self {
        Tagger { table, policy }
    }

    pub fn tag(&self, record: &ParsedRecord) -> Tagged<'a> {
        let protocol = protocol::resolve(record.protocol_number);
        let key = PortProtocol {
            port: record.port,
            protocol,
        };

        let stored = self.table.tags_for(&LookupKey::new(record.port, protocol));
        let tags = match (stored.first(), self.policy) {
            (None, _) => vec![UNTAGGED],
            (Some(first), DuplicatePolicy::First) => vec![first.as_str()],
            (Some(_), DuplicatePolicy::FanOut) => stored.iter().map(String::as_str).collect(),
        };

        Tagged { key, tags }
    }
}
