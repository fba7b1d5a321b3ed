pub mod domain {
    /// Tag counted for records with no lookup table entry.
    pub const UNTAGGED: &str = "Untagged";

    /// Lookup table key. The protocol name is always stored lowercase.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct LookupKey {
        pub port: u16,
        pub protocol: String,
    }

    impl LookupKey {
        pub fn new(port: u16, protocol: &str) -> Self {
            LookupKey {
                port,
                protocol: protocol.to_lowercase(),
            }
        }
    }

    /// The two fields of a flow log line the engine cares about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParsedRecord {
        pub port: u16,
        pub protocol_number: u64,
    }

    /// Key of the port/protocol distribution. Field order gives the report tie-break.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct PortProtocol {
        pub port: u16,
        pub protocol: &'static str,
    }
}

pub mod dto {
    use serde::Serialize;

    #[derive(Debug, Serialize, Clone, PartialEq, Eq)]
    pub struct TagCountDTO {
        pub tag: String,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Clone, PartialEq, Eq)]
    pub struct PortProtocolCountDTO {
        pub port: u16,
        pub protocol: String,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
    pub struct ReportDTO {
        pub tag_counts: Vec<TagCountDTO>,
        pub port_protocol_counts: Vec<PortProtocolCountDTO>,
    }
}
