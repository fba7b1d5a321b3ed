/// Name returned for any protocol number outside the known table.
pub const UNKNOWN_PROTOCOL: &str = "unknown";

const PROTOCOL_TCP: u64 = 6;
const PROTOCOL_UDP: u64 = 17;
const PROTOCOL_ICMP: u64 = 1;

/// Maps an IANA protocol number to its lowercase name.
pub fn resolve(protocol_number: u64) -> &'static str {
    match protocol_number {
        PROTOCOL_TCP => "tcp",
        PROTOCOL_UDP => "udp",
        PROTOCOL_ICMP => "icmp",
        _ => UNKNOWN_PROTOCOL,
    }
}
