use std::fs;
use std::path::Path;

use flowtag::engine::{self, ScanOptions};
use flowtag::report::{self, OutputFormat};
use flowtag::tagger::DuplicatePolicy;
use flowtag::FlowTagError;
use tempfile::tempdir;

fn record(dstport: u16, protocol: u32) -> String {
    format!(
        "2 123456789012 eni-0a1b2c3d 10.0.1.201 198.51.100.2 49153 {dstport} {protocol} 25 20000 1620140761 1620140821 ACCEPT OK\n"
    )
}

fn write_inputs(dir: &Path, lookup: &str, flow_log: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let lookup_path = dir.join("lookup.csv");
    let flow_path = dir.join("flow_logs.txt");
    fs::write(&lookup_path, lookup).unwrap();
    fs::write(&flow_path, flow_log).unwrap();
    (lookup_path, flow_path)
}

fn text_report(lookup: &Path, flow: &Path, options: &ScanOptions) -> String {
    let outcome = engine::run(lookup, flow, options).unwrap();
    report::render(&report::build(&outcome.aggregator), OutputFormat::Text).unwrap()
}

#[test]
fn web_email_and_untagged() {
    let dir = tempdir().unwrap();
    let log = [record(443, 6), record(25, 6), record(23, 6)].concat();
    let (lookup, flow) = write_inputs(dir.path(), "dstport,protocol,tag\n443,tcp,web\n25,tcp,email\n", &log);

    let text = text_report(&lookup, &flow, &ScanOptions::default());
    assert_eq!(
        text,
        "Tag Counts:\nTag,Count\nUntagged,1\nemail,1\nweb,1\n\n\
         Port/Protocol Combination Counts:\nPort,Protocol,Count\n23,tcp,1\n25,tcp,1\n443,tcp,1\n"
    );
}

#[test]
fn totals_match_accepted_records() {
    let dir = tempdir().unwrap();
    let mut log = String::new();
    for (port, proto) in [(443, 6), (443, 6), (68, 17), (0, 1), (993, 6), (53, 99), (110, 6)] {
        log.push_str(&record(port, proto));
    }
    log.push_str("2 123 eni-1 10.0.0.1 10.0.0.2 1 2 3 4 5\n");
    log.push_str("not a flow record\n\n");

    let lookup = "dstport,protocol,tag\n443,TCP,sv_P2\n68,udp,sv_P2\n0,icmp,sv_P5\n993,tcp,email\n443,tcp\n";
    let (lookup, flow) = write_inputs(dir.path(), lookup, &log);

    let outcome = engine::run(&lookup, &flow, &ScanOptions::default()).unwrap();
    assert_eq!(outcome.stats.records_accepted, 7);
    assert_eq!(outcome.stats.lines_skipped, 3);
    assert_eq!(outcome.aggregator.total_tags(), 7);
    assert_eq!(outcome.aggregator.total_port_protocols(), 7);

    let tags = outcome.aggregator.tag_counts();
    assert_eq!(tags["sv_P2"], 3);
    assert_eq!(tags["sv_P5"], 1);
    assert_eq!(tags["email"], 1);
    assert_eq!(tags["Untagged"], 2);
}

#[test]
fn duplicate_key_policies() {
    let dir = tempdir().unwrap();
    let log = [record(143, 6), record(143, 6)].concat();
    let (lookup, flow) = write_inputs(dir.path(), "h,h,h\n143,tcp,email\n143,tcp,imap\n", &log);

    let fan_out = engine::run(&lookup, &flow, &ScanOptions::default()).unwrap();
    assert_eq!(fan_out.aggregator.tag_counts()["email"], 2);
    assert_eq!(fan_out.aggregator.tag_counts()["imap"], 2);
    assert_eq!(fan_out.aggregator.total_port_protocols(), 2);

    let first = engine::run(
        &lookup,
        &flow,
        &ScanOptions {
            policy: DuplicatePolicy::First,
            ..ScanOptions::default()
        },
    )
    .unwrap();
    assert_eq!(first.aggregator.tag_counts()["email"], 2);
    assert!(!first.aggregator.tag_counts().contains_key("imap"));
}

#[test]
fn reports_are_byte_identical_across_runs_and_workers() {
    let dir = tempdir().unwrap();
    let mut log = String::new();
    for i in 0..2000u32 {
        log.push_str(&record((i % 97) as u16, [6, 17, 1, 47][(i % 4) as usize]));
    }
    let lookup = "dstport,protocol,tag\n1,tcp,a\n2,udp,b\n3,icmp,c\n4,unknown,d\n5,tcp,a\n";
    let (lookup, flow) = write_inputs(dir.path(), lookup, &log);

    let first = text_report(&lookup, &flow, &ScanOptions::default());
    let second = text_report(&lookup, &flow, &ScanOptions::default());
    let parallel = text_report(
        &lookup,
        &flow,
        &ScanOptions {
            workers: 3,
            batch_size: 64,
            ..ScanOptions::default()
        },
    );
    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn missing_lookup_file_is_fatal() {
    let dir = tempdir().unwrap();
    let flow = dir.path().join("flow_logs.txt");
    fs::write(&flow, record(443, 6)).unwrap();

    let err = engine::run(&dir.path().join("nope.csv"), &flow, &ScanOptions::default()).unwrap_err();
    assert!(matches!(err, FlowTagError::Open { .. }));
}

#[test]
fn report_is_written_to_disk() {
    let dir = tempdir().unwrap();
    let (lookup, flow) = write_inputs(dir.path(), "dstport,protocol,tag\n443,tcp,web\n", &record(443, 6));
    let out = dir.path().join("output.txt");

    let outcome = engine::run(&lookup, &flow, &ScanOptions::default()).unwrap();
    let rendered = report::render(&report::build(&outcome.aggregator), OutputFormat::Json).unwrap();
    engine::write_report(&out, &rendered).unwrap();

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["tag_counts"][0]["tag"], "web");
    assert_eq!(written["tag_counts"][0]["count"], 1);
}
