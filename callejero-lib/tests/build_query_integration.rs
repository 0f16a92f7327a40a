//! End-to-end tests of the `build` and `query` commands against small fixed-width sources.
//!
//! The source files are generated in a temporary directory, built into a snapshot through
//! the command-line entry point, and then queried the same way.

use callejero_lib::Host;
use callejero_lib::snapshot::{Snapshot, list_versions, read_current_version};
use std::fs;
use std::path::Path;

/// Test host that captures output to in-memory buffers and records the exit code.
#[derive(Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

const VIAS_WIDTH: usize = 152;
const TRAM_WIDTH: usize = 273;

fn put(line: &mut [u8], start: usize, text: &[u8]) {
    line[start..start + text.len()].copy_from_slice(text);
}

fn vias_line(cpro: &str, cmun: &str, cvia: &str, tvia: &str, nvia: &str) -> Vec<u8> {
    let mut line = vec![b' '; VIAS_WIDTH];
    put(&mut line, 0, cpro.as_bytes());
    put(&mut line, 2, cmun.as_bytes());
    put(&mut line, 47, cvia.as_bytes());
    put(&mut line, 52, tvia.as_bytes());
    put(&mut line, 57, nvia.as_bytes());
    line
}

fn tram_line(cpro: &str, cmun: &str, cpos: &str, cun_var: &str, nentsic: &[u8], cvia: &str) -> Vec<u8> {
    let mut line = vec![b' '; TRAM_WIDTH];
    put(&mut line, 0, cpro.as_bytes());
    put(&mut line, 2, cmun.as_bytes());
    put(&mut line, 42, cpos.as_bytes());
    put(&mut line, 78, cun_var.as_bytes());
    put(&mut line, 110, nentsic);
    put(&mut line, 160, cvia.as_bytes());
    line
}

fn write_lines(path: &Path, lines: &[Vec<u8>]) {
    let mut bytes = Vec::new();
    for line in lines {
        bytes.extend_from_slice(line);
        bytes.extend_from_slice(b"\r\n");
    }
    fs::write(path, bytes).unwrap();
}

/// Writes VIAS and TRAM sources; UP, PSEU and SECC are left out on purpose.
fn write_sources(dir: &Path) {
    write_lines(
        &dir.join("VIAS-NAL.F260630"),
        &[
            vias_line("28", "079", "00105", "CALLE", "MAYOR"),
            vias_line("28", "079", "00200", "PLAZA", "MAYOR"),
            vias_line("28", "079", "00300", "CALLE", "ALCALA"),
            vias_line("05", "019", "00010", "CALLE", "REAL"),
        ],
    );

    write_lines(
        &dir.join("TRAM-NAL.F260630"),
        &[
            tram_line("28", "079", "28001", "0001701", b"MADRID", "00105"),
            tram_line("28", "079", "28001", "0001701", b"MADRID", "00105"),
            tram_line("28", "079", "28001", "0001701", b"MADRID", "00300"),
            tram_line("28", "079", "28013", "0001701", b"MADRID", "00200"),
            // 0xD1 is 'Ñ' in the Windows-1252 encoding of the sources
            tram_line("05", "019", "05100", "0003001", b"PE\xD1A", "00010"),
        ],
    );
}

async fn run(host: &mut TestHost, data_dir: &Path, args: &[&str]) -> callejero_lib::Result<()> {
    let data_dir = data_dir.to_str().unwrap();
    let mut argv = vec!["callejero", "--data-dir", data_dir, "--color", "never"];
    argv.extend_from_slice(args);
    callejero_lib::run(host, argv).await
}

async fn query_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut host = TestHost::default();
    let mut argv = vec!["query", "--format", "json"];
    argv.extend_from_slice(args);
    run(&mut host, data_dir, &argv).await.unwrap();
    assert_eq!(host.exit_code, None, "unexpected outcome: {}", host.error_str());
    serde_json::from_str(&host.output_str()).unwrap()
}

async fn build_fixture_snapshot(data_dir: &Path, input_dir: &Path) -> TestHost {
    write_sources(input_dir);
    let mut host = TestHost::default();
    run(&mut host, data_dir, &["build", "--input-dir", input_dir.to_str().unwrap()])
        .await
        .unwrap();
    host
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_build_then_query() {
    let data = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();

    let build = build_fixture_snapshot(data.path(), input.path()).await;
    let report = build.output_str();
    assert!(report.starts_with("Published snapshot "), "{report}");
    assert!(report.contains("1 duplicate(s) dropped"), "{report}");
    assert!(report.contains("UP    skipped, no source file"), "{report}");
    assert!(read_current_version(&data.path().join("snapshots")).unwrap().is_some());

    let exact = query_json(data.path(), &["postal", "28001"]).await;
    assert_eq!(
        exact,
        serde_json::json!([{ "cpos": 28001, "cpro": 28, "cmun": 79, "nentsic": "MADRID" }])
    );

    let range = query_json(data.path(), &["postal", "280"]).await;
    let codes: Vec<_> = range.as_array().unwrap().iter().map(|r| r["cpos"].as_i64().unwrap()).collect();
    assert_eq!(codes, vec![28001, 28013]);

    let decoded = query_json(data.path(), &["postal", "05100"]).await;
    assert_eq!(decoded[0]["nentsic"], "PEÑA");

    let streets = query_json(data.path(), &["streets", "MAY", "--postal-code", "28001"]).await;
    assert_eq!(streets.as_array().unwrap().len(), 1);
    assert_eq!(streets[0]["tvia"], "Calle");
    assert_eq!(streets[0]["nvia"], "Mayor");
    assert_eq!(streets[0]["cvia"], 105);
    assert!(streets[0].get("cun").is_none());

    let by_unit = query_json(data.path(), &["streets", "may", "--unit", "28", "79", "1"]).await;
    let names: Vec<_> = by_unit.as_array().unwrap().iter().map(|r| r["tvia"].as_str().unwrap().to_string()).collect();
    assert_eq!(names, vec!["Calle", "Plaza"]);
    assert_eq!(by_unit[0]["cun"], 1);

    let municipality = query_json(data.path(), &["municipality", "28", "79"]).await;
    assert_eq!(municipality.as_array().unwrap().len(), 2);

    let unit = query_json(data.path(), &["unit", "28", "79", "1701"]).await;
    assert_eq!(unit[0]["cun_var"], 1701);

    let units = query_json(data.path(), &["units", "5"]).await;
    assert_eq!(units, serde_json::json!([{ "cmun": 19, "cun": 3, "nentsic": "PEÑA" }]));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_query_outcomes_set_exit_codes() {
    let data = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();
    let _ = build_fixture_snapshot(data.path(), input.path()).await;

    let cases: [(&[&str], i32); 6] = [
        (&["query", "postal", "9x9"], 2),
        (&["query", "postal", "28"], 3),
        (&["query", "postal", "99999"], 4),
        (&["query", "municipality", "53", "1"], 2),
        (&["query", "streets", "MA", "--postal-code", "28001"], 3),
        (&["query", "streets", "NOWHERE", "--postal-code", "28001"], 4),
    ];

    for (args, expected) in cases {
        let mut host = TestHost::default();
        run(&mut host, data.path(), args).await.unwrap();
        assert_eq!(host.exit_code, Some(expected), "{args:?}");
        assert!(host.output_str().is_empty(), "{args:?}");
        assert!(!host.error_str().is_empty(), "{args:?}");
    }
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_console_output() {
    let data = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();
    let _ = build_fixture_snapshot(data.path(), input.path()).await;

    let mut host = TestHost::default();
    run(&mut host, data.path(), &["query", "postal", "28001"]).await.unwrap();

    let output = host.output_str();
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("cpos   cpro  cmun  nentsic"));
    assert!(output.contains("28001  28    79    MADRID"), "{output}");
    assert!(output.ends_with("1 record(s)\n"), "{output}");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_missing_required_source_keeps_current_snapshot() {
    let data = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();
    let _ = build_fixture_snapshot(data.path(), input.path()).await;
    let snapshots = data.path().join("snapshots");
    let before = read_current_version(&snapshots).unwrap();

    let partial = tempfile::tempdir().unwrap();
    write_lines(
        &partial.path().join("VIAS-NAL.F260630"),
        &[vias_line("28", "079", "00105", "CALLE", "MAYOR")],
    );

    let mut host = TestHost::default();
    let result = run(&mut host, data.path(), &["build", "--input-dir", partial.path().to_str().unwrap()]).await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("TRAM"), "{err}");
    assert_eq!(read_current_version(&snapshots).unwrap(), before);

    let exact = query_json(data.path(), &["postal", "28013"]).await;
    assert_eq!(exact[0]["cpos"], 28013);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_query_without_snapshot_fails() {
    let data = tempfile::tempdir().unwrap();
    let mut host = TestHost::default();
    assert!(run(&mut host, data.path(), &["query", "postal", "28001"]).await.is_err());
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_reference_tables_need_no_snapshot() {
    let data = tempfile::tempdir().unwrap();

    let mut host = TestHost::default();
    run(&mut host, data.path(), &["regions", "--format", "json"]).await.unwrap();
    let regions: serde_json::Value = serde_json::from_str(&host.output_str()).unwrap();
    assert_eq!(regions.as_array().unwrap().len(), 19);
    assert_eq!(regions[12]["CCOM"], "13");

    let mut host = TestHost::default();
    run(&mut host, data.path(), &["provinces", "13", "--format", "csv"]).await.unwrap();
    let csv = host.output_str();
    assert_eq!(csv.lines().count(), 2, "{csv}");
    assert!(csv.contains("MADRID"), "{csv}");

    let mut host = TestHost::default();
    run(&mut host, data.path(), &["provinces", "20"]).await.unwrap();
    assert_eq!(host.exit_code, Some(2));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_rebuild_from_same_sources_is_identical() {
    let data = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();
    let _ = build_fixture_snapshot(data.path(), input.path()).await;

    let mut host = TestHost::default();
    run(&mut host, data.path(), &["build", "--input-dir", input.path().to_str().unwrap()])
        .await
        .unwrap();

    let snapshots = data.path().join("snapshots");
    let versions = list_versions(&snapshots).unwrap();
    assert_eq!(versions.len(), 2);

    let first = Snapshot::open(&snapshots.join(&versions[0])).unwrap();
    let second = Snapshot::open(&snapshots.join(&versions[1])).unwrap();
    assert_eq!(first.streets(), second.streets());
    assert_eq!(first.tracts(), second.tracts());
    assert_eq!(first.tracts().len(), 4);
}
