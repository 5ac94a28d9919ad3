// End-to-end tests for the gas binary.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use gas::codec::Writer;
use gas::{content_digest, decode_chunk, dump_string, encode_chunk, ChunkBuilder};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_gas");
    Command::new(exe)
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write input");
    path
}

fn run(args: &[&str], file: &Path) -> Output {
    cmd()
        .args(args)
        .arg(file)
        .output()
        .expect("run gas")
}

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// A chunk with its attributes stored in descending key order.
fn unsorted_chunk() -> Vec<u8> {
    let mut body = Writer::new();
    body.write_bytes_prefixed(b"n");
    body.write_length(2);
    body.write_bytes_prefixed(b"b");
    body.write_bytes_prefixed(b"2");
    body.write_bytes_prefixed(b"a");
    body.write_bytes_prefixed(b"1");
    body.write_bytes_prefixed(b"");
    body.write_length(0);

    let mut writer = Writer::new();
    writer.write_length(body.len());
    writer.write_bytes(body.as_bytes());
    writer.into_bytes()
}

#[test]
fn dump_prints_every_chunk() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut first = ChunkBuilder::new("first")
        .attribute("k", "v")
        .payload("data")
        .child_with("inner", |c| c)
        .build();
    let mut second = ChunkBuilder::new("second").build();
    let mut bytes = encode_chunk(&mut first);
    bytes.extend(encode_chunk(&mut second));
    let path = write_file(temp.path(), "two.gas", &bytes);

    let output = run(&["dump"], &path);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let expected = format!("{}{}", dump_string(&first), dump_string(&second));
    assert_eq!(String::from_utf8(output.stdout).expect("utf8"), expected);
}

#[test]
fn dump_reads_stdin() {
    let mut chunk = ChunkBuilder::new("piped").build();
    let bytes = encode_chunk(&mut chunk);

    let mut child = cmd()
        .arg("dump")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn gas");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(&bytes)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).expect("utf8"), dump_string(&chunk));
}

#[test]
fn check_reports_non_canonical_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut canonical = ChunkBuilder::new("ok").attribute("a", "1").build();
    let mut bytes = unsorted_chunk();
    bytes.extend(encode_chunk(&mut canonical));
    let path = write_file(temp.path(), "mixed.gas", &bytes);

    let output = run(&["check"], &path);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);

    assert!(lines[0].contains("non-canonical"));
    let mut reordered = decode_chunk(&unsorted_chunk()).expect("decode");
    assert!(lines[0].ends_with(&hex(&content_digest(&mut reordered))));

    assert!(!lines[1].contains("non-canonical"));
    assert!(lines[1].contains("canonical"));
    assert!(lines[1].ends_with(&hex(&content_digest(&mut canonical))));

    assert_eq!(lines[2], "2 chunk(s), 1 non-canonical");
}

#[test]
fn check_fails_without_chunks() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_file(temp.path(), "empty.gas", &[]);

    let output = run(&["check"], &path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no chunks found"), "stderr: {}", stderr);
}

#[test]
fn max_length_flag_rejects_large_fields() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut chunk = ChunkBuilder::new("big").payload(vec![0u8; 64]).build();
    let path = write_file(temp.path(), "big.gas", &encode_chunk(&mut chunk));

    let output = run(&["dump"], &path);
    assert!(output.status.success());

    let output = run(&["--max-length", "16", "dump"], &path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exceeds maximum 16"), "stderr: {}", stderr);

    let output = run(&["check", "--max-length", "16"], &path);
    assert!(!output.status.success());
}

#[test]
fn hex_dumps_raw_bytes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_file(temp.path(), "raw.bin", b"0123456789abcdefXY");

    let output = run(&["hex"], &path);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("00000000  30 31 32 33"));
    assert!(lines[1].ends_with("|XY|"));
}
