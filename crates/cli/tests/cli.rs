//! End-to-end tests running the `comunicado` binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn comunicado(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_comunicado"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_poster(dir: &Path) {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 6, Rgb([10, 90, 200]));
    img.save(dir.join("poster.png")).unwrap();
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

#[test]
fn test_generate_with_default_poster_and_name() {
    let dir = tempfile::tempdir().unwrap();
    write_poster(dir.path());
    fs::write(
        dir.path().join("interior.txt"),
        "22\t0\tREGISTRO\t2\n5  1  SAO PAULO  1\n",
    )
    .unwrap();

    let output = comunicado(
        dir.path(),
        &["generate", "--report", "br-interior", "--input", "interior.txt"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let pdf = dir.path().join("comunicado_br_interior.pdf");
    assert_eq!(page_count(&pdf), 3);
}

#[test]
fn test_generate_into_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_poster(dir.path());
    fs::create_dir(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("capital.txt"), "CENTRO|3\nNORTE|0\n").unwrap();

    let output = comunicado(
        dir.path(),
        &[
            "generate", "-r", "sp-capital", "-i", "capital.txt", "-b", "poster.png", "-o", "out",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(page_count(&dir.path().join("out/comunicado_sp_capital.pdf")), 3);
}

#[test]
fn test_generate_without_background_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("capital.txt"), "CENTRO|3\n").unwrap();

    let output = comunicado(
        dir.path(),
        &["generate", "-r", "sp-capital", "-i", "capital.txt"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing background"), "{stderr}");
    assert!(!dir.path().join("comunicado_sp_capital.pdf").exists());
}

#[test]
fn test_generate_without_valid_records_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_poster(dir.path());
    fs::write(dir.path().join("interior.txt"), "22\tX\tREGISTRO\t10\n").unwrap();

    let output = comunicado(
        dir.path(),
        &["generate", "-r", "br-interior", "-i", "interior.txt"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No valid records"), "{stderr}");
    assert!(stderr.contains("line 1 skipped"), "{stderr}");
}

#[test]
fn test_parse_json_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_comunicado"))
        .args(["parse", "-r", "sp-capital", "-i", "-", "--json", "--quiet"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"CENTRO|3\nSUL\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"], "sp-capital");
    assert_eq!(json["records"][0]["filial"], "CENTRO");
    assert_eq!(json["records"][0]["qtde"], 3);
    assert_eq!(json["diagnostics"][0]["line"], 2);
    assert_eq!(json["diagnostics"][0]["reason"]["kind"], "too-few-fields");
}

#[test]
fn test_parse_prints_footers() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("capital.txt"), "CENTRO|3\n").unwrap();

    let output = comunicado(dir.path(), &["parse", "-r", "sp-capital", "-i", "capital.txt"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "FILIAL CENTRO - QTDE. 3\n"
    );
}

#[test]
fn test_parse_file_with_byte_order_mark() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("capital.txt"), "\u{FEFF}CENTRO|3\r\nLAPA|1\r\n").unwrap();

    let output = comunicado(dir.path(), &["parse", "-r", "sp-capital", "-i", "capital.txt"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "FILIAL CENTRO - QTDE. 3\nFILIAL LAPA - QTDE. 1\n"
    );
}
