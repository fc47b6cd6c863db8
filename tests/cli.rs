use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn latin1sniff() -> Command {
    Command::cargo_bin("latin1sniff").unwrap()
}

fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ascii.txt", b"Hello, world\n");
    write(dir.path(), "utf8.txt", "caf\u{e9} \u{1F600}\n".as_bytes());
    write(dir.path(), "latin1.txt", b"caf\xe9\n");
    write(dir.path(), "c1.txt", b"\x93quoted\x94\n");
    write(dir.path(), "a_rather_long_name.txt", b"x");
    dir
}

fn write(dir: &Path, name: &str, contents: &[u8]) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn stdin_without_arguments() {
    latin1sniff()
        .write_stdin("caf\u{e9}\n")
        .assert()
        .success()
        .stdout("UTF8\n");

    latin1sniff()
        .write_stdin(Vec::<u8>::new())
        .assert()
        .success()
        .stdout("ASCII\n");
}

#[test]
fn single_file_has_no_name() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .arg("latin1.txt")
        .assert()
        .success()
        .stdout("Latin1\n");
}

#[test]
fn several_files_are_labelled() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .args([
            "ascii.txt",
            "utf8.txt",
            "latin1.txt",
            "c1.txt",
            "a_rather_long_name.txt",
        ])
        .assert()
        .success()
        .stdout(
            "ascii.txt : ASCII\n\
             utf8.txt  : UTF8\n\
             latin1.txt: Latin1\n\
             c1.txt    : Unknown\n\
             a_rather_long_name.txt: ASCII\n",
        );
}

#[test]
fn missing_file_is_skipped_and_fails() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .args(["ascii.txt", "missing.txt", "utf8.txt"])
        .assert()
        .code(1)
        .stdout("ascii.txt : ASCII\nutf8.txt  : UTF8\n")
        .stderr(predicate::str::contains("missing.txt: Cannot open"));
}

#[test]
fn lone_missing_file() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .arg("missing.txt")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("missing.txt: Cannot open"));
}

#[test]
fn directory_cannot_be_read() {
    let dir = fixtures();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    latin1sniff()
        .current_dir(dir.path())
        .args(["sub", "latin1.txt"])
        .assert()
        .code(1)
        .stdout("latin1.txt: Latin1\n")
        .stderr(predicate::str::contains("sub: Cannot"));
}

#[test]
fn encoding_names() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .args(["--encoding", "ascii.txt", "utf8.txt", "latin1.txt", "c1.txt"])
        .assert()
        .success()
        .stdout(
            "ascii.txt : UTF-8\n\
             utf8.txt  : UTF-8\n\
             latin1.txt: windows-1252\n\
             c1.txt    : Unknown\n",
        );
}

#[test]
fn verbose_logs_to_stderr_only() {
    let dir = fixtures();
    latin1sniff()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["-v", "utf8.txt"])
        .assert()
        .success()
        .stdout("UTF8\n")
        .stderr(predicate::str::contains("classified"));
}
