use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use rand;
use std::{env::temp_dir, path::PathBuf};

fn write_source(code: &str) -> PathBuf {
    let mut filename = temp_dir();
    filename.push(format!("{:016X}.c", rand::random::<u64>()));
    std::fs::write(&filename, code).unwrap();
    filename
}

pub fn dump(args: &[&str], code: &str) -> String {
    let filename = write_source(code);
    let output = Command::cargo_bin("decldump")
        .unwrap()
        .args(args)
        .arg(&filename)
        .unwrap();
    String::from_utf8(output.stdout).unwrap()
}

pub fn dump_json(code: &str) -> serde_json::Value {
    serde_json::from_str(&dump(&["--json"], code)).unwrap()
}

pub fn dump_to_file(args: &[&str], code: &str) -> String {
    let filename = write_source(code);
    let out_filename = filename.with_extension("txt");
    Command::cargo_bin("decldump")
        .unwrap()
        .args(args)
        .arg("-o")
        .arg(&out_filename)
        .arg(&filename)
        .unwrap()
        .assert()
        .success();
    std::fs::read_to_string(&out_filename).unwrap()
}

pub fn dump_failure(code: &str) {
    let filename = write_source(code);
    Command::cargo_bin("decldump")
        .unwrap()
        .arg(&filename)
        .assert()
        .failure();
}
