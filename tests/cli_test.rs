use assert_cmd::prelude::*;
use std::io::Write;
use std::process::Command;

type StdResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn build_then_dump_round_trips_json() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let doc_path = temp_dir.path().join("doc.json");
    std::fs::write(&doc_path, br#"{"name":"wisent","values":[1,2,3],"nested":{"ok":true}}"#)?;
    let tree_path = temp_dir.path().join("doc.wisent");

    Command::cargo_bin("wisent")?
        .arg("build")
        .arg("-i").arg(&doc_path)
        .arg("-o").arg(&tree_path)
        .assert()
        .success();

    let output = Command::cargo_bin("wisent")?
        .arg("dump")
        .arg("-i").arg(&tree_path)
        .output()?;
    assert!(output.status.success());
    let dumped: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let original: serde_json::Value = serde_json::from_slice(&std::fs::read(&doc_path)?)?;
    assert_eq!(dumped, original);
    Ok(())
}

#[test]
fn compress_then_decompress_round_trips_tree_bytes() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let doc_path = temp_dir.path().join("doc.json");
    std::fs::write(&doc_path, br#"{"a":[1,1,1,1,1,1,1],"b":"hello world"}"#)?;
    let tree_path = temp_dir.path().join("doc.wisent");
    let compressed_path = temp_dir.path().join("doc.wz");
    let roundtrip_path = temp_dir.path().join("doc.roundtrip");

    Command::cargo_bin("wisent")?
        .arg("build")
        .arg("-i").arg(&doc_path)
        .arg("-o").arg(&tree_path)
        .assert()
        .success();

    Command::cargo_bin("wisent")?
        .arg("compress")
        .arg("-i").arg(&doc_path)
        .arg("-o").arg(&compressed_path)
        .arg("-p").arg("rle,lz77")
        .assert()
        .success();

    Command::cargo_bin("wisent")?
        .arg("decompress")
        .arg("-i").arg(&compressed_path)
        .arg("-o").arg(&roundtrip_path)
        .arg("-p").arg("rle,lz77")
        .assert()
        .success();

    let original_tree = std::fs::read(&tree_path)?;
    let roundtrip_tree = std::fs::read(&roundtrip_path)?;
    assert_eq!(original_tree, roundtrip_tree);
    Ok(())
}

#[test]
fn build_inlines_csv_sidecar() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let csv_path = temp_dir.path().join("rows.csv");
    let mut csv_file = std::fs::File::create(&csv_path)?;
    write!(csv_file, "id,label\n1,one\n2,two\n")?;

    let doc_path = temp_dir.path().join("doc.json");
    std::fs::write(&doc_path, br#"{"table":"rows.csv"}"#)?;
    let tree_path = temp_dir.path().join("doc.wisent");

    Command::cargo_bin("wisent")?
        .arg("build")
        .arg("-i").arg(&doc_path)
        .arg("-o").arg(&tree_path)
        .arg("--csv-prefix").arg(temp_dir.path())
        .assert()
        .success();

    let output = Command::cargo_bin("wisent")?
        .arg("dump")
        .arg("-i").arg(&tree_path)
        .output()?;
    assert!(output.status.success());
    let dumped: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    // Table has no way back to its source filename, so it dumps structurally.
    assert_eq!(dumped["table"]["head"], "Table");
    Ok(())
}

#[test]
fn rejects_unknown_pipeline_step() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let doc_path = temp_dir.path().join("doc.json");
    std::fs::write(&doc_path, br#"{"a":1}"#)?;
    let out_path = temp_dir.path().join("doc.wz");

    Command::cargo_bin("wisent")?
        .arg("compress")
        .arg("-i").arg(&doc_path)
        .arg("-o").arg(&out_path)
        .arg("-p").arg("not-a-real-codec")
        .assert()
        .failure();
    Ok(())
}
