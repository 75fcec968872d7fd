use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_collect_to_output_file() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("project");
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("venv")).unwrap();
    fs::write(root.join("test.rs"), "fn main() {}").unwrap();
    fs::write(root.join("venv/lib.py"), "x = 1").unwrap();
    fs::write(root.join(".git/HEAD"), "ref").unwrap();

    let output_file = temp_dir.path().join("output.md");

    Command::cargo_bin("collect-sources")
        .unwrap()
        .arg("--doc-root")
        .arg(&root)
        .arg("-o")
        .arg(&output_file)
        .arg("--exclude")
        .arg("venv")
        .assert()
        .success()
        .stderr(predicate::str::contains("collected 1 files, skipped 0"));

    let output = fs::read_to_string(&output_file).unwrap();
    assert!(output.contains("test.rs\n```rust\nfn main() {}\n```\n"));
    assert!(!output.contains("lib.py"));
    assert!(!output.contains("HEAD"));
}

#[test]
fn test_collect_to_stdout() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("script.py"), "print('Hello, World!')\n").unwrap();

    Command::cargo_bin("collect-sources")
        .unwrap()
        .arg("--doc-root")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "script.py\n```python\nprint('Hello, World!')\n\n```\n",
        ));
}

#[test]
fn test_collect_warns_about_binary_files() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("blob.bin"), [0x00u8, 0xFF, 0xAA, 0x55]).unwrap();

    Command::cargo_bin("collect-sources")
        .unwrap()
        .arg("--doc-root")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("blob.bin").not())
        .stderr(predicate::str::contains("Skipping binary file: blob.bin"));
}

#[test]
fn test_collect_missing_doc_root_fails() {
    let temp_dir = tempdir().unwrap();

    Command::cargo_bin("collect-sources")
        .unwrap()
        .arg("--doc-root")
        .arg(temp_dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --doc-root"));
}

#[test]
fn test_collect_requires_doc_root_flag() {
    Command::cargo_bin("collect-sources")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--doc-root"));
}

#[test]
fn test_invalid_arguments() {
    Command::cargo_bin("collect-sources")
        .unwrap()
        .arg("--invalid-arg")
        .assert()
        .failure();
}

#[cfg(feature = "restore")]
mod restore {
    use super::*;

    #[test]
    fn test_restore_example_document() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("all_code.md");
        fs::write(&input, "src/main.py\n```\nprint(\"hi\")\n```\n").unwrap();
        let out = temp_dir.path().join("out");

        Command::cargo_bin("restore-sources")
            .unwrap()
            .arg("-i")
            .arg(&input)
            .arg("--doc-root")
            .arg(&out)
            .assert()
            .success()
            .stderr(predicate::str::contains("restored 1 files, skipped 0"));

        assert_eq!(
            fs::read_to_string(out.join("src/main.py")).unwrap(),
            "print(\"hi\")"
        );
    }

    #[test]
    fn test_restore_warns_and_continues() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("all_code.md");
        fs::write(
            &input,
            "```\norphan\n```\n../../etc/passwd\n```\nroot\n```\nok.txt\n```\nfine\n```\n",
        )
        .unwrap();
        let out = temp_dir.path().join("out");

        Command::cargo_bin("restore-sources")
            .unwrap()
            .arg("-i")
            .arg(&input)
            .arg("--doc-root")
            .arg(&out)
            .assert()
            .success()
            .stderr(predicate::str::contains("line 1: code block has no preceding path line"))
            .stderr(predicate::str::contains(
                "line 4: path '../../etc/passwd' escapes the destination root",
            ))
            .stderr(predicate::str::contains("restored 1 files, skipped 2"));

        assert_eq!(fs::read_to_string(out.join("ok.txt")).unwrap(), "fine");
    }

    #[test]
    fn test_restore_from_stdin() {
        let temp_dir = tempdir().unwrap();

        Command::cargo_bin("restore-sources")
            .unwrap()
            .arg("-i")
            .arg("-")
            .arg("--doc-root")
            .arg(temp_dir.path())
            .write_stdin("## notes/todo.txt\n\n```text\nbuy milk\n```\n")
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("notes/todo.txt")).unwrap(),
            "buy milk"
        );
    }

    #[test]
    fn test_restore_missing_input_fails() {
        let temp_dir = tempdir().unwrap();

        Command::cargo_bin("restore-sources")
            .unwrap()
            .arg("-i")
            .arg(temp_dir.path().join("missing.md"))
            .arg("--doc-root")
            .arg(temp_dir.path().join("out"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid --input"));

        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_collect_then_restore_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/nested/deep.rs"), "// deep\n").unwrap();
        fs::write(root.join("README.md"), "# Title\n```\ncode\n```").unwrap();

        let doc = temp_dir.path().join("doc.md");
        let out = temp_dir.path().join("restored");

        Command::cargo_bin("collect-sources")
            .unwrap()
            .arg("--doc-root")
            .arg(&root)
            .arg("-o")
            .arg(&doc)
            .assert()
            .success();

        Command::cargo_bin("restore-sources")
            .unwrap()
            .arg("-i")
            .arg(&doc)
            .arg("--doc-root")
            .arg(&out)
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(out.join("src/nested/deep.rs")).unwrap(),
            "// deep\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("README.md")).unwrap(),
            "# Title\n```\ncode\n```"
        );
    }
}
