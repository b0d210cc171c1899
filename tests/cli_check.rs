use assert_cmd::Command;

const ORGANELLES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/organelles.json");
const SHORT_QUIZ: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/short-quiz.json");

fn studyforge() -> Command {
    let mut cmd = Command::cargo_bin("studyforge").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn check_summarizes_a_saved_artifact() {
    let output = studyforge()
        .args(["--check", "--artifact", ORGANELLES])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Matching Game: 8 items"));
    assert!(stdout.contains("Mitochondrion <-> Produces ATP through respiration"));
}

#[test]
fn check_resaves_with_defaults_filled_in() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("copy.json");

    studyforge()
        .args(["--check", "--artifact", ORGANELLES, "--save"])
        .arg(&out)
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 8);
    assert_eq!(saved[2]["difficulty"], "medium");
}

#[test]
fn check_rejects_a_short_quiz() {
    let output = studyforge()
        .args(["--check", "--artifact", SHORT_QUIZ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed validation"), "stderr: {stderr}");
}

#[test]
fn check_with_the_wrong_kind_fails() {
    studyforge()
        .args(["--check", "--kind", "flashcards", "--artifact", ORGANELLES])
        .assert()
        .failure();
}

#[test]
fn check_without_input_is_a_usage_error() {
    studyforge().arg("--check").assert().failure().code(2);
}
