use assert_cmd::cargo::cargo_bin_cmd;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use evalmetrics_testing::TestWorld;
use evalmetrics_testing::assertions::assert_response_status;
use predicates::prelude::*;
use std::io::Cursor;

fn world_with_drafts() -> TestWorld {
    TestWorld::new().with_draft_folder(
        "draft_data",
        &[
            ("summary.json", r#"{"runs": 2}"#),
            ("thread-1/draft.json", r#"{"pages": []}"#),
        ],
    )
}

/// Test: archive writes the zip to the default location
#[test]
fn test_archive_default_output() {
    let world = world_with_drafts();

    let mut cmd = cargo_bin_cmd!("evalmetrics");
    world.configure_command(&mut cmd);
    cmd.arg("archive")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Created reports/draft_data.zip ("));

    let bytes = std::fs::read(world.path("reports/draft_data.zip")).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
}

/// Test: archive of a missing folder fails
#[test]
fn test_archive_missing_folder_fails() {
    let world = TestWorld::new();

    let result = world
        .run(&["archive", "--folder", "nowhere"])
        .expect("Failed to run archive");

    assert!(!result.success());
    assert!(result.stderr().contains("Draft data folder not found: nowhere"));
}

/// Test: download returns a base64 zip attachment
#[test]
fn test_download_success_response() {
    let world = world_with_drafts();

    let result = world.run(&["download"]).expect("Failed to run download");
    assert!(result.success(), "download failed: {}", result.stderr());

    let response = result.json().unwrap();
    assert_response_status(&response, 200).unwrap();
    assert_eq!(response["isBase64Encoded"], true);
    assert_eq!(
        response["headers"]["Content-Disposition"],
        "attachment; filename=\"eval_draft_data.zip\""
    );

    let bytes = STANDARD
        .decode(response["body"].as_str().unwrap())
        .unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(archive.by_name("draft_data/thread-1/draft.json").is_ok());
}

/// Test: download of a missing folder is a 404 response, not a crash
#[test]
fn test_download_missing_folder_is_404() {
    let world = TestWorld::new().with_env("DRAFT_DATA_FOLDER", "absent");

    let result = world.run(&["download"]).expect("Failed to run download");
    assert!(result.success());

    let response = result.json().unwrap();
    assert_response_status(&response, 404).unwrap();
    let body: serde_json::Value =
        serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["error"], "Draft data folder not found: absent");
}
