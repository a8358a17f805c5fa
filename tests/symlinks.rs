//! End-to-end runs of the `symlinks` and `store` subcommands.

mod common;

use common::{SnapshotJson, TestFixture};

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

fn tool_state(hash: &str, content: &str) -> SnapshotJson {
    let store_file = format!("nix/store/{hash}-pkg-1.0/bin/tool");
    SnapshotJson::default()
        .link("bin/tool", Some(&format!("/{store_file}")))
        .file(&store_file, Some(content))
}

#[test]
fn rebuilt_package_is_identical_and_consistently_mapped() {
    let fixture =
        TestFixture::new(&tool_state(HASH_A, "H"), &tool_state(HASH_B, "H")).expect("fixture");
    let result = fixture.run("symlinks", &[]).expect("run symlinks");
    assert!(result.output.status.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Identical final content: 1"));

    let report = result.report.expect("report written");
    assert_eq!(report["schema_version"], 1);
    let summary = &report["summary"];
    assert_eq!(summary["matching_paths"], 1);
    assert_eq!(summary["identical_final_content"], 1);
    assert_eq!(summary["different_final_content"], 0);
    assert_eq!(summary["different_targets"], 0);
    assert_eq!(summary["store_path_analysis"]["consistent_mappings"], 1);
    assert_eq!(summary["store_path_analysis"]["inconsistent_mappings"], 0);
    assert_eq!(
        report["store_path_analysis"]["consistent_package_mappings"]["pkg-1.0"],
        "pkg-1.0"
    );
    let example = &report["symlink_analysis"]["identical_final_content"][0];
    assert_eq!(example["state1_path"], "bin/tool");
    assert_eq!(example["state1_resolution"]["final_hash"], "H");
    assert_eq!(example["state2_resolution"]["status"], "file");
}

#[test]
fn cycles_and_depth_exhaustion_terminate() {
    let mut state = SnapshotJson::default()
        .link("a", Some("/b"))
        .link("b", Some("/a"));
    for i in 0..30 {
        state = state.link(&format!("chain/l{i:02}"), Some(&format!("l{:02}", i + 1)));
    }
    state = state.file("chain/l30", Some("END"));

    let fixture = TestFixture::new(&state, &state).expect("fixture");
    let result = fixture.run("symlinks", &[]).expect("run symlinks");
    assert!(result.output.status.success(), "stderr: {}", result.stderr());
    let report = result.report.expect("report written");
    let broken = &report["symlink_analysis"]["broken_in_both"];
    let statuses: Vec<&str> = broken
        .as_array()
        .expect("broken list")
        .iter()
        .filter_map(|m| m["state1_resolution"]["status"].as_str())
        .collect();
    assert!(statuses.contains(&"cycle"));
    assert!(statuses.contains(&"max_depth"));
    assert_eq!(report["summary"]["different_final_content"], 0);
}

#[test]
fn max_depth_flag_extends_the_hop_bound() {
    let mut state = SnapshotJson::default();
    for i in 0..30 {
        state = state.link(&format!("l{i:02}"), Some(&format!("l{:02}", i + 1)));
    }
    state = state.file("l30", Some("END"));

    let fixture = TestFixture::new(&state, &state).expect("fixture");
    let result = fixture
        .run("symlinks", &["--max-depth", "64"])
        .expect("run symlinks");
    let report = result.report.expect("report written");
    assert_eq!(report["summary"]["identical_final_content"], 30);
    assert_eq!(report["summary"]["broken_links"]["in_both_states"], 0);
}

#[test]
fn exclusions_remove_paths_before_matching() {
    let state1 = tool_state(HASH_A, "H").link("var/log/current", Some("x"));
    let state2 = tool_state(HASH_B, "H2").link("var/log/current", Some("y"));
    let fixture = TestFixture::new(&state1, &state2).expect("fixture");
    let exclude = fixture
        .write_text("exclusions.txt", "# noisy\nvar/log/\n")
        .expect("write exclusions");
    let exclude = exclude.display().to_string();

    let result = fixture
        .run("symlinks", &["--exclude", &exclude])
        .expect("run symlinks");
    let report = result.report.expect("report written");
    assert_eq!(report["summary"]["total_symlinks_state1"], 1);
    assert_eq!(report["summary"]["different_final_content"], 1);
}

#[test]
fn malformed_snapshot_aborts_without_report() {
    let fixture =
        TestFixture::new(&SnapshotJson::default(), &SnapshotJson::default()).expect("fixture");
    std::fs::write(fixture.path("state2.json"), "{\"files\": [").expect("corrupt snapshot");
    let result = fixture.run("symlinks", &[]).expect("run symlinks");
    assert!(!result.output.status.success());
    assert!(result.report.is_none());
    assert!(result.stderr().contains("parse snapshot JSON"));
}

#[test]
fn store_subcommand_compares_store_file_content() {
    let state1 = tool_state(HASH_A, "H").file(
        &format!("nix/store/{HASH_A}-pkg-1.0/share/gone"),
        Some("G"),
    );
    let state2 = tool_state(HASH_B, "H");
    let fixture = TestFixture::new(&state1, &state2).expect("fixture");
    let result = fixture.run("store", &[]).expect("run store");
    assert!(result.output.status.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("Identical content: 1"));
    let report = result.report.expect("diff written");
    assert_eq!(
        report["only_in_state1"][0]["normalized_path"],
        "nix/store/HASH-pkg-1.0/share/gone"
    );
}
