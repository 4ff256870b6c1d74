//! Chain behavior tests against a real temporary backup directory

use tagmend_history::{
    BucketClock, ChainStatus, RecordKind, RestorePointKind, RestoreTarget, VersionChain,
};

const FILE: &str = "news_s_index_d_html";
const BUCKET: &str = "2026-08-25";

fn chain_in(dir: &tempfile::TempDir) -> VersionChain {
    VersionChain::new(dir.path(), BucketClock::Utc)
}

/// Simulates the service layer: applies a single-line edit to `content` and
/// records it, returning the new content.
fn edit_line(chain: &VersionChain, content: &str, line: usize, after: &str) -> String {
    let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
    let before = lines[line - 1].clone();
    lines[line - 1] = after.to_string();
    let post = lines.join("\n");
    chain
        .record_edit(FILE, BUCKET, line, &before, after, content, &post)
        .unwrap();
    post
}

#[test]
fn test_first_edit_writes_base_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let outcome = chain
        .record_edit(FILE, BUCKET, 1, "<p>a</p>", "<p>b</p>", "<p>a</p>", "<p>b</p>")
        .unwrap();

    assert_eq!(outcome.kind, RecordKind::Snapshot);
    assert_eq!(outcome.sequence, 0);
    assert!(dir
        .path()
        .join(FILE)
        .join(BUCKET)
        .join("base.html")
        .exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(FILE).join(BUCKET).join("latest.html")).unwrap(),
        "<p>b</p>"
    );
    assert_eq!(chain.latest(FILE, BUCKET).unwrap().unwrap(), "<p>b</p>");
}

#[test]
fn test_reconstruction_tracks_live_content_through_many_edits() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let mut live = "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>".to_string();
    live = edit_line(&chain, &live, 2, "<li>a2</li>");
    for i in 0..6 {
        live = edit_line(&chain, &live, 3, &format!("<li>b{}</li>", i));
    }
    live = edit_line(&chain, &live, 4, "<li>c2</li>");

    assert_eq!(
        chain.reconstruct(FILE, BUCKET, u32::MAX).unwrap().unwrap(),
        live
    );
    assert_eq!(chain.status(FILE, BUCKET, &live).unwrap(), ChainStatus::Consistent);
    assert!(chain.verify(FILE, BUCKET, &live).unwrap());
}

#[test]
fn test_reconstruct_at_intermediate_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>one</p>".to_string();
    let v1 = edit_line(&chain, &v0, 1, "<p>two</p>");
    let v2 = edit_line(&chain, &v1, 1, "<p>three</p>");

    // Sequence 0 is the base, written at the first edit, i.e. already v1.
    assert_eq!(chain.reconstruct(FILE, BUCKET, 0).unwrap().unwrap(), v1);
    assert_eq!(chain.reconstruct(FILE, BUCKET, 1).unwrap().unwrap(), v2);
    assert!(chain.reconstruct(FILE, "2026-01-01", 5).unwrap().is_none());
}

#[test]
fn test_divergence_produces_snapshot_then_consistent_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>one</p>\n<p>two</p>".to_string();
    let v1 = edit_line(&chain, &v0, 1, "<p>ONE</p>");

    // Someone edits the file outside the editor.
    let external = format!("{}\n<p>extra</p>", v1);
    assert_eq!(
        chain.status(FILE, BUCKET, &external).unwrap(),
        ChainStatus::Diverged
    );

    let post = external.replace("two", "TWO");
    let outcome = chain
        .record_edit(FILE, BUCKET, 2, "<p>two</p>", "<p>TWO</p>", &external, &post)
        .unwrap();

    assert_eq!(outcome.kind, RecordKind::Snapshot);
    assert!(outcome.sequence > 0);

    // The rebase snapshot is the new effective baseline.
    assert_eq!(
        chain.reconstruct(FILE, BUCKET, u32::MAX).unwrap().unwrap(),
        post
    );
    assert!(chain.verify(FILE, BUCKET, &post).unwrap());

    // And the chain keeps accepting plain diffs afterwards.
    let v3 = edit_line(&chain, &post, 1, "<p>1</p>");
    assert!(chain.verify(FILE, BUCKET, &v3).unwrap());
}

#[test]
fn test_diffs_resume_after_rebase_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>a</p>".to_string();
    edit_line(&chain, &v0, 1, "<p>b</p>");

    let external = "<p>hijacked</p>".to_string();
    let post = "<p>fixed</p>".to_string();
    chain
        .record_edit(FILE, BUCKET, 1, "<p>hijacked</p>", "<p>fixed</p>", &external, &post)
        .unwrap();

    let mut lines: Vec<String> = post.split('\n').map(String::from).collect();
    let before = lines[0].clone();
    lines[0] = "<p>final</p>".to_string();
    let v3 = lines.join("\n");
    let outcome = chain
        .record_edit(FILE, BUCKET, 1, &before, "<p>final</p>", &post, &v3)
        .unwrap();

    // Consistent again: the probe accepted a diff, not a snapshot.
    assert_eq!(outcome.kind, RecordKind::Diff);
    assert_eq!(
        chain.reconstruct(FILE, BUCKET, u32::MAX).unwrap().unwrap(),
        v3
    );
}

#[test]
fn test_restore_points_list_base_diffs_and_rebases() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>a</p>".to_string();
    let v1 = edit_line(&chain, &v0, 1, "<p>b</p>");
    let v2 = edit_line(&chain, &v1, 1, "<p>c</p>");
    let _v3 = edit_line(&chain, &v2, 1, "<p>d</p>");
    chain
        .record_edit(FILE, BUCKET, 1, "x", "y", "<p>external</p>", "<p>rebased</p>")
        .unwrap();

    let points = chain.restore_points(FILE, BUCKET).unwrap();
    let kinds: Vec<RestorePointKind> = points.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RestorePointKind::Base,
            RestorePointKind::Diff,
            RestorePointKind::Diff,
            RestorePointKind::Rebase,
        ]
    );
    assert_eq!(points[0].sequence, 0);
    assert_eq!(points[1].line_number, Some(1));
    assert!(points[1].timestamp.is_some());
    assert_eq!(points[3].sequence, 3);
}

#[test]
fn test_restore_diff_target_reconstructs_and_backs_up_live() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>one</p>".to_string();
    let v1 = edit_line(&chain, &v0, 1, "<p>two</p>");
    let v2 = edit_line(&chain, &v1, 1, "<p>three</p>");
    let v3 = edit_line(&chain, &v2, 1, "<p>four</p>");

    // Diff 1 produced v2; restoring to it rolls the last edit back.
    let restored = chain
        .restore(FILE, BUCKET, RestoreTarget::Diff(1), &v3)
        .unwrap();
    assert_eq!(restored, v2);

    // The pre-restore live content went into today's bucket as a snapshot.
    let today = chain.current_bucket();
    let points = chain.restore_points(FILE, &today).unwrap();
    assert!(points
        .iter()
        .any(|p| p.kind == RestorePointKind::Rebase));
}

#[test]
fn test_restore_base_and_rebase_targets_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>start</p>".to_string();
    let v1 = edit_line(&chain, &v0, 1, "<p>second</p>");
    chain
        .record_edit(FILE, BUCKET, 1, "x", "y", "<p>external</p>", "<p>rebased</p>")
        .unwrap();

    assert_eq!(
        chain.restore(FILE, BUCKET, RestoreTarget::Base, &v1).unwrap(),
        v1
    );
    assert_eq!(
        chain
            .restore(FILE, BUCKET, RestoreTarget::Rebase(1), "<p>live</p>")
            .unwrap(),
        "<p>rebased</p>"
    );
}

#[test]
fn test_restore_unknown_target_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    let v0 = "<p>a</p>".to_string();
    edit_line(&chain, &v0, 1, "<p>b</p>");

    assert!(chain
        .restore(FILE, BUCKET, RestoreTarget::Diff(99), "<p>b</p>")
        .is_err());
    assert!(chain
        .restore(FILE, "2026-01-01", RestoreTarget::Base, "<p>b</p>")
        .is_err());
}

#[test]
fn test_chains_are_isolated_per_file_and_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_in(&dir);

    chain
        .record_edit("file_a", BUCKET, 1, "a", "b", "a", "b")
        .unwrap();
    chain
        .record_edit("file_b", BUCKET, 1, "x", "y", "x", "y")
        .unwrap();
    chain
        .record_edit("file_a", "2026-08-26", 1, "b", "c", "b", "c")
        .unwrap();

    assert_eq!(
        chain.reconstruct("file_a", BUCKET, u32::MAX).unwrap().unwrap(),
        "b"
    );
    assert_eq!(
        chain
            .reconstruct("file_a", "2026-08-26", u32::MAX)
            .unwrap()
            .unwrap(),
        "c"
    );
    assert_eq!(
        chain.reconstruct("file_b", BUCKET, u32::MAX).unwrap().unwrap(),
        "y"
    );
    assert!(chain.reconstruct("file_c", BUCKET, u32::MAX).unwrap().is_none());
}
