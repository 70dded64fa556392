//! End-to-end workflow against the case history fixture
//!
//! 1. Apply the built-in plan in memory and on disk
//! 2. Compare with the golden output
//! 3. Check rerun behavior and the untouched placeholder ranges

use case_history_patcher::{
    placeholders, shift_placeholders, PatchError, RuleOutcome, TextPatcher, WriteMode,
};
use std::fs;

fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn builtin() -> TextPatcher {
    TextPatcher::builtin().expect("built-in plan")
}

#[test]
fn builtin_plan_matches_golden_output() {
    let input = load_fixture("CaseHistory.js");
    let expected = load_fixture("CaseHistory.expected.js");

    let report = builtin().patch_text(&input);

    assert_eq!(report.patched, expected);
    assert_eq!(report.applied_count(), 6);
    assert!(report
        .rules
        .iter()
        .all(|r| r.outcome == RuleOutcome::Applied { occurrences: 1 }));
    // $49 is rewritten by the update-set rule, leaving $50..=$146
    assert_eq!(report.placeholders_shifted, 97);
    assert!(!report.looks_like_rerun());
}

#[test]
fn merged_field_replaces_both_flags() {
    let report = builtin().patch_text(&load_fixture("CaseHistory.js"));

    assert!(!report.patched.contains("family_history_consanguinity_present"));
    assert!(!report.patched.contains("family_history_consanguinity_absent"));
    assert!(report
        .patched
        .contains("family_history_consanguinity = COALESCE($47, family_history_consanguinity),"));
    assert!(report
        .patched
        .contains("family_history_economic_social_status = COALESCE($48, family_history_economic_social_status),"));
    assert!(report
        .patched
        .contains("family_history_home_atmosphere = COALESCE($49, family_history_home_atmosphere),"));
}

#[test]
fn where_clause_and_low_placeholders_untouched() {
    let input = load_fixture("CaseHistory.js");
    let report = builtin().patch_text(&input);

    assert!(report.patched.contains("WHERE id = $147 AND partner_id = $148"));
    assert!(report
        .patched
        .contains("'SELECT * FROM case_histories WHERE client_id = $1 ORDER BY created_at DESC'"));
    assert!(!report.patched.contains("$146"));

    let low_before: Vec<u32> = placeholders(&input)
        .map(|p| p.value)
        .filter(|v| *v <= 46)
        .collect();
    let low_after: Vec<u32> = placeholders(&report.patched)
        .map(|p| p.value)
        .filter(|v| *v <= 46)
        .collect();
    assert_eq!(low_before, low_after);
}

#[test]
fn patching_is_deterministic_on_fresh_copies() {
    let dir = tempfile::tempdir().unwrap();
    let input = load_fixture("CaseHistory.js");
    let patcher = builtin();

    let mut outputs = Vec::new();
    for name in ["first.js", "second.js"] {
        let path = dir.path().join(name);
        fs::write(&path, &input).unwrap();
        let _ = patcher.patch_file(&path, WriteMode::Write).unwrap();
        outputs.push(fs::read_to_string(&path).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn second_run_only_shifts_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CaseHistory.js");
    fs::write(&path, load_fixture("CaseHistory.js")).unwrap();
    let patcher = builtin();

    let first = patcher.patch_file(&path, WriteMode::Write).unwrap();
    let second = patcher.patch_file(&path, WriteMode::Write).unwrap();

    assert!(second.looks_like_rerun());
    assert!(second
        .rules
        .iter()
        .all(|r| r.outcome == RuleOutcome::AlreadyApplied));
    assert_eq!(second.original, first.patched);

    // Rule replacements are stable, only the renumbering differs
    let range = *patcher.renumber().unwrap();
    let (reshifted, _) = shift_placeholders(&first.patched, &range);
    assert_eq!(second.patched, reshifted);
    assert!(second
        .patched
        .contains("family_history_home_atmosphere = COALESCE($48, family_history_home_atmosphere),"));
}

#[test]
fn text_without_targets_is_only_renumbered() {
    let input = load_fixture("CaseHistory.js").replace("consanguinity", "kinship");
    let patcher = builtin();

    let report = patcher.patch_text(&input);
    let (renumbered, _) = shift_placeholders(&input, patcher.renumber().unwrap());

    assert_eq!(report.applied_count(), 0);
    assert_eq!(report.patched, renumbered);
}

#[test]
fn reformatted_target_reports_drift() {
    let input = load_fixture("CaseHistory.js").replace(
        "          family_history_consanguinity_present = COALESCE",
        "            family_history_consanguinity_present = COALESCE",
    );

    let report = builtin().patch_text(&input);
    let drifted: Vec<_> = report.drifted().map(|r| r.id.as_str()).collect();

    assert_eq!(drifted, ["update-set"]);
    assert!(report.patched.contains("family_history_consanguinity_present = COALESCE"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.js");

    let err = builtin().patch_file(&path, WriteMode::Write).unwrap_err();

    assert!(matches!(err, PatchError::Read { .. }));
    assert!(!path.exists());
}
