//! Property tests for the placeholder renumbering pass

use case_history_patcher::{placeholders, shift_placeholders, RenumberRange};
use proptest::prelude::*;

const CASE_HISTORY: RenumberRange = RenumberRange {
    start: 49,
    end: 146,
    shift: -1,
};

/// SQL-ish filler that never contains `$` or digits, so token boundaries are
/// exactly where the test puts them.
fn filler() -> impl Strategy<Value = String> {
    "[a-z_ (),=\n]{0,12}"
}

fn document() -> impl Strategy<Value = (Vec<(String, u32)>, String)> {
    (
        prop::collection::vec((filler(), 0u32..300), 0..40),
        filler(),
    )
}

fn render(parts: &[(String, u32)], tail: &str, map: impl Fn(u32) -> u32) -> String {
    let mut out = String::new();
    for (text, value) in parts {
        out.push_str(text);
        out.push('$');
        out.push_str(&map(*value).to_string());
    }
    out.push_str(tail);
    out
}

proptest! {
    #[test]
    fn in_range_tokens_shift_exactly_once((parts, tail) in document()) {
        let input = render(&parts, &tail, |v| v);
        let expected = render(&parts, &tail, |v| if (49..=146).contains(&v) { v - 1 } else { v });

        let (output, shifted) = shift_placeholders(&input, &CASE_HISTORY);

        prop_assert_eq!(output, expected);
        prop_assert_eq!(
            shifted,
            parts.iter().filter(|(_, v)| (49..=146).contains(v)).count()
        );
    }

    #[test]
    fn out_of_range_tokens_are_byte_identical((parts, tail) in document()) {
        let input = render(&parts, &tail, |v| v);
        let (output, _) = shift_placeholders(&input, &CASE_HISTORY);

        for (before, after) in placeholders(&input).zip(placeholders(&output)) {
            if !CASE_HISTORY.contains(before.value) {
                prop_assert_eq!(&input[before.span], &output[after.span]);
            }
        }
    }

    #[test]
    fn text_without_placeholders_is_unchanged(text in "[^$]{0,200}") {
        let (output, shifted) = shift_placeholders(&text, &CASE_HISTORY);
        prop_assert_eq!(output, text);
        prop_assert_eq!(shifted, 0);
    }

    #[test]
    fn token_count_is_preserved((parts, tail) in document()) {
        let input = render(&parts, &tail, |v| v);
        let (output, _) = shift_placeholders(&input, &CASE_HISTORY);
        prop_assert_eq!(placeholders(&output).count(), placeholders(&input).count());
    }
}
