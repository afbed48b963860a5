#![forbid(unsafe_code)]

//! Deterministic row fixtures.

/// `n` distinct, ordered row labels: `row-0000`, `row-0001`, ...
#[must_use]
pub fn rows(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("row-{i:04}")).collect()
}

/// The expected rendered window over `rows(n)` for `[start, end)`:
/// `Some(label)` inside the dataset, nothing past its end.
#[must_use]
pub fn window_of(n: usize, start: usize, end: usize) -> Vec<Option<String>> {
    (start..end.min(n)).map(|i| Some(format!("row-{i:04}"))).collect()
}
