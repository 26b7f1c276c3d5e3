//! Range value helpers.
//!
//! Range filters and aggregations carry their bounds as `from..to` strings.
//! An empty `from` means zero and an empty `to` means unbounded.

/// Lower bound used when the `from` side is empty.
pub const RANGE_ZERO: i64 = 0;

/// Upper bound used when the `to` side is empty.
pub const RANGE_INFINITE: i64 = -1;

/// Separator between the two bounds.
pub const RANGE_SEPARATOR: &str = "..";

/// Parse a `from..to` string into its bounds.
///
/// A missing or unparseable side falls back to [`RANGE_ZERO`] /
/// [`RANGE_INFINITE`] respectively.
pub fn parse(range: &str) -> (i64, i64) {
    let (from, to) = range.split_once(RANGE_SEPARATOR).unwrap_or((range, ""));
    (
        from.parse().unwrap_or(RANGE_ZERO),
        to.parse().unwrap_or(RANGE_INFINITE),
    )
}

/// Format bounds as a `from..to` string, eliding the default bounds.
pub fn format(from: i64, to: i64) -> String {
    let from = if from == RANGE_ZERO {
        String::new()
    } else {
        from.to_string()
    };
    let to = if to == RANGE_INFINITE {
        String::new()
    } else {
        to.to_string()
    };

    format!("{from}{RANGE_SEPARATOR}{to}")
}

/// Build consecutive `from..to` option strings of width `step`.
pub fn ranges(mut from: i64, to: i64, step: i64) -> Vec<String> {
    if step <= 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    while from < to {
        let next = from + step;
        out.push(format!("{from}{RANGE_SEPARATOR}{next}"));
        from = next;
    }

    out
}
