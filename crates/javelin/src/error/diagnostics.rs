//! Helpers for turning syntax errors into readable messages.
//!
//! - "Did you mean?" suggestions for misspelled keywords
//! - Human-readable lists of expected tokens

/// Suggests the expected spelling closest to `actual`.
///
/// Only candidates above a similarity threshold are considered, so an identifier that
/// merely happens to share a prefix with a keyword does not produce a suggestion.
///
/// ```rust
/// use javelin::error::diagnostics::did_you_mean;
///
/// assert_eq!(did_you_mean("pubilc", &["public", "private"]), Some("public"));
/// assert_eq!(did_you_mean("x", &["public", "private"]), None);
/// ```
#[must_use]
pub fn did_you_mean<'a>(actual: &str, expected: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for &candidate in expected {
        let similarity = string_similarity(actual, candidate);
        if similarity < 0.6 {
            continue;
        }
        match best {
            Some((_, score)) if score >= similarity => {}
            _ => best = Some((candidate, similarity)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Formats a list of expected tokens as `a`, `a or b`, or `a, b, or c`.
///
/// Long lists are cut short: past `limit` entries the tail collapses into a count.
#[must_use]
pub fn format_expected_list(expected: &[&str], limit: usize) -> String {
    let shown = &expected[..expected.len().min(limit)];
    let hidden = expected.len() - shown.len();
    let mut result = match shown {
        [] => "nothing".to_string(),
        [only] => (*only).to_string(),
        [first, second] if hidden == 0 => format!("{first} or {second}"),
        [init @ .., last] => {
            let mut joined = init.join(", ");
            if hidden == 0 {
                joined.push_str(", or ");
                joined.push_str(last);
            } else {
                joined.push_str(", ");
                joined.push_str(last);
            }
            joined
        }
    };
    if hidden > 0 {
        result.push_str(&format!(", or one of {hidden} more"));
    }
    result
}

/// Normalized Levenshtein similarity in `0.0..=1.0`.
fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    let distance = previous[b.len()];

    let to_f64 = |n: usize| f64::from(u32::try_from(n).unwrap_or(u32::MAX));
    1.0 - to_f64(distance) / to_f64(longest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_you_mean_transposition() {
        assert_eq!(
            did_you_mean("improt", &["import", "package", "class"]),
            Some("import")
        );
    }

    #[test]
    fn test_did_you_mean_no_match() {
        assert_eq!(did_you_mean("zzz", &["class", "enum"]), None);
        assert_eq!(did_you_mean("class", &[]), None);
    }

    #[test]
    fn test_format_expected_list_shapes() {
        assert_eq!(format_expected_list(&[], 5), "nothing");
        assert_eq!(format_expected_list(&["';'"], 5), "';'");
        assert_eq!(format_expected_list(&["';'", "'='"], 5), "';' or '='");
        assert_eq!(
            format_expected_list(&["';'", "'='", "','"], 5),
            "';', '=', or ','"
        );
    }

    #[test]
    fn test_format_expected_list_truncates() {
        let list = ["a", "b", "c", "d"];
        assert_eq!(format_expected_list(&list, 2), "a, b, or one of 2 more");
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((string_similarity("class", "class") - 1.0).abs() < f64::EPSILON);
        assert!(string_similarity("class", "enum") < 0.5);
    }
}
