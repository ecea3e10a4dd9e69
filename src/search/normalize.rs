use regex::Regex;
use std::sync::LazyLock;

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,/#!$%^&*;:{}=\-_`~()]").expect("valid regex"));

/// Lowercases a stop name and strips punctuation so that "Pala." and "PALA"
/// compare equal.
pub fn normalize(input: &str) -> String {
    PUNCTUATION_RE
        .replace_all(&input.to_lowercase(), "")
        .trim()
        .to_string()
}

/// True when either string contains the other. Empty strings never match.
pub fn loosely_matches(candidate: &str, query: &str) -> bool {
    if candidate.is_empty() || query.is_empty() {
        return false;
    }
    candidate.contains(query) || query.contains(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_and_punctuation() {
        assert_eq!(normalize("  Pala, (Kottayam).  "), "pala kottayam");
        assert_eq!(normalize("Thiruvananthapuram-Central"), "thiruvananthapuramcentral");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn equal_after_normalization_means_equal_match() {
        let a = normalize("ERNAKULAM!");
        let b = normalize("ernakulam");
        assert_eq!(a, b);
        assert!(loosely_matches(&a, &b));
    }

    #[test]
    fn matches_in_both_directions() {
        assert!(loosely_matches("kochi ksrtc bus stand", "kochi"));
        assert!(loosely_matches("kochi", "kochi ksrtc bus stand"));
        assert!(!loosely_matches("kollam", "kochi"));
        assert!(!loosely_matches("", "kochi"));
        assert!(!loosely_matches("kochi", ""));
    }
}
