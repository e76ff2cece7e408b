use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Canonical text form used for transcripts, chunks and ASR output alike:
/// lowercase, Unicode NFC, hyphens and em-dashes turned into spaces, all
/// other punctuation stripped, whitespace collapsed to single spaces.
///
/// The function is idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let folded: String = lowered
        .nfc()
        .map(|c| if c == '-' || c == '—' { ' ' } else { c })
        .filter(|c| c.general_category_group() != GeneralCategoryGroup::Punctuation)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized words of `text`, newest last.
pub fn normalized_words(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Don't Stop, now!"), "dont stop now");
    }

    #[test]
    fn hyphens_become_spaces() {
        assert_eq!(normalize("real-time auto—pilot"), "real time auto pilot");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  say \t no\n to  someone "), "say no to someone");
    }

    #[test]
    fn unicode_is_composed() {
        // Decomposed e + combining acute composes to a single code point.
        let decomposed = "cafe\u{0301}";
        assert_eq!(normalize(decomposed), "café");
    }

    #[test]
    fn idempotent_on_arbitrary_inputs() {
        for s in [
            "The ability to say NO.",
            "have you ever—struggled?",
            "  multi   space  ",
            "café né",
            "",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn empty_and_punctuation_only_become_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!.,;"), "");
    }
}
