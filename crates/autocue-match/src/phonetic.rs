use crate::cache::LruCache;

/// Phonetic letter groups by gross articulation class. Substituting two
/// letters that share any group is free; letters absent from every group
/// (h, and anything non-ASCII) cost a full substitution unless identical.
/// `p` intentionally sits in both the labial-plosive and fricative groups.
/// The table is fixed for the lifetime of a session.
const PHONETIC_GROUPS: [&[u8]; 11] = [
    b"aeiouy", // vowels
    b"bp",     // labial plosives
    b"ckq",    // velars
    b"dt",     // dentals
    b"lr",     // liquids
    b"mn",     // nasals
    b"gj",     // soft sibilants
    b"fpv",    // labial fricatives
    b"sxz",    // hard sibilants
    b"csz",    // aspirates
    b"w",      // glide
];

fn letter_mask(c: char) -> u16 {
    if !c.is_ascii_lowercase() {
        return 0;
    }
    let byte = c as u8;
    let mut mask = 0u16;
    for (i, group) in PHONETIC_GROUPS.iter().enumerate() {
        if group.contains(&byte) {
            mask |= 1 << i;
        }
    }
    mask
}

fn substitution_cost(a: char, b: char) -> u32 {
    if a == b || letter_mask(a) & letter_mask(b) != 0 {
        0
    } else {
        1
    }
}

/// Levenshtein distance over letters with group-aware substitution cost.
/// Insertions and deletions cost 1.
pub fn word_distance(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len() as u32;
    }
    if b_chars.is_empty() {
        return a_chars.len() as u32;
    }

    let mut previous: Vec<u32> = (0..=b_chars.len() as u32).collect();
    let mut current = vec![0u32; b_chars.len() + 1];

    for (i, &ac) in a_chars.iter().enumerate() {
        current[0] = i as u32 + 1;
        for (j, &bc) in b_chars.iter().enumerate() {
            let substitute = previous[j] + substitution_cost(ac, bc);
            let delete = previous[j + 1] + 1;
            let insert = current[j] + 1;
            current[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Word similarity in [0, 1]: `1 - d / max(|a|, |b|)`.
pub fn word_similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    (1.0 - word_distance(a, b) as f32 / longest as f32).clamp(0.0, 1.0)
}

/// Sentence-level phonetic similarity with a memoized word-distance table.
pub struct PhoneticScorer {
    word_cache: LruCache<(String, String), u32>,
}

impl PhoneticScorer {
    pub fn new(word_cache_entries: usize) -> Self {
        Self {
            word_cache: LruCache::new(word_cache_entries),
        }
    }

    fn word_similarity_cached(&mut self, a: &str, b: &str) -> f32 {
        let longest = a.chars().count().max(b.chars().count());
        if longest == 0 {
            return 1.0;
        }
        // Distance is symmetric; canonical key order doubles the hit rate.
        let key = if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        };
        let distance = match self.word_cache.get(&key) {
            Some(&d) => d,
            None => {
                let d = word_distance(a, b);
                self.word_cache.insert(key, d);
                d
            }
        };
        (1.0 - distance as f32 / longest as f32).clamp(0.0, 1.0)
    }

    /// Similarity between two word sequences in [0, 1]: a word-level
    /// Levenshtein where substituting words costs `1 - word_similarity` and
    /// inserting or deleting a word costs 1, normalized by the longer length.
    pub fn sentence_score(&mut self, query: &[String], candidate: &[String]) -> f32 {
        let (m, n) = (query.len(), candidate.len());
        if m == 0 && n == 0 {
            return 1.0;
        }
        if m == 0 || n == 0 {
            return 0.0;
        }

        let mut previous: Vec<f32> = (0..=n).map(|j| j as f32).collect();
        let mut current = vec![0f32; n + 1];

        for (i, q_word) in query.iter().enumerate() {
            current[0] = i as f32 + 1.0;
            for (j, c_word) in candidate.iter().enumerate() {
                let substitute =
                    previous[j] + (1.0 - self.word_similarity_cached(q_word, c_word));
                let delete = previous[j + 1] + 1.0;
                let insert = current[j] + 1.0;
                current[j + 1] = substitute.min(delete).min(insert);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        (1.0 - previous[n] / m.max(n) as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn identical_words_have_zero_distance() {
        assert_eq!(word_distance("hands", "hands"), 0);
        assert_eq!(word_similarity("hands", "hands"), 1.0);
    }

    #[test]
    fn grouped_letters_substitute_for_free() {
        // d/t share the dental group, b/p the labial group.
        assert_eq!(word_distance("tried", "dried"), 0);
        assert_eq!(word_distance("bat", "pat"), 0);
        // Vowels interchange freely.
        assert_eq!(word_distance("no", "na"), 0);
    }

    #[test]
    fn ungrouped_letters_pay_full_cost() {
        // h belongs to no group.
        assert_eq!(word_distance("hat", "cat"), 1);
    }

    #[test]
    fn hence_vs_hands_matches_reference_arithmetic() {
        // h=h free, e~a vowels, n=n, c vs d costs 1, e vs s costs 1.
        assert_eq!(word_distance("hence", "hands"), 2);
        assert!((word_similarity("hence", "hands") - 0.6).abs() < 1e-6);
    }

    #[test]
    fn empty_word_edge_cases() {
        assert_eq!(word_distance("", "abc"), 3);
        assert_eq!(word_similarity("", ""), 1.0);
        assert_eq!(word_similarity("", "abc"), 0.0);
    }

    #[test]
    fn sentence_self_similarity_is_one() {
        let mut scorer = PhoneticScorer::new(1024);
        let q = words("let me see your hands");
        assert_eq!(scorer.sentence_score(&q, &q), 1.0);
    }

    #[test]
    fn sentence_score_is_bounded() {
        let mut scorer = PhoneticScorer::new(1024);
        let q = words("completely unrelated gibberish");
        let c = words("the ability to say no have you");
        let score = scorer.sentence_score(&q, &c);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn near_miss_hypothesis_scores_high() {
        let mut scorer = PhoneticScorer::new(1024);
        let q = words("let me see your hence");
        let c = words("let me see your hands");
        let score = scorer.sentence_score(&q, &c);
        // Four exact words and one 0.6-similar word over five words: 0.92.
        assert!(score >= 0.7, "expected >= 0.7, got {score}");
        assert!((score - 0.92).abs() < 1e-6);
    }

    #[test]
    fn empty_sequences() {
        let mut scorer = PhoneticScorer::new(1024);
        assert_eq!(scorer.sentence_score(&[], &[]), 1.0);
        assert_eq!(scorer.sentence_score(&[], &words("a b")), 0.0);
    }

    #[test]
    fn cache_returns_same_results() {
        let mut scorer = PhoneticScorer::new(16);
        let q = words("tried to say no");
        let c = words("dried to say no");
        let first = scorer.sentence_score(&q, &c);
        let second = scorer.sentence_score(&q, &c);
        assert_eq!(first, second);
        assert_eq!(first, 1.0);
    }
}
