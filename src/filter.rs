//! Sentence quality filtering by readability consensus.
//!
//! Pages scraped from the open web carry navigation stubs, cookie banners and
//! other fragments that read like first-grade prose. Each sentence is scored
//! with a consensus of standard readability grades and dropped when the
//! consensus falls below the 5th-6th grade band. The thresholds are a fixed
//! policy, not configuration.

/// Consensus grade below which a sentence is considered noise.
const MIN_GRADE: i32 = 5;

/// Split `text` into sentences and keep those that pass the quality check.
///
/// Never fails; with pathological input it may return an empty vector, which
/// the pipeline maps to the apology sentinel.
pub fn evaluate_sentence_quality(text: &str) -> Vec<String> {
    text.split('.')
        .filter_map(|raw| {
            let sentence = raw.trim();
            if sentence.is_empty() {
                return None;
            }
            let sentence = format!("{}.", sentence);
            if consensus_grade(&sentence) >= MIN_GRADE {
                Some(sentence)
            } else {
                None
            }
        })
        .collect()
}

/// Median of the rounded Flesch-Kincaid, Coleman-Liau and ARI grades.
pub fn consensus_grade(text: &str) -> i32 {
    let stats = TextStats::of(text);
    if stats.words == 0 {
        return 0;
    }
    let mut grades = [
        stats.flesch_kincaid_grade().round() as i32,
        stats.coleman_liau_index().round() as i32,
        stats.automated_readability_index().round() as i32,
    ];
    grades.sort_unstable();
    grades[1]
}

/// Basic counts a readability formula needs.
struct TextStats {
    words: usize,
    letters: usize,
    syllables: usize,
    sentences: usize,
}

impl TextStats {
    fn of(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let letters = words
            .iter()
            .map(|w| w.chars().filter(|c| c.is_alphanumeric()).count())
            .sum();
        let syllables = words.iter().map(|w| count_syllables(w)).sum();
        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
            .count()
            .max(1);
        Self {
            words: words.len(),
            letters,
            syllables,
            sentences,
        }
    }

    fn flesch_kincaid_grade(&self) -> f64 {
        let words = self.words as f64;
        let sentences = self.sentences as f64;
        let syllables = self.syllables as f64;
        0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59
    }

    fn coleman_liau_index(&self) -> f64 {
        let words = self.words as f64;
        let letters_per_100 = self.letters as f64 / words * 100.0;
        let sentences_per_100 = self.sentences as f64 / words * 100.0;
        0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8
    }

    fn automated_readability_index(&self) -> f64 {
        let words = self.words as f64;
        let sentences = self.sentences as f64;
        let chars = self.letters as f64;
        4.71 * (chars / words) + 0.5 * (words / sentences) - 21.43
    }
}

/// Heuristic syllable count: contiguous vowel groups, with a silent final e.
fn count_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if word.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| "aeiouy".contains(c);
    let mut count = 0;
    let mut prev_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_syllables_for_common_words() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("paper"), 2);
        assert_eq!(count_syllables("infrastructure"), 4);
        assert_eq!(count_syllables("queue"), 1);
    }

    #[test]
    fn trivial_sentences_are_dropped() {
        let kept = evaluate_sentence_quality("Go up. Sit on it. I am ok.");
        assert!(kept.is_empty(), "kept: {:?}", kept);
    }

    #[test]
    fn substantive_sentences_are_kept() {
        let text = "The comprehensive infrastructure modernization initiative \
                    demonstrated measurable improvements across distributed \
                    computational environments.";
        let kept = evaluate_sentence_quality(text);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].starts_with("The comprehensive"));
        assert!(kept[0].ends_with('.'));
    }

    #[test]
    fn mixed_text_keeps_only_complex_sentences() {
        let text = "Ok. The regulatory framework introduces significant compliance \
                    obligations for multinational technology corporations operating \
                    internationally.";
        let kept = evaluate_sentence_quality(text);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].contains("regulatory framework"));
    }

    #[test]
    fn empty_input_yields_no_sentences() {
        assert!(evaluate_sentence_quality("").is_empty());
        assert!(evaluate_sentence_quality("   ").is_empty());
    }
}
