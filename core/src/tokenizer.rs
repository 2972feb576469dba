use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    // Stored the way tokens look after stripping, so "don't" is "dont".
    static ref STOPWORDS: HashSet<String> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().map(|w| w.replace('\'', "")).collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Turns raw page text into index tokens.
///
/// Each whitespace-separated word is lower-cased, stripped of everything
/// outside `[a-z0-9]`, and dropped if that leaves it empty or a stop word.
/// Accent folding and stemming are off by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    /// Decompose (NFKD) and drop combining marks before stripping, so
    /// "café" becomes "cafe" instead of "caf".
    pub fold_accents: bool,
    /// Reduce each kept token to its English stem.
    pub stem: bool,
}

impl Preprocessor {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().filter_map(|word| self.clean(word)).collect()
    }

    /// Cleans a single query word exactly as indexed tokens are cleaned.
    /// Returns `None` when nothing indexable is left, or when `term` holds
    /// more than one whitespace-separated word.
    pub fn normalize_term(&self, term: &str) -> Option<String> {
        let mut words = term.split_whitespace();
        match (words.next(), words.next()) {
            (Some(word), None) => self.clean(word),
            _ => None,
        }
    }

    /// Cleans a completion prefix with the indexing character rules but
    /// without stop-word removal or stemming, since a partial word is
    /// neither.
    pub fn normalize_prefix(&self, prefix: &str) -> Option<String> {
        let stripped = self.fold_and_strip(prefix.trim());
        if stripped.is_empty() { None } else { Some(stripped) }
    }

    fn clean(&self, word: &str) -> Option<String> {
        let stripped = self.fold_and_strip(word);
        if stripped.is_empty() || is_stopword(&stripped) {
            return None;
        }
        if self.stem {
            Some(STEMMER.stem(&stripped).into_owned())
        } else {
            Some(stripped)
        }
    }

    fn fold_and_strip(&self, word: &str) -> String {
        let lowered = if self.fold_accents {
            word.nfkd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
        } else {
            word.to_lowercase()
        };
        NON_ALNUM.replace_all(&lowered, "").into_owned()
    }
}

/// Tokenize with the default [`Preprocessor`].
pub fn tokenize(text: &str) -> Vec<String> {
    Preprocessor::default().tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("A Stack, is LIFO!");
        assert_eq!(t, vec!["stack", "lifo"]);
    }

    #[test]
    fn punctuation_inside_words_is_removed() {
        assert_eq!(tokenize("linked-list 2D-array don't"), vec!["linkedlist", "2darray"]);
    }

    #[test]
    fn prefix_keeps_stop_words_and_partial_stems() {
        let p = Preprocessor { fold_accents: true, stem: true };
        assert_eq!(p.normalize_prefix(" Café ").as_deref(), Some("cafe"));
        assert_eq!(p.normalize_prefix("The").as_deref(), Some("the"));
        assert_eq!(p.normalize_prefix("runni").as_deref(), Some("runni"));
        assert_eq!(p.normalize_prefix("?!"), None);
        assert_eq!(Preprocessor::default().normalize_prefix("Café").as_deref(), Some("caf"));
    }
}
