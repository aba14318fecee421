use regex::{Regex, RegexBuilder};

use crate::error::ScanError;
use crate::normalize::{normalize, normalize_name};

/// Characters that count as "word" for boundary checks: any letter (`L*`),
/// any number (`N*`) or `_`. Combining marks (`M*`) and format characters
/// such as ZWJ are non-word, so Arabic harakat after a name do not glue it
/// to the next token.
const WORD_CHAR: &str = r"^[\p{L}\p{N}_]$";

/// Whole-word, case-insensitive, Unicode-aware matcher over a fixed name list.
///
/// Each name is trimmed and NFKC-normalized, then compiled once as an escaped
/// literal. A candidate occurrence counts only when both of its edges are word
/// boundaries: the characters on either side of the edge differ in
/// word-ness, the string edge being non-word. So `ann` does not match inside
/// `annette`, `Élodie` matches `ÉLODIE` and `محمد` matches `محمدٌ`.
///
/// Shared read-only across workers; `Send + Sync` comes from [`Regex`].
#[derive(Debug)]
pub struct NameMatcher {
    patterns: Vec<NamePattern>,
    word: Regex,
}

#[derive(Debug)]
struct NamePattern {
    /// The name exactly as the caller supplied it.
    original: String,
    regex: Regex,
}

impl NameMatcher {
    /// Compile `names`, dropping any that are blank after trimming and any
    /// repeats of an earlier entry.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, ScanError> {
        let mut patterns: Vec<NamePattern> = Vec::with_capacity(names.len());

        for name in names {
            let original = name.as_ref();
            if patterns.iter().any(|p| p.original == original) {
                continue;
            }

            let normalized = normalize_name(original);
            if normalized.is_empty() {
                continue;
            }

            let regex = RegexBuilder::new(&regex::escape(&normalized))
                .case_insensitive(true)
                .unicode(true)
                .build()
                .map_err(|e| ScanError::InvalidPattern(format!("{original}: {e}")))?;

            patterns.push(NamePattern {
                original: original.to_string(),
                regex,
            });
        }

        let word = Regex::new(WORD_CHAR).map_err(|e| ScanError::InvalidPattern(e.to_string()))?;

        Ok(Self { patterns, word })
    }

    /// Number of names that survived trimming and de-duplication.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Names found in `text`, in the order they were configured.
    ///
    /// `text` must already be [`normalize`]d.
    pub fn find(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.patterns
            .iter()
            .filter(|p| self.occurs_as_word(&p.regex, text))
            .map(|p| p.original.clone())
            .collect()
    }

    fn occurs_as_word(&self, regex: &Regex, text: &str) -> bool {
        let mut start = 0;
        while let Some(m) = regex.find_at(text, start) {
            if self.is_boundary(text, m.start()) && self.is_boundary(text, m.end()) {
                return true;
            }
            // Retry one character further on; candidates may overlap.
            match text[m.start()..].chars().next() {
                Some(c) => start = m.start() + c.len_utf8(),
                None => break,
            }
        }
        false
    }

    fn is_boundary(&self, text: &str, at: usize) -> bool {
        let before = text[..at].chars().next_back();
        let after = text[at..].chars().next();
        self.is_word(before) != self.is_word(after)
    }

    fn is_word(&self, c: Option<char>) -> bool {
        let mut buf = [0u8; 4];
        c.map(|c| self.word.is_match(c.encode_utf8(&mut buf)))
            .unwrap_or(false)
    }
}

/// One-shot convenience: normalize `text` and report which `names` occur in it.
pub fn find_matches<S: AsRef<str>>(text: &str, names: &[S]) -> Result<Vec<String>, ScanError> {
    let matcher = NameMatcher::new(names)?;
    Ok(matcher.find(&normalize(text)))
}
