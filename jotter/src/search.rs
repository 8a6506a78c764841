//! Word-based search patterns with negation
//!
//! A pattern is a list of whitespace-separated words. Each word is a
//! required substring of the searched text, except words of the form
//! `!word`, which must *not* occur anywhere in the text. A lone `"!"`
//! is a required term, not a negation. An empty pattern matches
//! everything.
//!
//! Case folding is split between the two sides: patterns are stored in
//! lower case ([`Pattern::parse`] folds for you), and the searched text
//! must be folded by the caller before matching.

/// A single search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// The word must occur as a substring of the text
    Required(String),
    /// The word must not occur anywhere in the text
    Negated(String),
}

impl Term {
    fn from_word(word: &str) -> Self {
        // "!" on its own is a required term; negation needs a remainder.
        match word.strip_prefix('!') {
            Some(rest) if !rest.is_empty() => Term::Negated(rest.to_string()),
            _ => Term::Required(word.to_string()),
        }
    }
}

/// A parsed search pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    terms: Vec<Term>,
}

impl Pattern {
    /// Parse raw search-box text: lower-case it and split on whitespace
    pub fn parse(raw: &str) -> Self {
        Self::from_words(raw.to_lowercase().split_whitespace())
    }

    /// Build a pattern from words that are already lower-cased
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: words
                .into_iter()
                .map(|w| Term::from_word(w.as_ref()))
                .collect(),
        }
    }

    /// An empty pattern, which matches every note
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if the pattern has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The parsed terms, in input order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Match against text that has already been lower-cased by the caller
    pub fn matches(&self, lowercased_text: &str) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Required(word) => lowercased_text.contains(word.as_str()),
            Term::Negated(word) => !lowercased_text.contains(word.as_str()),
        })
    }
}
