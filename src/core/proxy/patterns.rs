//! Phrase lists used to recognize proxy failures in error text
//!
//! Matching is a case-insensitive substring test. Lists keep their insertion
//! order so the first matching phrase is deterministic for logging.

/// Phrases emitted by socket layers when a TCP connection is refused
pub const DEFAULT_REFUSAL_PHRASES: &[&str] = &["connection refused", "Verbindung verweigerte"];

/// Fingerprints of an HTTP/2 response reaching an HTTP/1 parser through a proxy
pub const DEFAULT_HTTP2_FINGERPRINTS: &[&str] = &[
    "invalid status line",
    "HTTP/2 200 OK",
    "response ended prematurely",
];

/// Ordered, extensible set of case-insensitive substring patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
    lowered: Vec<String>,
}

impl PhraseSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from any list of phrases, skipping blank entries
    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        set.extend(phrases);
        set
    }

    /// Default connection-refused phrases
    pub fn refusal_defaults() -> Self {
        Self::from_phrases(DEFAULT_REFUSAL_PHRASES.iter().copied())
    }

    /// Default HTTP/2 leak fingerprints
    pub fn http2_defaults() -> Self {
        Self::from_phrases(DEFAULT_HTTP2_FINGERPRINTS.iter().copied())
    }

    /// Append a phrase. Blank phrases would match everything and are ignored.
    pub fn push(&mut self, phrase: impl Into<String>) {
        let phrase = phrase.into();
        if phrase.trim().is_empty() {
            return;
        }
        self.lowered.push(phrase.to_lowercase());
        self.phrases.push(phrase);
    }

    pub fn extend<I, S>(&mut self, phrases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for phrase in phrases {
            self.push(phrase);
        }
    }

    /// Return the first phrase contained in `text`, ignoring case
    pub fn find_in(&self, text: &str) -> Option<&str> {
        if self.phrases.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.lowered
            .iter()
            .position(|needle| haystack.contains(needle.as_str()))
            .map(|idx| self.phrases[idx].as_str())
    }

    pub fn matches(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_defaults_match_both_languages() {
        let set = PhraseSet::refusal_defaults();
        assert_eq!(set.len(), 2);
        assert!(set.matches("tcp connect error: Connection Refused (os error 111)"));
        assert!(set.matches("Es konnte keine Verbindung hergestellt werden, da der Zielcomputer die VERBINDUNG VERWEIGERTE."));
        assert!(!set.matches("dns error: failed to lookup address information"));
    }

    #[test]
    fn test_find_in_returns_first_phrase_in_order() {
        let set = PhraseSet::http2_defaults();
        let text = "Received an invalid status line: HTTP/2 200 OK";
        assert_eq!(set.find_in(text), Some("invalid status line"));
        assert_eq!(set.find_in("got http/2 200 ok back"), Some("HTTP/2 200 OK"));
    }

    #[test]
    fn test_blank_phrases_are_ignored() {
        let mut set = PhraseSet::new();
        set.push("");
        set.push("   ");
        assert!(set.is_empty());
        assert!(!set.matches("anything"));
    }

    #[test]
    fn test_extend_adds_new_language() {
        let mut set = PhraseSet::refusal_defaults();
        set.extend(["connexion refusée"]);
        assert_eq!(set.len(), 3);
        assert!(set.matches("Connexion Refusée par l'hôte distant"));
        assert_eq!(set.phrases()[2], "connexion refusée");
    }
}
