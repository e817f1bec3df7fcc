use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const EMBEDDED_FILE: &str = "sentences.json";
const INTERPUNCT: char = '\u{00b7}';

/// One goal sentence and where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceEntry {
    pub sentence: String,
    #[serde(default, alias = "ref")]
    pub reference: String,
}

impl SentenceEntry {
    pub fn new(sentence: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            reference: reference.into(),
        }
    }

    /// Shown when there is nothing to practise.
    pub fn fallback() -> Self {
        Self::new("The quick brown fox jumps over the lazy dog.", "")
    }

    /// Interpuncts are typed as a comma and a space.
    pub fn normalized(&self) -> Self {
        Self {
            sentence: self.sentence.replace(INTERPUNCT, ", "),
            reference: self.reference.clone(),
        }
    }
}

/// Ordered goal sentences with a wrap-around cursor.
#[derive(Clone, Debug)]
pub struct Corpus {
    entries: Vec<SentenceEntry>,
    index: usize,
}

impl Corpus {
    /// Trims sentences and drops empty ones.
    pub fn from_entries(entries: Vec<SentenceEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let sentence = entry.sentence.trim();
                (!sentence.is_empty()).then(|| SentenceEntry::new(sentence, entry.reference))
            })
            .collect();
        Self { entries, index: 0 }
    }

    /// The sentence list compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let file = DATA_DIR.get_file(EMBEDDED_FILE).ok_or_else(|| Error::EmptyCorpus {
            source_name: EMBEDDED_FILE.to_string(),
        })?;
        let contents = file.contents_utf8().unwrap_or_default();
        Self::from_json(contents, EMBEDDED_FILE)
    }

    /// `.json` files hold `[{ "sentence", "reference" }]`; anything else is
    /// read as one sentence per line, referenced by the file stem.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let corpus = if is_json {
            Self::from_json(&contents, &source_name)?
        } else {
            let reference = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Self::from_lines(&contents, &reference, &source_name)?
        };

        info!(source = %source_name, sentences = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    fn from_json(contents: &str, source_name: &str) -> Result<Self> {
        let entries: Vec<SentenceEntry> = serde_json::from_str(contents)?;
        Self::non_empty(Self::from_entries(entries), source_name)
    }

    fn from_lines(contents: &str, reference: &str, source_name: &str) -> Result<Self> {
        let entries = contents
            .lines()
            .map(|line| SentenceEntry::new(line, reference))
            .collect();
        Self::non_empty(Self::from_entries(entries), source_name)
    }

    fn non_empty(corpus: Self, source_name: &str) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus {
                source_name: source_name.to_string(),
            });
        }
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
        self.index = 0;
        debug!(sentences = self.entries.len(), "corpus shuffled");
    }

    /// The sentence to type now, normalized for display and comparison.
    pub fn current(&self) -> SentenceEntry {
        self.entries
            .get(self.index)
            .map(SentenceEntry::normalized)
            .unwrap_or_else(SentenceEntry::fallback)
    }

    /// Move to the next sentence, wrapping at the end.
    pub fn advance(&mut self) -> SentenceEntry {
        self.index = if self.index + 1 >= self.entries.len() {
            0
        } else {
            self.index + 1
        };
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_embedded_corpus_loads() {
        let corpus = Corpus::embedded().unwrap();
        assert!(!corpus.is_empty());
        assert!(!corpus.current().sentence.is_empty());
    }

    #[test]
    fn test_from_entries_trims_and_drops_blank() {
        let corpus = Corpus::from_entries(vec![
            SentenceEntry::new("  run fast  ", "a"),
            SentenceEntry::new("   ", "b"),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.current().sentence, "run fast");
    }

    #[test]
    fn test_advance_wraps() {
        let mut corpus = Corpus::from_entries(vec![
            SentenceEntry::new("one", ""),
            SentenceEntry::new("two", ""),
        ]);
        assert_eq!(corpus.advance().sentence, "two");
        assert_eq!(corpus.advance().sentence, "one");
        assert_eq!(corpus.index(), 0);
    }

    #[test]
    fn test_empty_corpus_uses_fallback() {
        let mut corpus = Corpus::from_entries(vec![]);
        assert_eq!(corpus.current(), SentenceEntry::fallback());
        assert_eq!(corpus.advance(), SentenceEntry::fallback());
    }

    #[test]
    fn test_interpunct_is_normalized() {
        let corpus = Corpus::from_entries(vec![SentenceEntry::new("salt\u{00b7}pepper", "")]);
        assert_eq!(corpus.current().sentence, "salt, pepper");
    }

    #[test]
    fn test_shuffle_keeps_entries() {
        let mut corpus = Corpus::embedded().unwrap();
        let before = corpus.len();
        corpus.advance();
        corpus.shuffle_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(corpus.len(), before);
        assert_eq!(corpus.index(), 0);
    }

    #[test]
    fn test_load_json_file_accepts_ref_alias() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"sentence": "run fast", "ref": "track"}}]"#).unwrap();

        let corpus = Corpus::load_file(file.path()).unwrap();
        assert_eq!(corpus.current(), SentenceEntry::new("run fast", "track"));
    }

    #[test]
    fn test_load_text_file_one_sentence_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drills.txt");
        std::fs::write(&path, "first line\n\n  second line \n").unwrap();

        let corpus = Corpus::load_file(&path).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.current(), SentenceEntry::new("first line", "drills"));
    }

    #[test]
    fn test_load_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "\n\n").unwrap();

        assert!(matches!(
            Corpus::load_file(&path),
            Err(Error::EmptyCorpus { .. })
        ));
    }
}
