//! TF-IDF lexical index with a fixed relevance floor.
//!
//! # Weighting
//!
//! 1. Lowercase the text and split it into runs of alphanumeric or `_`
//!    characters; keep runs of two or more characters.
//! 2. Drop English stop words.
//! 3. Term frequency is the raw count in the fragment.
//! 4. Inverse document frequency is smoothed: `ln((1 + n) / (1 + df)) + 1`.
//! 5. Each fragment vector is L2-normalised, so cosine similarity is a dot
//!    product.
//!
//! The weighted matrix is stored column-wise as postings (term → fragments),
//! and a query only touches the postings of its own terms.
//!
//! # Relevance floor
//!
//! Fragments scoring at or below [`RELEVANCE_FLOOR`] are discarded, so a
//! query with no distinctive terms returns nothing rather than noise.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Fragment, ScoredFragment};
use crate::retriever::Retriever;

/// Minimum cosine similarity a fragment must exceed to be returned.
pub const RELEVANCE_FLOOR: f64 = 0.10;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Split text into lowercase index terms.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2 && !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Sparse, L2-normalised term vector: `(term_id, weight)` pairs.
pub type SparseVector = Vec<(usize, f64)>;

/// Vocabulary and idf weights learned from a set of documents.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights, returning the fitted model and
    /// the weighted vector of every document.
    pub fn fit_transform(docs: &[&str]) -> (Self, Vec<SparseVector>) {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut df: Vec<usize> = Vec::new();
        let mut counts: Vec<HashMap<usize, usize>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut tf: HashMap<usize, usize> = HashMap::new();
            for token in tokenize(doc) {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(token).or_insert(next_id);
                if id == df.len() {
                    df.push(0);
                }
                *tf.entry(id).or_insert(0) += 1;
            }
            for id in tf.keys() {
                df[*id] += 1;
            }
            counts.push(tf);
        }

        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let model = Self { vocabulary, idf };
        let vectors = counts.iter().map(|tf| model.weigh(tf)).collect();
        (model, vectors)
    }

    /// Project `text` into the fitted term space. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut tf: HashMap<usize, usize> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&id) = self.vocabulary.get(&token) {
                *tf.entry(id).or_insert(0) += 1;
            }
        }
        self.weigh(&tf)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn weigh(&self, tf: &HashMap<usize, usize>) -> SparseVector {
        let mut vec: SparseVector = tf
            .iter()
            .map(|(&id, &count)| (id, count as f64 * self.idf[id]))
            .collect();
        vec.sort_by_key(|(id, _)| *id);
        let norm = vec.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vec.iter_mut() {
                *w /= norm;
            }
        }
        vec
    }
}

/// Fitted model plus the weighted term matrix, stored as postings.
#[derive(Debug)]
struct TermMatrix {
    vectorizer: TfidfVectorizer,
    postings: Vec<Vec<(usize, f64)>>,
}

/// Keyword retrieval over TF-IDF vectors.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    fragments: Vec<Fragment>,
    matrix: Option<TermMatrix>,
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fit the model over `fragments`, replacing any prior state.
    pub fn fit(&mut self, fragments: &[Fragment]) {
        self.fragments = fragments.to_vec();
        self.matrix = None;
        if fragments.is_empty() {
            return;
        }

        let contents: Vec<&str> = fragments.iter().map(|f| f.content.as_str()).collect();
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&contents);
        if vectorizer.vocabulary_len() == 0 {
            return;
        }

        let mut postings = vec![Vec::new(); vectorizer.vocabulary_len()];
        for (doc, row) in rows.into_iter().enumerate() {
            for (term, weight) in row {
                postings[term].push((doc, weight));
            }
        }
        self.matrix = Some(TermMatrix {
            vectorizer,
            postings,
        });
    }

    /// Top `k` fragments by cosine similarity, excluding any at or below
    /// [`RELEVANCE_FLOOR`]. Ties keep original fragment order.
    pub fn search(&self, text: &str, k: usize) -> Vec<ScoredFragment> {
        let matrix = match &self.matrix {
            Some(m) => m,
            None => return Vec::new(),
        };

        let query = matrix.vectorizer.transform(text);
        if query.is_empty() {
            return Vec::new();
        }

        let mut sims = vec![0.0f64; self.fragments.len()];
        for (term, q_weight) in &query {
            for (doc, d_weight) in &matrix.postings[*term] {
                sims[*doc] += q_weight * d_weight;
            }
        }

        let mut ranked: Vec<usize> = (0..sims.len()).collect();
        ranked.sort_by(|a, b| {
            sims[*b]
                .partial_cmp(&sims[*a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ranked
            .into_iter()
            .take(k)
            .filter(|&i| sims[i] > RELEVANCE_FLOOR)
            .map(|i| ScoredFragment::new(self.fragments[i].clone(), sims[i]))
            .collect()
    }
}

#[async_trait]
impl Retriever for LexicalIndex {
    fn name(&self) -> &'static str {
        "lexical"
    }

    async fn build(&mut self, fragments: &[Fragment]) -> Result<()> {
        self.fit(fragments);
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredFragment>> {
        Ok(self.search(text, k))
    }
}
