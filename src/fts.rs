//! Embedded full-text engine wrapper
//!
//! Thin wrapper around tantivy exposing exactly what the indexer needs:
//! a one-shot write-only builder for producing a sealed generation, and
//! a read-only reader for querying one. Keeping the surface narrow
//! keeps the engine swappable and the indexer free of tantivy types
//! outside this module.
//!
//! Paths are tokenized into alphanumeric runs with underscores treated
//! as separators, so `foo_bar.txt` is found by both `foo` and `bar`.

use std::fs;
use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::{
    BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, QueryParser, RegexQuery, TermQuery,
};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED,
    STRING,
};
use tantivy::tokenizer::RegexTokenizer;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Score, TantivyDocument, Term};

use crate::error::Result;

const ID_FIELD: &str = "id";
const PATH_FIELD: &str = "path";

const TOKENIZER_NAME: &str = "path_parts";
const TOKEN_PATTERN: &str = r"[^\W_]+";

/// Write buffer for generation builds
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Default number of hits returned for a search request
pub const DEFAULT_LIMIT: usize = 10;

const FUZZY_BOOST: Score = 2.0;
const PREFIX_BOOST: Score = 2.0;
const QUERY_STRING_BOOST: Score = 1.0;
const WILDCARD_BOOST: Score = 2.0;
const MATCH_BOOST: Score = 5.0;

/// Maximum edit distance for the fuzzy clause
const FUZZY_DISTANCE: u8 = 1;

fn schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field(ID_FIELD, STRING | STORED);
    let indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    builder.add_text_field(
        PATH_FIELD,
        TextOptions::default().set_indexing_options(indexing),
    );
    builder.build()
}

/// Field holding the searchable path text
///
/// The schema is fixed, so the field can be resolved without an open
/// generation; useful for composing raw requests.
pub fn path_field() -> Field {
    schema()
        .get_field(PATH_FIELD)
        .expect("path field is part of the default schema")
}

// Tokenizers are not persisted with the index, so both builder and
// reader register the same one by name before touching documents.
fn register_tokenizer(index: &Index) -> Result<()> {
    let tokenizer = RegexTokenizer::new(TOKEN_PATTERN)?;
    index.tokenizers().register(TOKENIZER_NAME, tokenizer);
    Ok(())
}

/// One-shot builder producing a sealed generation directory
///
/// Write-only: documents become visible to readers only after `close`
/// commits them, which is what keeps an in-progress build invisible.
pub struct GenerationBuilder {
    writer: IndexWriter,
    id: Field,
    path: Field,
    docs: u64,
}

impl GenerationBuilder {
    /// Create a fresh generation rooted at the given directory
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let index = Index::create_in_dir(dir, schema())?;
        register_tokenizer(&index)?;
        let writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        let id = index.schema().get_field(ID_FIELD)?;
        let path = index.schema().get_field(PATH_FIELD)?;
        Ok(Self {
            writer,
            id,
            path,
            docs: 0,
        })
    }

    /// Add one document
    pub fn index(&mut self, id: &str, data: &str) -> Result<()> {
        self.writer.add_document(doc!(
            self.id => id,
            self.path => data,
        ))?;
        self.docs += 1;
        Ok(())
    }

    /// Number of documents fed so far
    pub fn doc_count(&self) -> u64 {
        self.docs
    }

    /// Commit and seal the generation
    pub fn close(mut self) -> Result<()> {
        self.writer.commit()?;
        self.writer.wait_merging_threads()?;
        Ok(())
    }
}

/// Read-only handle over one sealed generation
pub struct GenerationReader {
    index: Index,
    reader: IndexReader,
    name: String,
    id: Field,
    path: Field,
}

impl std::fmt::Debug for GenerationReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationReader")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

impl GenerationReader {
    /// Open the generation at the given directory
    pub fn open(dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(dir)?;
        register_tokenizer(&index)?;
        // generations are immutable once sealed, nothing to reload
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let id = index.schema().get_field(ID_FIELD)?;
        let path = index.schema().get_field(PATH_FIELD)?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            index,
            reader,
            name,
            id,
            path,
        })
    }

    /// Display name of this generation
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of documents in the generation
    pub fn doc_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Execute a pre-built request and collect ranked hits
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let searcher = self.reader.searcher();
        let limit = request.limit.max(1);
        let top = searcher.search(request.query.as_ref(), &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top.len());
        for (score, address) in top {
            let document: TantivyDocument = searcher.doc(address)?;
            let id = document
                .get_first(self.id)
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string();
            hits.push(Hit { id, score });
        }
        Ok(SearchResults { hits })
    }

    /// Build the ranked disjunction request for a plain search term
    ///
    /// Five clauses are unioned: fuzzy, prefix, query-string, wildcard
    /// and match. The boost weights are part of the query contract; the
    /// exact-match clause dominates so a literal hit outranks the
    /// approximate ones.
    pub fn term_request(&self, term: &str) -> Result<SearchRequest> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(5);
        let mut clause = |query: Box<dyn Query>, boost: Score| {
            clauses.push((Occur::Should, Box::new(BoostQuery::new(query, boost))));
        };

        let fuzzy = FuzzyTermQuery::new(
            Term::from_field_text(self.path, term),
            FUZZY_DISTANCE,
            true,
        );
        clause(Box::new(fuzzy), FUZZY_BOOST);

        let prefix = RegexQuery::from_pattern(&format!("{}.*", regex::escape(term)), self.path)?;
        clause(Box::new(prefix), PREFIX_BOOST);

        let parser = QueryParser::for_index(&self.index, vec![self.path]);
        let (query_string, _errors) = parser.parse_query_lenient(term);
        clause(query_string, QUERY_STRING_BOOST);

        let wildcard = RegexQuery::from_pattern(&wildcard_pattern(term), self.path)?;
        clause(Box::new(wildcard), WILDCARD_BOOST);

        clause(self.match_query(term)?, MATCH_BOOST);

        Ok(SearchRequest::new(BooleanQuery::new(clauses)))
    }

    // Analyze the term with the path tokenizer and union a term query
    // per produced token.
    fn match_query(&self, term: &str) -> Result<Box<dyn Query>> {
        let mut analyzer = self.index.tokenizer_for_field(self.path)?;
        let mut stream = analyzer.token_stream(term);
        let mut terms: Vec<Box<dyn Query>> = Vec::new();
        while let Some(token) = stream.next() {
            terms.push(Box::new(TermQuery::new(
                Term::from_field_text(self.path, &token.text),
                IndexRecordOption::WithFreqs,
            )));
        }
        Ok(Box::new(BooleanQuery::union(terms)))
    }
}

/// Translate shell-style wildcards to a term regex
fn wildcard_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 8);
    for ch in term.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&ch.to_string())),
        }
    }
    pattern
}

/// A search request: a query plus a result limit
pub struct SearchRequest {
    pub query: Box<dyn Query>,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Query + 'static) -> Self {
        Self {
            query: Box::new(query),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Ranked search results
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
}

impl SearchResults {
    /// Hit ids in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.id.as_str()).collect()
    }
}

/// A single ranked hit
#[derive(Debug, Clone)]
pub struct Hit {
    pub id: String,
    pub score: Score,
}
