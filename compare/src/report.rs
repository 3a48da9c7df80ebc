//! Plain-text walkthrough printed by the `compare` binary.

use anyhow::Result;
use search_core::{DocId, Document, Hit, LexicalIndex, SemanticIndex};
use std::collections::HashMap;
use std::io::Write;

pub const NO_RESULTS: &str = "No results";
const SECTION_RULE: usize = 70;
const TABLE_RULE: usize = 50;

/// Which queries run in which section. An empty list skips its sections.
pub struct QueryPlan {
    pub keyword: Vec<String>,
    pub semantic: Vec<String>,
}

impl QueryPlan {
    pub fn canned(keyword: &[&str], semantic: &[&str]) -> Self {
        Self {
            keyword: keyword.iter().map(|q| q.to_string()).collect(),
            semantic: semantic.iter().map(|q| q.to_string()).collect(),
        }
    }

    /// User queries, shown against both indexes in the keyword sections.
    pub fn custom(queries: Vec<String>) -> Self {
        Self { keyword: queries, semantic: Vec::new() }
    }
}

/// `"%-20s %s"`: query padded to 20 columns, then the best match.
pub fn best_match_line(query: &str, best: Option<&str>) -> String {
    format!("{:<20} {}", query, best.unwrap_or(NO_RESULTS))
}

fn rule<W: Write>(out: &mut W, width: usize) -> Result<()> {
    writeln!(out, "{}", "-".repeat(width))?;
    Ok(())
}

fn banner<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out)?;
    rule(out, SECTION_RULE)?;
    writeln!(out, "{title}")?;
    rule(out, SECTION_RULE)?;
    Ok(())
}

fn table_header<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", best_match_line("Query", Some("Best Match")))?;
    rule(out, TABLE_RULE)?;
    Ok(())
}

struct Sections<'a> {
    texts: HashMap<DocId, &'a str>,
    next: usize,
}

impl<'a> Sections<'a> {
    fn title(&mut self, text: &str) -> String {
        self.next += 1;
        format!("({}) {}", self.next, text)
    }

    fn text(&self, id: DocId) -> Option<&'a str> {
        self.texts.get(&id).copied()
    }
}

fn print_best_matches<W, F>(out: &mut W, s: &Sections<'_>, queries: &[String], search: F) -> Result<()>
where
    W: Write,
    F: Fn(&str) -> search_core::Result<Vec<Hit>>,
{
    for query in queries {
        let hits = search(query.as_str())?;
        let best = hits.first().and_then(|h| s.text(h.doc_id));
        writeln!(out, "{}", best_match_line(query, best))?;
    }
    Ok(())
}

/// Build both indexes over `documents` and print every section.
pub fn run<W: Write>(
    out: &mut W,
    documents: &[Document],
    lexical: &mut LexicalIndex,
    semantic: &mut SemanticIndex,
    plan: &QueryPlan,
) -> Result<()> {
    let mut s = Sections { texts: documents.iter().map(|d| (d.id, d.text.as_str())).collect(), next: 0 };

    let title = s.title("Starting data...");
    banner(out, &title)?;
    for doc in documents {
        writeln!(out, "[{}] {}", doc.id, doc.text)?;
    }
    rule(out, SECTION_RULE)?;

    let title = s.title("Building BM25 keyword index...");
    banner(out, &title)?;
    lexical.index(documents)?;
    let params = lexical.params();
    writeln!(
        out,
        "...Index built ({} documents, {} terms, k1={} b={})",
        lexical.num_docs(),
        lexical.num_terms(),
        params.k1(),
        params.b()
    )?;

    if !plan.keyword.is_empty() {
        let title = s.title("Keyword queries on the keyword index...");
        banner(out, &title)?;
        table_header(out)?;
        print_best_matches(out, &s, &plan.keyword, |q| lexical.search(q, 1))?;
    }

    if !plan.semantic.is_empty() {
        let title = s.title("Semantic queries on the keyword index (expect misses)...");
        banner(out, &title)?;
        table_header(out)?;
        print_best_matches(out, &s, &plan.semantic, |q| lexical.search(q, 1))?;
    }

    let title = s.title("Building semantic index...");
    banner(out, &title)?;
    semantic.index(documents)?;
    writeln!(out, "...Index built ({} documents, embedder {})", semantic.len(), semantic.embedder().name())?;

    if !plan.semantic.is_empty() {
        let title = s.title("Semantic queries on the semantic index...");
        banner(out, &title)?;
        table_header(out)?;
        print_best_matches(out, &s, &plan.semantic, |q| semantic.search(q, 1))?;
    }

    if !plan.keyword.is_empty() {
        let title = s.title("Keyword queries on the semantic index...");
        banner(out, &title)?;
        table_header(out)?;
        print_best_matches(out, &s, &plan.keyword, |q| semantic.search(q, 1))?;
    }

    banner(out, "-- END --")?;
    Ok(())
}
