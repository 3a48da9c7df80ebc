use anyhow::{bail, Context, Result};
use search_core::{DocId, Document};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    id: Option<DocId>,
    #[serde(alias = "body")]
    text: String,
}

/// Collects documents, assigning ids to records that lack one.
#[derive(Default)]
struct Loader {
    documents: Vec<Document>,
    next_id: DocId,
}

impl Loader {
    fn push(&mut self, doc: InputDoc) {
        let id = doc.id.unwrap_or(self.next_id);
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.documents.push(Document::new(id, doc.text));
    }

    fn read_jsonl(&mut self, file: &Path) -> Result<()> {
        let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
        let reader = BufReader::new(f);
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let doc: InputDoc = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}: invalid document", file.display(), n + 1))?;
            self.push(doc);
        }
        Ok(())
    }

    fn read_json(&mut self, file: &Path) -> Result<()> {
        let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
        let reader = BufReader::new(f);
        let json: serde_json::Value = serde_json::from_reader(reader)
            .with_context(|| format!("{}: invalid JSON", file.display()))?;
        match json {
            serde_json::Value::Array(arr) => {
                for v in arr {
                    let doc: InputDoc = match v {
                        serde_json::Value::String(text) => InputDoc { id: None, text },
                        other => serde_json::from_value(other)
                            .with_context(|| format!("{}: invalid document", file.display()))?,
                    };
                    self.push(doc);
                }
            }
            serde_json::Value::Object(_) => {
                let doc: InputDoc = serde_json::from_value(json)
                    .with_context(|| format!("{}: invalid document", file.display()))?;
                self.push(doc);
            }
            _ => bail!("{}: expected a JSON array or object", file.display()),
        }
        Ok(())
    }
}

fn is_corpus_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

/// Read documents from a JSON/JSONL file, or from every such file under a
/// directory in path order. A JSON array may hold plain strings.
pub fn load(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_corpus_file(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("corpus path {} does not exist", input.display());
    }

    let mut loader = Loader::default();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            loader.read_jsonl(&file)?;
        } else {
            loader.read_json(&file)?;
        }
    }
    tracing::debug!(num_docs = loader.documents.len(), path = %input.display(), "read corpus");
    Ok(loader.documents)
}
