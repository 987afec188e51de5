//! CLI: validate JSON documents against a schema document.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use shape_guard::lower::lower_document;
use shape_guard::schema_doc::SchemaDocument;
use shape_guard::types::{sealed, sealed_deep};
use shape_guard::{Failure, Runtype, Value};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON/NDJSON documents against a declarative schema document
#[derive(Parser, Debug)]
#[command(name = "shape-guard", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document and report each verdict
    Check(CheckOut),
    /// print the rendered type of the schema
    Show(ShowOut),
    /// parse every input document and print the result as JSON
    Parse(ParseOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// schema document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    /// reject properties the schema does not declare (top level only)
    #[arg(long, default_value_t = false)]
    sealed: bool,

    /// with --sealed, also reject undeclared properties in nested values
    #[arg(long, default_value_t = false, requires = "sealed")]
    deep: bool,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// only report failing documents
    #[arg(long, short, default_value_t = false)]
    quiet: bool,

    /// print a JSON report instead of colored text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct ShowOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,
}

#[derive(clap::Parser, Debug)]
struct ParseOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One input document: where it came from and its JSON.
struct Document {
    label: String,
    json: serde_json::Value,
}

#[derive(Serialize)]
struct Verdict {
    input: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<Failure>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load(&self) -> anyhow::Result<Runtype> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema document {}", self.schema.display()))?;
        let document = SchemaDocument::from_json_str(&source)
            .with_context(|| format!("invalid schema document {}", self.schema.display()))?;
        let root = lower_document(&document)
            .with_context(|| format!("invalid schema document {}", self.schema.display()))?;
        Ok(match (self.sealed, self.deep) {
            (false, _) => root,
            (true, false) => sealed(root),
            (true, true) => sealed_deep(root),
        })
    }
}

impl InputSettings {
    /// Reads every input in parallel; documents stay in input order.
    fn load(&self) -> anyhow::Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let batches = source_paths
            .par_iter()
            .map(|source_path| self.load_file(source_path))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(batches.into_iter().flatten().collect())
    }

    fn load_file(&self, source_path: &Path) -> anyhow::Result<Vec<Document>> {
        let source_path_str = source_path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {source_path_str}"))?;
        let mut documents = Vec::new();
        if self.ndjson {
            for (index, line) in source.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let label = format!("{source_path_str}:{}", index + 1);
                let json = serde_json::from_str(line)
                    .with_context(|| format!("failed to parse JSON in {label}"))?;
                documents.push(Document { label, json });
            }
        } else {
            let json = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
            documents.push(Document { label: source_path_str, json });
        }
        match self.json_pointer.as_deref() {
            None => Ok(documents),
            Some(pointer) => documents
                .into_iter()
                .map(|Document { label, json }| match json.pointer(pointer) {
                    Some(selected) => Ok(Document { label, json: selected.clone() }),
                    None => Err(anyhow!("JSON pointer {pointer} selects nothing in {label}")),
                })
                .collect(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Show(target) => {
                let schema = target.schema_settings.load()?;
                println!("{}", schema.show());
                Ok(ExitCode::SUCCESS)
            }
            Command::Parse(target) => target.run(),
        }
    }
}

impl CheckOut {
    fn run(&self) -> anyhow::Result<ExitCode> {
        let schema = self.schema_settings.load()?;
        let documents = self.input_settings.load()?;
        tracing::info!(documents = documents.len(), schema = %schema.show(), "checking documents");
        let verdicts: Vec<Verdict> = documents
            .par_iter()
            .map(|document| {
                let failure = schema.check(&Value::from(document.json.clone())).err();
                Verdict { input: document.label.clone(), ok: failure.is_none(), failure }
            })
            .collect();
        let failed = verdicts.iter().filter(|verdict| !verdict.ok).count();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        } else {
            for verdict in &verdicts {
                match &verdict.failure {
                    None if self.quiet => {}
                    None => println!("{} {}", "✅".green(), verdict.input),
                    Some(failure) => {
                        println!("{} {}", "❌".red(), verdict.input.bold());
                        for line in failure.render().lines() {
                            println!("   {}", line.red());
                        }
                    }
                }
            }
            if !self.quiet || failed > 0 {
                let summary = format!("{} of {} documents failed", failed, verdicts.len());
                eprintln!("{}", if failed > 0 { summary.red() } else { summary.green() });
            }
        }
        Ok(if failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
    }
}

impl ParseOut {
    fn run(&self) -> anyhow::Result<ExitCode> {
        let schema = self.schema_settings.load()?;
        let documents = self.input_settings.load()?;
        let mut parsed = Vec::with_capacity(documents.len());
        for document in &documents {
            let value = schema
                .parse(&Value::from(document.json.clone()))
                .with_context(|| format!("{} does not match the schema", document.label))?;
            parsed.push(value.to_json()?);
        }
        let output = match <[serde_json::Value; 1]>::try_from(parsed) {
            Ok([single]) => single,
            Err(many) => serde_json::Value::Array(many),
        };
        let output_src = serde_json::to_string_pretty(&output)?;
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &output_src)?;
        } else {
            println!("{output_src}");
        }
        Ok(ExitCode::SUCCESS)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
