//! CLI: check documents against declared types, or normalize them.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use crate::de::Deserializer;
use crate::decl::DeclFile;
use crate::schema::Registry;
use crate::ser::Serializer;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// map JSON documents onto declared object types
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode every document and report which ones map cleanly
    Check(CheckOut),
    /// decode then re-encode every document in canonical form
    Normalize(NormalizeOut),
}

#[derive(Args, Debug, Clone)]
struct TypeSettings {
    /// declaration file describing the object and enum types
    #[arg(long)]
    decl: PathBuf,

    /// root type each document is decoded into
    #[arg(long = "type")]
    root_type: String,
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
    type_settings: TypeSettings,

    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct NormalizeOut {
    #[command(flatten)]
    type_settings: TypeSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file, one JSON document per line (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One input document, labelled by where it came from.
#[derive(Debug)]
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSettings {
    fn load_registry(&self) -> Result<Registry> {
        let registry = DeclFile::load(&self.decl)
            .and_then(DeclFile::into_registry)
            .with_context(|| format!("failed to load declarations from {}", self.decl.display()))?;
        registry
            .object_schema(&self.root_type)
            .with_context(|| format!("root type '{}' is not a declared object type", self.root_type))?;
        Ok(registry)
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (index, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", index + 1);
                    let value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({label})"))?;
                    documents.push(self.select(label, value)?);
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                documents.push(self.select(source_path_str, value)?);
            }
        }
        Ok(documents)
    }

    fn select(&self, source: String, value: Value) -> Result<Document> {
        let Some(pointer) = self.json_pointer.as_deref() else {
            return Ok(Document { source, value });
        };
        let value = value
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| anyhow!("JSON pointer {pointer} does not resolve in {source}"))?;
        Ok(Document { source, value })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Normalize(target) => target.run(),
        }
    }
}

impl CheckOut {
    fn run(&self) -> Result<ExitCode> {
        let registry = self.type_settings.load_registry()?;
        let documents = self.input_settings.load_documents()?;
        let deserializer = Deserializer::new(&registry, &self.type_settings.root_type);

        let outcomes: Vec<_> = documents
            .par_iter()
            .map(|doc| (doc, deserializer.deserialize(&doc.value)))
            .collect();

        let mut failures = 0usize;
        for (doc, outcome) in &outcomes {
            match outcome {
                Ok(_) => eprintln!("{} {}", "✅".green(), doc.source),
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {}", "❌".red(), doc.source.bold(), error);
                }
            }
        }
        eprintln!("{} of {} documents mapped", outcomes.len() - failures, outcomes.len());
        Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

impl NormalizeOut {
    fn run(&self) -> Result<ExitCode> {
        let registry = self.type_settings.load_registry()?;
        let documents = self.input_settings.load_documents()?;
        let deserializer = Deserializer::new(&registry, &self.type_settings.root_type);
        let serializer = Serializer::new(&registry);

        let lines = documents
            .par_iter()
            .map(|doc| -> Result<String> {
                let object = deserializer
                    .deserialize_object(&doc.value)
                    .with_context(|| format!("failed to decode {}", doc.source))?;
                let encoded = serializer
                    .serialize(&object)
                    .with_context(|| format!("failed to encode {}", doc.source))?;
                Ok(serde_json::to_string(&encoded)?)
            })
            .collect::<Result<Vec<String>>>()?;

        let mut output = lines.join("\n");
        output.push('\n');
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &output).with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            print!("{output}");
        }
        Ok(ExitCode::SUCCESS)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern)? {
                out.push(entry?);
            }
            if out.len() == before {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
