//! Minimal CLI: decode → (normalize | classify)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use node_norm::{KeyPath, Map, Node, Profile, Shape, item};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// normalize loosely-typed YAML/JSON config nodes into canonical shapes
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// apply a normalization profile and print the canonical document
    Normalize(NormalizeOut),
    /// print the shape of each top-level entry
    Classify(ClassifyOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// dotted path selecting a subnode in each document (e.g. jobs.include.0)
    #[arg(long)]
    select: Option<KeyPath>,

    /// One or more inputs. May be literal paths or quoted glob patterns.
    /// `.json` files are decoded as JSON, everything else as YAML.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(clap::Parser, Debug)]
struct NormalizeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON normalization profile (aliases only at the root if omitted)
    #[arg(long)]
    profile: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ClassifyOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Decode every input in parallel; results keep input order.
    fn load_all(&self) -> Result<Vec<(PathBuf, Node)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        source_paths
            .into_par_iter()
            .map(|source_path| -> Result<(PathBuf, Node)> {
                let node = decode_file(&source_path)?;
                let node = self.select_from(&source_path, node);
                Ok((source_path, node))
            })
            .collect()
    }

    fn select_from(&self, source_path: &Path, node: Node) -> Node {
        let Some(path) = self.select.as_ref() else {
            return node;
        };
        match item(&node, path.clone()) {
            Some(found) => found.clone(),
            None => {
                log::warn!("{}: nothing at `{path}`", source_path.display());
                Node::null()
            }
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Normalize(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let profile = match target.profile.as_ref() {
                    Some(path) => Profile::load(path)?,
                    None => Profile::default(),
                };
                let documents = target.input_settings.load_all()?;
                let mut normalized = documents
                    .into_iter()
                    .map(|(path, node)| (path, profile.apply(node)))
                    .collect::<Vec<_>>();

                // a single input prints bare, several are keyed by path
                let output = if normalized.len() == 1 {
                    normalized.remove(0).1
                } else {
                    Node::Map(
                        normalized
                            .into_iter()
                            .map(|(path, node)| (path.to_string_lossy().to_string(), node))
                            .collect::<Map>(),
                    )
                };
                let rendered = match target.format {
                    OutputFormat::Json => serde_json::to_string_pretty(&output)?,
                    OutputFormat::Yaml => serde_yaml::to_string(&output)?,
                };
                write_output(target.out.as_deref(), &rendered)
            }
            Command::Classify(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                for (path, node) in target.input_settings.load_all()? {
                    println!("{}", path.display().to_string().as_str().bold());
                    match &node {
                        Node::Map(map) if !map.is_empty() => {
                            for (key, value) in map {
                                println!("  {key}: {}", shape_label(value));
                            }
                        }
                        other => println!("  {}", shape_label(other)),
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn decode_file(source_path: &Path) -> Result<Node> {
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;
    let is_json = source_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let node = if is_json {
        Node::from_json_str(&source)
    } else {
        Node::from_yaml_str(&source)
    };
    node.with_context(|| format!("failed to decode {}", source_path.display()))
}

fn shape_label(node: &Node) -> colored::ColoredString {
    match node.shape() {
        None => "scalar".normal(),
        Some(Shape::Map) => "map".cyan(),
        Some(Shape::Sequence) => "sequence".green(),
        Some(Shape::Empty) => "empty".dimmed(),
        Some(Shape::Mixed) => "mixed".red(),
    }
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
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
