//! Runs the fixture cases under `cases/`: decode `input` as YAML, apply
//! `profile`, compare with `expected`.
use std::path::{Path, PathBuf};

use colored::Colorize;
use node_norm::{Node, Profile};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    /// YAML source text
    input: String,
    #[serde(default)]
    profile: serde_json::Value,
    expected: serde_json::Value,
}

fn run_case(case: &Case) -> Result<(), String> {
    let document = Node::from_yaml_str(&case.input).map_err(|e| format!("decode: {e}"))?;
    let profile = if case.profile.is_null() {
        Profile::default()
    } else {
        Profile::from_json_str(&case.profile.to_string()).map_err(|e| format!("profile: {e}"))?
    };
    let actual = serde_json::Value::from(profile.apply(document));
    if actual == case.expected {
        Ok(())
    } else {
        Err(format!(
            "expected:\n{}\nactual:\n{}",
            serde_json::to_string_pretty(&case.expected).unwrap_or_default(),
            serde_json::to_string_pretty(&actual).unwrap_or_default(),
        ))
    }
}

fn load_cases(dir: &Path) -> Vec<(PathBuf, Result<Case, String>)> {
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let paths = glob::glob(&pattern)
        .expect("case glob is valid")
        .filter_map(Result::ok)
        .collect::<Vec<_>>();
    paths
        .into_iter()
        .map(|path| {
            let case = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    let de = &mut serde_json::Deserializer::from_slice(&bytes);
                    serde_path_to_error::deserialize::<_, Case>(de)
                        .map_err(|err| format!("at JSON path {} → {}", err.path(), err.inner()))
                });
            (path, case)
        })
        .collect()
}

fn main() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases");
    let cases = load_cases(&dir);
    let mut failed = 0usize;

    for (path, case) in &cases {
        let outcome = case.as_ref().map_err(String::clone).and_then(run_case);
        let label = match case {
            Ok(case) => case.name.clone(),
            Err(_) => path.display().to_string(),
        };
        match outcome {
            Ok(()) => eprintln!("✅ {label}"),
            Err(error) => {
                failed += 1;
                eprintln!("❌ {}\n{error}", label.as_str().red());
            }
        }
    }

    eprintln!("{} cases, {} failed", cases.len(), failed);
    if failed > 0 || cases.is_empty() {
        std::process::exit(1);
    }
}
