//! Rule-file persistence.
//!
//! Rule files are JSON documents, either a bare array of rules or
//! `{ "rules": [...] }`. The admin surface (load/save) only touches `.json`
//! files under a trusted root directory. Two loaders exist on purpose: the
//! strict one for interactive use, where a broken file should fail loudly,
//! and the lenient one for startup and hot reload, where a broken file
//! means "no rules loaded" and any previously cached rules stay in effect.

use crate::Result;
use crate::rules::model::{Rule, RuleDoc};
use anyhow::{Context, bail};
use std::path::{Component, Path, PathBuf};

const RULES_FILE_SUFFIX: &str = ".json";

/// Resolve a rule-file path against the trusted root and reject anything
/// that is not a `.json` file inside it.
pub fn guard_json_path(root: &Path, rel_or_abs: &Path) -> Result<PathBuf> {
    if rel_or_abs.as_os_str().is_empty() {
        bail!("rule file path is empty");
    }
    if !rel_or_abs
        .to_string_lossy()
        .ends_with(RULES_FILE_SUFFIX)
    {
        bail!("rule file path must end with {}", RULES_FILE_SUFFIX);
    }

    let root = std::path::absolute(root).with_context(|| format!("resolve root {:?}", root))?;
    let abs = if rel_or_abs.is_absolute() {
        rel_or_abs.to_path_buf()
    } else {
        root.join(rel_or_abs)
    };

    let normalized = normalize(&abs);
    if !normalized.starts_with(&normalize(&root)) {
        bail!("rule file path must stay under {:?}", root);
    }
    Ok(normalized)
}

/// Lexical normalization: fold `.` and `..` components without touching
/// the filesystem, so the containment check cannot be escaped.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Strict loader: every failure, including a missing file, is an error.
pub fn read_rules(path: &Path) -> Result<Vec<Rule>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read rule file {}", path.display()))?;
    let doc: RuleDoc = serde_json::from_str(&text)
        .with_context(|| format!("parse rule file {}", path.display()))?;
    Ok(doc.into_rules())
}

/// Overwrite the rule file with pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_rules(path: &Path, rules: &[Rule]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create rule directory {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(rules)?;
    std::fs::write(path, text).with_context(|| format!("write rule file {}", path.display()))?;
    Ok(())
}

/// Lenient loader for startup and hot reload. Any failure resolves to
/// `None` ("no rules loaded") after a warning; it never aborts the caller.
pub fn try_load(path: &Path) -> Option<Vec<Rule>> {
    match read_rules(path) {
        Ok(rules) => Some(rules),
        Err(err) => {
            log::warn!("rule file load failed: {err:#}");
            None
        }
    }
}
