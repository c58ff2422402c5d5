//! Observation id list parsing
//!
//! Accepts one id per line or several separated by commas/whitespace.
//! `#` starts a comment. Duplicates are kept; each is processed on its own.

use gbmatch_common::{Error, Result};
use std::path::Path;

/// Parse ids from text, reporting the offending line on error
pub fn parse_ids(content: &str) -> Result<Vec<u64>> {
    let mut ids = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            ids.push(parse_id(token).map_err(|e| {
                Error::Parse(format!("line {}: {}", index + 1, e))
            })?);
        }
    }

    Ok(ids)
}

/// Read and parse an id file
pub fn read_id_file(path: &Path) -> Result<Vec<u64>> {
    let content = std::fs::read_to_string(path)?;
    parse_ids(&content).map_err(|e| match e {
        Error::Parse(msg) => Error::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse one observation id; ids are positive integers
pub fn parse_id(token: &str) -> std::result::Result<u64, String> {
    match token.parse::<u64>() {
        Ok(0) => Err("observation id must be positive, got 0".to_string()),
        Ok(id) => Ok(id),
        Err(_) => Err(format!("invalid observation id {:?}", token)),
    }
}
