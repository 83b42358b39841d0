//! Final report files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::research::Plan;

/// Markdown document saved for a finished run.
pub fn render(topic: &str, plan: &Plan, body: &str, queries: &[String], generated_at: DateTime<Utc>) -> String {
    let mut out = format!("# {topic}\n\n**Goal:** {}\n\n{}\n", plan.goal, body.trim());
    if !queries.is_empty() {
        out.push_str("\n---\n\n## Searches\n\n");
        for q in queries {
            out.push_str(&format!("- {q}\n"));
        }
    }
    out.push_str(&format!("\n_Generated {}_\n", generated_at.to_rfc3339()));
    out
}

/// `{session}-{YYYYmmddTHHMMSSZ}.md`
pub fn file_name(session_id: &str, generated_at: DateTime<Utc>) -> String {
    format!("{session_id}-{}.md", generated_at.format("%Y%m%dT%H%M%SZ"))
}

/// Write `contents` into `dir`, creating it if needed. Returns the file path.
///
/// Never overwrites: a name already taken gets a `-2`, `-3`, … suffix.
pub fn write(dir: &Path, session_id: &str, contents: &str, generated_at: DateTime<Utc>) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let base = file_name(session_id, generated_at);
    let stem = base.trim_end_matches(".md");
    for n in 1u32.. {
        let path = if n == 1 { dir.join(&base) } else { dir.join(format!("{stem}-{n}.md")) };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Io(io::Error::other("no free report file name")))
}
