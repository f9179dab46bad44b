//! Dataset loading.
//!
//! Reads the transcript dataset, a JSON object keyed by `YYYY-MM-DD`:
//!
//! ```json
//! {
//!   "1989-04-16": { "title": "...", "transcript": "...", "url": "..." },
//!   ...
//! }
//! ```
//!
//! Any problem with the file (missing, not JSON, wrong shape, bad or repeated key) is a
//! [`ArchiveError::MalformedDataset`]; no partial archive is built.

use std::fmt;
use std::path::Path;

use comic_archive_core::archive::Archive;
use comic_archive_core::error::ArchiveError;
use comic_archive_core::models::RawEntry;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

/// Load and index the dataset at `path`.
pub fn load_archive(path: &Path) -> Result<Archive, ArchiveError> {
    let source = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ArchiveError::malformed(&source, format!("cannot read dataset: {}", e)))?;
    let archive = parse_archive(&source, &content)?;
    tracing::info!(
        path = %source,
        items = archive.len(),
        "loaded dataset"
    );
    Ok(archive)
}

/// Parse dataset JSON text into an [`Archive`]. `source` names the input in errors.
pub fn parse_archive(source: &str, content: &str) -> Result<Archive, ArchiveError> {
    let Entries(entries) = serde_json::from_str::<Entries>(content)
        .map_err(|e| ArchiveError::malformed(source, format!("invalid JSON: {}", e)))?;

    let raw = entries
        .into_iter()
        .map(|(key, value)| to_raw_entry(key, value))
        .collect::<Result<Vec<_>, _>>()?;

    Archive::build(raw)
}

/// Top-level dataset entries in file order.
///
/// A `serde_json::Map` keeps only the last value of a repeated key, so the
/// object is read pair by pair and repeats reach [`Archive::build`], which
/// rejects them.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object keyed by YYYY-MM-DD")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn to_raw_entry(key: String, value: Value) -> Result<RawEntry, ArchiveError> {
    let Value::Object(mut fields) = value else {
        return Err(ArchiveError::malformed(key, "entry must be a JSON object"));
    };

    let transcript = match fields.remove("transcript") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(_) => return Err(ArchiveError::malformed(key, "transcript must be a string")),
    };
    let title = match fields.remove("title") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => return Err(ArchiveError::malformed(key, "title must be a string")),
    };

    Ok(RawEntry {
        key,
        title,
        transcript,
        extra: fields,
    })
}
