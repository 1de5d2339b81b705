use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use topomap_core::model::Snapshot;

const INDENT: &[u8] = b"    ";
const ARCHIVE_STAMP: &str = "%Y_%m_%d_%H_%M";

/// Canonical on-disk form: object keys sorted, four-space indentation.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    let value = sort_keys(serde_json::to_value(snapshot)?);

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// `data/topology.json` stamped at 2024-05-01 13:07 becomes
/// `data/topology_2024_05_01_13_07.json`.
pub fn archive_path(path: &Path, taken_at: NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "topology".to_string());
    let stamp = taken_at.format(ARCHIVE_STAMP);

    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    };
    path.with_file_name(file_name)
}

// Map ordering depends on serde_json features enabled elsewhere in the build.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
