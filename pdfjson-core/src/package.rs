//! Bundling converted documents into a ZIP archive
//!
//! Each entry becomes one deflate-compressed `.json` member holding the
//! pretty-printed data. The archive is built entirely in memory.

use std::io::{Cursor, Write};

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Action name that requests a ZIP of previously converted results
pub const DOWNLOAD_ALL_ACTION: &str = "download_all";

/// One item of a batch download request
///
/// Both fields are optional so that incomplete items can be skipped instead
/// of rejecting the whole request. A `data` field that is present but `null`
/// still counts as present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageEntry {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "present_value")]
    pub data: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PackageEntry {
    pub fn new(filename: impl Into<String>, data: Value) -> Self {
        Self {
            filename: Some(filename.into()),
            data: Some(data),
        }
    }
}

/// JSON body of `POST /convert` asking for all results as one archive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchDownloadRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub json_data: Vec<Value>,
}

impl BatchDownloadRequest {
    pub fn is_download_all(&self) -> bool {
        self.action.as_deref() == Some(DOWNLOAD_ALL_ACTION)
    }

    /// Items of `json_data` that have the shape of a [`PackageEntry`]
    ///
    /// Non-object items, and objects whose `filename` is not a string, are
    /// dropped.
    pub fn entries(&self) -> Vec<PackageEntry> {
        self.json_data
            .iter()
            .filter_map(|item| match PackageEntry::deserialize(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping malformed package entry: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Archive member name for an uploaded file name
///
/// Every occurrence of `.pdf` is replaced by `.json`. Names without `.pdf`
/// are returned unchanged.
pub fn archive_member_name(filename: &str) -> String {
    filename.replace(".pdf", ".json")
}

/// Build a ZIP archive with one JSON member per complete entry
///
/// Entries lacking a filename or data are skipped. When two entries map to
/// the same member name they are merged into a single member: the later
/// entry's data wins and the first entry's position is kept. A ZIP with two
/// identically named members is never produced, since the writer rejects
/// duplicate names.
pub fn create_zip_package(entries: &[PackageEntry]) -> Result<Vec<u8>> {
    let mut members: Vec<(String, &Value)> = Vec::new();
    for entry in entries {
        let (Some(filename), Some(data)) = (&entry.filename, &entry.data) else {
            continue;
        };
        let name = archive_member_name(filename);
        match members.iter_mut().find(|(existing, _)| *existing == name) {
            Some(member) => {
                warn!("Duplicate archive member {name}, keeping the last entry");
                member.1 = data;
            }
            None => members.push((name, data)),
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in &members {
        let content = serde_json::to_string_pretty(data)?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    let buffer = zip.finish()?.into_inner();
    debug!(
        "Packaged {} members into {} bytes",
        members.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Standard (padded) base64 encoding of an archive
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_members(bytes: Vec<u8>) -> Vec<(String, String)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_member_name_replaces_pdf_substring() {
        assert_eq!(archive_member_name("report.pdf"), "report.json");
        assert_eq!(archive_member_name("a.pdf.pdf"), "a.json.json");
        assert_eq!(archive_member_name("my.pdf.backup"), "my.json.backup");
    }

    #[test]
    fn test_member_name_without_pdf_is_untouched() {
        assert_eq!(archive_member_name("notes.txt"), "notes.txt");
        assert_eq!(archive_member_name("REPORT.PDF"), "REPORT.PDF");
    }

    #[test]
    fn test_single_entry_is_pretty_printed() {
        let data = json!({"filename": "report.pdf", "total_pages": 0, "pages": []});
        let zip = create_zip_package(&[PackageEntry::new("report.pdf", data.clone())]).unwrap();

        let members = read_members(zip);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "report.json");
        assert_eq!(members[0].1, serde_json::to_string_pretty(&data).unwrap());
        assert!(members[0].1.contains("\n  \"total_pages\": 0"));
    }

    #[test]
    fn test_members_are_deflated() {
        let entry = PackageEntry::new("a.pdf", json!({"text": "x".repeat(1000)}));
        let zip = create_zip_package(&[entry]).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(zip)).unwrap();
        let file = archive.by_name("a.json").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < file.size());
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let entries = vec![
            PackageEntry {
                filename: Some("missing-data.pdf".to_string()),
                data: None,
            },
            PackageEntry {
                filename: None,
                data: Some(json!({})),
            },
            PackageEntry::new("kept.pdf", json!({"ok": true})),
        ];

        let members = read_members(create_zip_package(&entries).unwrap());
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "kept.json");
    }

    #[test]
    fn test_empty_package_is_valid_archive() {
        let zip = create_zip_package(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(zip)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_round_trip_preserves_data_and_key_order() {
        let data = json!({
            "filename": "b.pdf",
            "total_pages": 1,
            "pages": [{"page_number": 1, "content": "hi", "word_count": 1, "character_count": 2}]
        });
        let members = read_members(create_zip_package(&[PackageEntry::new("b.pdf", data.clone())]).unwrap());

        let restored: Value = serde_json::from_str(&members[0].1).unwrap();
        assert_eq!(restored, data);
        let first_key = members[0].1.lines().nth(1).unwrap().trim();
        assert!(first_key.starts_with("\"filename\""));
    }

    #[test]
    fn test_duplicate_member_keeps_last_entry() {
        let entries = vec![
            PackageEntry::new("x.pdf", json!(1)),
            PackageEntry::new("y.pdf", json!(2)),
            PackageEntry::new("x.pdf", json!(3)),
        ];
        let members = read_members(create_zip_package(&entries).unwrap());

        assert_eq!(members.len(), 2);
        assert_eq!(members[0], ("x.json".to_string(), "3".to_string()));
        assert_eq!(members[1], ("y.json".to_string(), "2".to_string()));
    }

    #[test]
    fn test_duplicate_non_ascii_names_merge_into_one_member() {
        let entries = vec![
            PackageEntry::new("café.pdf", json!({"t": "naïve"})),
            PackageEntry::new("café.pdf", json!({"t": "second"})),
        ];
        let members = read_members(create_zip_package(&entries).unwrap());

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "café.json");
        let restored: Value = serde_json::from_str(&members[0].1).unwrap();
        assert_eq!(restored, json!({"t": "second"}));
    }

    #[test]
    fn test_request_entries_are_lenient() {
        let request: BatchDownloadRequest = serde_json::from_value(json!({
            "action": "download_all",
            "json_data": [
                {"filename": "a.pdf", "data": {"k": 1}},
                {"filename": "b.pdf"},
                {"filename": 42, "data": {}},
                "not an object",
                {"filename": "c.pdf", "data": null}
            ]
        }))
        .unwrap();

        assert!(request.is_download_all());
        let entries = request.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].data, None);
        assert_eq!(entries[2].data, Some(Value::Null));

        let members = read_members(create_zip_package(&entries).unwrap());
        assert_eq!(members.len(), 2);
        assert_eq!(members[1], ("c.json".to_string(), "null".to_string()));
    }

    #[test]
    fn test_other_actions_are_not_download_all() {
        let request: BatchDownloadRequest =
            serde_json::from_value(json!({"action": "convert"})).unwrap();
        assert!(!request.is_download_all());
        assert!(request.json_data.is_empty());

        let request: BatchDownloadRequest = serde_json::from_value(json!({})).unwrap();
        assert!(!request.is_download_all());
    }

    #[test]
    fn test_base64_encoding() {
        assert_eq!(encode_base64(b"PK"), "UEs=");
        assert_eq!(encode_base64(&[]), "");
    }
}
