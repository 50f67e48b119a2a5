/// Card file codec.
///
/// A card file looks like:
///
/// ```text
///   ---
///   id: 12
///   title: Buy milk
///   list_order: 3.5
///   trello_data: {...}      <- foreign keys survive every write
///   ---
///   # Buy milk
///   body...
/// ```
///
/// Writes are read-modify-write: the raw frontmatter currently on disk is
/// merged with the typed [`CardMetadata`] so that keys we do not model are
/// preserved, while typed keys that were cleared disappear.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_yaml_ng::{Mapping, Value};

use crate::storage::{atomic_write, Result};
use crate::types::{truncate_preview, CardMetadata, KNOWN_META_KEYS, PREVIEW_MAX_LEN};

pub const DELIMITER: &str = "---";

/// Number of body lines read during a scan to build the preview.
pub const BODY_PREVIEW_MAX_LINES: usize = 20;

/// Typed keys written first, in this order.
const PRIORITY_KEYS: &[&str] = &[
    "id",
    "title",
    "list_order",
    "created",
    "updated",
    "due",
    "range",
    "labels",
    "icon",
    "url",
    "estimate",
];

/// Feed the lines of a card file to two callbacks: one for lines inside the
/// `---` block, one for lines after it. A callback returning false stops
/// the scan. Lines before the first delimiter belong to neither.
///
/// Frontmatter lines must be UTF-8; body lines are decoded lossily.
fn scan_card_lines<R: BufRead>(
    mut reader: R,
    mut on_frontmatter: impl FnMut(&str) -> bool,
    mut on_body: impl FnMut(&str) -> bool,
) -> std::io::Result<()> {
    let mut in_frontmatter = false;
    let mut dash_count = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let raw = strip_line_ending(&buf);

        if dash_count >= 2 {
            if !on_body(&String::from_utf8_lossy(raw)) {
                return Ok(());
            }
            continue;
        }

        let Ok(line) = std::str::from_utf8(raw) else {
            if in_frontmatter {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "frontmatter is not valid UTF-8",
                ));
            }
            continue;
        };
        if line.trim() == DELIMITER {
            dash_count += 1;
            in_frontmatter = dash_count == 1;
            continue;
        }
        if in_frontmatter && !on_frontmatter(line) {
            return Ok(());
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse the frontmatter of a card and collect a bounded body preview.
/// A file without frontmatter yields default metadata.
pub fn parse_file_header(path: &Path) -> Result<(CardMetadata, String)> {
    let file = File::open(path)?;

    let mut frontmatter = String::new();
    let mut preview = PreviewBuilder::default();

    scan_card_lines(
        BufReader::new(file),
        |line| {
            frontmatter.push_str(line);
            frontmatter.push('\n');
            true
        },
        |line| preview.push_line(line),
    )?;

    let meta = if frontmatter.trim().is_empty() {
        CardMetadata::default()
    } else {
        serde_yaml_ng::from_str(&frontmatter)?
    };
    Ok((meta, preview.finish()))
}

#[derive(Default)]
struct PreviewBuilder {
    text: String,
    lines: usize,
}

impl PreviewBuilder {
    /// Returns false once no more lines are wanted.
    fn push_line(&mut self, line: &str) -> bool {
        self.lines += 1;
        if self.lines > BODY_PREVIEW_MAX_LINES {
            return false;
        }
        self.text.push_str(line);
        self.text.push('\n');
        self.text.chars().count() < PREVIEW_MAX_LEN
    }

    fn finish(self) -> String {
        truncate_preview(&self.text)
    }
}

/// Preview of an in-memory body, identical to what a scan of the written
/// file would produce.
pub fn body_preview(body: &str) -> String {
    let mut preview = PreviewBuilder::default();
    for line in body.lines() {
        if !preview.push_line(line) {
            break;
        }
    }
    preview.finish()
}

/// Read the full markdown body of a card (everything after the frontmatter).
pub fn read_card_content(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| {
        log::error!("[daedalus.frontmatter] Failed to open {:?}: {}", path, e);
        e
    })?;

    let mut body = String::new();
    scan_card_lines(
        BufReader::new(file),
        |_| true,
        |line| {
            body.push_str(line);
            body.push('\n');
            true
        },
    )?;
    Ok(body)
}

/// Read the raw frontmatter of an existing card as an untyped mapping.
/// `Ok(None)` when the file does not exist or has no frontmatter.
pub fn read_raw_frontmatter(path: &Path) -> Result<Option<Mapping>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut frontmatter = String::new();
    scan_card_lines(
        BufReader::new(file),
        |line| {
            frontmatter.push_str(line);
            frontmatter.push('\n');
            true
        },
        |_| false,
    )?;

    if frontmatter.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml_ng::from_str::<Value>(&frontmatter)? {
        Value::Mapping(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => {
            log::warn!(
                "[daedalus.frontmatter] Frontmatter of {:?} is not a mapping ({:?}), ignoring",
                path,
                other
            );
            Ok(None)
        }
    }
}

fn is_known_key(key: &Value) -> bool {
    key.as_str().map_or(false, |k| KNOWN_META_KEYS.contains(&k))
}

/// Combine the typed metadata with the raw frontmatter previously on disk.
///
/// Typed fields that are set come from `meta`; typed fields that are empty
/// are absent from the result even if `existing` had them. Every foreign key
/// of `existing` is carried over unchanged, in its original order.
pub fn merge_frontmatter(existing: Option<&Mapping>, meta: &CardMetadata) -> Result<Mapping> {
    let mut merged = match serde_yaml_ng::to_value(meta)? {
        Value::Mapping(map) => map,
        _ => Mapping::new(),
    };

    if let Some(existing) = existing {
        for (key, value) in existing {
            if !is_known_key(key) && !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(merged)
}

/// Serialize a merged frontmatter mapping with a stable key order:
/// priority keys, then the other known keys alphabetically, then foreign
/// keys in the order they appear in `merged`.
pub fn render_frontmatter(merged: &Mapping) -> Result<String> {
    let mut ordered: Vec<Value> = Vec::with_capacity(merged.len());

    for key in PRIORITY_KEYS {
        if merged.contains_key(*key) {
            ordered.push(Value::from(*key));
        }
    }

    let mut rest_known: Vec<&str> = KNOWN_META_KEYS
        .iter()
        .copied()
        .filter(|k| !PRIORITY_KEYS.contains(k) && merged.contains_key(*k))
        .collect();
    rest_known.sort_unstable();
    ordered.extend(rest_known.into_iter().map(Value::from));

    ordered.extend(merged.keys().filter(|k| !is_known_key(k)).cloned());

    let mut out = String::new();
    for key in ordered {
        if let Some(value) = merged.get(&key) {
            let mut single = Mapping::new();
            single.insert(key, value.clone());
            out.push_str(&serde_yaml_ng::to_string(&single)?);
        }
    }
    Ok(out)
}

/// Render a complete card file from frontmatter and body.
pub fn render_card(merged: &Mapping, body: &str) -> Result<String> {
    let yaml = render_frontmatter(merged)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

/// Write a card's metadata and body, preserving foreign frontmatter keys
/// already present in the file.
///
/// Malformed frontmatter in the existing file is not fatal: the write goes
/// ahead with the typed fields only.
pub fn write_card_file(path: &Path, meta: &CardMetadata, body: &str) -> Result<()> {
    let existing = match read_raw_frontmatter(path) {
        Ok(existing) => existing,
        Err(e) => {
            log::warn!(
                "[daedalus.frontmatter] Unreadable frontmatter in {:?}, foreign keys dropped: {}",
                path,
                e
            );
            None
        }
    };

    let merged = merge_frontmatter(existing.as_ref(), meta)?;
    let content = render_card(&merged, body)?;

    atomic_write(path, &content).map_err(|e| {
        log::error!("[daedalus.frontmatter] Failed to write {:?}: {}", path, e);
        e
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp;
    use crate::types::{CheckListItem, Checklist, Counter, TimeSeries, TimeSeriesEntry};
    use std::fs;
    use tempfile::TempDir;

    fn write_test_card(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_card_content_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "1.md",
            "---\ntitle: \"Test Card\"\nid: 1\n---\n# Test Card\n\nSome body content here.\nSecond line.\n",
        );
        let body = read_card_content(&path).unwrap();
        assert_eq!(body, "# Test Card\n\nSome body content here.\nSecond line.\n");
    }

    #[test]
    fn test_read_card_content_empty_body() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(dir.path(), "2.md", "---\ntitle: \"Empty Body\"\nid: 2\n---\n");
        assert_eq!(read_card_content(&path).unwrap(), "");
    }

    #[test]
    fn test_read_card_content_no_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(dir.path(), "3.md", "# Just Markdown\n\nNo frontmatter here.\n");
        assert_eq!(read_card_content(&path).unwrap(), "");
    }

    #[test]
    fn test_read_card_content_keeps_later_rules() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "4.md",
            "---\nid: 4\n---\nabove\n---\nbelow\n",
        );
        assert_eq!(read_card_content(&path).unwrap(), "above\n---\nbelow\n");
    }

    #[test]
    fn test_read_card_content_missing_file() {
        assert!(read_card_content(Path::new("/nonexistent/path/card.md")).is_err());
    }

    #[test]
    fn test_parse_file_header_basic_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "10.md",
            "---\ntitle: \"Parse Test\"\nid: 10\nlist_order: 5\nlabels:\n  - \"bug\"\n  - \"urgent\"\ndue: 2026-03-01\n---\n# Parse Test\n\nBody here.\n",
        );
        let (meta, preview) = parse_file_header(&path).unwrap();
        assert_eq!(meta.id, 10);
        assert_eq!(meta.title, "Parse Test");
        assert_eq!(meta.list_order, 5.0);
        assert_eq!(meta.labels, vec!["bug", "urgent"]);
        assert_eq!(meta.due, timestamp::parse("2026-03-01"));
        assert!(preview.starts_with("# Parse Test"));
    }

    #[test]
    fn test_parse_file_header_checklist_and_counter() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "11.md",
            "---\nid: 11\ntitle: Lists\nchecklist:\n  label: Steps\n  items:\n    - idx: 0\n      desc: \"first: step\"\n      done: true\n    - idx: 1\n      desc: second\n      done: false\ncounter:\n  current: 2\n  max: 10\n  step: 2\n  label: reps\n---\n",
        );
        let (meta, _) = parse_file_header(&path).unwrap();
        let checklist = meta.checklist.unwrap();
        assert_eq!(checklist.label, "Steps");
        assert_eq!(checklist.items.len(), 2);
        assert_eq!(checklist.items[0].desc, "first: step");
        assert!(checklist.items[0].done);
        let counter = meta.counter.unwrap();
        assert_eq!((counter.current, counter.max, counter.step), (2, 10, 2));
        assert_eq!(counter.label, "reps");
    }

    #[test]
    fn test_parse_file_header_preview_is_bounded() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("---\nid: 1\n---\n");
        for i in 0..100 {
            content.push_str(&format!("line number {i} with some filler text\n"));
        }
        let path = write_test_card(dir.path(), "1.md", &content);
        let (_, preview) = parse_file_header(&path).unwrap();
        assert!(preview.chars().count() <= PREVIEW_MAX_LEN);
        assert!(preview.starts_with("line number 0"));
    }

    #[test]
    fn test_body_preview_matches_scanned_preview() {
        let dir = TempDir::new().unwrap();
        let bodies = [
            String::new(),
            "# Title\n\nshort\n".to_string(),
            "no trailing newline".to_string(),
            (0..40).map(|i| format!("l{i}\n")).collect::<String>(),
            "x".repeat(400),
        ];
        for (i, body) in bodies.iter().enumerate() {
            let path = dir.path().join(format!("{i}.md"));
            write_card_file(&path, &CardMetadata::default(), body).unwrap();
            let (_, scanned) = parse_file_header(&path).unwrap();
            assert_eq!(body_preview(body), scanned, "body #{i}");
        }
    }

    #[test]
    fn test_parse_file_header_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(dir.path(), "1.md", "---\nid: [unclosed\n---\nbody\n");
        assert!(parse_file_header(&path).is_err());
    }

    #[test]
    fn test_write_card_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.md");
        let meta = CardMetadata {
            id: 1,
            title: "Round Trip".to_string(),
            created: timestamp::parse("2026-01-05T10:00:00Z"),
            list_order: 5.5,
            labels: vec!["test".to_string(), "roundtrip".to_string()],
            estimate: Some(1.5),
            url: "https://example.com".to_string(),
            checklist: Some(Checklist {
                label: "Steps".to_string(),
                items: vec![
                    CheckListItem { idx: 0, desc: "Step 1".to_string(), done: true },
                    CheckListItem { idx: 1, desc: "Step 2: the sequel".to_string(), done: false },
                ],
            }),
            counter: Some(Counter { current: 1, max: 3, ..Default::default() }),
            ..Default::default()
        };
        let body = "# Round Trip\n\nSome description.\n";

        write_card_file(&path, &meta, body).unwrap();

        let (read_meta, preview) = parse_file_header(&path).unwrap();
        assert_eq!(read_meta, meta);
        assert!(!preview.is_empty());
        assert_eq!(read_card_content(&path).unwrap(), body);
    }

    #[test]
    fn test_write_card_file_key_order() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "5.md",
            "---\nzzz_tool: 1\nid: 5\naaa_tool: 2\n---\n",
        );
        let meta = CardMetadata {
            id: 5,
            title: "Ordered".to_string(),
            list_order: 2.0,
            labels: vec!["x".to_string()],
            timeseries: Some(TimeSeries::default()),
            checklist: Some(Checklist::default()),
            ..Default::default()
        };
        write_card_file(&path, &meta, "").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let keys: Vec<&str> = raw
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-') && l.contains(':'))
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec!["id", "title", "list_order", "labels", "checklist", "timeseries", "zzz_tool", "aaa_tool"]
        );
        assert!(raw.starts_with("---\nid: 5\n"));
    }

    #[test]
    fn test_write_card_file_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(
            dir.path(),
            "2.md",
            "---\ntitle: \"Trello Card\"\nid: 2\nlist_order: 1\ntrello_data:\n  board_id: \"abc123\"\n  card_id: \"def456\"\n  actions: [1, 2, 3]\nreviewed: true\n---\n# Trello Card\n\nImported from Trello.\n",
        );
        let before = read_raw_frontmatter(&path).unwrap().unwrap();

        let meta = CardMetadata {
            id: 2,
            title: "Updated Trello Card".to_string(),
            list_order: 1.0,
            ..Default::default()
        };
        write_card_file(&path, &meta, "# Updated Trello Card\n\nNew body.\n").unwrap();

        let after = read_raw_frontmatter(&path).unwrap().unwrap();
        for key in ["trello_data", "reviewed"] {
            assert_eq!(after.get(key), before.get(key), "{key} changed");
        }
        let (read_meta, _) = parse_file_header(&path).unwrap();
        assert_eq!(read_meta.title, "Updated Trello Card");
    }

    #[test]
    fn test_write_card_file_clears_removed_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("3.md");
        let mut meta = CardMetadata {
            id: 3,
            title: "Due Card".to_string(),
            list_order: 1.0,
            due: timestamp::parse("2026-03-01"),
            labels: vec!["soon".to_string()],
            ..Default::default()
        };
        write_card_file(&path, &meta, "# Due Card\n").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("due:"));
        assert!(raw.contains("labels:"));

        meta.due = None;
        meta.labels.clear();
        write_card_file(&path, &meta, "# Due Card\n").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("due:"));
        assert!(!raw.contains("labels:"));
    }

    #[test]
    fn test_write_card_file_timeseries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ts.md");
        let meta = CardMetadata {
            id: 100,
            title: "TS Card".to_string(),
            list_order: 1.0,
            timeseries: Some(TimeSeries {
                label: "Weight".to_string(),
                entries: vec![
                    TimeSeriesEntry { time: "2026-01-01".to_string(), value: 215.0 },
                    TimeSeriesEntry { time: "2026-01-02".to_string(), value: 214.5 },
                ],
            }),
            ..Default::default()
        };
        write_card_file(&path, &meta, "# TS Card\n").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("timeseries:"));
        assert!(raw.contains("Weight"));

        let (read_meta, _) = parse_file_header(&path).unwrap();
        let ts = read_meta.timeseries.unwrap();
        assert_eq!(ts.entries.len(), 2);
        assert_eq!(ts.entries[0].time, "2026-01-01");
        assert_eq!(ts.entries[1].value, 214.5);
    }

    #[test]
    fn test_write_card_file_empty_timeseries_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ts-empty.md");
        let meta = CardMetadata {
            id: 101,
            title: "Empty TS".to_string(),
            list_order: 1.0,
            timeseries: Some(TimeSeries::default()),
            ..Default::default()
        };
        write_card_file(&path, &meta, "# Empty TS\n").unwrap();

        let (read_meta, _) = parse_file_header(&path).unwrap();
        assert_eq!(read_meta.timeseries, Some(TimeSeries::default()));
    }

    #[test]
    fn test_write_card_file_over_malformed_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(dir.path(), "6.md", "---\nid: [broken\nforeign: 1\n---\nold body\n");
        let meta = CardMetadata {
            id: 6,
            title: "Fixed".to_string(),
            ..Default::default()
        };
        write_card_file(&path, &meta, "new body\n").unwrap();

        let (read_meta, _) = parse_file_header(&path).unwrap();
        assert_eq!(read_meta.title, "Fixed");
        assert!(!fs::read_to_string(&path).unwrap().contains("foreign"));
    }

    #[test]
    fn test_merge_is_pure_and_typed_wins() {
        let existing: Mapping =
            serde_yaml_ng::from_str("id: 9\ntitle: old\nicon: star.svg\nfoo: bar\n7: numeric key\n").unwrap();
        let meta = CardMetadata {
            id: 9,
            title: "new".to_string(),
            ..Default::default()
        };

        let merged = merge_frontmatter(Some(&existing), &meta).unwrap();
        assert_eq!(merged.get("title"), Some(&Value::from("new")));
        // cleared typed field is not resurrected from disk
        assert!(merged.get("icon").is_none());
        assert_eq!(merged.get("foo"), Some(&Value::from("bar")));
        assert_eq!(
            merged.get(Value::Number(7.into())),
            Some(&Value::from("numeric key"))
        );

        let again = merge_frontmatter(Some(&existing), &meta).unwrap();
        assert_eq!(merged, again);
    }

    #[test]
    fn test_roundtrip_fidelity_many_unknowns() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("---\nid: 1\ntitle: T\nlist_order: 3\nlabels: [a]\n");
        for i in 0..25 {
            content.push_str(&format!("ext_{i}:\n  nested: {i}\n  list: [x, {i}]\n"));
        }
        content.push_str("---\nbody\n");
        let path = write_test_card(dir.path(), "1.md", &content);

        let before = read_raw_frontmatter(&path).unwrap().unwrap();
        let (meta, _) = parse_file_header(&path).unwrap();
        let body = read_card_content(&path).unwrap();
        write_card_file(&path, &meta, &body).unwrap();
        let after = read_raw_frontmatter(&path).unwrap().unwrap();

        for (key, value) in &before {
            if !is_known_key(key) {
                assert_eq!(after.get(key), Some(value));
            }
        }
        assert_eq!(read_card_content(&path).unwrap(), "body\n");
    }

    #[test]
    fn test_non_utf8_body_keeps_card() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.md");
        fs::write(
            &path,
            b"---\nid: 1\ntitle: Caf\ntrello_data: keep\n---\ncaf\xe9 latin-1 body\nnext\n",
        )
        .unwrap();

        let (meta, preview) = parse_file_header(&path).unwrap();
        assert_eq!(meta.id, 1);
        assert_eq!(meta.title, "Caf");
        assert_eq!(preview, "caf\u{FFFD} latin-1 body\nnext\n");
        assert_eq!(read_card_content(&path).unwrap(), "caf\u{FFFD} latin-1 body\nnext\n");

        let raw = read_raw_frontmatter(&path).unwrap().unwrap();
        assert_eq!(raw.get("trello_data"), Some(&Value::from("keep")));

        write_card_file(&path, &meta, "new body\n").unwrap();
        let after = read_raw_frontmatter(&path).unwrap().unwrap();
        assert_eq!(after.get("trello_data"), Some(&Value::from("keep")));
    }

    #[test]
    fn test_non_utf8_frontmatter_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.md");
        fs::write(&path, b"---\nid: 1\ntitle: Caf\xe9\n---\nbody\n").unwrap();
        assert!(parse_file_header(&path).is_err());
    }

    #[test]
    fn test_crlf_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_test_card(dir.path(), "1.md", "---\r\nid: 4\r\n---\r\nbody\r\n");
        let (meta, _) = parse_file_header(&path).unwrap();
        assert_eq!(meta.id, 4);
        assert_eq!(read_card_content(&path).unwrap(), "body\n");
    }
}
