/// Event types emitted by the board watcher.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Events emitted when a board changes outside of this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardChangeEvent {
    /// Files under the board changed since the last accepted snapshot.
    #[serde(rename_all = "camelCase")]
    ExternalChange {
        #[serde(serialize_with = "serialize_path", deserialize_with = "deserialize_path")]
        root: PathBuf,
        #[serde(serialize_with = "serialize_paths", deserialize_with = "deserialize_paths")]
        changed_paths: Vec<PathBuf>,
    },
    /// The watcher was closed and will not emit again.
    #[serde(rename_all = "camelCase")]
    Stopped {
        #[serde(serialize_with = "serialize_path", deserialize_with = "deserialize_path")]
        root: PathBuf,
    },
}

fn serialize_path<S: serde::Serializer>(path: &PathBuf, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy())
}

fn deserialize_path<'de, D: serde::Deserializer<'de>>(d: D) -> Result<PathBuf, D::Error> {
    let s = String::deserialize(d)?;
    Ok(PathBuf::from(s))
}

fn serialize_paths<S: serde::Serializer>(paths: &[PathBuf], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}

fn deserialize_paths<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Vec<PathBuf>, D::Error> {
    let raw = Vec::<String>::deserialize(d)?;
    Ok(raw.into_iter().map(PathBuf::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = BoardChangeEvent::ExternalChange {
            root: PathBuf::from("/boards/home"),
            changed_paths: vec![PathBuf::from("/boards/home/open/1.md")],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "externalChange");
        assert_eq!(json["root"], "/boards/home");
        assert_eq!(json["changedPaths"][0], "/boards/home/open/1.md");

        let decoded: BoardChangeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_stopped_event() {
        let json = serde_json::to_string(&BoardChangeEvent::Stopped {
            root: PathBuf::from("/b"),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"stopped","root":"/b"}"#);
    }
}
