//! Versioned JSON save file with a SHA-256 body digest.
//!
//! The document carries the session snapshot plus `format_version`,
//! a write timestamp, and `body_sha256_hex` computed over the snapshot's
//! canonical JSON. Loading verifies the version and the digest before
//! anything reaches the session, so a truncated or hand-edited file is
//! rejected instead of half-restored. Writes go through a temp file and
//! rename so a crash never leaves a torn save behind.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use game_core::SessionSnapshot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct SaveDocument {
    format_version: u32,
    updated_at_unix_ms: u64,
    body_sha256_hex: String,
    snapshot: SessionSnapshot,
}

#[derive(Debug)]
pub enum SaveFileError {
    Io(io::Error),
    /// The file is not a valid save document.
    Malformed { message: String },
    /// The document's version is not one this build reads.
    UnsupportedVersion { found: u32 },
    /// The body digest does not match the stored snapshot.
    DigestMismatch,
}

impl fmt::Display for SaveFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "save file I/O error: {e}"),
            Self::Malformed { message } => write!(f, "malformed save file: {message}"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported save format version {found} (expected {FORMAT_VERSION})")
            }
            Self::DigestMismatch => write!(f, "save file SHA-256 digest mismatch"),
        }
    }
}

impl std::error::Error for SaveFileError {}

impl From<io::Error> for SaveFileError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// `hex(SHA-256(snapshot_json))`.
fn body_digest(snapshot_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(snapshot_json.as_bytes());
    let result = hasher.finalize();
    format!("{result:064x}")
}

/// Platform data-directory path for the save file, when one exists.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "Cachegrid").map(|dirs| {
        let mut path = dirs.data_dir().to_path_buf();
        path.push("session.json");
        path
    })
}

/// Serialize `snapshot` and write it atomically (temp file + rename).
pub fn write_atomic(path: &Path, snapshot: &SessionSnapshot) -> Result<(), SaveFileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let snapshot_json = serde_json::to_string(snapshot)
        .map_err(|e| SaveFileError::Malformed { message: e.to_string() })?;
    let document = SaveDocument {
        format_version: FORMAT_VERSION,
        updated_at_unix_ms: unix_ms_now(),
        body_sha256_hex: body_digest(&snapshot_json),
        snapshot: snapshot.clone(),
    };
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| SaveFileError::Malformed { message: e.to_string() })?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Load and fully validate a save file.
pub fn load(path: &Path) -> Result<SessionSnapshot, SaveFileError> {
    let content = fs::read_to_string(path)?;
    let document: SaveDocument = serde_json::from_str(&content)
        .map_err(|e| SaveFileError::Malformed { message: e.to_string() })?;

    if document.format_version != FORMAT_VERSION {
        return Err(SaveFileError::UnsupportedVersion { found: document.format_version });
    }

    // Recompute the digest over the snapshot's canonical serialization.
    let snapshot_json = serde_json::to_string(&document.snapshot)
        .map_err(|e| SaveFileError::Malformed { message: e.to_string() })?;
    if body_digest(&snapshot_json) != document.body_sha256_hex {
        return Err(SaveFileError::DigestMismatch);
    }

    Ok(document.snapshot)
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Point, Token};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn sample_snapshot() -> SessionSnapshot {
        let mut mementos = BTreeMap::new();
        mementos.insert("0,0".to_string(), "[{\"i\":0,\"j\":0,\"serial\":0}]".to_string());
        SessionSnapshot {
            collected: vec![Token { i: 3, j: -4, serial: 1 }],
            mementos,
            auto_tracking: false,
            position: Point::new(36.9895, -122.0628),
            path: vec![vec![Point::new(36.9895, -122.0628)]],
        }
    }

    #[test]
    fn test_atomic_write_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let snapshot = sample_snapshot();

        write_atomic(&path, &snapshot).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        write_atomic(&path, &sample_snapshot()).unwrap();

        let tampered =
            fs::read_to_string(&path).unwrap().replace("\"serial\": 1", "\"serial\": 2");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(load(&path), Err(SaveFileError::DigestMismatch)));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        write_atomic(&path, &sample_snapshot()).unwrap();

        let bumped = fs::read_to_string(&path)
            .unwrap()
            .replace("\"format_version\": 1", "\"format_version\": 99");
        fs::write(&path, bumped).unwrap();

        assert!(matches!(load(&path), Err(SaveFileError::UnsupportedVersion { found: 99 })));
    }

    #[test]
    fn test_non_json_file_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "definitely not json").unwrap();
        assert!(matches!(load(&path), Err(SaveFileError::Malformed { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load(&path), Err(SaveFileError::Io(_))));
    }
}
