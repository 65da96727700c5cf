//! The turn-value table and its on-disk formats.
//!
//! Binary format: 16-byte little-endian header (magic "YHTZ", version, slot
//! count, reserved) followed by one f32 per [`TurnState::id`] slot,
//! `MAX_TURN_STATE_ID + 1` slots in id order. About 3 MB.
//!
//! JSON format: a single array of `MAX_TURN_STATE_ID + 1` numbers.
//!
//! Values are held as f64 in memory and narrowed to f32 on disk. Files are
//! loaded through a read-only memory map.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::Mmap;
use thiserror::Error;
use tracing::info;

use crate::constants::*;
use crate::types::TurnState;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt value table: {reason}")]
    CorruptData { reason: String },
    #[error("failed to encode value table as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    fn corrupt(reason: impl Into<String>) -> Self {
        StorageError::CorruptData {
            reason: reason.into(),
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// On-disk encoding of a [`TurnValues`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    #[default]
    Binary,
    Json,
}

const SLOT_COUNT: usize = MAX_TURN_STATE_ID + 1;

/// Expected future score for every turn state, indexed by [`TurnState::id`].
///
/// Unreachable slots hold 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnValues {
    values: Vec<f64>,
}

impl TurnValues {
    /// All-zero table.
    pub fn new() -> Self {
        TurnValues {
            values: vec![0.0; SLOT_COUNT],
        }
    }

    #[inline(always)]
    pub fn get(&self, state: &TurnState) -> f64 {
        self.values[state.id()]
    }

    pub fn insert(&mut self, state: &TurnState, value: f64) {
        self.values[state.id()] = value;
    }

    #[inline(always)]
    pub(crate) fn set_by_id(&mut self, id: usize, value: f64) {
        self.values[id] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode in the default binary format.
    pub fn serialize(&self) -> Vec<u8> {
        self.to_binary()
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(VALUE_FILE_HEADER_LEN + SLOT_COUNT * 4);
        for word in [VALUE_FILE_MAGIC, VALUE_FILE_VERSION, SLOT_COUNT as u32, 0] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        for &v in &self.values {
            bytes.extend_from_slice(&(v as f32).to_le_bytes());
        }
        bytes
    }

    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        let narrowed: Vec<f32> = self.values.iter().map(|&v| v as f32).collect();
        Ok(serde_json::to_vec(&narrowed)?)
    }

    pub fn encode(&self, format: ValueFormat) -> Result<Vec<u8>, StorageError> {
        match format {
            ValueFormat::Binary => Ok(self.to_binary()),
            ValueFormat::Json => self.to_json(),
        }
    }

    /// Decode either format; the magic number selects binary.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.len() >= 4 && read_u32(bytes, 0) == VALUE_FILE_MAGIC {
            Self::from_binary(bytes)
        } else {
            Self::from_json(bytes)
        }
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, StorageError> {
        if bytes.len() < VALUE_FILE_HEADER_LEN {
            return Err(StorageError::corrupt(format!(
                "{} bytes is shorter than the header",
                bytes.len()
            )));
        }
        let magic = read_u32(bytes, 0);
        let version = read_u32(bytes, 4);
        let count = read_u32(bytes, 8) as usize;
        if magic != VALUE_FILE_MAGIC || version != VALUE_FILE_VERSION {
            return Err(StorageError::corrupt(format!(
                "invalid header (magic=0x{magic:08x} version={version})"
            )));
        }
        if count != SLOT_COUNT {
            return Err(StorageError::corrupt(format!(
                "expected {SLOT_COUNT} slots, header says {count}"
            )));
        }
        let body = &bytes[VALUE_FILE_HEADER_LEN..];
        if body.len() != count * 4 {
            return Err(StorageError::corrupt(format!(
                "expected {} value bytes, got {}",
                count * 4,
                body.len()
            )));
        }

        let mut values = Vec::with_capacity(count);
        for (i, chunk) in body.chunks_exact(4).enumerate() {
            let v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if !v.is_finite() {
                return Err(StorageError::corrupt(format!("non-finite value at slot {i}")));
            }
            values.push(v as f64);
        }
        Ok(TurnValues { values })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        let narrowed: Vec<f32> = serde_json::from_slice(bytes)
            .map_err(|e| StorageError::corrupt(format!("invalid JSON: {e}")))?;
        if narrowed.len() != SLOT_COUNT {
            return Err(StorageError::corrupt(format!(
                "expected {SLOT_COUNT} slots, got {}",
                narrowed.len()
            )));
        }
        if let Some(i) = narrowed.iter().position(|v| !v.is_finite()) {
            return Err(StorageError::corrupt(format!("non-finite value at slot {i}")));
        }
        Ok(TurnValues {
            values: narrowed.into_iter().map(f64::from).collect(),
        })
    }
}

impl Default for TurnValues {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Decode a value table from bytes in either format.
pub fn load_value_table(bytes: &[u8]) -> Result<TurnValues, StorageError> {
    TurnValues::from_bytes(bytes)
}

/// Load a value table file via a read-only memory map.
pub fn load_turn_values(path: impl AsRef<Path>) -> Result<TurnValues, StorageError> {
    let path = path.as_ref();
    let start_time = Instant::now();

    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let len = file.metadata().map_err(|e| StorageError::io(path, e))?.len();
    if len == 0 {
        return Err(StorageError::corrupt(format!("{} is empty", path.display())));
    }
    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| StorageError::io(path, e))?;
    let values = TurnValues::from_bytes(&mmap)?;

    info!(
        path = %path.display(),
        slots = values.len(),
        elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "loaded turn values"
    );
    Ok(values)
}

/// Write a value table, creating parent directories as needed.
pub fn save_turn_values(
    values: &TurnValues,
    path: impl AsRef<Path>,
    format: ValueFormat,
) -> Result<(), StorageError> {
    let path = path.as_ref();
    let start_time = Instant::now();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    let bytes = values.encode(format)?;
    let mut file = File::create(path).map_err(|e| StorageError::io(path, e))?;
    file.write_all(&bytes).map_err(|e| StorageError::io(path, e))?;

    info!(
        path = %path.display(),
        bytes = bytes.len(),
        ?format,
        elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "saved turn values"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, CategorySet};

    fn sample() -> TurnValues {
        let mut values = TurnValues::new();
        values.insert(&TurnState::default(), 254.5899);
        values.insert(&TurnState::default().next(Category::Chance, 22), 231.25);
        values.insert(&TurnState::new(CategorySet::full(), 63, true), 0.0);
        values
    }

    #[test]
    fn test_size() {
        assert_eq!(TurnValues::new().len(), MAX_TURN_STATE_ID + 1);
        assert_eq!(
            sample().to_binary().len(),
            VALUE_FILE_HEADER_LEN + (MAX_TURN_STATE_ID + 1) * 4
        );
    }

    #[test]
    fn test_binary_header() {
        let bytes = sample().to_binary();
        assert_eq!(&bytes[..4], b"YHTZ");
        assert_eq!(read_u32(&bytes, 4), VALUE_FILE_VERSION);
        assert_eq!(read_u32(&bytes, 8) as usize, MAX_TURN_STATE_ID + 1);
        assert_eq!(read_u32(&bytes, 12), 0);
    }

    #[test]
    fn test_binary_reload() {
        let original = sample();
        let loaded = load_value_table(&original.serialize()).unwrap();
        let start = TurnState::default();
        assert!((loaded.get(&start) - 254.5899).abs() < 1e-4);
        assert_eq!(loaded.get(&start.next(Category::Chance, 22)), 231.25);
    }

    #[test]
    fn test_json_reload() {
        let original = sample();
        let bytes = original.to_json().unwrap();
        assert_eq!(bytes.first(), Some(&b'['));
        let loaded = TurnValues::from_bytes(&bytes).unwrap();
        assert!((loaded.get(&TurnState::default()) - 254.5899).abs() < 1e-4);
    }

    #[test]
    fn test_truncated_binary_rejected() {
        let bytes = sample().to_binary();
        let err = TurnValues::from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, StorageError::CorruptData { .. }));
        let err = TurnValues::from_bytes(&bytes[..8]).unwrap_err();
        assert!(matches!(err, StorageError::CorruptData { .. }));
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut bytes = sample().to_binary();
        bytes[4] = 99;
        assert!(matches!(
            TurnValues::from_bytes(&bytes),
            Err(StorageError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        for bytes in [&b""[..], b"not a table", b"[1.0, 2.0]", b"{\"a\": 1}"] {
            assert!(matches!(
                TurnValues::from_bytes(bytes),
                Err(StorageError::CorruptData { .. })
            ));
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("yahtzee-storage-{}", std::process::id()));
        let path = dir.join("nested").join("values.bin");
        save_turn_values(&sample(), &path, ValueFormat::Binary).unwrap();
        let loaded = load_turn_values(&path).unwrap();
        assert_eq!(loaded.get(&TurnState::default().next(Category::Chance, 22)), 231.25);

        let json_path = dir.join("values.json");
        save_turn_values(&sample(), &json_path, ValueFormat::Json).unwrap();
        assert_eq!(load_turn_values(&json_path).unwrap(), loaded);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_turn_values("/nonexistent/yahtzee/values.bin").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
