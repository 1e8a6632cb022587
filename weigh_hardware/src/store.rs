//! Key/value persistence for calibration state.
//!
//! `FileStore` keeps one TOML file per namespace and rewrites it atomically
//! on every put, so a power cut leaves either the old or the new values.
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use weigh_traits::{BoxError, KvStore};

use crate::error::{HwError, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Slots {
    #[serde(default)]
    floats: BTreeMap<String, f32>,
    #[serde(default)]
    ints: BTreeMap<String, i32>,
}

/// Write `bytes` to `path` via a synced sibling file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}

/// TOML-file backed store: `<dir>/<namespace>.toml`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Slots,
}

impl FileStore {
    /// Open (or lazily create) the namespace file under `dir`.
    ///
    /// A missing file is an empty store; an unparsable one is an error so a
    /// corrupt calibration is never silently replaced by defaults on write.
    pub fn open(dir: &Path, namespace: &str) -> Result<Self> {
        if namespace.is_empty() || namespace.contains(['/', '\\']) {
            return Err(HwError::Storage(format!("invalid namespace {namespace:?}")));
        }
        let path = dir.join(format!("{namespace}.toml"));
        let slots = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)
                .map_err(|e| HwError::Storage(format!("parse {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Slots::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "opened calibration store");
        Ok(Self { path, slots })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = toml::to_string(&self.slots)
            .map_err(|e| HwError::Storage(format!("encode: {e}")))?;
        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.slots.floats.get(key).copied().unwrap_or(default)
    }

    fn put_f32(&mut self, key: &str, value: f32) -> std::result::Result<(), BoxError> {
        self.slots.floats.insert(key.to_string(), value);
        self.flush().map_err(Into::into)
    }

    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.slots.ints.get(key).copied().unwrap_or(default)
    }

    fn put_i32(&mut self, key: &str, value: i32) -> std::result::Result<(), BoxError> {
        self.slots.ints.insert(key.to_string(), value);
        self.flush().map_err(Into::into)
    }
}

#[derive(Debug, Default)]
struct MemState {
    floats: HashMap<String, f32>,
    ints: HashMap<String, i32>,
    fail_writes: bool,
    writes: usize,
}

/// Volatile store. Clones share contents, which lets tests inspect what the
/// firmware persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Make subsequent puts fail (values are not stored).
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful puts.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

impl KvStore for MemoryStore {
    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.lock().floats.get(key).copied().unwrap_or(default)
    }

    fn put_f32(&mut self, key: &str, value: f32) -> std::result::Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_writes {
            return Err(Box::new(HwError::Storage("write refused".into())));
        }
        st.floats.insert(key.to_string(), value);
        st.writes += 1;
        Ok(())
    }

    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.lock().ints.get(key).copied().unwrap_or(default)
    }

    fn put_i32(&mut self, key: &str, value: i32) -> std::result::Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_writes {
            return Err(Box::new(HwError::Storage("write refused".into())));
        }
        st.ints.insert(key.to_string(), value);
        st.writes += 1;
        Ok(())
    }
}
