use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info, warn};

use crate::config::{LedgerConfig, StoreBackend};

use super::error::{LedgerError, Result};
use super::history::Snapshot;

/// Atomic load/save of a whole ledger snapshot.
///
/// Implementations know nothing about the data beyond encoding it. `save`
/// must never leave a partially written snapshot visible to `load`.
pub trait SnapshotStore: Send + Sync {
    /// Read the persisted snapshot. Missing data is an empty snapshot;
    /// unparsable data is [`LedgerError::CorruptData`].
    fn load(&self) -> Result<Snapshot>;

    /// Replace the persisted snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;
}

/// Open the backend selected in configuration.
pub fn open_store(config: &LedgerConfig) -> Result<Box<dyn SnapshotStore>> {
    let store: Box<dyn SnapshotStore> = match config.backend {
        StoreBackend::File => Box::new(FileStore::new(&config.path)),
        StoreBackend::Fjall => Box::new(FjallStore::open(&config.path)?),
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    };
    info!(backend = ?config.backend, location = %store.location(), "Snapshot store ready");
    Ok(store)
}

fn decode(bytes: &[u8], location: &str) -> Result<Snapshot> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::corrupt(location, e))
}

/// Single JSON document on the local filesystem.
///
/// Saves go through a sibling temp file that is fsynced and then renamed over
/// the target, so readers see either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_temp(&self, tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Snapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot found, starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = decode(&bytes, &self.location())?;
        info!(
            path = %self.path.display(),
            events = snapshot.history.len(),
            subjects = snapshot.last_seen.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;

        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        if let Err(e) = self.write_temp(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, &self.path)?;

        // Make the rename itself durable. Not every platform can open a directory.
        #[cfg(unix)]
        {
            let dir = parent.unwrap_or_else(|| Path::new("."));
            if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
                warn!(dir = %dir.display(), error = %e, "Failed to sync snapshot directory");
            }
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Saved snapshot");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

const SNAPSHOT_PARTITION: &str = "ledger";
const SNAPSHOT_KEY: &[u8] = b"snapshot";

/// Fjall-backed store holding the snapshot under a single key.
///
/// A single-key insert is atomic in fjall; each save is followed by a
/// `SyncAll` persist so it survives a crash.
#[derive(Clone)]
pub struct FjallStore {
    path: PathBuf,
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallStore {
    /// Open or create a Fjall keyspace at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Fjall store at: {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let partition =
            keyspace.open_partition(SNAPSHOT_PARTITION, PartitionCreateOptions::default())?;

        Ok(Self {
            path: path.to_path_buf(),
            keyspace,
            partition,
        })
    }
}

impl SnapshotStore for FjallStore {
    fn load(&self) -> Result<Snapshot> {
        match self.partition.get(SNAPSHOT_KEY)? {
            Some(value) => {
                let snapshot = decode(&value, &self.location())?;
                info!(
                    events = snapshot.history.len(),
                    subjects = snapshot.last_seen.len(),
                    "Loaded snapshot from Fjall"
                );
                Ok(snapshot)
            }
            None => {
                info!("No snapshot in Fjall store, starting empty");
                Ok(Snapshot::default())
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let value = serde_json::to_vec(snapshot)?;
        self.partition.insert(SNAPSHOT_KEY, value)?;
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        debug!("Saved snapshot to Fjall");
        Ok(())
    }

    fn location(&self) -> String {
        format!("fjall:{}/{}", self.path.display(), SNAPSHOT_PARTITION)
    }
}

/// In-process store for tests and throwaway runs.
///
/// Holds the encoded bytes so load/save exercise the same serialization as
/// the durable backends. Saves can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw persisted bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `save` fail with an I/O error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self) -> Option<Vec<u8>> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        match self.raw() {
            Some(bytes) => decode(&bytes, &self.location()),
            None => Ok(Snapshot::default()),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("memory store rejected save").into());
        }
        let encoded = serde_json::to_vec(snapshot)?;
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
