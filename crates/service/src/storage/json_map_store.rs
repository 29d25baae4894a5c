use std::{collections::BTreeMap, marker::PhantomData, path::{Path, PathBuf}};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::{RwLock, RwLockWriteGuard}};

use crate::errors::ServiceError;

/// Generic JSON file-backed map store.
///
/// Nothing is cached: every snapshot or transaction reads the file again, so
/// the file is the only source of truth. Writes replace the whole document
/// through a temp file and a rename, so readers see either the old or the new
/// content, never a torn write.
///
/// One `RwLock` serializes transactions against each other within a process.
pub struct JsonMapStore<K, V> {
    lock: RwLock<()>,
    file_path: PathBuf,
    _types: PhantomData<fn() -> (K, V)>,
}

/// A write transaction holding the store's exclusive lock.
///
/// Mutate `map` freely; nothing reaches disk until [`MapTxn::commit`].
/// Dropping the transaction discards the changes.
pub struct MapTxn<'a, K, V> {
    _guard: RwLockWriteGuard<'a, ()>,
    store: &'a JsonMapStore<K, V>,
    pub map: BTreeMap<K, V>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Point the store at `path`. The file is not touched until first use.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { lock: RwLock::new(()), file_path: path.into(), _types: PhantomData }
    }

    /// Load the current map under the shared lock.
    pub async fn snapshot(&self) -> Result<BTreeMap<K, V>, ServiceError> {
        let _guard = self.lock.read().await;
        self.load().await
    }

    /// Start a write transaction: take the exclusive lock, then load.
    pub async fn begin(&self) -> Result<MapTxn<'_, K, V>, ServiceError> {
        let guard = self.lock.write().await;
        let map = self.load().await?;
        Ok(MapTxn { _guard: guard, store: self, map })
    }

    /// Apply a mutation and persist it only if the closure succeeds.
    pub async fn update_map<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<T, ServiceError>,
    {
        let mut txn = self.begin().await?;
        let out = f(&mut txn.map)?;
        txn.commit().await?;
        Ok(out)
    }

    /// Read the file. A missing file is an empty map.
    async fn load(&self) -> Result<BTreeMap<K, V>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::persistence(&format!("malformed {}", self.file_path.display()), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ServiceError::persistence(&format!("read {}", self.file_path.display()), e)),
        }
    }

    /// Replace the file content with `map`.
    async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        let data = encode(map)?;
        let path = self.file_path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &data))
            .await
            .map_err(|e| ServiceError::persistence("write task", e))?
    }
}

impl<K, V> MapTxn<'_, K, V>
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Persist `map` and release the lock.
    pub async fn commit(self) -> Result<(), ServiceError> {
        self.store.save(&self.map).await
    }
}

/// Pretty JSON, four-space indent, trailing newline.
fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ServiceError::persistence("encode", e))?;
    buf.push(b'\n');
    Ok(buf)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| ServiceError::persistence(&format!("create {}", dir.display()), e))?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ServiceError::persistence(&format!("temp file in {}", dir.display()), e))?;
    std::io::Write::write_all(&mut temp, data)
        .map_err(|e| ServiceError::persistence("write temp file", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ServiceError::persistence("sync temp file", e))?;
    temp.persist(path)
        .map_err(|e| ServiceError::persistence(&format!("persist {}", path.display()), e))?;
    Ok(())
}
