//! A minimal stand-in for the object store primitives `cls_zlog` relies on:
//! whole-object byte storage, a small named-attribute map (xattrs), and a
//! per-object string-keyed byte submap (omap). The real object store
//! (replication, durability, placement) is out of scope for this crate —
//! this gives the object class and view store something to run against for
//! correctness tests and local development, the way a "fake" in-process
//! sequencer stands in for the real one.
//!
//! Every operation against one object name runs while holding that object's
//! mutex for the whole closure, which is how callers get a single atomic
//! object-store transaction without needing any locking in the object-class
//! logic itself.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::trace;

/// In-memory state of one object: its byte stream, xattrs, and omap.
#[derive(Debug, Default)]
pub struct ObjectState {
    exists: bool,
    data: Vec<u8>,
    xattrs: HashMap<String, Bytes>,
    omap: BTreeMap<String, Bytes>,
}

impl ObjectState {
    /// Whether any operation has yet materialized this object. Mirrors what
    /// `cls_cxx_stat` returning `-ENOENT` means in the original object class.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Mark the object as created. Called once by `init`/`view_init` before
    /// writing the first metadata.
    pub fn create(&mut self) {
        self.exists = true;
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Read `len` bytes starting at `offset`. Any portion past the current
    /// object size reads as zero — the object store's sparse-hole guarantee
    /// that lets `Unused` be detected without formatting.
    pub fn read_range(&self, offset: u64, len: u64) -> Bytes {
        let offset = offset as usize;
        let len = len as usize;
        let mut out = vec![0u8; len];
        if offset < self.data.len() {
            let avail = (self.data.len() - offset).min(len);
            out[..avail].copy_from_slice(&self.data[offset..offset + avail]);
        }
        Bytes::from(out)
    }

    /// Overwrite `data` at `offset`, zero-extending the object if necessary.
    pub fn write_range(&mut self, offset: u64, data: &[u8]) {
        let offset = offset as usize;
        let end = offset + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(data);
    }

    pub fn getxattr(&self, key: &str) -> Option<Bytes> {
        self.xattrs.get(key).cloned()
    }

    pub fn setxattr(&mut self, key: &str, value: Bytes) {
        self.xattrs.insert(key.to_string(), value);
    }

    pub fn omap_get_val(&self, key: &str) -> Option<Bytes> {
        self.omap.get(key).cloned()
    }

    pub fn omap_set_val(&mut self, key: &str, value: Bytes) {
        self.omap.insert(key.to_string(), value);
    }
}

/// The in-memory object store. Cheaply cloneable; all clones share the same
/// backing objects.
#[derive(Clone, Default)]
pub struct MemStore {
    objects: Arc<RwLock<HashMap<String, Arc<Mutex<ObjectState>>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the named object, creating its slot
    /// lazily (but not marking it existent — that's `ObjectState::create`'s
    /// job) on first touch. This is the atomicity boundary: every object-class
    /// operation runs as exactly one `transact` call.
    pub async fn transact<R>(&self, oid: &str, f: impl FnOnce(&mut ObjectState) -> R) -> R {
        let handle = {
            let mut objects = self.objects.write().await;
            objects
                .entry(oid.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ObjectState::default())))
                .clone()
        };
        let mut guard = handle.lock().await;
        trace!(oid, "transact");
        f(&mut guard)
    }

    /// Number of distinct object names ever touched (existent or not).
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}
