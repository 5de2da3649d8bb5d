//! C6: the backend façade. Exposes `init_data_object`/`write`/`read`/
//! `invalidate`/`view_init`/`view_read`/`view_extend` against a single
//! object-store handle, each in a synchronous (directly-awaited) form and an
//! asynchronous form that reports through a completion callback.
//!
//! `Seal`, `MaxPos`, `SetProjection`, and `LatestProjection` — present in the
//! wider abstract backend this is modeled on — are intentionally not part of
//! this surface.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

use zlog_objclass::{init, invalidate, read, view_extend, view_init, view_read, write};
use zlog_proto::{
    CanonicalResult, InitOp, InvalidateOp, ObjclassError, ReadOp, ReadOpReply, ViewExtendOp,
    ViewInitOp, ViewParams, ViewReadOp, ViewReadOpReply, WriteOp,
};
use zlog_store::MemStore;

/// The façade's own error type: just `ObjclassError` widened with nothing,
/// kept distinct so callers depend on a façade-owned type rather than
/// reaching into `zlog-objclass` directly (cf. `osdclient::error::OSDClientError`
/// as a focused per-crate error enum).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error(transparent)]
pub struct BackendError(#[from] pub ObjclassError);

pub type Result<T> = std::result::Result<T, BackendError>;

/// A completion callback invoked exactly once with the canonical result
/// code. The boxed closure is the heap-allocated completion context; it is
/// dropped the moment it returns.
pub type Completion = Box<dyn FnOnce(CanonicalResult) + Send>;

/// As [`Completion`], but for `async_read`, which also needs to deliver the
/// payload bytes on success — an empty `Bytes` accompanies any non-`Ok` code.
pub type ReadCompletion = Box<dyn FnOnce(CanonicalResult, Bytes) + Send>;

/// Thin adapter over one [`MemStore`] connection. Cheaply cloneable; owns a
/// single connection handle and is safe for concurrent callers.
#[derive(Clone)]
pub struct Backend {
    store: MemStore,
}

impl Backend {
    pub fn new(store: MemStore) -> Self {
        Self { store }
    }

    pub async fn init_data_object(&self, oid: &str, params: ViewParams, object_id: u64) -> Result<()> {
        init(&self.store, oid, InitOp { params, object_id })
            .await
            .map_err(BackendError)
    }

    pub async fn write(&self, oid: &str, position: u64, data: Bytes) -> Result<()> {
        write(&self.store, oid, WriteOp { position, data })
            .await
            .map_err(BackendError)
    }

    pub async fn read(&self, oid: &str, position: u64) -> Result<ReadOpReply> {
        read(&self.store, oid, ReadOp { position })
            .await
            .map_err(BackendError)
    }

    pub async fn invalidate(&self, oid: &str, position: u64, force: bool) -> Result<()> {
        invalidate(&self.store, oid, InvalidateOp { position, force })
            .await
            .map_err(BackendError)
    }

    pub async fn view_init(&self, meta_oid: &str, params: ViewParams, num_stripes: u32) -> Result<()> {
        view_init(&self.store, meta_oid, ViewInitOp { params, num_stripes })
            .await
            .map_err(BackendError)
    }

    pub async fn view_read(&self, meta_oid: &str, min_epoch: u64) -> Result<ViewReadOpReply> {
        view_read(&self.store, meta_oid, ViewReadOp { min_epoch })
            .await
            .map_err(BackendError)
    }

    pub async fn view_extend(&self, meta_oid: &str, position: u64) -> Result<()> {
        view_extend(&self.store, meta_oid, ViewExtendOp { position })
            .await
            .map_err(BackendError)
    }

    /// Asynchronous write: submits the operation on a fresh task and reports
    /// the canonical result through `completion` exactly once. Callers must
    /// not assume ordering between completions for different positions.
    pub fn async_write(self: &Arc<Self>, oid: String, position: u64, data: Bytes, completion: Completion) {
        let backend = self.clone();
        tokio::spawn(async move {
            let result = backend.write(&oid, position, data).await;
            let code = match result {
                Ok(()) => CanonicalResult::Ok,
                Err(BackendError(e)) => {
                    warn!(oid, position, error = %e, "async_write failed");
                    CanonicalResult::from(e)
                }
            };
            completion(code);
        });
    }

    /// Asynchronous read: as `async_write`, but delivers the payload
    /// alongside the canonical code on success.
    pub fn async_read(self: &Arc<Self>, oid: String, position: u64, completion: ReadCompletion) {
        let backend = self.clone();
        tokio::spawn(async move {
            match backend.read(&oid, position).await {
                Ok(reply) => {
                    let code = match reply.outcome {
                        zlog_proto::ReadOutcome::Ok => CanonicalResult::Ok,
                        zlog_proto::ReadOutcome::Unwritten => CanonicalResult::NotWritten,
                        zlog_proto::ReadOutcome::Invalidated => CanonicalResult::Invalidated,
                    };
                    completion(code, reply.data);
                }
                Err(BackendError(e)) => {
                    warn!(oid, position, error = %e, "async_read failed");
                    completion(CanonicalResult::from(e), Bytes::new());
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn params() -> ViewParams {
        ViewParams {
            entry_size: 16,
            stripe_width: 1,
            entries_per_object: 10,
        }
    }

    #[tokio::test]
    async fn sync_roundtrip_through_facade() {
        let backend = Backend::new(MemStore::new());
        backend.init_data_object("L.0", params(), 0).await.unwrap();
        backend
            .write("L.0", 3, Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let reply = backend.read("L.0", 3).await.unwrap();
        assert_eq!(reply.outcome, zlog_proto::ReadOutcome::Ok);
        assert_eq!(&reply.data[..5], b"hello");
    }

    #[tokio::test]
    async fn async_write_reports_ok_exactly_once() {
        let backend = Arc::new(Backend::new(MemStore::new()));
        backend.init_data_object("L.0", params(), 0).await.unwrap();

        let (tx, rx) = oneshot::channel();
        backend.async_write(
            "L.0".to_string(),
            1,
            Bytes::from_static(b"x"),
            Box::new(move |code| {
                tx.send(code).ok();
            }),
        );
        let code = rx.await.unwrap();
        assert_eq!(code, CanonicalResult::Ok);
    }

    #[tokio::test]
    async fn async_write_collision_reports_read_only() {
        let backend = Arc::new(Backend::new(MemStore::new()));
        backend.init_data_object("L.0", params(), 0).await.unwrap();
        backend.write("L.0", 1, Bytes::from_static(b"first")).await.unwrap();

        let (tx, rx) = oneshot::channel();
        backend.async_write(
            "L.0".to_string(),
            1,
            Bytes::from_static(b"second"),
            Box::new(move |code| {
                tx.send(code).ok();
            }),
        );
        let code = rx.await.unwrap();
        assert_eq!(code, CanonicalResult::ReadOnly);
    }

    #[tokio::test]
    async fn async_read_delivers_payload_and_code() {
        let backend = Arc::new(Backend::new(MemStore::new()));
        backend.init_data_object("L.0", params(), 0).await.unwrap();
        backend.write("L.0", 2, Bytes::from_static(b"data")).await.unwrap();

        let (tx, rx) = oneshot::channel();
        backend.async_read(
            "L.0".to_string(),
            2,
            Box::new(move |code, data| {
                tx.send((code, data)).ok();
            }),
        );
        let (code, data) = rx.await.unwrap();
        assert_eq!(code, CanonicalResult::Ok);
        assert_eq!(&data[..4], b"data");
    }

    #[tokio::test]
    async fn async_read_unwritten_position_reports_not_written() {
        let backend = Arc::new(Backend::new(MemStore::new()));
        backend.init_data_object("L.0", params(), 0).await.unwrap();

        let (tx, rx) = oneshot::channel();
        backend.async_read(
            "L.0".to_string(),
            9,
            Box::new(move |code, data| {
                tx.send((code, data)).ok();
            }),
        );
        let (code, data) = rx.await.unwrap();
        assert_eq!(code, CanonicalResult::NotWritten);
        assert!(data.is_empty());
    }
}
