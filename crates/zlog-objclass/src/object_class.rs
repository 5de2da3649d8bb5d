//! C2: the per-object state machine — `init`, `write`, `read`, `invalidate`.
//!
//! One-to-one with `cls_zlog.cc`'s methods of the same names, expressed as
//! plain async functions over a `MemStore` object instead of Ceph object-class
//! callbacks over a `cls_method_context_t`. Each function runs as exactly one
//! `MemStore::transact` call, which is the atomic-transaction boundary this
//! state machine relies on.

use bytes::Bytes;
use tracing::{debug, warn};

use zlog_layout::calc_layout;
use zlog_proto::{EntryState, InitOp, InvalidateOp, ObjclassError, ObjclassResult, ObjectMeta, ReadOp, ReadOpReply, ReadOutcome, WriteOp};
use zlog_store::{MemStore, ObjectState};

use crate::denc_io::{decode_denc, encode_denc};

const META_XATTR: &str = "meta";

fn read_meta(obj: &ObjectState) -> ObjclassResult<ObjectMeta> {
    let bytes = obj.getxattr(META_XATTR).ok_or_else(|| {
        warn!("read_meta: object or attribute not found");
        ObjclassError::IOError
    })?;
    decode_denc::<ObjectMeta>(&bytes).map_err(|_| {
        warn!("read_meta: failed to decode metadata");
        ObjclassError::IOError
    })
}

/// Write (or verify) an object's metadata. Note: matching `cls_zlog.cc`, a
/// first-time `init` writes the caller's parameters unconditionally before
/// validating them — a zero parameter on first init still gets persisted,
/// and the subsequent validation check then fails the call. This quirk is
/// preserved deliberately, not an oversight here.
pub async fn init(store: &MemStore, oid: &str, op: InitOp) -> ObjclassResult<()> {
    let result = store
        .transact(oid, |obj| {
            let meta = if obj.exists() {
                read_meta(obj)?
            } else {
                obj.create();
                let meta = ObjectMeta {
                    params: op.params,
                    object_id: op.object_id,
                };
                obj.setxattr(META_XATTR, encode_denc(&meta));
                meta
            };

            if !meta.params.is_valid() {
                warn!(oid, "init: invalid object metadata");
                return Err(ObjclassError::InvalidArgument);
            }
            if meta.params != op.params || meta.object_id != op.object_id {
                warn!(oid, "init: metadata mismatch");
                return Err(ObjclassError::InvalidArgument);
            }
            Ok(())
        })
        .await;
    debug!(oid, ok = result.is_ok(), "init");
    result
}

pub async fn write(store: &MemStore, oid: &str, op: WriteOp) -> ObjclassResult<()> {
    let result = store
        .transact(oid, |obj| {
            if !obj.exists() {
                return Err(ObjclassError::NotFound);
            }
            let meta = read_meta(obj)?;
            if !meta.params.is_valid() {
                return Err(ObjclassError::IOError);
            }

            let layout = calc_layout(
                op.position,
                meta.params.stripe_width,
                meta.params.entries_per_object,
                meta.params.entry_size,
            );
            if layout.objectno != meta.object_id {
                warn!(oid, position = op.position, "write: wrong object target");
                return Err(ObjclassError::WrongObject);
            }
            if 1 + op.data.len() as u64 > layout.slot_size {
                warn!(oid, position = op.position, "write: entry too large");
                return Err(ObjclassError::TooLarge);
            }

            let hdr = if layout.offset < obj.size() {
                obj.read_range(layout.offset, 1)[0]
            } else {
                0
            };
            if hdr != 0 {
                debug!(oid, position = op.position, "write: entry already exists");
                return Err(ObjclassError::AlreadyExists);
            }

            let mut slot = vec![0u8; layout.slot_size as usize];
            slot[0] = EntryState::Taken as u8;
            slot[1..1 + op.data.len()].copy_from_slice(&op.data);
            obj.write_range(layout.offset, &slot);
            Ok(())
        })
        .await;
    debug!(oid, position = op.position, ok = result.is_ok(), "write");
    result
}

pub async fn read(store: &MemStore, oid: &str, op: ReadOp) -> ObjclassResult<ReadOpReply> {
    store
        .transact(oid, |obj| {
            if !obj.exists() {
                return Err(ObjclassError::NotFound);
            }
            let meta = read_meta(obj)?;
            if !meta.params.is_valid() {
                return Err(ObjclassError::IOError);
            }

            let layout = calc_layout(
                op.position,
                meta.params.stripe_width,
                meta.params.entries_per_object,
                meta.params.entry_size,
            );
            if layout.objectno != meta.object_id {
                return Err(ObjclassError::WrongObject);
            }

            if layout.offset + layout.slot_size > obj.size() {
                debug!(oid, position = op.position, "read: entry not written (past eof)");
                return Ok(ReadOpReply {
                    outcome: ReadOutcome::Unwritten,
                    data: Bytes::new(),
                });
            }

            let slot = obj.read_range(layout.offset, layout.slot_size);
            match EntryState::from_tag(slot[0]) {
                Some(EntryState::Taken) => Ok(ReadOpReply {
                    outcome: ReadOutcome::Ok,
                    data: slot.slice(1..),
                }),
                Some(EntryState::Unused) => Ok(ReadOpReply {
                    outcome: ReadOutcome::Unwritten,
                    data: Bytes::new(),
                }),
                Some(EntryState::Invalid) => Ok(ReadOpReply {
                    outcome: ReadOutcome::Invalidated,
                    data: Bytes::new(),
                }),
                None => {
                    warn!(oid, position = op.position, "read: unexpected status byte");
                    Err(ObjclassError::IOError)
                }
            }
        })
        .await
}

pub async fn invalidate(store: &MemStore, oid: &str, op: InvalidateOp) -> ObjclassResult<()> {
    let result = store
        .transact(oid, |obj| {
            if !obj.exists() {
                return Err(ObjclassError::NotFound);
            }
            let meta = read_meta(obj)?;
            if !meta.params.is_valid() {
                return Err(ObjclassError::IOError);
            }

            let layout = calc_layout(
                op.position,
                meta.params.stripe_width,
                meta.params.entries_per_object,
                meta.params.entry_size,
            );
            if layout.objectno != meta.object_id {
                return Err(ObjclassError::WrongObject);
            }

            let hdr = if layout.offset < obj.size() && !op.force {
                obj.read_range(layout.offset, 1)[0]
            } else {
                0
            };

            if hdr == EntryState::Invalid as u8 {
                debug!(oid, position = op.position, "invalidate: already invalid");
                return Ok(());
            }

            if hdr == 0 || op.force {
                if layout.offset < obj.size() {
                    obj.write_range(layout.offset, &[EntryState::Invalid as u8]);
                } else {
                    let mut slot = vec![0u8; layout.slot_size as usize];
                    slot[0] = EntryState::Invalid as u8;
                    obj.write_range(layout.offset, &slot);
                }
                return Ok(());
            }

            debug!(oid, position = op.position, "invalidate: entry is valid, not forced");
            Err(ObjclassError::ReadOnly)
        })
        .await;
    debug!(oid, position = op.position, force = op.force, ok = result.is_ok(), "invalidate");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use zlog_proto::ViewParams;

    fn params(entry_size: u32, stripe_width: u32, entries_per_object: u32) -> ViewParams {
        ViewParams {
            entry_size,
            stripe_width,
            entries_per_object,
        }
    }

    async fn init_ok(store: &MemStore, oid: &str, p: ViewParams, object_id: u64) {
        init(store, oid, InitOp { params: p, object_id })
            .await
            .unwrap();
    }

    // S1
    #[tokio::test]
    async fn write_read_roundtrip() {
        let store = MemStore::new();
        let p = params(1024, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        let data = vec![7u8; 100];
        write(
            &store,
            "log.0",
            WriteOp {
                position: 3,
                data: Bytes::from(data.clone()),
            },
        )
        .await
        .unwrap();

        let reply = read(&store, "log.0", ReadOp { position: 3 }).await.unwrap();
        assert_eq!(reply.outcome, ReadOutcome::Ok);
        assert_eq!(&reply.data[..100], &data[..]);
        assert_eq!(reply.data.len(), 1024);
        assert!(reply.data[100..].iter().all(|&b| b == 0));

        let reply = read(&store, "log.0", ReadOp { position: 5 }).await.unwrap();
        assert_eq!(reply.outcome, ReadOutcome::Unwritten);
    }

    // S2
    #[tokio::test]
    async fn write_twice_fails() {
        let store = MemStore::new();
        let p = params(1024, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        write(
            &store,
            "log.0",
            WriteOp {
                position: 3,
                data: Bytes::from_static(b"x"),
            },
        )
        .await
        .unwrap();

        let err = write(
            &store,
            "log.0",
            WriteOp {
                position: 3,
                data: Bytes::from_static(b"y"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::AlreadyExists);
    }

    // S3
    #[tokio::test]
    async fn wrong_object_is_rejected() {
        let store = MemStore::new();
        let p = params(8, 1, 10);
        init_ok(&store, "1.10.0", p, 0).await;

        // positions 10 and 20 both map to object 0 under width=1, epo=10
        write(
            &store,
            "1.10.0",
            WriteOp {
                position: 10,
                data: Bytes::from_static(b"a"),
            },
        )
        .await
        .unwrap();
        write(
            &store,
            "1.10.0",
            WriteOp {
                position: 20,
                data: Bytes::from_static(b"b"),
            },
        )
        .await
        .unwrap();

        // position 1 maps to object 1 under width=1, epo=10 -> not this object
        let err = write(
            &store,
            "1.10.0",
            WriteOp {
                position: 1,
                data: Bytes::from_static(b"c"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::WrongObject);
    }

    // S4
    #[tokio::test]
    async fn forced_invalidate_of_taken_slot() {
        let store = MemStore::new();
        let p = params(1024, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        write(
            &store,
            "log.0",
            WriteOp {
                position: 4,
                data: Bytes::from(vec![1u8; 100]),
            },
        )
        .await
        .unwrap();

        let err = invalidate(
            &store,
            "log.0",
            InvalidateOp {
                position: 4,
                force: false,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::ReadOnly);

        invalidate(
            &store,
            "log.0",
            InvalidateOp {
                position: 4,
                force: true,
            },
        )
        .await
        .unwrap();

        let reply = read(&store, "log.0", ReadOp { position: 4 }).await.unwrap();
        assert_eq!(reply.outcome, ReadOutcome::Invalidated);

        let err = write(
            &store,
            "log.0",
            WriteOp {
                position: 4,
                data: Bytes::from_static(b"z"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::AlreadyExists);
    }

    #[tokio::test]
    async fn forced_invalidate_preserves_payload_bytes() {
        let store = MemStore::new();
        let p = params(16, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        write(
            &store,
            "log.0",
            WriteOp {
                position: 2,
                data: Bytes::from_static(b"payload-intact"),
            },
        )
        .await
        .unwrap();

        invalidate(&store, "log.0", InvalidateOp { position: 2, force: true })
            .await
            .unwrap();

        let layout = calc_layout(2, p.stripe_width, p.entries_per_object, p.entry_size);
        let slot = store
            .transact("log.0", |obj| obj.read_range(layout.offset, layout.slot_size))
            .await;
        assert_eq!(slot[0], EntryState::Invalid as u8);
        assert_eq!(&slot[1..15], b"payload-intact");
    }

    #[tokio::test]
    async fn invalidate_unused_then_write_fails() {
        let store = MemStore::new();
        let p = params(8, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        invalidate(
            &store,
            "log.0",
            InvalidateOp {
                position: 1,
                force: false,
            },
        )
        .await
        .unwrap();

        let reply = read(&store, "log.0", ReadOp { position: 1 }).await.unwrap();
        assert_eq!(reply.outcome, ReadOutcome::Invalidated);

        let err = write(
            &store,
            "log.0",
            WriteOp {
                position: 1,
                data: Bytes::from_static(b"x"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::AlreadyExists);

        // invalidating an already-invalid slot is a no-op success
        invalidate(
            &store,
            "log.0",
            InvalidateOp {
                position: 1,
                force: false,
            },
        )
        .await
        .unwrap();
    }

    // P7: write with |data| > entry_size leaves the slot unchanged
    #[tokio::test]
    async fn too_large_entry_leaves_slot_unchanged() {
        let store = MemStore::new();
        let p = params(4, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        let err = write(
            &store,
            "log.0",
            WriteOp {
                position: 0,
                data: Bytes::from_static(b"12345"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::TooLarge);

        let reply = read(&store, "log.0", ReadOp { position: 0 }).await.unwrap();
        assert_eq!(reply.outcome, ReadOutcome::Unwritten);
    }

    #[tokio::test]
    async fn init_mismatch_is_rejected() {
        let store = MemStore::new();
        let p = params(8, 1, 10);
        init_ok(&store, "log.0", p, 0).await;

        let err = init(
            &store,
            "log.0",
            InitOp {
                params: params(16, 1, 10),
                object_id: 0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::InvalidArgument);

        // identical re-init still succeeds
        init(
            &store,
            "log.0",
            InitOp {
                params: p,
                object_id: 0,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn init_rejects_zero_parameter() {
        let store = MemStore::new();
        let err = init(
            &store,
            "log.0",
            InitOp {
                params: params(0, 1, 10),
                object_id: 0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::InvalidArgument);
    }

    #[tokio::test]
    async fn read_on_missing_object_is_not_found() {
        let store = MemStore::new();
        let err = read(&store, "nope.0", ReadOp { position: 0 })
            .await
            .unwrap_err();
        assert_eq!(err, ObjclassError::NotFound);
    }
}
