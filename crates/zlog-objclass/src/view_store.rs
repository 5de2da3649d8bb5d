//! C3: the view store — `view_init`, `view_read`, `view_extend`.
//!
//! Lives on a single metadata object (conventionally named `<log>.meta`),
//! tracked independently of the data objects the object class above writes
//! into. One omap entry per epoch (`view_epoch_key`), plus a `zlog.view.meta`
//! xattr caching `(max_epoch, max_position)` so `view_extend` and position
//! lookups don't need to scan the omap. Grounded on the `view_init`/
//! `view_read`/`view_extend` methods of `cls_zlog.cc`.

use tracing::{debug, warn};

use zlog_proto::{ObjclassError, ObjclassResult, View, ViewExtendOp, ViewInitOp, ViewMeta, ViewReadOp, ViewReadOpReply, view_epoch_key};
use zlog_store::{MemStore, ObjectState};

use crate::denc_io::{decode_denc, encode_denc};

const VIEW_META_XATTR: &str = "zlog.view.meta";

fn read_view_meta(obj: &ObjectState) -> ObjclassResult<ViewMeta> {
    let bytes = obj.getxattr(VIEW_META_XATTR).ok_or(ObjclassError::IOError)?;
    decode_denc::<ViewMeta>(&bytes).map_err(|_| ObjclassError::IOError)
}

fn read_view(obj: &ObjectState, epoch: u64) -> ObjclassResult<View> {
    let bytes = obj
        .omap_get_val(&view_epoch_key(epoch))
        .ok_or_else(|| {
            warn!(epoch, "read_view: missing view entry");
            ObjclassError::IOError
        })?;
    decode_denc::<View>(&bytes).map_err(|_| {
        warn!(epoch, "read_view: failed to decode view entry");
        ObjclassError::IOError
    })
}

fn write_view(obj: &mut ObjectState, view: &View) {
    obj.omap_set_val(&view_epoch_key(view.epoch), encode_denc(view));
}

pub async fn view_init(store: &MemStore, meta_oid: &str, op: ViewInitOp) -> ObjclassResult<()> {
    let result = store
        .transact(meta_oid, |obj| {
            if obj.exists() {
                debug!(meta_oid, "view_init: log already exists");
                return Err(ObjclassError::AlreadyExists);
            }
            if !op.params.is_valid() || op.num_stripes == 0 {
                warn!(meta_oid, "view_init: invalid parameters");
                return Err(ObjclassError::InvalidArgument);
            }
            obj.create();

            let view = View {
                epoch: 0,
                params: op.params,
                num_stripes: op.num_stripes,
            };
            write_view(obj, &view);

            let meta = ViewMeta {
                max_epoch: 0,
                max_position: view.span() - 1,
            };
            obj.setxattr(VIEW_META_XATTR, encode_denc(&meta));
            Ok(())
        })
        .await;
    debug!(meta_oid, ok = result.is_ok(), "view_init");
    result
}

pub async fn view_read(store: &MemStore, meta_oid: &str, op: ViewReadOp) -> ObjclassResult<ViewReadOpReply> {
    store
        .transact(meta_oid, |obj| {
            if !obj.exists() {
                return Err(ObjclassError::NotFound);
            }
            let meta = read_view_meta(obj)?;
            if op.min_epoch > meta.max_epoch {
                return Err(ObjclassError::InvalidArgument);
            }

            let mut views = Vec::with_capacity((meta.max_epoch - op.min_epoch + 1) as usize);
            for epoch in op.min_epoch..=meta.max_epoch {
                views.push(read_view(obj, epoch)?);
            }
            Ok(ViewReadOpReply { views })
        })
        .await
}

/// Grows the view history so that `op.position` falls within the span of
/// some view, appending a new epoch with just enough additional stripes.
/// A position already covered is a no-op success.
pub async fn view_extend(store: &MemStore, meta_oid: &str, op: ViewExtendOp) -> ObjclassResult<()> {
    let result = store
        .transact(meta_oid, |obj| {
            if !obj.exists() {
                return Err(ObjclassError::NotFound);
            }
            let mut meta = read_view_meta(obj)?;

            if op.position <= meta.max_position {
                debug!(meta_oid, position = op.position, "view_extend: already covered");
                return Ok(());
            }

            let latest = read_view(obj, meta.max_epoch)?;
            let entries_per_stripe = latest.params.entries_per_stripe();
            let entries_needed = op.position - meta.max_position;
            let stripes_needed = entries_needed.div_ceil(entries_per_stripe) as u32;

            let next_view = View {
                epoch: meta.max_epoch + 1,
                params: latest.params,
                num_stripes: stripes_needed,
            };
            write_view(obj, &next_view);

            meta.max_epoch += 1;
            meta.max_position += entries_per_stripe * stripes_needed as u64;
            obj.setxattr(VIEW_META_XATTR, encode_denc(&meta));
            Ok(())
        })
        .await;
    debug!(meta_oid, position = op.position, ok = result.is_ok(), "view_extend");
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

    // S5
    #[tokio::test]
    async fn view_extend_grows_in_lockstep_with_demand() {
        let store = MemStore::new();
        view_init(
            &store,
            "log.meta",
            ViewInitOp {
                params: params(5, 10, 10),
                num_stripes: 1,
            },
        )
        .await
        .unwrap();

        // entries_per_stripe = 100, max_position starts at 99
        let reply = view_read(&store, "log.meta", ViewReadOp { min_epoch: 0 })
            .await
            .unwrap();
        assert_eq!(reply.views.len(), 1);
        assert_eq!(reply.views[0].num_stripes, 1);

        view_extend(&store, "log.meta", ViewExtendOp { position: 50 })
            .await
            .unwrap();
        let reply = view_read(&store, "log.meta", ViewReadOp { min_epoch: 0 })
            .await
            .unwrap();
        assert_eq!(reply.views.len(), 1, "position already covered: no new epoch");

        view_extend(&store, "log.meta", ViewExtendOp { position: 150 })
            .await
            .unwrap();
        let reply = view_read(&store, "log.meta", ViewReadOp { min_epoch: 0 })
            .await
            .unwrap();
        assert_eq!(reply.views.len(), 2);
        assert_eq!(reply.views[1].epoch, 1);
        assert_eq!(reply.views[1].num_stripes, 1);

        view_extend(&store, "log.meta", ViewExtendOp { position: 10_000 })
            .await
            .unwrap();
        let reply = view_read(&store, "log.meta", ViewReadOp { min_epoch: 2 })
            .await
            .unwrap();
        assert_eq!(reply.views.len(), 1);
        assert_eq!(reply.views[0].epoch, 2);
        // max_position was 199 after epoch 1; need up through 10000 -> 9801 more
        // entries -> ceil(9801/100) = 99 stripes
        assert_eq!(reply.views[0].num_stripes, 99);
    }

    #[tokio::test]
    async fn view_init_twice_fails() {
        let store = MemStore::new();
        let op = ViewInitOp {
            params: params(8, 1, 10),
            num_stripes: 1,
        };
        view_init(&store, "log.meta", op).await.unwrap();
        let err = view_init(&store, "log.meta", op).await.unwrap_err();
        assert_eq!(err, ObjclassError::AlreadyExists);
    }

    #[tokio::test]
    async fn view_init_rejects_zero_num_stripes() {
        let store = MemStore::new();
        let err = view_init(
            &store,
            "log.meta",
            ViewInitOp {
                params: params(8, 1, 10),
                num_stripes: 0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::InvalidArgument);
    }

    #[tokio::test]
    async fn view_init_twice_with_invalid_params_still_reports_already_exists() {
        let store = MemStore::new();
        let op = ViewInitOp {
            params: params(8, 1, 10),
            num_stripes: 1,
        };
        view_init(&store, "log.meta", op).await.unwrap();
        let err = view_init(
            &store,
            "log.meta",
            ViewInitOp {
                params: params(8, 1, 10),
                num_stripes: 0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ObjclassError::AlreadyExists);
    }

    #[tokio::test]
    async fn view_read_rejects_epoch_beyond_history() {
        let store = MemStore::new();
        view_init(
            &store,
            "log.meta",
            ViewInitOp {
                params: params(8, 1, 10),
                num_stripes: 1,
            },
        )
        .await
        .unwrap();

        let err = view_read(&store, "log.meta", ViewReadOp { min_epoch: 5 })
            .await
            .unwrap_err();
        assert_eq!(err, ObjclassError::InvalidArgument);
    }

    #[tokio::test]
    async fn view_read_on_missing_log_is_not_found() {
        let store = MemStore::new();
        let err = view_read(&store, "nope.meta", ViewReadOp { min_epoch: 0 })
            .await
            .unwrap_err();
        assert_eq!(err, ObjclassError::NotFound);
    }
}
