//! C5: the client-side striper. Caches the view sequence it has seen so far
//! and maps an absolute log position to the name of the object that owns it,
//! extending the view sequence on demand when a position runs past what's
//! currently known.

mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use zlog_layout::calc_layout;
use zlog_proto::View;

pub use error::{Result, StriperError};

/// Capability the striper calls out to when a position isn't covered by any
/// known view. Implemented by whatever owns the view store connection (the
/// `Log`/backend façade in a full client) — broken out as a trait rather
/// than a back-pointer to the owning log, since a `Log -> Striper -> Log`
/// cycle is awkward to express with ordinary ownership in Rust.
#[async_trait]
pub trait ViewExtender: Send + Sync {
    /// Ask the view store to grow its view sequence so that `position` falls
    /// within some view's span (`view_extend`).
    async fn extend_views(&self, position: u64) -> Result<()>;

    /// Re-read the view sequence and feed any new views to `add_views`.
    async fn refresh_projection(&self) -> Result<()>;
}

/// A resolved range of positions mapped by one view: `[start_position,
/// max_position]`, striped according to `params`.
#[derive(Debug, Clone, Copy)]
struct ObjectSet {
    start_position: u64,
    max_position: u64,
    params: zlog_proto::ViewParams,
}

struct StriperState {
    /// Epoch the next ingested view must carry; views are contiguous and
    /// strictly increasing, so this is also "number of views ingested".
    next_epoch: u64,
    /// Keyed by `start_position`, so `range(..=p).next_back()` finds the
    /// object set whose range might contain `p`.
    sets: BTreeMap<u64, ObjectSet>,
}

impl StriperState {
    fn new() -> Self {
        Self {
            next_epoch: 0,
            sets: BTreeMap::new(),
        }
    }

    fn ingest(&mut self, view: &View) {
        assert_eq!(
            view.epoch, self.next_epoch,
            "view epoch {} out of order or duplicate; expected {}",
            view.epoch, self.next_epoch
        );
        let start_position = self
            .sets
            .values()
            .next_back()
            .map(|s| s.max_position + 1)
            .unwrap_or(0);
        let span = view.span();
        let set = ObjectSet {
            start_position,
            max_position: start_position + span - 1,
            params: view.params,
        };
        trace!(epoch = view.epoch, start_position, max_position = set.max_position, "striper: ingested view");
        self.sets.insert(start_position, set);
        self.next_epoch += 1;
    }

    fn resolve(&self, position: u64) -> Option<ObjectSet> {
        let (_, set) = self.sets.range(..=position).next_back()?;
        if position > set.max_position {
            return None;
        }
        Some(*set)
    }
}

/// Everything a caller needs to operate on the object that owns a position:
/// its name, its `init`-time identity, and the striping parameters that
/// produced it.
#[derive(Debug, Clone)]
pub struct MappedPosition {
    pub oid: String,
    pub object_id: u64,
    pub params: zlog_proto::ViewParams,
}

/// Client-side cache mapping positions to object names, shared across many
/// concurrent callers behind one mutex.
pub struct Striper {
    logname: String,
    state: Mutex<StriperState>,
    extender: Arc<dyn ViewExtender>,
}

impl Striper {
    pub fn new(logname: impl Into<String>, extender: Arc<dyn ViewExtender>) -> Self {
        Self {
            logname: logname.into(),
            state: Mutex::new(StriperState::new()),
            extender,
        }
    }

    /// Feed newly-read views into the local cache, in epoch order.
    pub async fn add_views(&self, views: &[View]) {
        let mut state = self.state.lock().await;
        for view in views {
            state.ingest(view);
        }
    }

    /// Number of views ingested so far — also the epoch of the next view
    /// this striper expects. Used by a `ViewExtender` to know where to
    /// resume `view_read` from when refreshing its projection.
    pub async fn views_ingested(&self) -> u64 {
        self.state.lock().await.next_epoch
    }

    fn mapped(&self, set: &ObjectSet, position: u64) -> MappedPosition {
        let layout = calc_layout(
            position,
            set.params.stripe_width,
            set.params.entries_per_object,
            set.params.entry_size,
        );
        MappedPosition {
            oid: format!("{}.{}", self.logname, layout.objectno),
            object_id: layout.objectno,
            params: set.params,
        }
    }

    async fn try_resolve(&self, position: u64) -> Option<MappedPosition> {
        let state = self.state.lock().await;
        let set = state.resolve(position)?;
        Some(self.mapped(&set, position))
    }

    /// Map `position` to the object that owns it, including the identity and
    /// striping parameters needed to lazily `init` that object. If `extend`
    /// is true and the position isn't covered yet, ask the `ViewExtender` to
    /// grow the view sequence and retry exactly once; otherwise (or if the
    /// retry still misses) return `OutOfRange`.
    pub async fn resolve_position(&self, position: u64, extend: bool) -> Result<MappedPosition> {
        if let Some(mapped) = self.try_resolve(position).await {
            return Ok(mapped);
        }
        if !extend {
            debug!(position, "striper: position out of range, not extending");
            return Err(StriperError::OutOfRange(position));
        }

        debug!(position, "striper: extending view sequence");
        self.extender.extend_views(position).await?;
        self.extender.refresh_projection().await?;

        self.try_resolve(position)
            .await
            .ok_or(StriperError::OutOfRange(position))
    }

    /// As [`Striper::resolve_position`], but returns only the object name.
    pub async fn map_position(&self, position: u64, extend: bool) -> Result<String> {
        self.resolve_position(position, extend).await.map(|m| m.oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zlog_proto::ViewParams;

    fn params(entry_size: u32, stripe_width: u32, entries_per_object: u32) -> ViewParams {
        ViewParams {
            entry_size,
            stripe_width,
            entries_per_object,
        }
    }

    fn view(epoch: u64, p: ViewParams, num_stripes: u32) -> View {
        View {
            epoch,
            params: p,
            num_stripes,
        }
    }

    struct NoopExtender;

    #[async_trait]
    impl ViewExtender for NoopExtender {
        async fn extend_views(&self, _position: u64) -> Result<()> {
            Ok(())
        }
        async fn refresh_projection(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn maps_positions_within_epoch_zero() {
        let striper = Striper::new("mylog", Arc::new(NoopExtender));
        striper.add_views(&[view(0, params(8, 2, 3), 2)]).await;

        let oid = striper.map_position(0, false).await.unwrap();
        assert_eq!(oid, "mylog.0");
    }

    #[tokio::test]
    async fn out_of_range_without_extend_fails() {
        let striper = Striper::new("mylog", Arc::new(NoopExtender));
        striper.add_views(&[view(0, params(8, 1, 10), 1)]).await;

        let span = params(8, 1, 10).span(1);
        let err = striper.map_position(span, false).await.unwrap_err();
        assert!(matches!(err, StriperError::OutOfRange(_)));
    }

    #[tokio::test]
    async fn extend_retries_once_via_extender() {
        struct CountingExtender {
            calls: AtomicUsize,
            striper: std::sync::Weak<Striper>,
            next_view: View,
        }

        #[async_trait]
        impl ViewExtender for CountingExtender {
            async fn extend_views(&self, _position: u64) -> Result<()> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            async fn refresh_projection(&self) -> Result<()> {
                if let Some(striper) = self.striper.upgrade() {
                    striper.add_views(&[self.next_view]).await;
                }
                Ok(())
            }
        }

        // Build via Arc::new_cyclic so the extender can reach back into the
        // striper it's extending, the way a real `Log` would.
        let p = params(8, 1, 10);
        let first = view(0, p, 1);
        let second = view(1, p, 1);

        let striper = Arc::new_cyclic(|weak: &std::sync::Weak<Striper>| {
            let extender = Arc::new(CountingExtender {
                calls: AtomicUsize::new(0),
                striper: weak.clone(),
                next_view: second,
            });
            Striper::new("mylog", extender)
        });
        striper.add_views(&[first]).await;

        // span0 is the first position not covered by epoch 0; resolving it
        // requires one extend_views + refresh_projection round trip, which
        // ingests epoch 1 and lets the retry succeed.
        let span0 = p.span(1);
        let oid = striper.map_position(span0, true).await.unwrap();
        let expected_layout = calc_layout(span0, p.stripe_width, p.entries_per_object, p.entry_size);
        assert_eq!(oid, format!("mylog.{}", expected_layout.objectno));
    }

    #[tokio::test]
    #[should_panic(expected = "out of order or duplicate")]
    async fn ingesting_views_out_of_order_panics() {
        let striper = Striper::new("mylog", Arc::new(NoopExtender));
        striper.add_views(&[view(1, params(8, 1, 10), 1)]).await;
    }
}
