//! Ties the sequencer, striper, and backend façade together into the "Log"
//! orchestration layer a caller actually appends and reads through — grounded
//! on `zlog::Log`'s role in `src/bench/append.cc` (`log->Append(...)`,
//! `log->Read(...)`).
//!
//! This lives in the CLI rather than as its own library crate: it is glue
//! code wiring together the three library crates, not a standalone module in
//! its own right.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use zlog_backend::Backend;
use zlog_proto::{ReadOutcome, ViewParams};
use zlog_sequencer::Sequencer;
use zlog_striper::{Striper, ViewExtender};

/// Bridges `Striper`'s view-extension requests back to the backend façade's
/// `view_extend`/`view_read` — the concrete capability that breaks what would
/// otherwise be a `Striper <-> LogSession` reference cycle.
struct BackendViewExtender {
    backend: Arc<Backend>,
    meta_oid: String,
    striper: Weak<Striper>,
}

#[async_trait]
impl ViewExtender for BackendViewExtender {
    async fn extend_views(&self, position: u64) -> zlog_striper::Result<()> {
        self.backend
            .view_extend(&self.meta_oid, position)
            .await
            .map_err(|e| zlog_striper::StriperError::Extend(e.to_string()))
    }

    async fn refresh_projection(&self) -> zlog_striper::Result<()> {
        let striper = self
            .striper
            .upgrade()
            .ok_or_else(|| zlog_striper::StriperError::Extend("striper dropped".to_string()))?;
        let min_epoch = striper.views_ingested().await;
        let reply = self
            .backend
            .view_read(&self.meta_oid, min_epoch)
            .await
            .map_err(|e| zlog_striper::StriperError::Extend(e.to_string()))?;
        striper.add_views(&reply.views).await;
        Ok(())
    }
}

pub struct LogSession {
    name: String,
    meta_oid: String,
    backend: Arc<Backend>,
    striper: Arc<Striper>,
    sequencer: Arc<dyn Sequencer>,
}

impl LogSession {
    /// Create a brand-new log: `view_init` its metadata object and wire up a
    /// striper that knows how to extend it.
    pub async fn create(
        backend: Arc<Backend>,
        sequencer: Arc<dyn Sequencer>,
        name: impl Into<String>,
        params: ViewParams,
        num_stripes: u32,
    ) -> anyhow::Result<Arc<Self>> {
        let name = name.into();
        let meta_oid = format!("{name}.meta");
        backend.view_init(&meta_oid, params, num_stripes).await?;
        Self::open_existing(backend, sequencer, name, meta_oid).await
    }

    /// Attach to a log whose metadata object already exists.
    pub async fn open(
        backend: Arc<Backend>,
        sequencer: Arc<dyn Sequencer>,
        name: impl Into<String>,
    ) -> anyhow::Result<Arc<Self>> {
        let name = name.into();
        let meta_oid = format!("{name}.meta");
        Self::open_existing(backend, sequencer, name, meta_oid).await
    }

    async fn open_existing(
        backend: Arc<Backend>,
        sequencer: Arc<dyn Sequencer>,
        name: String,
        meta_oid: String,
    ) -> anyhow::Result<Arc<Self>> {
        // The extender needs a weak handle back to the striper it extends —
        // built via `Arc::new_cyclic` to avoid a strong reference cycle.
        let striper = Arc::new_cyclic(|weak: &Weak<Striper>| {
            let extender = Arc::new(BackendViewExtender {
                backend: backend.clone(),
                meta_oid: meta_oid.clone(),
                striper: weak.clone(),
            });
            Striper::new(name.clone(), extender)
        });

        let reply = backend.view_read(&meta_oid, 0).await?;
        striper.add_views(&reply.views).await;

        Ok(Arc::new(Self {
            name,
            meta_oid,
            backend,
            striper,
            sequencer,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Claim the next position from the sequencer, lazily `init` the object
    /// that owns it, and write the payload into its slot.
    pub async fn append(&self, data: Bytes) -> anyhow::Result<u64> {
        let position = self.sequencer.next().await?;
        let mapped = self.striper.resolve_position(position, true).await?;
        debug!(position, oid = %mapped.oid, "append: resolved object");
        self.backend
            .init_data_object(&mapped.oid, mapped.params, mapped.object_id)
            .await?;
        self.backend.write(&mapped.oid, position, data).await?;
        Ok(position)
    }

    pub async fn read(&self, position: u64) -> anyhow::Result<(ReadOutcome, Bytes)> {
        let mapped = self.striper.resolve_position(position, true).await?;
        let reply = self.backend.read(&mapped.oid, position).await?;
        Ok((reply.outcome, reply.data))
    }

    pub async fn invalidate(&self, position: u64, force: bool) -> anyhow::Result<()> {
        let mapped = self.striper.resolve_position(position, true).await?;
        self.backend.invalidate(&mapped.oid, position, force).await?;
        Ok(())
    }

    pub async fn view_read(&self, min_epoch: u64) -> anyhow::Result<Vec<zlog_proto::View>> {
        let reply = self.backend.view_read(&self.meta_oid, min_epoch).await?;
        Ok(reply.views)
    }
}
