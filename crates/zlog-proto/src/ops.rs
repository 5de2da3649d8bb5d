//! Request/reply shapes for the seven object-class operations.
//!
//! Unlike `View`/`ObjectMeta`/`ViewMeta` these are never persisted — they're
//! the in-process call signatures the backend façade and object class agree
//! on, analogous to the protobuf `InitOp`/`ReadOp`/... messages `cls_zlog`
//! decodes out of its `in` bufferlist, but expressed as plain Rust structs
//! since nothing here crosses a real wire in this workspace.

use bytes::Bytes;

use crate::error::ReadOutcome;
use crate::types::ViewParams;

#[derive(Debug, Clone, Copy)]
pub struct InitOp {
    pub params: ViewParams,
    pub object_id: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOp {
    pub position: u64,
}

#[derive(Debug, Clone)]
pub struct ReadOpReply {
    pub outcome: ReadOutcome,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct WriteOp {
    pub position: u64,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy)]
pub struct InvalidateOp {
    pub position: u64,
    pub force: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewInitOp {
    pub params: ViewParams,
    pub num_stripes: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewReadOp {
    pub min_epoch: u64,
}

#[derive(Debug, Clone)]
pub struct ViewReadOpReply {
    pub views: Vec<crate::types::View>,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewExtendOp {
    pub position: u64,
}
