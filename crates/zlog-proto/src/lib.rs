//! Wire/storage types shared by the object class, the striper, and the backend façade.

pub mod error;
pub mod ops;
pub mod types;

pub use error::{CanonicalResult, ObjclassError, ObjclassResult, ReadOutcome};
pub use ops::{
    InitOp, InvalidateOp, ReadOp, ReadOpReply, ViewExtendOp, ViewInitOp, ViewReadOp,
    ViewReadOpReply, WriteOp,
};
pub use types::{view_epoch_key, EntryState, ObjectMeta, View, ViewMeta, ViewParams};
