//! Server-side object state machine (C2) and view store (C3): the logic that
//! would live inside a Ceph object class, expressed here as plain async
//! functions over [`zlog_store::MemStore`] so it can be exercised without a
//! real object store.

mod denc_io;
mod object_class;
mod view_store;

pub use object_class::{init, invalidate, read, write};
pub use view_store::{view_extend, view_init, view_read};
