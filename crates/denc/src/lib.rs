pub mod denc;
pub mod encoding_metadata;
pub mod error;
pub mod padding;
pub mod zerocopy;

pub use denc::*;
pub use encoding_metadata::*;
pub use error::*;
pub use padding::*;
pub use zerocopy::*;

// Re-export derive macros
pub use denc_derive::{DencMut, ZeroCopyDencode};
