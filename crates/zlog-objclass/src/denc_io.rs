//! Small glue for reading/writing `denc`-encoded values to/from xattr and
//! omap byte blobs.

use bytes::{Bytes, BytesMut};
use denc::denc::Denc;

pub fn encode_denc<T: Denc>(value: &T) -> Bytes {
    let mut buf = BytesMut::with_capacity(value.encoded_size(0).unwrap_or(64));
    value
        .encode(&mut buf, 0)
        .expect("encoding a well-formed in-memory value cannot fail");
    buf.freeze()
}

pub fn decode_denc<T: Denc>(bytes: &Bytes) -> Result<T, denc::error::RadosError> {
    let mut buf = bytes.clone();
    T::decode(&mut buf, 0)
}
