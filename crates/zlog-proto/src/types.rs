//! `View`, `ObjectMeta`, `ViewMeta` — the persisted shapes backing a log's
//! striping geometry and per-object bookkeeping.

use bytes::{Buf, BufMut};
use denc::denc::{Denc, VersionedEncode};
use denc::error::RadosError;
use denc::impl_denc_for_versioned;

/// The striping geometry shared by a view and the object metadata it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParams {
    pub entry_size: u32,
    pub stripe_width: u32,
    pub entries_per_object: u32,
}

impl ViewParams {
    pub fn is_valid(&self) -> bool {
        self.entry_size != 0 && self.stripe_width != 0 && self.entries_per_object != 0
    }

    /// Number of entries one view with `num_stripes` stripes maps.
    pub fn span(&self, num_stripes: u32) -> u64 {
        self.entries_per_object as u64 * self.stripe_width as u64 * num_stripes as u64
    }

    pub fn entries_per_stripe(&self) -> u64 {
        self.entries_per_object as u64 * self.stripe_width as u64
    }
}

impl VersionedEncode for ViewParams {
    fn encoding_version(&self, _features: u64) -> u8 {
        1
    }

    fn compat_version(&self, _features: u64) -> u8 {
        1
    }

    fn encode_content<B: BufMut>(
        &self,
        buf: &mut B,
        features: u64,
        _version: u8,
    ) -> Result<(), RadosError> {
        self.entry_size.encode(buf, features)?;
        self.stripe_width.encode(buf, features)?;
        self.entries_per_object.encode(buf, features)?;
        Ok(())
    }

    fn decode_content<B: Buf>(
        buf: &mut B,
        features: u64,
        _version: u8,
        _compat_version: u8,
    ) -> Result<Self, RadosError> {
        Ok(ViewParams {
            entry_size: Denc::decode(buf, features)?,
            stripe_width: Denc::decode(buf, features)?,
            entries_per_object: Denc::decode(buf, features)?,
        })
    }

    fn encoded_size_content(&self, features: u64, _version: u8) -> Option<usize> {
        Some(
            self.entry_size.encoded_size(features)?
                + self.stripe_width.encoded_size(features)?
                + self.entries_per_object.encoded_size(features)?,
        )
    }
}

impl_denc_for_versioned!(ViewParams);

/// A view: the description of how a contiguous range of positions is striped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub epoch: u64,
    pub params: ViewParams,
    pub num_stripes: u32,
}

impl View {
    /// Number of positions this view maps.
    pub fn span(&self) -> u64 {
        self.params.span(self.num_stripes)
    }
}

impl VersionedEncode for View {
    fn encoding_version(&self, _features: u64) -> u8 {
        1
    }

    fn compat_version(&self, _features: u64) -> u8 {
        1
    }

    fn encode_content<B: BufMut>(
        &self,
        buf: &mut B,
        features: u64,
        _version: u8,
    ) -> Result<(), RadosError> {
        self.epoch.encode(buf, features)?;
        self.params.encode(buf, features)?;
        self.num_stripes.encode(buf, features)?;
        Ok(())
    }

    fn decode_content<B: Buf>(
        buf: &mut B,
        features: u64,
        _version: u8,
        _compat_version: u8,
    ) -> Result<Self, RadosError> {
        Ok(View {
            epoch: Denc::decode(buf, features)?,
            params: Denc::decode(buf, features)?,
            num_stripes: Denc::decode(buf, features)?,
        })
    }

    fn encoded_size_content(&self, features: u64, _version: u8) -> Option<usize> {
        Some(
            self.epoch.encoded_size(features)?
                + self.params.encoded_size(features)?
                + self.num_stripes.encoded_size(features)?,
        )
    }
}

impl_denc_for_versioned!(View);

/// Per-object metadata, written once to the `meta` xattr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub params: ViewParams,
    pub object_id: u64,
}

impl VersionedEncode for ObjectMeta {
    fn encoding_version(&self, _features: u64) -> u8 {
        1
    }

    fn compat_version(&self, _features: u64) -> u8 {
        1
    }

    fn encode_content<B: BufMut>(
        &self,
        buf: &mut B,
        features: u64,
        _version: u8,
    ) -> Result<(), RadosError> {
        self.params.encode(buf, features)?;
        self.object_id.encode(buf, features)?;
        Ok(())
    }

    fn decode_content<B: Buf>(
        buf: &mut B,
        features: u64,
        _version: u8,
        _compat_version: u8,
    ) -> Result<Self, RadosError> {
        Ok(ObjectMeta {
            params: Denc::decode(buf, features)?,
            object_id: Denc::decode(buf, features)?,
        })
    }

    fn encoded_size_content(&self, features: u64, _version: u8) -> Option<usize> {
        Some(self.params.encoded_size(features)? + self.object_id.encoded_size(features)?)
    }
}

impl_denc_for_versioned!(ObjectMeta);

/// `(max_epoch, max_position)`, written to the `zlog.view.meta` xattr on the
/// log's metadata object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewMeta {
    pub max_epoch: u64,
    pub max_position: u64,
}

impl VersionedEncode for ViewMeta {
    fn encoding_version(&self, _features: u64) -> u8 {
        1
    }

    fn compat_version(&self, _features: u64) -> u8 {
        1
    }

    fn encode_content<B: BufMut>(
        &self,
        buf: &mut B,
        features: u64,
        _version: u8,
    ) -> Result<(), RadosError> {
        self.max_epoch.encode(buf, features)?;
        self.max_position.encode(buf, features)?;
        Ok(())
    }

    fn decode_content<B: Buf>(
        buf: &mut B,
        features: u64,
        _version: u8,
        _compat_version: u8,
    ) -> Result<Self, RadosError> {
        Ok(ViewMeta {
            max_epoch: Denc::decode(buf, features)?,
            max_position: Denc::decode(buf, features)?,
        })
    }

    fn encoded_size_content(&self, features: u64, _version: u8) -> Option<usize> {
        Some(self.max_epoch.encoded_size(features)? + self.max_position.encoded_size(features)?)
    }
}

impl_denc_for_versioned!(ViewMeta);

/// The state tag occupying byte 0 of every slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryState {
    Unused = 0,
    Taken = 1,
    Invalid = 2,
}

impl EntryState {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(EntryState::Unused),
            1 => Some(EntryState::Taken),
            2 => Some(EntryState::Invalid),
            _ => None,
        }
    }
}

/// Zero-padded 20-digit decimal key used for omap view entries: lexicographic
/// order of these strings equals numeric order of the epoch.
pub fn view_epoch_key(epoch: u64) -> String {
    format!("view.epoch.{:020}", epoch)
}
