// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handles identifying physical controllers.
//!
//! A [`LightHandle`] is a cheap, cloneable reference to one controller. Its
//! identity is the transport address. The connection-scoped facts (writable
//! characteristic, detected family, inferred mode) are attached to it and
//! updated by the [`ConnectionPool`](crate::pool::ConnectionPool) while it
//! holds the device lock; callers only read them.
//!
//! Handles are not persisted: detection is cheap enough to repeat every
//! session.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::state::{DeviceMode, TrackedMode};
use crate::transport::CharacteristicId;
use crate::types::ProtocolFamily;

/// A device reported by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LightInfo {
    /// Transport address.
    pub address: String,
    /// Advertised name, or `unknown`.
    pub name: String,
}

impl LightInfo {
    /// Creates a new light info.
    #[must_use]
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for LightInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Connection-scoped metadata of a handle.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Link {
    pub(crate) characteristic: Option<CharacteristicId>,
    pub(crate) family: ProtocolFamily,
    pub(crate) mode: TrackedMode,
}

#[derive(Debug)]
struct Inner {
    info: LightInfo,
    pinned_family: Option<ProtocolFamily>,
    link: RwLock<Link>,
}

/// Identifies one physical controller.
///
/// Clones share the same underlying metadata.
///
/// # Examples
///
/// ```
/// use lightdesk::LightHandle;
/// use lightdesk::state::DeviceMode;
/// use lightdesk::types::ProtocolFamily;
///
/// let handle = LightHandle::new("BE:FF:20:00:11:22", "ELK-BLEDOM");
/// assert_eq!(handle.family(), ProtocolFamily::Unknown);
/// assert_eq!(handle.mode(), DeviceMode::Static);
///
/// // A family known out of band is never probed
/// let pinned = LightHandle::with_family("BE:FF:20:00:11:23", "QHM-S281", ProtocolFamily::Ffe9);
/// assert_eq!(pinned.pinned_family(), Some(ProtocolFamily::Ffe9));
/// ```
#[derive(Clone)]
pub struct LightHandle {
    inner: Arc<Inner>,
}

impl LightHandle {
    /// Creates a handle whose family will be detected on connect.
    #[must_use]
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self::build(LightInfo::new(address, name), None)
    }

    /// Creates a handle with a family known out of band.
    #[must_use]
    pub fn with_family(
        address: impl Into<String>,
        name: impl Into<String>,
        family: ProtocolFamily,
    ) -> Self {
        let pinned = family.is_known().then_some(family);
        Self::build(LightInfo::new(address, name), pinned)
    }

    fn build(info: LightInfo, pinned_family: Option<ProtocolFamily>) -> Self {
        Self {
            inner: Arc::new(Inner {
                info,
                pinned_family,
                link: RwLock::new(Link::default()),
            }),
        }
    }

    /// Returns the transport address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.inner.info.address
    }

    /// Returns the advertised name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.info.name
    }

    /// Returns the scan info this handle was built from.
    #[must_use]
    pub fn info(&self) -> &LightInfo {
        &self.inner.info
    }

    /// Returns the family pinned at construction, if any.
    #[must_use]
    pub fn pinned_family(&self) -> Option<ProtocolFamily> {
        self.inner.pinned_family
    }

    /// Returns the family of the current connection.
    ///
    /// `Unknown` until the pool has connected and detected.
    #[must_use]
    pub fn family(&self) -> ProtocolFamily {
        self.inner.link.read().family
    }

    /// Returns the writable characteristic of the current connection.
    #[must_use]
    pub fn characteristic(&self) -> Option<CharacteristicId> {
        self.inner.link.read().characteristic
    }

    /// Returns the inferred output mode.
    #[must_use]
    pub fn mode(&self) -> DeviceMode {
        self.inner.link.read().mode.mode()
    }

    /// Returns the inferred mode with its version and confirmation time.
    #[must_use]
    pub fn tracked_mode(&self) -> TrackedMode {
        self.inner.link.read().mode
    }

    /// Returns true if both handles refer to the same device.
    #[must_use]
    pub fn same_device(&self, other: &Self) -> bool {
        self.address() == other.address()
    }

    pub(crate) fn link(&self) -> Link {
        *self.inner.link.read()
    }

    pub(crate) fn set_link(&self, link: Link) {
        *self.inner.link.write() = link;
    }

    pub(crate) fn downgrade(&self) -> WeakLight {
        WeakLight(Arc::downgrade(&self.inner))
    }
}

/// A non-owning reference to a handle's metadata.
#[derive(Debug, Clone)]
pub(crate) struct WeakLight(Weak<Inner>);

impl WeakLight {
    pub(crate) fn upgrade(&self) -> Option<LightHandle> {
        self.0.upgrade().map(|inner| LightHandle { inner })
    }

    /// Returns true if `handle` shares this metadata.
    pub(crate) fn refers_to(&self, handle: &LightHandle) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&handle.inner))
    }

    pub(crate) fn is_dropped(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl From<LightInfo> for LightHandle {
    fn from(info: LightInfo) -> Self {
        Self::build(info, None)
    }
}

impl fmt::Debug for LightHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = self.link();
        f.debug_struct("LightHandle")
            .field("address", &self.address())
            .field("name", &self.name())
            .field("family", &link.family)
            .field("mode", &link.mode.mode())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for LightHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner.info, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_metadata() {
        let handle = LightHandle::new("AA", "Triones");
        let clone = handle.clone();
        handle.set_link(Link {
            family: ProtocolFamily::Fff3,
            ..Link::default()
        });
        assert_eq!(clone.family(), ProtocolFamily::Fff3);
    }

    #[test]
    fn weak_reference_tracks_only_its_handle() {
        let handle = LightHandle::new("AA", "Triones");
        let weak = handle.downgrade();

        assert!(weak.refers_to(&handle.clone()));
        assert!(!weak.refers_to(&LightHandle::new("AA", "Triones")));
        assert!(weak.upgrade().is_some());

        drop(handle);
        assert!(weak.is_dropped());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn pinning_unknown_is_ignored() {
        let handle = LightHandle::with_family("AA", "x", ProtocolFamily::Unknown);
        assert_eq!(handle.pinned_family(), None);
    }

    #[test]
    fn from_info_keeps_name_and_address() {
        let handle = LightHandle::from(LightInfo::new("AA:BB", "LEDBlue"));
        assert_eq!(handle.to_string(), "LEDBlue (AA:BB)");
        assert!(handle.same_device(&LightHandle::new("AA:BB", "other")));
    }
}
