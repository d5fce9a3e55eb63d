// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named groups of lights.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::light::LightHandle;

/// A named set of lights meant to act in unison.
///
/// The name keys the group's resynchronization clock, so two groups with
/// the same name share one clock.
#[derive(Debug, Clone)]
pub struct LightGroup {
    name: String,
    members: Vec<LightHandle>,
}

impl LightGroup {
    /// Creates a group. Duplicate addresses are dropped, first one wins.
    #[must_use]
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = LightHandle>) -> Self {
        let mut unique: Vec<LightHandle> = Vec::new();
        for handle in members {
            if !unique.iter().any(|h| h.same_device(&handle)) {
                unique.push(handle);
            }
        }
        Self {
            name: name.into(),
            members: unique,
        }
    }

    /// A group of one, named after the device address.
    #[must_use]
    pub fn single(handle: LightHandle) -> Self {
        let name = handle.address().to_string();
        Self::new(name, [handle])
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the members in dispatch order.
    #[must_use]
    pub fn members(&self) -> &[LightHandle] {
        &self.members
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Which side of a two-light stage a cue addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Target {
    /// Only the first light.
    A,
    /// Only the second light.
    B,
    /// Both lights in unison.
    #[default]
    #[serde(rename = "A+B")]
    Both,
}

impl Target {
    /// Returns the group name used for this target.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Both => "A+B",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "A+B" | "AB" | "BOTH" => Ok(Self::Both),
            _ => Err(ValueError::UnknownTarget(s.to_string())),
        }
    }
}

/// Two independently addressable lights, either of which may be absent.
///
/// # Examples
///
/// ```
/// use lightdesk::LightHandle;
/// use lightdesk::dispatch::{Stage, Target};
///
/// let stage = Stage::new(Some(LightHandle::new("AA", "ELK-BLEDOM")), None);
/// let both = stage.group(Target::Both);
/// assert_eq!(both.name(), "A+B");
/// assert_eq!(both.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Stage {
    /// The first light.
    pub a: Option<LightHandle>,
    /// The second light.
    pub b: Option<LightHandle>,
}

impl Stage {
    /// Creates a stage.
    #[must_use]
    pub fn new(a: Option<LightHandle>, b: Option<LightHandle>) -> Self {
        Self { a, b }
    }

    /// Resolves `target` to a group, skipping missing slots.
    #[must_use]
    pub fn group(&self, target: Target) -> LightGroup {
        let members = match target {
            Target::A => [self.a.clone(), None],
            Target::B => [None, self.b.clone()],
            Target::Both => [self.a.clone(), self.b.clone()],
        };
        LightGroup::new(target.as_str(), members.into_iter().flatten())
    }
}
