//! `Object/Instance/Resource` addressing.
//!
//! Paths follow the public object registry convention: three unsigned
//! integers separated by `/`, e.g. `3303/0/5700` (temperature sensor,
//! instance 0, sensor value).  Only the syntactic shape is validated;
//! whether an object ID is actually registered is not our concern.

use core::fmt;
use core::str::FromStr;

use crate::error::RegistryError;

/// Three-part numeric resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    pub object: u16,
    pub instance: u16,
    pub resource: u16,
}

impl ResourcePath {
    pub const fn new(object: u16, instance: u16, resource: u16) -> Self {
        Self {
            object,
            instance,
            resource,
        }
    }

    /// Parse `"O/I/R"`.  Each segment must be a non-empty run of ASCII
    /// digits that fits in `u16`; no signs, whitespace, or extra segments.
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let mut parts = text.split('/');
        let object = parse_segment(parts.next())?;
        let instance = parse_segment(parts.next())?;
        let resource = parse_segment(parts.next())?;
        if parts.next().is_some() {
            return Err(RegistryError::InvalidPath);
        }
        Ok(Self::new(object, instance, resource))
    }
}

fn parse_segment(segment: Option<&str>) -> Result<u16, RegistryError> {
    let s = segment.ok_or(RegistryError::InvalidPath)?;
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegistryError::InvalidPath);
    }
    s.parse().map_err(|_| RegistryError::InvalidPath)
}

impl FromStr for ResourcePath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.object, self.instance, self.resource)
    }
}
