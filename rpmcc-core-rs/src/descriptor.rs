//! Static identity of a votable RPM resource

use crate::types::{ceil_div, RateHz, ResourceSlot, HZ_PER_KHZ};
use serde::Serialize;

/// Immutable description of one RPM clock resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    /// Key the RPM expects in the request record
    pub remote_key: u32,
    /// Physical resource this entry votes on
    pub slot: ResourceSlot,
    /// On/off resource: any nonzero vote means "on"
    pub is_branch: bool,
    /// Rate of a non-settable clock (e.g. a crystal oscillator)
    pub fixed_rate_hz: Option<RateHz>,
    /// Divisor applied before transmission
    pub unit_divisor: u64,
}

impl ResourceDescriptor {
    /// Continuous-rate resource voted in kHz
    pub const fn rate(remote_key: u32, slot: ResourceSlot) -> Self {
        Self {
            remote_key,
            slot,
            is_branch: false,
            fixed_rate_hz: None,
            unit_divisor: HZ_PER_KHZ,
        }
    }

    /// On/off resource running at a fixed rate
    pub const fn branch(remote_key: u32, slot: ResourceSlot, fixed_rate_hz: RateHz) -> Self {
        Self {
            remote_key,
            slot,
            is_branch: true,
            fixed_rate_hz: Some(fixed_rate_hz),
            unit_divisor: HZ_PER_KHZ,
        }
    }

    /// Collapse an aggregate to `{0, 1}` for branch resources
    pub fn coerce(&self, aggregate: RateHz) -> RateHz {
        if self.is_branch {
            (aggregate != 0) as RateHz
        } else {
            aggregate
        }
    }

    /// Convert an aggregate to the value carried on the wire
    ///
    /// Saturates at `u32::MAX` kHz.
    pub fn wire_value(&self, aggregate: RateHz) -> u32 {
        let scaled = ceil_div(aggregate, self.unit_divisor);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    /// Rate a freshly created vote starts with
    pub fn initial_rate(&self) -> RateHz {
        self.fixed_rate_hz.unwrap_or(0)
    }
}
