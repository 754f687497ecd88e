//! Core types for RPM clock voting
//!
//! Resource types and keys are four-character codes packed little-endian,
//! the way the RPM firmware names them (`clk1` is `0x316b6c63`).

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Resource Types
// ============================================================================

/// Miscellaneous clocks (`clk0`): XO, QDSS, scaling control
pub const RPM_MISC_CLK: u32 = 0x306b_6c63;

/// Bus clocks (`clk1`): PCNOC, SNOC, CNOC, ...
pub const RPM_BUS_CLK: u32 = 0x316b_6c63;

/// Memory clocks (`clk2`): BIMC, OCMEM, GFX3D
pub const RPM_MEM_CLK: u32 = 0x326b_6c63;

/// XO buffer clocks (`clka`)
pub const RPM_CLK_BUF_A: u32 = 0x616b_6c63;

// ============================================================================
// Request Keys
// ============================================================================

/// Rate vote in kHz (`KHz`)
pub const KEY_RATE: u32 = 0x007a_484b;

/// Enable vote (`Enab`)
pub const KEY_ENABLE: u32 = 0x6261_6e45;

/// State vote (`STAT`)
pub const KEY_STATE: u32 = 0x5441_5453;

/// XO buffer software enable (`swen`)
pub const KEY_SOFTWARE_ENABLE: u32 = 0x6e65_7773;

/// XO buffer pin-control enable (`pccb`)
pub const KEY_PIN_CTRL_CLK_BUFFER_ENABLE: u32 = 0x6263_6370;

/// Resource id of the clock scaling switch within [`RPM_MISC_CLK`]
pub const SCALING_ENABLE_ID: u32 = 2;

/// Hz to kHz
pub const HZ_PER_KHZ: u64 = 1000;

/// Code a rejected request is acknowledged with (-EIO)
pub const RPM_REJECT_CODE: i32 = -5;

// ============================================================================
// Basic Types
// ============================================================================

/// Index of a clock in the vote table
pub type ClockId = usize;

/// Rate in Hz
pub type RateHz = u64;

/// RPM context a vote applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum RpmState {
    /// Application processor awake
    Active = 0,
    /// Application processor in power collapse
    Sleep = 1,
}

impl fmt::Display for RpmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpmState::Active => write!(f, "active"),
            RpmState::Sleep => write!(f, "sleep"),
        }
    }
}

/// Physical resource a logical clock maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceSlot {
    /// Resource type code (`clk0`, `clk1`, ...)
    pub res_type: u32,
    /// Resource instance within the type
    pub res_id: u32,
}

impl ResourceSlot {
    pub const fn new(res_type: u32, res_id: u32) -> Self {
        Self { res_type, res_id }
    }

    /// Slot of the clock scaling switch
    pub const fn scaling() -> Self {
        Self::new(RPM_MISC_CLK, SCALING_ENABLE_ID)
    }
}

impl fmt::Display for ResourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", FourCc(self.res_type), self.res_id)
    }
}

/// Display adapter for packed four-character codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCc(pub u32);

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.to_le_bytes() {
            if b == 0 {
                continue;
            }
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Integer division rounding up; a zero divisor passes the value through
pub const fn ceil_div(value: u64, divisor: u64) -> u64 {
    if divisor == 0 {
        return value;
    }
    value / divisor + (value % divisor != 0) as u64
}
