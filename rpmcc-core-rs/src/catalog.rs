//! Per-platform RPM clock tables
//!
//! Every RPM clock comes as a pair sharing one physical slot: a clock that
//! votes for both active and sleep sets, and an `_a` twin that only votes
//! for the active set. The pairs become peers in the vote table.

use crate::descriptor::ResourceDescriptor;
use crate::types::*;

/// XO rate on all supported platforms
pub const XO_RATE_HZ: RateHz = 19_200_000;

/// Nominal rate of the XO buffer outputs (only presence is voted)
pub const XO_BUFFER_RATE_HZ: RateHz = 1000;

/// Two logical clocks voting on one RPM resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockPair {
    /// Votes for active and sleep sets
    pub name: &'static str,
    /// Votes for the active set only
    pub active_name: &'static str,
    /// Shared resource identity
    pub desc: ResourceDescriptor,
}

impl ClockPair {
    /// Bus or memory clock voted in kHz
    pub const fn rate(name: &'static str, active_name: &'static str, res_type: u32, res_id: u32) -> Self {
        Self {
            name,
            active_name,
            desc: ResourceDescriptor::rate(KEY_RATE, ResourceSlot::new(res_type, res_id)),
        }
    }

    /// Fixed-rate on/off clock
    pub const fn branch(
        name: &'static str,
        active_name: &'static str,
        res_type: u32,
        res_id: u32,
        rate: RateHz,
    ) -> Self {
        Self {
            name,
            active_name,
            desc: ResourceDescriptor::branch(KEY_ENABLE, ResourceSlot::new(res_type, res_id), rate),
        }
    }

    /// Debug subsystem clock voted through the state key
    pub const fn qdss(name: &'static str, active_name: &'static str, res_type: u32, res_id: u32) -> Self {
        Self {
            name,
            active_name,
            desc: ResourceDescriptor::rate(KEY_STATE, ResourceSlot::new(res_type, res_id)),
        }
    }

    /// XO buffer output under software control
    pub const fn xo_buffer(name: &'static str, active_name: &'static str, res_id: u32) -> Self {
        Self {
            name,
            active_name,
            desc: ResourceDescriptor::branch(
                KEY_SOFTWARE_ENABLE,
                ResourceSlot::new(RPM_CLK_BUF_A, res_id),
                XO_BUFFER_RATE_HZ,
            ),
        }
    }

    /// XO buffer output gated by its enable pin
    pub const fn xo_buffer_pinctrl(name: &'static str, active_name: &'static str, res_id: u32) -> Self {
        Self {
            name,
            active_name,
            desc: ResourceDescriptor::branch(
                KEY_PIN_CTRL_CLK_BUFFER_ENABLE,
                ResourceSlot::new(RPM_CLK_BUF_A, res_id),
                XO_BUFFER_RATE_HZ,
            ),
        }
    }
}

/// Clock table of one SoC
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    /// Device-tree compatible string
    pub compatible: &'static str,
    pub pairs: &'static [ClockPair],
}

impl Platform {
    /// Number of logical clocks (two per pair)
    pub fn clock_count(&self) -> usize {
        self.pairs.len() * 2
    }
}

// ============================================================================
// msm8916
// ============================================================================

const MSM8916_CLKS: &[ClockPair] = &[
    ClockPair::branch("xo", "xo_a", RPM_MISC_CLK, 0, XO_RATE_HZ),
    ClockPair::rate("pcnoc_clk", "pcnoc_a_clk", RPM_BUS_CLK, 0),
    ClockPair::rate("snoc_clk", "snoc_a_clk", RPM_BUS_CLK, 1),
    ClockPair::rate("bimc_clk", "bimc_a_clk", RPM_MEM_CLK, 0),
    ClockPair::qdss("qdss_clk", "qdss_a_clk", RPM_MISC_CLK, 1),
    ClockPair::xo_buffer("bb_clk1", "bb_clk1_a", 1),
    ClockPair::xo_buffer("bb_clk2", "bb_clk2_a", 2),
    ClockPair::xo_buffer("rf_clk1", "rf_clk1_a", 4),
    ClockPair::xo_buffer("rf_clk2", "rf_clk2_a", 5),
    ClockPair::xo_buffer_pinctrl("bb_clk1_pin", "bb_clk1_a_pin", 1),
    ClockPair::xo_buffer_pinctrl("bb_clk2_pin", "bb_clk2_a_pin", 2),
    ClockPair::xo_buffer_pinctrl("rf_clk1_pin", "rf_clk1_a_pin", 4),
    ClockPair::xo_buffer_pinctrl("rf_clk2_pin", "rf_clk2_a_pin", 5),
];

pub const MSM8916: Platform = Platform {
    compatible: "qcom,rpmcc-msm8916",
    pairs: MSM8916_CLKS,
};

// ============================================================================
// msm8974
// ============================================================================

const MSM8974_CLKS: &[ClockPair] = &[
    ClockPair::branch("cxo_clk_src", "cxo_a_clk_src", RPM_MISC_CLK, 0, XO_RATE_HZ),
    ClockPair::rate("pnoc_clk", "pnoc_a_clk", RPM_BUS_CLK, 0),
    ClockPair::rate("snoc_clk", "snoc_a_clk", RPM_BUS_CLK, 1),
    ClockPair::rate("cnoc_clk", "cnoc_a_clk", RPM_BUS_CLK, 2),
    ClockPair::rate("mmssnoc_ahb_clk", "mmssnoc_ahb_a_clk", RPM_BUS_CLK, 3),
    ClockPair::rate("bimc_clk", "bimc_a_clk", RPM_MEM_CLK, 0),
    ClockPair::rate("gfx3d_clk_src", "gfx3d_a_clk_src", RPM_MEM_CLK, 1),
    ClockPair::rate("ocmemgx_clk", "ocmemgx_a_clk", RPM_MEM_CLK, 2),
    ClockPair::qdss("qdss_clk", "qdss_a_clk", RPM_MISC_CLK, 1),
    ClockPair::xo_buffer("cxo_d0", "cxo_d0_a", 1),
    ClockPair::xo_buffer("cxo_d1", "cxo_d1_a", 2),
    ClockPair::xo_buffer("cxo_a0", "cxo_a0_a", 4),
    ClockPair::xo_buffer("cxo_a1", "cxo_a1_a", 5),
    ClockPair::xo_buffer("cxo_a2", "cxo_a2_a", 6),
    ClockPair::xo_buffer("diff_clk", "diff_a_clk", 7),
    ClockPair::xo_buffer("div_clk1", "div_a_clk1", 11),
    ClockPair::xo_buffer("div_clk2", "div_a_clk2", 12),
    ClockPair::xo_buffer_pinctrl("cxo_d0_pin", "cxo_d0_a_pin", 1),
    ClockPair::xo_buffer_pinctrl("cxo_d1_pin", "cxo_d1_a_pin", 2),
    ClockPair::xo_buffer_pinctrl("cxo_a0_pin", "cxo_a0_a_pin", 4),
    ClockPair::xo_buffer_pinctrl("cxo_a1_pin", "cxo_a1_a_pin", 5),
    ClockPair::xo_buffer_pinctrl("cxo_a2_pin", "cxo_a2_a_pin", 6),
];

pub const MSM8974: Platform = Platform {
    compatible: "qcom,rpmcc-msm8974",
    pairs: MSM8974_CLKS,
};

// ============================================================================
// apq8084
// ============================================================================

const APQ8084_CLKS: &[ClockPair] = &[
    ClockPair::branch("xo_clk_src", "xo_a_clk_src", RPM_MISC_CLK, 0, XO_RATE_HZ),
    ClockPair::rate("pnoc_clk", "pnoc_a_clk", RPM_BUS_CLK, 0),
    ClockPair::rate("snoc_clk", "snoc_a_clk", RPM_BUS_CLK, 1),
    ClockPair::rate("cnoc_clk", "cnoc_a_clk", RPM_BUS_CLK, 2),
    ClockPair::rate("mmssnoc_ahb_clk", "mmssnoc_ahb_a_clk", RPM_BUS_CLK, 3),
    ClockPair::rate("bimc_clk", "bimc_a_clk", RPM_MEM_CLK, 0),
    ClockPair::rate("gfx3d_clk_src", "gfx3d_a_clk_src", RPM_MEM_CLK, 1),
    ClockPair::rate("ocmemgx_clk", "ocmemgx_a_clk", RPM_MEM_CLK, 2),
    ClockPair::qdss("qdss_clk", "qdss_a_clk", RPM_MISC_CLK, 1),
    ClockPair::xo_buffer("bb_clk1", "bb_clk1_a", 1),
    ClockPair::xo_buffer("bb_clk2", "bb_clk2_a", 2),
    ClockPair::xo_buffer("rf_clk1", "rf_clk1_a", 4),
    ClockPair::xo_buffer("rf_clk2", "rf_clk2_a", 5),
    ClockPair::xo_buffer("rf_clk3", "rf_clk3_a", 6),
    ClockPair::xo_buffer("diff_clk1", "diff_clk1_a", 7),
    ClockPair::xo_buffer("div_clk1", "div_clk1_a", 11),
    ClockPair::xo_buffer("div_clk2", "div_clk2_a", 12),
    ClockPair::xo_buffer("div_clk3", "div_clk3_a", 13),
    ClockPair::xo_buffer_pinctrl("bb_clk1_pin", "bb_clk1_a_pin", 1),
    ClockPair::xo_buffer_pinctrl("bb_clk2_pin", "bb_clk2_a_pin", 2),
    ClockPair::xo_buffer_pinctrl("rf_clk1_pin", "rf_clk1_a_pin", 4),
    ClockPair::xo_buffer_pinctrl("rf_clk2_pin", "rf_clk2_a_pin", 5),
    ClockPair::xo_buffer_pinctrl("rf_clk3_pin", "rf_clk3_a_pin", 6),
];

pub const APQ8084: Platform = Platform {
    compatible: "qcom,rpmcc-apq8084",
    pairs: APQ8084_CLKS,
};

/// All known platforms
pub const PLATFORMS: &[Platform] = &[MSM8916, MSM8974, APQ8084];

/// Look up a platform by compatible string
pub fn platform(compatible: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.compatible == compatible)
}
