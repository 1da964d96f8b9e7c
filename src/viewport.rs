// Viewport breakpoints - width thresholds controlling tagged element visibility
use crate::page::Page;
use serde::{Deserialize, Serialize};

// --- Default thresholds (inclusive upper widths, CSS pixels) ---
pub const SMALL_PHONE_MAX: u32 = 350;
pub const PHONE_MAX: u32 = 450;
pub const TABLET_MAX: u32 = 768;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    SmallPhone,
    Phone,
    Tablet,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::SmallPhone, Breakpoint::Phone, Breakpoint::Tablet];

    /// Elements carrying this tag are hidden while the breakpoint holds.
    pub fn tag(self) -> &'static str {
        match self {
            Breakpoint::SmallPhone => "data-bzs-hide-small-phone",
            Breakpoint::Phone => "data-bzs-hide-phone",
            Breakpoint::Tablet => "data-bzs-hide-tablet",
        }
    }
}

/// Breakpoints are evaluated independently, so a narrow viewport holds all
/// of them at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreakpointSet {
    pub small_phone: bool,
    pub phone: bool,
    pub tablet: bool,
}

impl BreakpointSet {
    pub fn contains(&self, breakpoint: Breakpoint) -> bool {
        match breakpoint {
            Breakpoint::SmallPhone => self.small_phone,
            Breakpoint::Phone => self.phone,
            Breakpoint::Tablet => self.tablet,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.small_phone || self.phone || self.tablet)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Breakpoints {
    pub small_phone_max: u32,
    pub phone_max: u32,
    pub tablet_max: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            small_phone_max: SMALL_PHONE_MAX,
            phone_max: PHONE_MAX,
            tablet_max: TABLET_MAX,
        }
    }
}

impl Breakpoints {
    pub fn classify(&self, width: u32) -> BreakpointSet {
        BreakpointSet {
            small_phone: width <= self.small_phone_max,
            phone: width <= self.phone_max,
            tablet: width <= self.tablet_max,
        }
    }

    /// Show or hide every tagged element for the given width.
    pub fn apply(&self, page: &mut dyn Page, width: u32) -> BreakpointSet {
        let active = self.classify(width);
        for breakpoint in Breakpoint::ALL {
            page.set_tag_visibility(breakpoint.tag(), !active.contains(breakpoint));
        }
        active
    }
}

/// Classify with the default thresholds.
pub fn classify(width: u32) -> BreakpointSet {
    Breakpoints::default().classify(width)
}
