//! Limit switch inputs
//!
//! Each switch has two independent paths into the controller. The poll
//! path reads the pin on every motion tick. The edge path wakes the motion
//! task on any pin edge; edges closer together than the debounce window
//! are ignored, and an accepted edge re-samples the pin and only raises
//! the switch's latch if the input still reads active. Edges that land
//! while no wait is armed are left to the poll path.

use defmt::*;
use rookarm_core::safety::{EdgeFilter, EdgeLatch, SwitchId};
use rookarm_core::SwitchSample;
use rookarm_hal_rp2040::{InputPin, RpInput};

/// One limit switch input with its edge debounce state
pub struct LimitWatch {
    switch: SwitchId,
    input: RpInput<'static>,
    active_high: bool,
    filter: EdgeFilter,
    latch: EdgeLatch,
}

impl LimitWatch {
    pub fn new(switch: SwitchId, input: RpInput<'static>, active_high: bool, debounce_ms: u32) -> Self {
        Self {
            switch,
            input,
            active_high,
            filter: EdgeFilter::new(u64::from(debounce_ms)),
            latch: EdgeLatch::new(),
        }
    }

    /// Wait for the next rising or falling edge on the pin
    pub async fn wait_for_edge(&mut self) {
        self.input.wait_for_any_edge().await;
    }

    /// Debounce and confirm an edge the pin just reported
    pub fn on_edge(&mut self, now_ms: u64) {
        if !self.filter.accept(now_ms) {
            trace!("Limit {} edge inside debounce window", self.switch.name());
            return;
        }

        if self.input.is_high() == self.active_high {
            self.latch.raise();
            debug!("Limit {} edge latched", self.switch.name());
        }
    }

    /// Read the pin and take any latched edge for one motion tick
    pub fn sample(&self) -> SwitchSample {
        SwitchSample {
            level_high: self.input.is_high(),
            edge: self.latch.take(),
        }
    }
}
