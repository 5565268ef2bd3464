//! Limit switch debounce and latching

use heapless::Vec;

use crate::config::SwitchConfig;
use crate::error::RobotError;
use crate::motion::{AxisId, MotorId};

/// Motors one switch can stop
pub const MAX_ATTACHED: usize = 2;

/// Physical switches, one per homed axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchId {
    X,
    Y,
    Z,
}

impl SwitchId {
    pub const ALL: [SwitchId; 3] = [SwitchId::X, SwitchId::Y, SwitchId::Z];

    pub const fn index(self) -> usize {
        self.axis().index()
    }

    pub const fn axis(self) -> AxisId {
        match self {
            SwitchId::X => AxisId::X,
            SwitchId::Y => AxisId::Y,
            SwitchId::Z => AxisId::Z,
        }
    }

    pub const fn for_axis(axis: AxisId) -> Self {
        match axis {
            AxisId::X => SwitchId::X,
            AxisId::Y => SwitchId::Y,
            AxisId::Z => SwitchId::Z,
        }
    }

    pub const fn name(self) -> &'static str {
        self.axis().name()
    }
}

/// Latch transitions reported by the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchEvent {
    /// First activation; attached motors must stop now
    Triggered,
    /// Debounced release
    Released,
}

/// Debounced, latching limit switch
///
/// `active_latched` follows the physical switch with asymmetric debounce.
/// `triggered` is sticky until the homing sequencer clears it, so a pass
/// can tell its own capture from a previous cycle's.
#[derive(Debug, Clone)]
pub struct LimitSwitch {
    id: SwitchId,
    attached: Vec<MotorId, MAX_ATTACHED>,
    active_high: bool,
    trigger_samples: u16,
    release_samples: u16,
    active_run: u16,
    inactive_run: u16,
    active_latched: bool,
    triggered: bool,
    interrupt_enabled: bool,
}

impl LimitSwitch {
    pub fn new(id: SwitchId, config: &SwitchConfig) -> Self {
        Self {
            id,
            attached: Vec::new(),
            active_high: config.active_high,
            trigger_samples: config.trigger_samples.max(1),
            release_samples: config.release_samples.max(1),
            active_run: 0,
            inactive_run: 0,
            active_latched: false,
            triggered: false,
            interrupt_enabled: true,
        }
    }

    pub fn id(&self) -> SwitchId {
        self.id
    }

    /// Register a motor to stop on activation
    pub fn attach(&mut self, motor: MotorId) -> Result<(), RobotError> {
        if self.attached.contains(&motor) {
            return Ok(());
        }
        self.attached
            .push(motor)
            .map_err(|_| RobotError::InvalidArgument)
    }

    pub fn attached(&self) -> &[MotorId] {
        &self.attached
    }

    /// Map a pin level to switch activity
    pub fn is_active_level(&self, level_high: bool) -> bool {
        level_high == self.active_high
    }

    /// Feed one raw sample from the periodic safety poll
    pub fn poll(&mut self, raw_active: bool) -> Option<SwitchEvent> {
        if raw_active {
            self.inactive_run = 0;
            self.active_run = self.active_run.saturating_add(1);
            if self.active_run >= self.trigger_samples && self.trigger() {
                return Some(SwitchEvent::Triggered);
            }
        } else {
            self.active_run = 0;
            if self.active_latched {
                self.inactive_run = self.inactive_run.saturating_add(1);
                if self.inactive_run >= self.release_samples {
                    self.release();
                    return Some(SwitchEvent::Released);
                }
            }
        }
        None
    }

    /// Interrupt path: an edge was seen and the pin re-sampled
    ///
    /// Ignored while interrupts are disabled or if the re-sample shows the
    /// switch inactive (glitch).
    pub fn on_edge(&mut self, resampled_active: bool) -> Option<SwitchEvent> {
        if self.interrupt_enabled && resampled_active && self.trigger() {
            Some(SwitchEvent::Triggered)
        } else {
            None
        }
    }

    /// Latch the switch
    ///
    /// Returns `true` on first activation only.
    pub fn trigger(&mut self) -> bool {
        if self.active_latched {
            return false;
        }
        self.active_latched = true;
        self.triggered = true;
        self.inactive_run = 0;
        true
    }

    /// Drop the physical latch; the trigger flag is left alone
    pub fn release(&mut self) {
        self.active_latched = false;
        self.inactive_run = 0;
    }

    /// Arm a fresh homing pass
    pub fn clear_triggered(&mut self) {
        self.triggered = false;
    }

    /// Debounced physical state
    pub fn is_triggered(&self) -> bool {
        self.active_latched
    }

    /// Sticky flag set by the last activation
    pub fn was_triggered(&self) -> bool {
        self.triggered
    }

    pub fn enable_interrupt(&mut self, enabled: bool) {
        self.interrupt_enabled = enabled;
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn switch(n: u16, m: u16) -> LimitSwitch {
        LimitSwitch::new(
            SwitchId::Z,
            &SwitchConfig {
                trigger_samples: n,
                release_samples: m,
                ..SwitchConfig::default()
            },
        )
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let mut sw = switch(3, 50);
        assert!(sw.trigger());
        assert!(!sw.trigger());
        assert!(sw.is_triggered());
        assert!(sw.was_triggered());
    }

    #[test]
    fn test_release_keeps_trigger_flag() {
        let mut sw = switch(3, 50);
        sw.trigger();
        sw.release();
        assert!(!sw.is_triggered());
        assert!(sw.was_triggered());
        sw.clear_triggered();
        assert!(!sw.was_triggered());
    }

    #[test]
    fn test_edge_resample_rejects_glitch() {
        let mut sw = switch(3, 50);
        assert_eq!(sw.on_edge(false), None);
        assert!(!sw.is_triggered());
        assert_eq!(sw.on_edge(true), Some(SwitchEvent::Triggered));
        assert_eq!(sw.on_edge(true), None);
    }

    #[test]
    fn test_edge_ignored_when_interrupt_disabled() {
        let mut sw = switch(3, 50);
        sw.enable_interrupt(false);
        assert_eq!(sw.on_edge(true), None);
        // The poll path still works
        for _ in 0..2 {
            assert_eq!(sw.poll(true), None);
        }
        assert_eq!(sw.poll(true), Some(SwitchEvent::Triggered));
    }

    #[test]
    fn test_attach_at_most_two() {
        let mut sw = switch(3, 50);
        sw.attach(MotorId::Y1).unwrap();
        sw.attach(MotorId::Y2).unwrap();
        sw.attach(MotorId::Y2).unwrap();
        assert_eq!(sw.attach(MotorId::X), Err(RobotError::InvalidArgument));
        assert_eq!(sw.attached(), &[MotorId::Y1, MotorId::Y2]);
    }

    #[test]
    fn test_polarity() {
        let mut config = SwitchConfig::default();
        config.active_high = false;
        let sw = LimitSwitch::new(SwitchId::X, &config);
        assert!(sw.is_active_level(false));
        assert!(!sw.is_active_level(true));
    }

    #[test]
    fn test_chatter_during_backoff_stays_latched() {
        let mut sw = switch(3, 50);
        for _ in 0..3 {
            sw.poll(true);
        }
        assert!(sw.is_triggered());
        for _ in 0..10 {
            for _ in 0..20 {
                assert_eq!(sw.poll(false), None);
            }
            assert_eq!(sw.poll(true), None);
        }
        assert!(sw.is_triggered());
    }

    proptest! {
        #[test]
        fn prop_asymmetric_debounce(n in 1u16..10, extra in 1u16..90) {
            let m = n + extra;
            let mut sw = switch(n, m);

            for _ in 0..n - 1 {
                prop_assert_eq!(sw.poll(true), None);
            }
            prop_assert_eq!(sw.poll(false), None);
            prop_assert!(!sw.is_triggered());

            for _ in 0..n - 1 {
                prop_assert_eq!(sw.poll(true), None);
            }
            prop_assert_eq!(sw.poll(true), Some(SwitchEvent::Triggered));
            prop_assert!(sw.is_triggered());

            for _ in 0..m - 1 {
                prop_assert_eq!(sw.poll(false), None);
            }
            prop_assert!(sw.is_triggered());
            prop_assert_eq!(sw.poll(false), Some(SwitchEvent::Released));
            prop_assert!(!sw.is_triggered());
        }
    }
}
