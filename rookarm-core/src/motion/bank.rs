//! Fixed motor registry

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use rookarm_hal::OutputPin;

use super::axis::{Axis, TickOutcome};
use super::ids::MotorId;
use super::pair::{AxisPair, PairTick};
use crate::error::RobotError;

/// Outcome of ticking every motor once
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BankTick {
    /// Motors that reached their target this tick
    pub completed: Vec<MotorId, { MotorId::COUNT }>,
    /// Y pair disagreement; `None` when the pair is not fitted
    pub pair_diverged: Option<bool>,
}

/// Every stepper on the robot, one optional slot per [`MotorId`]
pub struct MotorBank<P: OutputPin> {
    slots: [Option<Axis<P>>; MotorId::COUNT],
}

impl<P: OutputPin> MotorBank<P> {
    /// Build from slots indexed by [`MotorId::index`]
    pub fn new(slots: [Option<Axis<P>>; MotorId::COUNT]) -> Self {
        Self { slots }
    }

    pub fn is_fitted(&self, id: MotorId) -> bool {
        self.slots[id.index()].is_some()
    }

    pub fn get(&self, id: MotorId) -> Result<&Axis<P>, RobotError> {
        self.slots[id.index()]
            .as_ref()
            .ok_or(RobotError::DeviceUnavailable)
    }

    pub fn get_mut(&mut self, id: MotorId) -> Result<&mut Axis<P>, RobotError> {
        self.slots[id.index()]
            .as_mut()
            .ok_or(RobotError::DeviceUnavailable)
    }

    /// Borrow Y1 and Y2 together
    pub fn y_pair(&mut self) -> Result<AxisPair<'_, P>, RobotError> {
        let (head, tail) = self.slots.split_at_mut(MotorId::Y2.index());
        match (head[MotorId::Y1.index()].as_mut(), tail[0].as_mut()) {
            (Some(first), Some(second)) => Ok(AxisPair::new(first, second)),
            _ => Err(RobotError::DeviceUnavailable),
        }
    }

    /// Fitted motors in id order
    pub fn iter(&self) -> impl Iterator<Item = (MotorId, &Axis<P>)> {
        MotorId::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(id, slot)| slot.as_ref().map(|axis| (id, axis)))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Axis<P>> {
        self.slots.iter_mut().flatten()
    }

    pub fn enable_all(&mut self, enabled: bool) {
        self.iter_mut().for_each(|axis| axis.enable(enabled));
    }

    /// Emergency-stop every motor; returns how many were moving
    pub fn stop_all(&mut self) -> usize {
        self.iter_mut()
            .map(|axis| axis.emergency_stop())
            .filter(|&stopped| stopped)
            .count()
    }

    /// No motor moving or homing
    pub fn all_idle(&self) -> bool {
        self.iter().all(|(_, axis)| !axis.is_active())
    }

    /// Zero every position counter without motion
    pub fn zero_all(&mut self) -> Result<(), RobotError> {
        if !self.all_idle() {
            return Err(RobotError::Busy);
        }
        for axis in self.iter_mut() {
            axis.set_position(0)?;
        }
        Ok(())
    }

    /// Tick every fitted motor once
    ///
    /// Y1/Y2 go through the pair coordinator when both are fitted.
    pub fn tick_all<D: DelayNs>(&mut self, now_us: u64, delay: &mut D) -> BankTick {
        let mut result = BankTick::default();

        for id in [MotorId::X, MotorId::Z, MotorId::Gripper] {
            if let Ok(axis) = self.get_mut(id) {
                if axis.tick(now_us, delay) == TickOutcome::Completed {
                    let _ = result.completed.push(id);
                }
            }
        }

        match self.y_pair() {
            Ok(mut pair) => {
                let tick = pair.tick(now_us, delay);
                result.pair_diverged = Some(tick.diverged());
                let (first, second) = match tick {
                    PairTick::Locked(outcome) => (outcome, outcome),
                    PairTick::Independent { first, second, .. } => (first, second),
                };
                if first == TickOutcome::Completed {
                    let _ = result.completed.push(MotorId::Y1);
                }
                if second == TickOutcome::Completed {
                    let _ = result.completed.push(MotorId::Y2);
                }
            }
            Err(_) => {
                for id in [MotorId::Y1, MotorId::Y2] {
                    if let Ok(axis) = self.get_mut(id) {
                        if axis.tick(now_us, delay) == TickOutcome::Completed {
                            let _ = result.completed.push(id);
                        }
                    }
                }
            }
        }

        result
    }
}
