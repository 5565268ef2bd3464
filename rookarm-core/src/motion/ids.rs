//! Motor and axis identifiers

/// Physical stepper motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorId {
    X,
    /// Y drive, left side
    Y1,
    /// Y drive, right side
    Y2,
    Z,
    /// Only fitted when the gripper is stepper-driven
    Gripper,
}

impl MotorId {
    pub const COUNT: usize = 5;

    pub const ALL: [MotorId; Self::COUNT] = [
        MotorId::X,
        MotorId::Y1,
        MotorId::Y2,
        MotorId::Z,
        MotorId::Gripper,
    ];

    /// Slot in the motor bank
    pub const fn index(self) -> usize {
        match self {
            MotorId::X => 0,
            MotorId::Y1 => 1,
            MotorId::Y2 => 2,
            MotorId::Z => 3,
            MotorId::Gripper => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MotorId::X => "x",
            MotorId::Y1 => "y1",
            MotorId::Y2 => "y2",
            MotorId::Z => "z",
            MotorId::Gripper => "gripper",
        }
    }

    /// Parse a motor name, case-insensitively
    ///
    /// A bare `"y"` names the first Y motor.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("y") {
            return Some(MotorId::Y1);
        }
        Self::ALL
            .into_iter()
            .find(|motor| name.eq_ignore_ascii_case(motor.name()))
    }
}

/// Logical axes of the gantry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisId {
    X,
    /// Driven by the Y1/Y2 pair
    Y,
    Z,
}

impl AxisId {
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Z];

    pub const fn index(self) -> usize {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
            AxisId::Z => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AxisId::X => "x",
            AxisId::Y => "y",
            AxisId::Z => "z",
        }
    }

    /// Motors that move this axis
    pub const fn motors(self) -> &'static [MotorId] {
        match self {
            AxisId::X => &[MotorId::X],
            AxisId::Y => &[MotorId::Y1, MotorId::Y2],
            AxisId::Z => &[MotorId::Z],
        }
    }

    /// Parse `"x"`, `"y"` or `"z"`, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|axis| name.eq_ignore_ascii_case(axis.name()))
    }
}

/// Target of a stepper diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorSelector {
    One(MotorId),
    /// Both Y motors together
    YPair,
    All,
}

impl MotorSelector {
    /// Parse a diagnostic target; `"y"` selects the pair
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("all") {
            Some(MotorSelector::All)
        } else if name.eq_ignore_ascii_case("y") {
            Some(MotorSelector::YPair)
        } else {
            MotorId::parse(name).map(MotorSelector::One)
        }
    }
}
