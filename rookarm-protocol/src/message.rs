//! Replies, events and their frame encoding

use serde::{Deserialize, Serialize};

use crate::command::{ActionRequest, Command, Name, SquareText};
use crate::frame::{Frame, FrameError};
use crate::report::{HomingReport, StatusReport, StepperReport};

/// Host → robot command
pub const MSG_COMMAND: u8 = 0x01;
/// Robot → host reply to the last command
pub const MSG_REPLY: u8 = 0x81;
/// Robot → host asynchronous event
pub const MSG_EVENT: u8 = 0x82;

/// Failure reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    Disabled,
    Busy,
    InvalidArgument,
    DeviceUnavailable,
    MotorError,
    Timeout,
    QueueFull,
    /// Frame could not be decoded into a command
    Malformed,
}

/// Reply to one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Ok,
    Error(ErrorCode),
    Status(StatusReport),
    Stepper(StepperReport),
    Homing(HomingReport),
}

/// Unsolicited notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A queued chess action finished; `error` is `None` on success
    ActionFinished {
        action: ActionRequest,
        error: Option<ErrorCode>,
        primitives: u8,
    },
    /// A limit switch latched (`"x"`, `"y"` or `"z"`)
    LimitTriggered { switch: Name },
    /// Homing state machine changed state
    HomingChanged { state: Name },
    /// The board scanner saw a piece move
    MoveDetected { from: SquareText, to: SquareText },
}

/// Anything the robot sends
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outbound {
    Reply(Response),
    Event(Event),
}

impl Command {
    /// Wrap this command in a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::from_message(MSG_COMMAND, self)
    }

    /// Decode a command frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        if frame.msg_type != MSG_COMMAND {
            return Err(FrameError::UnexpectedType);
        }
        frame.decode()
    }
}

impl Outbound {
    /// Wrap this message in a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            Outbound::Reply(response) => Frame::from_message(MSG_REPLY, response),
            Outbound::Event(event) => Frame::from_message(MSG_EVENT, event),
        }
    }

    /// Decode a reply or event frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_REPLY => frame.decode().map(Outbound::Reply),
            MSG_EVENT => frame.decode().map(Outbound::Event),
            _ => Err(FrameError::UnexpectedType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;
    use crate::report::{Position, SwitchReport};
    use heapless::Vec;

    fn name(s: &str) -> Name {
        Name::try_from(s).unwrap()
    }

    fn square(s: &str) -> SquareText {
        SquareText::try_from(s).unwrap()
    }

    #[test]
    fn test_command_through_parser() {
        let cmd = Command::Execute(ActionRequest::Castle {
            rook_from: square("h1"),
            rook_to: square("f1"),
            king_from: square("e1"),
            king_to: square("g1"),
        });
        let bytes = cmd.to_frame().unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let frame = parser.feed_bytes(&bytes).unwrap().unwrap();
        assert_eq!(Command::from_frame(&frame).unwrap(), cmd);
    }

    #[test]
    fn test_status_reply_fits_in_frame() {
        let mut axes = Vec::new();
        for motor in ["x", "y1", "y2", "z", "gripper"] {
            axes.push(crate::report::AxisReport {
                motor: name(motor),
                position: i32::MIN,
                moving: true,
                state: name("homing"),
                enabled: true,
                homed: false,
            })
            .unwrap();
        }
        let reply = Outbound::Reply(Response::Status(StatusReport {
            position: Position {
                x: i32::MIN,
                y: i32::MIN,
                z: i32::MIN,
            },
            busy: true,
            homing_state: name("homing_z"),
            is_homing: true,
            axes,
            all_idle: false,
            switches: SwitchReport::default(),
            queued: 4,
        }));

        let frame = reply.to_frame().unwrap();
        assert_eq!(Outbound::from_frame(&frame).unwrap(), reply);
    }

    #[test]
    fn test_event_frame_type() {
        let event = Outbound::Event(Event::LimitTriggered { switch: name("z") });
        let frame = event.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_EVENT);
        assert_eq!(Command::from_frame(&frame), Err(FrameError::UnexpectedType));
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let frame = Frame::new(MSG_COMMAND, &[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(Command::from_frame(&frame), Err(FrameError::Decode));
    }
}
