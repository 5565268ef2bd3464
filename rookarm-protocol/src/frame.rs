//! Frame encoding and decoding
//!
//! Frame format:
//! - START (1 byte): 0x7E synchronization byte
//! - LENGTH (1 byte): payload length (0-240)
//! - TYPE (1 byte): message type, see [`crate::message`]
//! - PAYLOAD (0-240 bytes): postcard-encoded message
//! - CHECKSUM (1 byte): XOR of LENGTH, TYPE and every PAYLOAD byte

use heapless::Vec;
use serde::{de::DeserializeOwned, Serialize};

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 240;

/// START + LENGTH + TYPE + CHECKSUM
const FRAME_OVERHEAD: usize = 4;

/// Maximum encoded frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Framing and payload errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Message does not fit in one frame
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// LENGTH byte out of range
    InvalidLength,
    /// Output buffer too small
    BufferTooSmall,
    /// TYPE byte does not match the expected message family
    UnexpectedType,
    /// Payload is not a valid postcard message
    Decode,
}

/// One frame: a type byte plus its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

fn checksum(msg_type: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(payload.len() as u8 ^ msg_type, |acc, byte| acc ^ byte)
}

impl Frame {
    /// Build a frame from raw payload bytes
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Serialize `message` with postcard into a new frame
    pub fn from_message<T: Serialize>(msg_type: u8, message: &T) -> Result<Self, FrameError> {
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        let used = postcard::to_slice(message, &mut buf).map_err(|_| FrameError::PayloadTooLarge)?;
        Self::new(msg_type, used)
    }

    /// Deserialize the payload
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FrameError> {
        postcard::from_bytes(&self.payload).map_err(|_| FrameError::Decode)
    }

    /// Encoded length of this frame
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        let out = buffer.get_mut(..len).ok_or(FrameError::BufferTooSmall)?;
        let body_end = len - 1;

        out[0] = FRAME_START;
        out[1] = self.payload.len() as u8;
        out[2] = self.msg_type;
        out[3..body_end].copy_from_slice(&self.payload);
        out[body_end] = checksum(self.msg_type, &self.payload);
        Ok(len)
    }

    /// Encode into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize_default(self.encoded_len())
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Sync,
    Length,
    Type { len: u8 },
    Payload { len: u8, msg_type: u8 },
    Checksum { msg_type: u8 },
}

/// Byte-at-a-time frame parser
///
/// Bytes outside a frame are skipped until the next START byte, so the
/// parser resynchronizes after line noise or a dropped byte.
#[derive(Debug, Clone)]
pub struct FrameParser {
    stage: Stage,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Sync,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.payload.clear();
    }

    /// Feed one byte
    ///
    /// Returns `Ok(Some(frame))` once a frame with a valid checksum is
    /// complete. Errors reset the parser.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.stage = match self.stage {
            Stage::Sync if byte == FRAME_START => Stage::Length,
            Stage::Sync => Stage::Sync,
            Stage::Length if byte as usize > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidLength);
            }
            Stage::Length => Stage::Type { len: byte },
            Stage::Type { len: 0 } => Stage::Checksum { msg_type: byte },
            Stage::Type { len } => {
                self.payload.clear();
                Stage::Payload {
                    len,
                    msg_type: byte,
                }
            }
            Stage::Payload { len, msg_type } => {
                // Capacity is guaranteed by the LENGTH check
                let _ = self.payload.push(byte);
                if self.payload.len() == len as usize {
                    Stage::Checksum { msg_type }
                } else {
                    Stage::Payload { len, msg_type }
                }
            }
            Stage::Checksum { msg_type } => {
                let valid = byte == checksum(msg_type, &self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.reset();
                if !valid {
                    return Err(FrameError::InvalidChecksum);
                }
                return Ok(Some(Frame { msg_type, payload }));
            }
        };
        Ok(None)
    }

    /// Feed bytes until the first complete frame
    ///
    /// Bytes after that frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_frame_layout() {
        let frame = Frame::new(0x01, &[]).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer).unwrap(), 4);
        assert_eq!(&buffer[..4], &[FRAME_START, 0, 0x01, 0x01]);
    }

    #[test]
    fn test_checksum_covers_length_type_payload() {
        let frame = Frame::new(0x81, &[0x10, 0x20]).unwrap();
        let bytes = frame.encode_to_vec().unwrap();
        assert_eq!(bytes[bytes.len() - 1], 2 ^ 0x81 ^ 0x10 ^ 0x20);
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(0x01, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 6];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_corrupt_checksum_rejected() {
        let mut bytes = Frame::new(0x01, &[7]).unwrap().encode_to_vec().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_resync_after_noise() {
        let frame = Frame::new(0x82, &[9, 9]).unwrap();
        let mut data: Vec<u8, 32> = Vec::from_slice(&[0x00, 0x13, 0xFF]).unwrap();
        data.extend_from_slice(&frame.encode_to_vec().unwrap()).unwrap();

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&data).unwrap(), Some(frame));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut parser = FrameParser::new();
        parser.feed(FRAME_START).unwrap();
        assert_eq!(parser.feed(250), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x01, &payload), Err(FrameError::PayloadTooLarge));
    }

    proptest! {
        #[test]
        fn prop_parser_recovers_any_frame(
            msg_type in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let bytes = frame.encode_to_vec().unwrap();
            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&bytes).unwrap(), Some(frame));
        }
    }
}
