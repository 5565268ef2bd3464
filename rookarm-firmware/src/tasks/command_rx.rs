//! Host UART receive task
//!
//! Receives command frames from the host and hands them to the motion task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use rookarm_protocol::{Command, ErrorCode, FrameParser, Outbound, Response};

use crate::channels::{COMMAND_CHANNEL, OUTBOUND_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Command RX task - receives and parses frames from the host
#[embassy_executor::task]
pub async fn command_rx_task(mut rx: BufferedUartRx) {
    info!("Command RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match Command::from_frame(&frame) {
                            Ok(command) => COMMAND_CHANNEL.send(command).await,
                            Err(e) => {
                                warn!("Failed to parse command: {:?}", e);
                                let reply = Outbound::Reply(Response::Error(ErrorCode::Malformed));
                                if OUTBOUND_CHANNEL.try_send(reply).is_err() {
                                    warn!("Outbound channel full, dropping reply");
                                }
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
