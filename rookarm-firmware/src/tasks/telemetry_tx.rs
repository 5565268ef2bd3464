//! Host UART transmit task
//!
//! Sends replies, controller telemetry and scanner move reports to the host.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use rookarm_core::command::relay_move_detected;
use rookarm_protocol::{Outbound, MAX_FRAME_SIZE};

use crate::channels::{MOVE_DETECTED, OUTBOUND_CHANNEL};

/// Telemetry TX task - frames outbound messages onto the host UART
#[embassy_executor::task]
pub async fn telemetry_tx_task(mut tx: BufferedUartTx) {
    info!("Telemetry TX task started");

    loop {
        let message = match select(OUTBOUND_CHANNEL.receive(), MOVE_DETECTED.receive()).await {
            Either::First(message) => message,
            Either::Second((from, to)) => match relay_move_detected(&from, &to) {
                Some(event) => Outbound::Event(event),
                None => {
                    warn!("Dropping move report with bad squares");
                    continue;
                }
            },
        };

        send(&mut tx, &message).await;
    }
}

/// Encode one message and write it out
async fn send(tx: &mut BufferedUartTx, message: &Outbound) {
    let frame = match message.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode outbound message: {:?}", e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = tx.write_all(&buf[..len]).await {
                warn!("UART write error: {:?}", e);
            } else {
                trace!("TX: {} bytes", len);
            }
        }
        Err(e) => warn!("Failed to frame outbound message: {:?}", e),
    }
}
