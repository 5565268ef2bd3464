//! Rookarm - Chess Robot Motion Firmware
//!
//! Main firmware binary for the RP2040 board driving the chess robot's
//! gantry: five step/dir drivers, three limit switches and a gripper
//! servo. Commands arrive over UART0 as framed postcard messages.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rookarm_core::config::GripperKind;
use rookarm_core::safety::SwitchId;
use rookarm_core::{MachineParts, RobotConfig, RobotController};
use rookarm_hal_rp2040::RpServo;

use crate::board::{limit_input, stepper_pins, RpBoard};

// postcard is built with `alloc`, which needs a global allocator
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 4KB
const HEAP_SIZE: usize = 4 * 1024;

/// Machine configuration encoded by build.rs from machine.toml
static MACHINE_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/machine.bin"));

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Rookarm firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Host link
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for host communication");

    // Gripper: either the fifth stepper or the servo is fitted
    let (gripper_pins, servo) = match config.gripper.kind {
        GripperKind::Stepper { .. } => (Some(stepper_pins(p.PIN_14, p.PIN_15, p.PIN_16)), None),
        GripperKind::Servo { .. } => {
            let pwm = Pwm::new_output_a(p.PWM_SLICE2, p.PIN_20, RpServo::slice_config());
            (None, Some(RpServo::new(pwm)))
        }
    };

    let parts = MachineParts::<RpBoard> {
        axes: [
            Some(stepper_pins(p.PIN_2, p.PIN_3, p.PIN_4)),
            Some(stepper_pins(p.PIN_5, p.PIN_6, p.PIN_7)),
            Some(stepper_pins(p.PIN_8, p.PIN_9, p.PIN_10)),
            Some(stepper_pins(p.PIN_11, p.PIN_12, p.PIN_13)),
            gripper_pins,
        ],
        switches: [true; 3],
        servo,
        delay: embassy_time::Delay,
    };
    let controller = RobotController::new(config, parts);

    info!("Controller initialized");

    let active_high = config.switches.active_high;
    let debounce_ms = config.switches.isr_debounce_ms;
    let limits = [
        (SwitchId::X, limit_input(p.PIN_17, active_high)),
        (SwitchId::Y, limit_input(p.PIN_18, active_high)),
        (SwitchId::Z, limit_input(p.PIN_19, active_high)),
    ]
    .map(|(switch, input)| tasks::LimitWatch::new(switch, input, active_high, debounce_ms));

    // Spawn tasks
    spawner.spawn(tasks::command_rx_task(rx)).unwrap();
    spawner.spawn(tasks::telemetry_tx_task(tx)).unwrap();
    spawner.spawn(tasks::motion_task(controller, limits)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Decode the embedded machine configuration
///
/// build.rs rejects invalid files, so the fallback only runs if the
/// embedded bytes do not match this build of `rookarm-core`.
fn load_config() -> RobotConfig {
    match RobotConfig::from_postcard(MACHINE_CONFIG) {
        Ok(config) => {
            info!(
                "Loaded machine config: {} steps/square, {} us travel",
                config.board.square_steps, config.speeds.travel_us
            );
            config
        }
        Err(e) => {
            warn!("Embedded machine config unusable ({}), using defaults", e);
            RobotConfig::default()
        }
    }
}
