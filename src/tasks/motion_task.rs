//! Pose motion task.
//!
//! Owns the [`Controller`] on the servo UART. Reads the pose the servos hold at boot, then
//! executes every [`PoseCommand`] the network task forwards.
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Receiver};
use esp_hal::{uart::Uart, Async};
use log::{error, info, warn};

use crate::bus::serial::SerialBus;
use crate::config::{ControllerConfig, DEFAULT_IDS, POSECMD_CHANNEL_SIZE};
use crate::motion::clock::EmbassyClock;
use crate::robot::commands::{execute, PoseCommand};
use crate::robot::controller::Controller;

#[embassy_executor::task]
pub async fn motion_task(
    uart: Uart<'static, Async>,
    cmd_receiver: Receiver<'static, CriticalSectionRawMutex, PoseCommand, POSECMD_CHANNEL_SIZE>,
) {
    let bus = SerialBus::new(uart);
    let mut controller =
        match Controller::new(bus, EmbassyClock, &DEFAULT_IDS, ControllerConfig::default()) {
            Ok(controller) => controller,
            Err(e) => {
                error!("[MOTION_TASK] {e}");
                return;
            }
        };

    match controller.read_current_pose().await {
        Ok(()) => info!("[MOTION_TASK] start pose {:?}", controller.current_pose()),
        Err(e) => warn!("[MOTION_TASK] start pose unknown, holding center: {e}"),
    }

    loop {
        let cmd = cmd_receiver.receive().await;
        info!("[MOTION_TASK] received {cmd:?}");
        if let Err(e) = execute(&mut controller, &cmd).await {
            error!("[MOTION_TASK] {e}");
            // re-sync with whatever the servos last accepted
            if let Err(e) = controller.read_current_pose().await {
                error!("[MOTION_TASK] pose re-sync failed: {e}");
            }
        }
    }
}
