//! Networking and TCP command server task.
//!
//! Manages WiFi connection, listens for TCP commands, parses them line by line (a line
//! may span several reads), and forwards them to the motion task for execution.
extern crate alloc;

use alloc::string::String;
use embassy_net::{tcp::TcpSocket, IpListenEndpoint, Stack};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Sender};
use embassy_time::Timer;
use esp_wifi::wifi::{ClientConfiguration, WifiController, WifiDevice, WifiError};
use log::{error, info, warn};

use crate::config::{PORT, POSECMD_CHANNEL_SIZE, RX_BUF_SIZE, TX_BUF_SIZE};
use crate::robot::commands::{CommandReader, PoseCommand};

pub type CommandSender = Sender<'static, CriticalSectionRawMutex, PoseCommand, POSECMD_CHANNEL_SIZE>;

#[embassy_executor::task]
pub async fn runner_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

#[embassy_executor::task]
pub async fn net_task(stack: Stack<'static>, cmd_sender: CommandSender) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut tx_buf = [0u8; TX_BUF_SIZE];

    while !stack.is_link_up() {
        Timer::after_millis(500).await;
    }
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!(
            "TCP server listening at address {}:{}",
            config.address, PORT
        );
    }

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);

        match socket
            .accept(IpListenEndpoint {
                port: PORT,
                addr: None,
            })
            .await
        {
            Ok(_) => {
                info!("Client connected!");
                handle_connection(&mut socket, &cmd_sender).await;
                socket.close();
            }
            Err(e) => {
                error!("Accept failed: {:?}", e);
                Timer::after_millis(500).await; // Backoff delay
                continue;
            }
        }
    }
}

pub async fn handle_connection(socket: &mut TcpSocket<'_>, cmd_sender: &CommandSender) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut reader = CommandReader::<RX_BUF_SIZE>::new();
    loop {
        match socket.read(&mut rx_buf).await {
            Ok(0) => break,
            Ok(n) => {
                let mut input = &rx_buf[..n];
                while let Some(parsed) = reader.next_command(&mut input) {
                    match parsed {
                        Ok(PoseCommand::CloseConnection) => return,
                        Ok(cmd) => cmd_sender.send(cmd).await,
                        Err(e) => warn!("Dropping command line: {e}"),
                    }
                }
            }
            Err(e) => {
                error!("Read error: {:?}", e);
                break;
            }
        }
    }
}

pub async fn configurate_and_start_wifi(
    wifi_controller: &mut WifiController<'_>,
) -> Result<(), WifiError> {
    let ssid = env!("WIFI_SSID");
    let password = env!("WIFI_PASS");
    let config = esp_wifi::wifi::Configuration::Client(ClientConfiguration {
        ssid: String::from(ssid),
        password: String::from(password),
        ..Default::default()
    });

    info!("Connecting to wifi: {ssid}");
    wifi_controller.set_configuration(&config)?;
    wifi_controller.set_power_saving(esp_wifi::config::PowerSaveMode::None)?;
    wifi_controller.start()?;
    wifi_controller
        .connect_async()
        .await
        .inspect_err(|e| error!("An error occured trying to connect to wifi: {e:?}"))?;

    if let Ok(rssi) = wifi_controller.rssi() {
        info!("Wifi connected! signal: {}", rssi)
    }
    Ok(())
}
