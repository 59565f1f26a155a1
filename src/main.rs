#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

extern crate alloc;

use alloc::boxed::Box;
use ax_controller::config::{BAUD_RATE, POSECMD_CHANNEL_SIZE};
use ax_controller::robot::commands::PoseCommand;
use ax_controller::tasks::motion_task::motion_task;
use ax_controller::tasks::net_task::{configurate_and_start_wifi, net_task, runner_task};
use core::future::pending;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use log::{error, info};

esp_bootloader_esp_idf::esp_app_desc!();

// SERVO BUS: UART1, TX GPIO17 / RX GPIO16 through a half-duplex buffer

static POSE_COMMANDS: Channel<CriticalSectionRawMutex, PoseCommand, POSECMD_CHANNEL_SIZE> =
    Channel::new();

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.init_with(|| $val)
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 32 * 1024);
    esp_alloc::heap_allocator!(#[unsafe(link_section = ".dram2_uninit")] size: 96 * 1024);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);
    info!("Embassy initialized");

    let uart = Uart::new(p.UART1, UartConfig::default().with_baudrate(BAUD_RATE))
        .expect("Failed to initialize servo UART")
        .with_tx(p.GPIO17)
        .with_rx(p.GPIO16)
        .into_async();

    info!("Starting pose controller...");
    spawner
        .spawn(motion_task(uart, POSE_COMMANDS.receiver()))
        .expect("Fail spawning motion task");

    // take important peripherals
    let mut rng = esp_hal::rng::Rng::new(p.RNG);
    let timer1 = TimerGroup::new(p.TIMG0);
    let wifi_init = esp_wifi::init(timer1.timer0, rng, p.RADIO_CLK)
        .expect("Failed to initialize WIFI controller");
    let wifi_init = Box::leak(Box::new(wifi_init));
    let (mut wifi_controller, interfaces) =
        esp_wifi::wifi::new(wifi_init, p.WIFI).expect("Failed to initialize WIFI controller");

    if let Err(e) = configurate_and_start_wifi(&mut wifi_controller).await {
        error!("Wifi unavailable, running without command server: {e:?}");
        loop {
            pending::<()>().await;
        }
    }

    //Get the embassy net stack up and working.
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let net_config = NetConfig::dhcpv4(Default::default());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        mk_static!(StackResources<3>, StackResources::new()),
        seed,
    );

    spawner
        .spawn(runner_task(runner))
        .expect("Fail spawning runner task");
    spawner
        .spawn(net_task(stack, POSE_COMMANDS.sender()))
        .expect("Fail spawning net task");

    loop {
        pending::<()>().await;
    }
}
