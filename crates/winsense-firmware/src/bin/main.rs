#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::WifiMode;
use log::{error, info};

use winsense_core::{NodeConfig, NodeHardware, SensorReporter};
use winsense_firmware::battery_adc::EspBatteryAdc;
use winsense_firmware::espnow_link::EspNowLink;
use winsense_firmware::settings::{self, BATTERY_VOLTS_PER_BIT};
use winsense_firmware::timing::EmbassyDelay;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // The Wi-Fi driver behind ESP-NOW allocates
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let node_id = settings::node_id().expect("node id is validated by build.rs");
    let gateway = settings::gateway_mac().expect("gateway MAC is validated by build.rs");

    let node_config = NodeConfig {
        node_id,
        volts_per_bit: BATTERY_VOLTS_PER_BIT,
        ..NodeConfig::default()
    };

    let radio_init = esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller");
    let (mut wifi_controller, interfaces) =
        esp_radio::wifi::new(&radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");
    wifi_controller
        .set_mode(WifiMode::Sta)
        .expect("Failed to put Wi-Fi into station mode");
    wifi_controller
        .start()
        .expect("Failed to start Wi-Fi controller");

    let link = EspNowLink::new(
        interfaces.esp_now,
        gateway,
        node_config.node_id,
        node_config.parent_node_id,
    )
    .expect("Failed to register gateway as ESP-NOW peer");

    info!("ESP-NOW link to {:02x?} ready", gateway);

    // Reed contact to ground through the external pull-up: open window reads high
    let window_pin = Input::new(
        peripherals.GPIO4,
        InputConfig::default().with_pull(Pull::None),
    );
    let status_led = Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default());
    let battery_adc = EspBatteryAdc::new(peripherals.ADC1, peripherals.GPIO1);

    let hardware = NodeHardware {
        window_pin,
        battery_adc,
        status_led,
        delay: EmbassyDelay,
    };

    match SensorReporter::new(node_config, hardware, link) {
        Ok(mut reporter) => reporter.run().await,
        Err(e) => error!("Cannot start reporter: {}", e),
    }

    // Only reachable with a bad build-time configuration
    loop {
        embassy_time::Timer::after_secs(60).await;
    }
}
