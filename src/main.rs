use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::{prelude::*, text::Text};

use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::spi;

use photopainter::epd::pins::{Pins, SpiSettings, PMIC_I2C_BAUDRATE_HZ};
use photopainter::epd::{Controller, Mono, PaletteIndex, SpiTransport, ED2208_GCA};
use photopainter::graphics::{primitives, Framebuffer, FONT_8X8};
use photopainter::pmic::{Axp2101, AXP2101_I2C_ADDR};

/// Draw the demo frame: a border, a title, a diagonal and a circle
fn draw_demo(fb: &mut Framebuffer) -> anyhow::Result<()> {
    let black = Mono::Black as u8;
    let (w, h) = (i32::from(fb.width()), i32::from(fb.height()));

    fb.fill(Mono::White as u8);
    primitives::rect(fb, 0, 0, w, h, black, false);
    primitives::rect(fb, 4, 4, w - 8, 20, black, true);
    primitives::text(fb, "PhotoPainter", 10, 10, Mono::White as u8, &FONT_8X8);

    primitives::line(fb, 4, 30, w / 2, h - 5, black);
    primitives::circle(fb, w * 3 / 4, h / 2 + 10, 30, black, false);
    primitives::circle(fb, w * 3 / 4, h / 2 + 10, 8, black, true);

    // embedded-graphics renders into the same buffer
    let style = MonoTextStyle::new(&FONT_6X10, PaletteIndex::from(Mono::Black));
    Text::new("ED2208-GCA 250x122", Point::new(10, h - 12), style).draw(fb)?;
    Ok(())
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let mut delay = Delay::default();

    // Panel power comes from the PMIC, bring it up first
    log::info!(
        "Configuring PMIC I2C (SDA GPIO{}, SCL GPIO{})",
        Pins::PMIC_SDA,
        Pins::PMIC_SCL
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        pins.gpio17,
        pins.gpio18,
        &I2cConfig::new().baudrate(PMIC_I2C_BAUDRATE_HZ.Hz().into()),
    )?;
    let mut pmic = Axp2101::new(i2c, AXP2101_I2C_ADDR)?;
    pmic.init(&mut delay)?;
    pmic.clear_irq()?;
    pmic.enable_display_power(&mut delay)?;
    log::info!(
        "Battery present: {}, charging: {}",
        pmic.is_battery_present()?,
        pmic.is_charging()?
    );

    log::info!(
        "Configuring SPI for the panel (SCK GPIO{}, MOSI GPIO{}, MISO GPIO{}, CS GPIO{})",
        Pins::SCK,
        Pins::MOSI,
        Pins::MISO,
        Pins::CS
    );
    let spi = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio12,
        pins.gpio11,
        Some(pins.gpio13),
        Some(pins.gpio10),
        &spi::SpiDriverConfig::new(),
        &spi::SpiConfig::new()
            .baudrate(SpiSettings::BAUDRATE_HZ.Hz().into())
            .data_mode(SpiSettings::MODE),
    )?;

    log::info!(
        "Panel control lines: BUSY GPIO{}, DC GPIO{}, RST GPIO{}",
        Pins::BSY,
        Pins::DC,
        Pins::RST
    );
    let transport = SpiTransport::new(
        spi,
        gpio::PinDriver::input(pins.gpio7)?,
        gpio::PinDriver::output(pins.gpio9)?,
        gpio::PinDriver::output(pins.gpio8)?,
        Delay::default(),
    );

    let mut epd = Controller::new(transport, ED2208_GCA);
    epd.init()?;

    let mut fb = Framebuffer::for_profile(epd.profile());
    draw_demo(&mut fb)?;

    log::info!("Sending {} bytes to the panel", fb.as_bytes().len());
    epd.display(fb.as_bytes())?;

    epd.sleep()?;
    pmic.disable_display_power()?;
    log::info!("Done, panel is asleep");

    let reset_reason = esp_idf_svc::hal::reset::ResetReason::get();
    log::info!("Reset reason: {:?}", reset_reason);

    Ok(())
}
