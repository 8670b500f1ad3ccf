//! Build script for stripsense-firmware
//!
//! - Sets up linker search paths and scripts
//! - Validates device.toml at compile time
//! - Generates `device_config.rs` (constants and pin macros) from it

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest GPIO number on the RP2040
const MAX_GPIO: i64 = 29;

/// Largest vendor request payload the control buffer is sized for
const MAX_PAYLOAD_BYTES: i64 = 4096;

fn main() {
    setup_linker();

    println!("cargo:rerun-if-changed=device.toml");
    let device = validate_config(Path::new("device.toml"));
    generate_config(&device);
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated device description
struct Device {
    vendor_id: u16,
    product_id: u16,
    manufacturer: String,
    product: String,
    serial_number: String,
    columns: u16,
    rows: u16,
    led_pin: u8,
    bit_rate_hz: u32,
    sda_pin: u8,
    scl_pin: u8,
    i2c_block: u8,
    frequency_hz: u32,
    addresses: Vec<u8>,
}

/// Report every error at once and stop the build
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Collects field errors while reading the config
struct Fields<'a> {
    config: &'a toml::Value,
    errors: Vec<String>,
}

impl<'a> Fields<'a> {
    fn lookup(&self, section: &str, key: &str) -> Option<&'a toml::Value> {
        self.config.get(section).and_then(|s| s.get(key))
    }

    fn integer(&mut self, section: &str, key: &str, min: i64, max: i64) -> i64 {
        match self.lookup(section, key) {
            Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
            Some(toml::Value::Integer(_)) => {
                self.errors
                    .push(format!("[{}] {} must be {}-{}", section, key, min, max));
                min
            }
            Some(_) => {
                self.errors
                    .push(format!("[{}] {} must be an integer", section, key));
                min
            }
            None => {
                self.errors.push(format!("[{}] missing '{}'", section, key));
                min
            }
        }
    }

    fn string(&mut self, section: &str, key: &str) -> String {
        match self.lookup(section, key) {
            Some(toml::Value::String(s)) if !s.is_empty() && s.len() <= 126 => s.clone(),
            Some(toml::Value::String(_)) => {
                self.errors
                    .push(format!("[{}] {} must be 1-126 characters", section, key));
                String::new()
            }
            Some(_) => {
                self.errors
                    .push(format!("[{}] {} must be a string", section, key));
                String::new()
            }
            None => {
                self.errors.push(format!("[{}] missing '{}'", section, key));
                String::new()
            }
        }
    }
}

/// Parse device.toml and check every field
fn validate_config(path: &Path) -> Device {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in device.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut fields = Fields {
        config: &config,
        errors: Vec::new(),
    };

    for section in ["usb", "led", "sensors"] {
        if !matches!(config.get(section), Some(toml::Value::Table(_))) {
            fields
                .errors
                .push(format!("Missing [{}] section", section));
        }
    }
    if !fields.errors.is_empty() {
        fail("Missing required sections in device.toml", &fields.errors);
    }

    let vendor_id = fields.integer("usb", "vendor_id", 0, 0xFFFF) as u16;
    let product_id = fields.integer("usb", "product_id", 0, 0xFFFF) as u16;
    let manufacturer = fields.string("usb", "manufacturer");
    let product = fields.string("usb", "product");
    let serial_number = fields.string("usb", "serial_number");

    let columns = fields.integer("led", "columns", 1, 0xFFFF) as u16;
    let rows = fields.integer("led", "rows", 1, 0xFFFF) as u16;
    let led_pin = fields.integer("led", "pin", 0, MAX_GPIO) as u8;
    let bit_rate_hz = fields.integer("led", "bit_rate_hz", 100_000, 1_000_000) as u32;

    let sda_pin = fields.integer("sensors", "sda_pin", 0, MAX_GPIO) as u8;
    let scl_pin = fields.integer("sensors", "scl_pin", 0, MAX_GPIO) as u8;
    let frequency_hz = fields.integer("sensors", "frequency_hz", 10_000, 1_000_000) as u32;

    let mut errors = fields.errors;

    if columns as i64 * rows as i64 * 3 > MAX_PAYLOAD_BYTES {
        errors.push(format!(
            "[led] {}x{} pixels exceed the {}-byte control transfer",
            columns, rows, MAX_PAYLOAD_BYTES
        ));
    }

    // RP2040 I2C function map: GPIO n is SDA when n % 4 is 0 (I2C0) or 2
    // (I2C1), SCL when it is 1 (I2C0) or 3 (I2C1)
    let i2c_block = (sda_pin % 4) / 2;
    if sda_pin % 2 != 0 {
        errors.push(format!("[sensors] GPIO{} has no I2C SDA function", sda_pin));
    }
    if scl_pin % 2 != 1 {
        errors.push(format!("[sensors] GPIO{} has no I2C SCL function", scl_pin));
    }
    if (scl_pin % 4) / 2 != i2c_block {
        errors.push(format!(
            "[sensors] GPIO{} and GPIO{} belong to different I2C blocks",
            sda_pin, scl_pin
        ));
    }
    if led_pin == sda_pin || led_pin == scl_pin {
        errors.push(format!("[led] GPIO{} is already used by the sensor bus", led_pin));
    }

    let addresses = match config.get("sensors").and_then(|s| s.get("addresses")) {
        Some(toml::Value::Array(list)) => validate_addresses(list, &mut errors),
        Some(_) => {
            errors.push("[sensors] addresses must be an array".to_string());
            Vec::new()
        }
        None => {
            errors.push("[sensors] missing 'addresses'".to_string());
            Vec::new()
        }
    };

    if !errors.is_empty() {
        fail("Invalid device configuration", &errors);
    }

    println!("cargo:warning=device.toml validated successfully");

    Device {
        vendor_id,
        product_id,
        manufacturer,
        product,
        serial_number,
        columns,
        rows,
        led_pin,
        bit_rate_hz,
        sda_pin,
        scl_pin,
        i2c_block,
        frequency_hz,
        addresses,
    }
}

/// Sensor addresses: 7-bit, outside the reserved ranges, unique
fn validate_addresses(list: &[toml::Value], errors: &mut Vec<String>) -> Vec<u8> {
    if list.is_empty() {
        errors.push("[sensors] at least one sensor address is required".to_string());
    }
    if list.len() > 16 {
        errors.push("[sensors] at most 16 sensors are supported".to_string());
    }

    let mut addresses = Vec::new();
    for (i, value) in list.iter().enumerate() {
        match value {
            toml::Value::Integer(a) if (0x08..=0x77).contains(a) => {
                let a = *a as u8;
                if addresses.contains(&a) {
                    errors.push(format!("[sensors] address 0x{:02X} listed twice", a));
                }
                addresses.push(a);
            }
            toml::Value::Integer(a) => {
                errors.push(format!(
                    "[sensors] address {} (0x{:X}) is not a usable 7-bit address",
                    i, a
                ));
            }
            _ => errors.push(format!("[sensors] address {} must be an integer", i)),
        }
    }
    addresses
}

/// Write `device_config.rs` into OUT_DIR
fn generate_config(device: &Device) {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "// Generated by build.rs from device.toml. Do not edit.");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub const USB_VID: u16 = 0x{:04X};", device.vendor_id);
    let _ = writeln!(out, "pub const USB_PID: u16 = 0x{:04X};", device.product_id);
    let _ = writeln!(out, "pub const USB_MANUFACTURER: &str = {:?};", device.manufacturer);
    let _ = writeln!(out, "pub const USB_PRODUCT: &str = {:?};", device.product);
    let _ = writeln!(out, "pub const USB_SERIAL_NUMBER: &str = {:?};", device.serial_number);
    let _ = writeln!(out);
    let _ = writeln!(out, "pub const LED_COLUMNS: u16 = {};", device.columns);
    let _ = writeln!(out, "pub const LED_ROWS: u16 = {};", device.rows);
    let _ = writeln!(
        out,
        "pub const PIXEL_COUNT: usize = {};",
        device.columns as usize * device.rows as usize
    );
    let _ = writeln!(out, "pub const LED_BIT_RATE_HZ: u32 = {};", device.bit_rate_hz);
    let _ = writeln!(out);
    let _ = writeln!(out, "pub const I2C_FREQUENCY_HZ: u32 = {};", device.frequency_hz);
    let _ = writeln!(out, "pub const SENSOR_COUNT: usize = {};", device.addresses.len());
    let _ = writeln!(
        out,
        "pub const SENSOR_ADDRESSES: [u8; SENSOR_COUNT] = [{}];",
        device
            .addresses
            .iter()
            .map(|a| format!("0x{:02X}", a))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "pub type SensorI2c = embassy_rp::peripherals::I2C{};",
        device.i2c_block
    );
    let _ = writeln!(out);

    for (name, peripheral) in [
        ("led_pin", format!("PIN_{}", device.led_pin)),
        ("sda_pin", format!("PIN_{}", device.sda_pin)),
        ("scl_pin", format!("PIN_{}", device.scl_pin)),
        ("sensor_i2c", format!("I2C{}", device.i2c_block)),
    ] {
        let _ = writeln!(out, "macro_rules! {} {{", name);
        let _ = writeln!(out, "    ($p:ident) => {{");
        let _ = writeln!(out, "        $p.{}", peripheral);
        let _ = writeln!(out, "    }};");
        let _ = writeln!(out, "}}");
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.rs"), out).unwrap();
}
