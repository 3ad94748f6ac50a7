//! `log` sink for the browser console

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: ConsoleLogger = ConsoleLogger;

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            write_console(record.level(), &format_record(record));
        }
    }

    fn flush(&self) {}
}

/// Unknown names fall back to `info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

pub fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

/// Install the console logger. Fails when another logger is already set.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(parse_level(level));
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let line = JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&line),
        Level::Warn => console::warn_1(&line),
        Level::Info => console::info_1(&line),
        Level::Debug | Level::Trace => console::debug_1(&line),
    }
}

/// Off the browser (headless dry runs against `MemoryPage`) warnings and
/// errors go to stderr, everything else to stdout.
#[cfg(not(target_arch = "wasm32"))]
fn write_console(level: Level, line: &str) {
    if writes_to_stderr(level) {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn writes_to_stderr(level: Level) -> bool {
    level <= Level::Warn
}
