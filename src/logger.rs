//! Logger that prints messages like `[WARN] Lorem ipsum` to stderr.

use atty;
use log::{self, Log, Level, Metadata, Record};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

struct Logger {
    level: Level,
    color_choice: ColorChoice,
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        _ => Color::Green,
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = StandardStream::stderr(self.color_choice);
        let _ = stderr.set_color(
            ColorSpec::new().set_fg(Some(level_color(record.level()))),
        );
        let _ = writeln!(&mut stderr, "[{}] {}", record.level(), record.args());
        let _ = stderr.reset();
    }

    fn flush(&self) { }
}

pub fn init(level: Level) {
    let color_choice = match atty::is(atty::Stream::Stderr) {
        true => ColorChoice::Auto,
        false => ColorChoice::Never,
    };
    let logger = Logger { level, color_choice };
    let _ = log::set_boxed_logger(Box::new(logger));
    log::set_max_level(level.to_level_filter());
}
