//! Colored `[LEVEL][module] message` lines on stderr. Stdout is left alone
//! so tools built on the crate can print machine-readable output there.

use std::io::Write;

use env_logger::{Builder, Env};
use log::{Level, Record};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub use log::{debug, error, info, trace, warn};

/// Filter directives, same syntax as `RUST_LOG`
pub const LOG_ENV: &str = "DIALKIT_LOG";

/// `always`, `never` or `auto` (the default)
pub const LOG_STYLE_ENV: &str = "DIALKIT_LOG_STYLE";

pub const DEFAULT_FILTER: &str = "dialkit=info";

/// Installs the logger with [`DEFAULT_FILTER`] unless [`LOG_ENV`] says
/// otherwise. Later calls are no-ops.
pub fn init_logger() {
    init_logger_with_filter(DEFAULT_FILTER);
}

pub fn init_logger_with_filter(default_filter: &str) {
    let env = Env::new().filter_or(LOG_ENV, default_filter);
    let choice = color_choice(std::env::var(LOG_STYLE_ENV).ok().as_deref());
    let mut builder = Builder::from_env(env);

    builder.format(move |_buf, record| {
        let writer = BufferWriter::stderr(choice);
        let mut buffer = writer.buffer();
        write_record(&mut buffer, record)?;
        writer.print(&buffer)
    });

    let _ = builder.try_init();
}

fn write_record(
    out: &mut impl WriteColor,
    record: &Record,
) -> std::io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(level_color(record.level())));
    out.set_color(&spec)?;
    write!(
        out,
        "[{}][{}]",
        record.level(),
        short_target(record.module_path().unwrap_or(record.target()))
    )?;
    out.reset()?;
    writeln!(out, " {}", record.args())
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

/// Drops the crate prefix: `dialkit::control::dial_store` prints as
/// `control::dial_store`
fn short_target(module_path: &str) -> &str {
    module_path
        .strip_prefix("dialkit::")
        .unwrap_or(module_path)
}

fn color_choice(style: Option<&str>) -> ColorChoice {
    match style.map(str::to_ascii_lowercase).as_deref() {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    #[test]
    fn test_short_target() {
        assert_eq!(
            short_target("dialkit::control::dial_store"),
            "control::dial_store"
        );
        assert_eq!(short_target("dialkit_cli"), "dialkit_cli");
    }

    #[test]
    fn test_color_choice() {
        assert_eq!(color_choice(Some("NEVER")), ColorChoice::Never);
        assert_eq!(color_choice(Some("always")), ColorChoice::Always);
        assert_eq!(color_choice(None), ColorChoice::Auto);
    }

    #[test]
    fn test_write_record() {
        let mut out = NoColor::new(Vec::new());
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("saved"))
                .level(Level::Info)
                .module_path(Some("dialkit::control::dial_store"))
                .build(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out.into_inner()).unwrap(),
            "[INFO][control::dial_store] saved\n"
        );
    }
}
