use chrono::Local;
use std::io::Write;

/// Install the process logger. `verbose` picks the default level
/// (0: warn, 1: info, 2+: debug); `RUST_LOG` overrides it.
pub fn init_logging(verbose: i32) {
    let default_level = match verbose {
        i32::MIN..=0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let time_str = Local::now().format("%x - %I:%M.%S%p");
            writeln!(buf, "{time_str} {:<5} {}", record.level(), record.args())
        })
        .init();
}
