use env_logger::{Builder, Env};
use std::io::Write;

/// Initialise the global logger. `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    let env = Env::default().default_filter_or("info");

    let _ = Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
