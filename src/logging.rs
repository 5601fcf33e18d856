//! Logger setup for binaries and tests that embed this crate.
//!
//! The crate itself only emits records through the `log` facade:
//!
//! - `debug!` - one line per patched statement or conversion request
//! - `trace!` - every chain mutation and every Phi argument rewrite
//!
//! Nothing is logged at `info!` or above during normal operation, so the default level
//! keeps a host tool quiet.
//!
//! ```bash
//! RUST_LOG=ssachain::ssa=debug ./tool
//! RUST_LOG=ssachain::ir::chain=trace ./tool
//! ```

use std::{io::Write, sync::Once};

use env_logger::{Builder, Env};
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs a logger at `Warn` level.
///
/// Only the first call of any `init*` function has an effect.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Installs a logger at `level`.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        let mut builder = Builder::new();
        builder.filter_level(level);
        install(builder);
    });
}

/// Installs a logger configured from `RUST_LOG`, falling back to `warn`.
pub fn init_from_env() {
    INIT.call_once(|| {
        install(Builder::from_env(Env::default().default_filter_or("warn")));
    });
}

fn install(mut builder: Builder) {
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{:5}] {} - {}",
            record.level(),
            record.module_path().unwrap_or("ssachain"),
            record.args()
        )
    });
    // A logger installed by the host wins.
    let _ = builder.try_init();
}
