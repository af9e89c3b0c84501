pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "finhabit_core=info";

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber on stderr. `RUST_LOG` replaces the
/// crate default when set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
