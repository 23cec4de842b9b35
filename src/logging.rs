use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes env_logger once. Safe to call from tests and main alike;
/// later calls are no-ops. `RUST_LOG` overrides the default filter.
pub fn init() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();
    });
}
