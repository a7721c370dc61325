use std::sync::OnceLock;

use verdant_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "verdant-tests",
            emit_stderr: true,
            format: LogFormat::from_name(
                &std::env::var("VERDANT_LOG_FORMAT").unwrap_or_default(),
            ),
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };

        verdant_common::observability::init_logging(config).unwrap_or_default()
    });
}
