mod loader;

pub use loader::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, get_default_config,
    load_configuration, write_config_to,
};
