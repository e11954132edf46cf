mod config;
mod header;
mod session;

pub use config::{
    ClientConfig, DEFAULT_HEADER_NAME, DEFAULT_SCHEME, DEFAULT_TOKEN_ENV, default_config_dir,
    load_config_from_dir, load_config_from_file, validate_config, write_default_config,
};
pub use header::authorization_header;
pub use session::{Challenge, TokenAuthenticator, TokenMessage, TokenSession};
