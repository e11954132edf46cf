use crate::ClientConfig;

/// Build the header that carries `token`, e.g. `("Authorization", "Bearer <token>")`.
pub fn authorization_header(config: &ClientConfig, token: &str) -> (String, String) {
    let value = if config.scheme.is_empty() {
        token.to_string()
    } else {
        format!("{} {token}", config.scheme)
    };
    (config.header_name.clone(), value)
}
