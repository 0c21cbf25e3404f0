//! Service configuration.

use std::path::{Path, PathBuf};

use adyen_hpp_core::{ConfigError, GatewayOptions, NotificationMethod};

/// Paths searched for the Adyen secrets file, in order.
const SECRET_PATHS: [&str; 3] = [
    ".secrets/adyen.json",
    "adyen-hpp/.secrets/adyen.json",
    "../.secrets/adyen.json",
];

/// Service configuration loaded from a secrets file and environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Externally reachable base URL, used to build payer return URLs.
    pub public_url: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Adyen gateway options.
    pub gateway: GatewayOptions,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the secrets file is unreadable or an environment
    /// variable holds an invalid value. Gateway options are only validated
    /// when the gateway is built.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gateway = load_gateway_options(Path::new("."))?;

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            public_url: std::env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            gateway,
        })
    }
}

/// Load gateway options from the first secrets file found under `base`, or
/// the environment.
fn load_gateway_options(base: &Path) -> Result<GatewayOptions, ConfigError> {
    if let Some(path) = find_secrets_file(base) {
        let options = GatewayOptions::from_path(&path)?;
        tracing::info!(path = %path.display(), "Loaded Adyen secrets from file");
        return Ok(options);
    }

    tracing::debug!("Adyen secrets file not found, using environment variables");
    options_from_lookup(|name| std::env::var(name).ok())
}

fn find_secrets_file(base: &Path) -> Option<PathBuf> {
    SECRET_PATHS
        .iter()
        .map(|path| base.join(path))
        .find(|path| path.exists())
}

/// Build gateway options from `ADYEN_*` variables supplied by `lookup`.
///
/// # Errors
///
/// Returns an error if `ADYEN_SANDBOX` is not `true` or `false`, or
/// `ADYEN_NOTIFICATION_METHOD` is not a known method.
pub fn options_from_lookup<F>(lookup: F) -> Result<GatewayOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = GatewayOptions::new();

    if let Some(skin_code) = lookup("ADYEN_SKIN_CODE") {
        options = options.with_skin_code(skin_code);
    }
    if let Some(account) = lookup("ADYEN_MERCHANT_ACCOUNT") {
        options = options.with_merchant_account(account);
    }
    if let Some(key) = lookup("ADYEN_HMAC_KEY") {
        options = options.with_hmac_key(key);
    }
    if let Some(sandbox) = lookup("ADYEN_SANDBOX") {
        let sandbox = sandbox
            .trim()
            .parse::<bool>()
            .map_err(|_| ConfigError::SandboxNotBoolean)?;
        options = options.with_sandbox(sandbox);
    }
    if let Some(method) = lookup("ADYEN_NOTIFICATION_METHOD") {
        let method: NotificationMethod = method.trim().parse()?;
        options.notification_method = Some(method.to_string());
    }
    options.notification_hmac = lookup("ADYEN_NOTIFICATION_HMAC");

    Ok(options)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            public_url: "http://localhost:8080".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            gateway: GatewayOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn options_from_environment() {
        let options = options_from_lookup(lookup(&[
            ("ADYEN_SKIN_CODE", "skin"),
            ("ADYEN_MERCHANT_ACCOUNT", "account"),
            ("ADYEN_HMAC_KEY", "4468"),
            ("ADYEN_SANDBOX", "false"),
            ("ADYEN_NOTIFICATION_METHOD", "hmac"),
            ("ADYEN_NOTIFICATION_HMAC", "00ff"),
        ]))
        .unwrap();

        let config = options.validate().unwrap();
        assert_eq!(config.skin_code, "skin");
        assert!(!config.sandbox);
        assert_eq!(config.notification_method, NotificationMethod::Hmac);
    }

    #[test]
    fn sandbox_must_parse_as_bool() {
        let err = options_from_lookup(lookup(&[("ADYEN_SANDBOX", "yes")])).unwrap_err();
        assert!(matches!(err, ConfigError::SandboxNotBoolean));
    }

    #[test]
    fn unknown_notification_method_fails() {
        let err =
            options_from_lookup(lookup(&[("ADYEN_NOTIFICATION_METHOD", "digest")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNotificationMethod(_)));
    }

    #[test]
    fn secrets_file_is_found_and_parsed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_secrets_file(dir.path()).is_none());

        std::fs::create_dir(dir.path().join(".secrets")).unwrap();
        std::fs::write(
            dir.path().join(".secrets/adyen.json"),
            r#"{"skinCode":"skin","merchantAccount":"account","hmacKey":"00ff","sandbox":true}"#,
        )
        .unwrap();

        let options = load_gateway_options(dir.path()).unwrap();
        assert_eq!(options.skin_code.as_deref(), Some("skin"));
        assert!(options.validate().unwrap().sandbox);
    }

    #[test]
    fn unreadable_secrets_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".secrets")).unwrap();
        std::fs::write(dir.path().join(".secrets/adyen.json"), "not json").unwrap();

        assert!(matches!(
            load_gateway_options(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn empty_environment_fails_validation() {
        let options = options_from_lookup(lookup(&[])).unwrap();
        assert!(matches!(
            options.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
