use std::{env, sync::Arc, time::Duration};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server.
/// It includes server host and port, number of worker threads, CORS settings,
/// logging preferences, Shopify app credentials and the shared billing settings
/// every plan charge is built from.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to next to stdout.
    pub log_file: String,
    /// Shopify app credentials and Admin API settings.
    pub shopify: ShopifyConfig,
    /// Base billing settings merged into every plan charge.
    pub billing: BillingSettings,
}

#[derive(Clone, Debug)]
/// `ShopifyConfig` holds what the app needs to talk to Shopify on behalf of a shop.
///
/// The API key and secret identify the app; the secret also signs the
/// session tokens App Bridge sends with every request.
pub struct ShopifyConfig {
    /// The app's client ID.
    pub api_key: String,
    /// The app's client secret.
    pub api_secret: String,
    /// Public host name of this app, used to build billing return URLs.
    pub host_name: String,
    /// Admin API version, e.g. `2024-07`.
    pub api_version: String,
    /// Upper bound for a single Admin API round trip.
    pub request_timeout: Duration,
}

#[derive(Clone, Debug)]
/// Fields shared by every plan charge.
pub struct BillingSettings {
    /// ISO 4217 code charges are created in.
    pub currency_code: String,
    /// Free trial length applied to new subscriptions.
    pub trial_days: u32,
    /// Create test charges, and count test charges as paid.
    pub test: bool,
}

impl ShopifyConfig {
    /// Creates a new `ShopifyConfig` instance from environment variables.
    ///
    /// - `SHOPIFY_API_KEY`, `SHOPIFY_API_SECRET`, `HOST`: required.
    /// - `SHOPIFY_API_VERSION`: optional, defaults to `2024-07`.
    /// - `BILLING_TIMEOUT_SECS`: optional, defaults to 10 seconds.
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        ShopifyConfig {
            api_key: env::var("SHOPIFY_API_KEY").expect("SHOPIFY_API_KEY must be set"),
            api_secret: env::var("SHOPIFY_API_SECRET").expect("SHOPIFY_API_SECRET must be set"),
            host_name: normalize_host(&env::var("HOST").expect("HOST must be set")),
            api_version: env::var("SHOPIFY_API_VERSION")
                .unwrap_or_else(|_| "2024-07".to_string()),
            request_timeout: Duration::from_secs(
                env::var("BILLING_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        }
    }
}

impl BillingSettings {
    /// Reads `BILLING_CURRENCY_CODE` (default `USD`), `BILLING_TRIAL_DAYS` (default 0)
    /// and `BILLING_TEST`. Test charges are on by default everywhere but production.
    pub fn from_env(is_production: bool) -> Self {
        dotenvy::dotenv().ok();

        BillingSettings {
            currency_code: env::var("BILLING_CURRENCY_CODE")
                .unwrap_or_else(|_| "USD".to_string())
                .to_uppercase(),
            trial_days: env::var("BILLING_TRIAL_DAYS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            test: env::var("BILLING_TEST")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(!is_production),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads all configuration values from environment variables with sensible defaults
    /// for most optional settings.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `SHOPIFY_API_KEY`, `SHOPIFY_API_SECRET`, `HOST` (via `ShopifyConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "plans.log")
    /// - Billing settings (see `BillingSettings::from_env()`)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT").expect("ENVIRONMENT must be set");
        let is_production = environment == "production";

        Arc::new(Config {
            environment,
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "plans.log".to_string()),
            shopify: ShopifyConfig::from_env(),
            billing: BillingSettings::from_env(is_production),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Strips scheme and trailing slashes, `HOST` is often pasted as a full URL.
fn normalize_host(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}
