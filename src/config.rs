use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_QUOTE_ENDPOINT: &str = "https://api.safiertech.com/quote.php";
pub const DEFAULT_CONTACT_PHONE: &str = "8745078808";
/// Upper bound for `QUOTE_TIMEOUT_SECS`; the in-flight guard adds a few
/// seconds on top of it.
pub const MAX_QUOTE_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub quote_endpoint: String,
    pub quote_timeout_secs: u64,
    /// Phone number offered to the user when a submission fails.
    pub contact_phone: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            quote_endpoint: parse_endpoint(
                std::env::var("QUOTE_ENDPOINT")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_QUOTE_ENDPOINT.to_string()),
            )?,
            quote_timeout_secs: parse_timeout(
                &std::env::var("QUOTE_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string()),
            )?,
            contact_phone: std::env::var("CONTACT_PHONE")
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTACT_PHONE.to_string()),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Quote endpoint: {}", config.quote_endpoint);
        tracing::debug!("Quote timeout: {}s", config.quote_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quote_timeout_secs)
    }

    /// Notification shown when a quote request could not be delivered.
    pub fn failure_notice(&self) -> String {
        format!(
            "Submission Failed. Please try again or call us directly at {}.",
            self.contact_phone
        )
    }
}

/// The endpoint must be an absolute http(s) URL.
fn parse_endpoint(raw: String) -> anyhow::Result<String> {
    let url = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("QUOTE_ENDPOINT is not a valid URL: {}", e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("QUOTE_ENDPOINT must start with http:// or https://");
    }
    Ok(url.to_string())
}

fn parse_timeout(raw: &str) -> anyhow::Result<u64> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("QUOTE_TIMEOUT_SECS must be a positive integer"))?;
    if secs == 0 || secs > MAX_QUOTE_TIMEOUT_SECS {
        anyhow::bail!(
            "QUOTE_TIMEOUT_SECS must be between 1 and {}",
            MAX_QUOTE_TIMEOUT_SECS
        );
    }
    Ok(secs)
}
