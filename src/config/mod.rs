use std::env;

/// Credentials for the vision service, present only when both environment
/// variables are set. A server running without them still answers requests;
/// the caption endpoint reports the misconfiguration per call.
#[derive(Clone, Debug)]
pub struct VisionConfig {
    pub endpoint: String,
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub vision: Option<VisionConfig>,
    pub server_host: String,
    pub server_port: u16,
    pub static_dir: String,
    pub is_dev: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let vision = match (env::var("VISION_ENDPOINT"), env::var("VISION_KEY")) {
            (Ok(endpoint), Ok(key)) if !endpoint.is_empty() && !key.is_empty() => {
                Some(VisionConfig { endpoint, key })
            }
            _ => {
                tracing::warn!("VISION_ENDPOINT or VISION_KEY not set.");
                None
            }
        };

        Config {
            vision,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            is_dev: env::var("APP_ENV").as_deref() != Ok("production"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
