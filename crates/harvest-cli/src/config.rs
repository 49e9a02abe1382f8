use harvest_db::MongoConfig;

/// Proxy endpoint and control-port settings.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: String,
    pub control_port: String,
    pub control_password: String,
    pub ping_url: String,
}

/// Feed locations and batch sizing for the registered sources.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub alfa_sitemap_url: String,
    pub beta_sitemap_url: String,
    pub batch_size: usize,
}

/// Token service connection details.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub address: String,
    pub issuer: String,
}

/// Vacancy service connection details.
#[derive(Debug, Clone)]
pub struct VacancyServerConfig {
    pub address: String,
}

/// The full application configuration, loaded from environment variables.
///
/// Missing string values default to empty, integers to 1 and `ENV` to
/// `dev`; components validate what they actually need at wiring time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub proxy: ProxyConfig,
    pub mongo: MongoConfig,
    pub sources: SourcesConfig,
    pub auth: AuthConfig,
    pub vacancy_server: VacancyServerConfig,
    pub env: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            proxy: ProxyConfig {
                host: env_or("PROXY_HOST", ""),
                port: env_or("PROXY_PORT", ""),
                control_port: env_or("PROXY_CONTROL_PORT", ""),
                control_password: env_or("PROXY_CONTROL_PASSWORD", ""),
                ping_url: env_or("PROXY_PING_URL", ""),
            },
            mongo: MongoConfig::from_env(),
            sources: SourcesConfig {
                alfa_sitemap_url: env_or("SOURCE_ALFA_SITEMAP_URL", ""),
                beta_sitemap_url: env_or("SOURCE_BETA_SITEMAP_URL", ""),
                batch_size: env_as_usize("SOURCE_BATCH_SIZE", 1),
            },
            auth: AuthConfig {
                address: env_or("AUTH_SERVER_ADDRESS", ""),
                issuer: env_or("AUTH_ISSUER", ""),
            },
            vacancy_server: VacancyServerConfig {
                address: env_or("VACANCY_SERVER_ADDRESS", ""),
            },
            env: env_or("ENV", "dev"),
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn env_as_usize(key: &str, fallback: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("HARVEST_TEST_UNSET_STRING", "dev"), "dev");

        std::env::set_var("HARVEST_TEST_SET_STRING", "prod");
        assert_eq!(env_or("HARVEST_TEST_SET_STRING", "dev"), "prod");
    }

    #[test]
    fn test_env_as_usize_falls_back_on_garbage() {
        assert_eq!(env_as_usize("HARVEST_TEST_UNSET_INT", 1), 1);

        std::env::set_var("HARVEST_TEST_BAD_INT", "many");
        assert_eq!(env_as_usize("HARVEST_TEST_BAD_INT", 1), 1);

        std::env::set_var("HARVEST_TEST_GOOD_INT", "25");
        assert_eq!(env_as_usize("HARVEST_TEST_GOOD_INT", 1), 25);
    }
}
