/// Configuration for the document store connection.
#[derive(Debug, Clone, Default)]
pub struct MongoConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub pass: String,
    pub database: String,
    pub urls_collection: String,
    pub vacancy_collection: String,
}

impl MongoConfig {
    /// Read configuration from `MONGO_*` environment variables. Missing
    /// values default to empty strings.
    pub fn from_env() -> Self {
        Self {
            host: env_or("MONGO_HOST"),
            port: env_or("MONGO_PORT"),
            user: env_or("MONGO_USER"),
            pass: env_or("MONGO_PASS"),
            database: env_or("MONGO_DB"),
            urls_collection: env_or("MONGO_URLS_COLLECTION"),
            vacancy_collection: env_or("MONGO_VACANCY_COLLECTION"),
        }
    }

    pub fn connection_uri(&self) -> String {
        if self.user.is_empty() {
            format!("mongodb://{}:{}", self.host, self.port)
        } else {
            format!(
                "mongodb://{}:{}@{}:{}",
                self.user, self.pass, self.host, self.port
            )
        }
    }
}

fn env_or(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}
