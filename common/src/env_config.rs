use std::{env, sync::Arc, time::Duration};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to start the subscriptions service: database
/// connection details, server host and port, number of worker threads,
/// CORS settings and logging preferences.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub db_max_connections: u32,
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
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// File the logger mirrors console output into.
    pub log_file: String,
    /// Connection timeouts applied to the HTTP server.
    pub timeouts: ServerTimeouts,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// HTTP server connection timeouts.
pub struct ServerTimeouts {
    /// Time a client has to send the request head.
    pub request: Duration,
    /// Idle time before a keep-alive connection is closed.
    pub keep_alive: Duration,
    /// Time a client has to acknowledge a connection shutdown.
    pub disconnect: Duration,
}

impl Default for ServerTimeouts {
    fn default() -> Self {
        ServerTimeouts {
            request: Duration::from_secs(5),
            keep_alive: Duration::from_secs(60),
            disconnect: Duration::from_secs(15),
        }
    }
}

impl ServerTimeouts {
    pub fn from_env() -> Self {
        let defaults = ServerTimeouts::default();
        ServerTimeouts {
            request: parse_secs(env::var("REQUEST_TIMEOUT_SECS").ok(), defaults.request),
            keep_alive: parse_secs(env::var("KEEP_ALIVE_SECS").ok(), defaults.keep_alive),
            disconnect: parse_secs(env::var("DISCONNECT_TIMEOUT_SECS").ok(), defaults.disconnect),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Discrete Postgres connection settings, used when `DATABASE_URL` is not set.
pub struct DbParts {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DbParts {
    pub fn from_env() -> Self {
        DbParts {
            host: env_or("DB_HOST", "postgres"),
            port: env_or("DB_PORT", "5432"),
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", "postgres"),
            name: env_or("DB_NAME", "subscriptions"),
        }
    }

    pub fn to_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// A `.env` file is loaded first when present. Every value has a default,
    /// so the service starts against a local docker-compose Postgres with no
    /// environment at all.
    ///
    /// # Environment Variables
    ///
    /// - `ENVIRONMENT`: `development` (default) or `production`
    /// - `DATABASE_URL`: full connection string; when unset it is built from
    ///   `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`
    /// - `DB_MAX_CONNECTIONS`: pool size (default: 10)
    /// - `IP`: Server host (default: "0.0.0.0")
    /// - `PORT` or `SERVER_PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_LEVEL`: default "info"
    /// - `LOG_FILE`: default "subscriptions.log"
    /// - `REQUEST_TIMEOUT_SECS`, `KEEP_ALIVE_SECS`, `DISCONNECT_TIMEOUT_SECS`:
    ///   server timeouts in seconds (defaults: 5, 60, 15)
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DbParts::from_env().to_url());
        let server_port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(8080);

        Arc::new(Config {
            environment: env_or("ENVIRONMENT", "development"),
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", "10").parse().unwrap_or(10),
            server_host: env_or("IP", "0.0.0.0"),
            server_port,
            num_workers: env_or("WORKERS", "4").parse().unwrap_or(4),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            console_logging_enabled: parse_flag(&env_or("ENABLE_CONSOLE_LOGGING", "true")),
            log_level: env_or("LOG_LEVEL", "info"),
            log_file: env_or("LOG_FILE", "subscriptions.log"),
            timeouts: ServerTimeouts::from_env(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> bool {
    value.trim().to_lowercase() == "true"
}

// zero or unparsable values fall back to the default
fn parse_secs(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_postgres_url_from_parts() {
        let parts = DbParts {
            host: "db".into(),
            port: "5433".into(),
            user: "svc".into(),
            password: "secret".into(),
            name: "subs".into(),
        };
        assert_eq!(parts.to_url(), "postgresql://svc:secret@db:5433/subs");
    }

    #[test]
    fn console_flag_is_case_insensitive() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" true "));
        assert!(!parse_flag("1"));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn timeouts_fall_back_to_defaults() {
        let defaults = ServerTimeouts::default();
        assert_eq!(defaults.request, Duration::from_secs(5));
        assert_eq!(defaults.keep_alive, Duration::from_secs(60));
        assert_eq!(defaults.disconnect, Duration::from_secs(15));

        let fallback = Duration::from_secs(7);
        assert_eq!(parse_secs(None, fallback), fallback);
        assert_eq!(parse_secs(Some("abc".into()), fallback), fallback);
        assert_eq!(parse_secs(Some("0".into()), fallback), fallback);
        assert_eq!(parse_secs(Some(" 30 ".into()), fallback), Duration::from_secs(30));
    }
}
