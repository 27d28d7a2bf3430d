use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrdersConfig {
    /// Reject status updates outside the lifecycle table when set.
    #[serde(default)]
    pub enforce_status_transitions: bool,
}

/// Administrator account ensured at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub email: String,
    pub password: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // No config file means environment variables and defaults only.
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 3000u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    orders: OrdersConfig::default(),
                    admin: None,
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment always wins over the file.
        config.apply_env_overrides();

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        // PORT is what most hosting platforms inject.
        for name in ["PORT", "SERVER_PORT"] {
            if let Ok(v) = env::var(name)
                && let Ok(p) = v.parse()
            {
                self.server.port = p;
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("ENFORCE_STATUS_TRANSITIONS")
            && let Ok(b) = v.parse()
        {
            self.orders.enforce_status_transitions = b;
        }

        let admin_email = env::var("ADMIN_EMAIL").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();
        if let Some(admin) = self.admin.as_mut() {
            if let Some(email) = admin_email {
                admin.email = email;
            }
            if let Some(password) = admin_password {
                admin.password = password;
            }
        } else if let (Some(email), Some(password)) = (admin_email, admin_password) {
            self.admin = Some(AdminConfig {
                name: default_admin_name(),
                email,
                password,
            });
        }
        if let (Some(admin), Ok(name)) = (&mut self.admin, env::var("ADMIN_NAME")) {
            admin.name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s3cret"
            expires_in = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jwt.expires_in, 3600);
        assert!(!config.orders.enforce_status_transitions);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_parse_admin_and_orders_sections() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/shop"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            expires_in = 86400

            [orders]
            enforce_status_transitions = true

            [admin]
            email = "admin@shop.test"
            password = "admin123"
            "#,
        )
        .unwrap();

        assert!(config.orders.enforce_status_transitions);
        let admin = config.admin.unwrap();
        assert_eq!(admin.name, "Administrator");
        assert_eq!(admin.email, "admin@shop.test");
    }
}
