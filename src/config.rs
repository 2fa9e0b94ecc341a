/// Placeholder secret used when SECRET_KEY is unset. Refused in production.
pub const DEV_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_url: String,
    pub bind_addr: String,
    /// Allowed browser origin for the chat socket. `None` accepts any origin.
    pub client_url: Option<String>,
    pub mail: MailConfig,
    pub admin_email: String,
    pub admin_password: String,
    pub production: bool,
}

impl Config {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Config, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so parsing is testable without touching the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let production = get("APP_ENV", "development").eq_ignore_ascii_case("production");
        let secret_key = get("SECRET_KEY", DEV_SECRET);
        if production && secret_key == DEV_SECRET {
            return Err("SECRET_KEY is still the development placeholder; set a 64+ byte secret for production".into());
        }

        let mail_port = get("MAIL_PORT", "587");
        let mail = MailConfig {
            server: get("MAIL_SERVER", "smtp.gmail.com"),
            port: mail_port
                .parse()
                .map_err(|_| format!("MAIL_PORT must be a port number, got '{mail_port}'"))?,
            use_tls: get("MAIL_USE_TLS", "true").eq_ignore_ascii_case("true"),
            username: get("MAIL_USERNAME", ""),
            password: get("MAIL_PASSWORD", ""),
        };

        Ok(Config {
            secret_key,
            database_url: get("DATABASE_URL", "postgres://localhost/ngoconnect"),
            bind_addr: get("BIND_ADDR", "127.0.0.1:8080"),
            client_url: lookup("CLIENT_URL")
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            mail,
            admin_email: get("ADMIN_EMAIL", "admin@ngoconnect.local"),
            admin_password: get("ADMIN_PASSWORD", "admin12345"),
            production,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.secret_key, DEV_SECRET);
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.mail.port, 587);
        assert!(cfg.mail.use_tls);
        assert!(cfg.client_url.is_none());
        assert!(!cfg.production);
    }

    #[test]
    fn production_refuses_placeholder_secret() {
        let err = Config::from_lookup(lookup_from(&[("APP_ENV", "production")])).unwrap_err();
        assert!(err.contains("SECRET_KEY"));
    }

    #[test]
    fn client_url_is_normalised() {
        let cfg = Config::from_lookup(lookup_from(&[("CLIENT_URL", " https://app.example.org/ ")])).unwrap();
        assert_eq!(cfg.client_url.as_deref(), Some("https://app.example.org"));
    }

    #[test]
    fn bad_mail_port_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("MAIL_PORT", "smtp")])).unwrap_err();
        assert!(err.contains("MAIL_PORT"));
    }
}
