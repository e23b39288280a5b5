use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub registration: RegistrationMode,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("QUIZARENA_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid QUIZARENA_HOST: {e}"))?;

        let port: u16 = env_or("QUIZARENA_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid QUIZARENA_PORT: {e}"))?;

        let base_url = env_or("QUIZARENA_BASE_URL", &format!("http://{host}:{port}"));

        let registration = match env_or("QUIZARENA_REGISTRATION", "open").as_str() {
            "closed" => RegistrationMode::Closed,
            _ => RegistrationMode::Open,
        };

        let log_level = env_or("QUIZARENA_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("QUIZARENA_SMTP_HOST").ok(),
            std::env::var("QUIZARENA_SMTP_PORT").ok(),
            std::env::var("QUIZARENA_SMTP_USER").ok(),
            std::env::var("QUIZARENA_SMTP_PASS").ok(),
            std::env::var("QUIZARENA_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid QUIZARENA_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            registration,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
