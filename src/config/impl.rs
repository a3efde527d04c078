use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::{AppConfig, JwtConfig};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 生产环境 HS256 密钥的最小字节数
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[cfg(test)]
const TEST_JWT_SECRET: &str = "unit-test-signing-key-not-for-deployment";

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 内置默认值，保证没有配置文件时也能启动
            .set_default("app.system_name", "Achievement Portal")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 8)?
            .set_default("server.timeouts.client_request", 5000)?
            .set_default("server.timeouts.client_disconnect", 1000)?
            .set_default("server.timeouts.keep_alive", 75)?
            .set_default("server.limits.max_payload_size", 1_048_576)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.leeway", 30)?
            .set_default("database.url", "memory://")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 30)?
            .set_default("cors.max_age", 3600)?
            .set_default("review.max_requests", 30)?
            .set_default("review.window_secs", 60)?
            .set_default("notifications.channel_capacity", 64)?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("PORTAL")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        // 单元测试没有外部身份服务，使用只存在于测试构建中的密钥
        #[cfg(test)]
        if app_config.jwt.secret.is_empty() {
            app_config.jwt.secret = TEST_JWT_SECRET.to_string();
        }

        app_config.jwt.validate(app_config.is_production())?;

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

impl JwtConfig {
    /// 密钥必须由部署方提供（`JWT_SECRET`），仓库中不保存任何可用密钥
    pub fn validate(&self, production: bool) -> Result<(), ConfigError> {
        let secret = self.secret.trim();
        if secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret is empty, set it through JWT_SECRET".to_string(),
            ));
        }
        if production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {MIN_PRODUCTION_SECRET_LEN} bytes in production"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            leeway: 30,
        }
    }

    #[test]
    fn test_empty_secret_is_rejected_everywhere() {
        assert!(jwt("").validate(false).is_err());
        assert!(jwt("   ").validate(false).is_err());
        assert!(jwt("").validate(true).is_err());
    }

    #[test]
    fn test_production_requires_long_secret() {
        assert!(jwt("short-local-key").validate(false).is_ok());
        assert!(jwt("short-local-key").validate(true).is_err());
        assert!(jwt(&"k".repeat(MIN_PRODUCTION_SECRET_LEN)).validate(true).is_ok());
    }

    #[test]
    fn test_shipped_config_carries_no_secret() {
        let shipped = Config::builder()
            .add_source(File::with_name("config").required(true))
            .build()
            .unwrap();
        assert_eq!(shipped.get_string("jwt.secret").unwrap(), "");
    }
}
