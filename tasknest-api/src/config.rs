/// Configuration management for the API server
///
/// Configuration is layered, later sources overriding earlier ones:
///
/// 1. Built-in defaults
/// 2. A config file: `--config` / `CONFIG`, otherwise the first
///    `config.{toml,yaml,yml,json}` found in `.`, `$XDG_CONFIG_HOME/tasknest`
///    or `/etc/tasknest`
/// 3. Environment variables (a `.env` file is loaded first if present)
/// 4. Command-line flags
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `LISTEN_URL`: Address to bind to (default: 127.0.0.1:3000)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 chars)
/// - `JWT_ACCESS_TTL_SECS`: Access token lifetime (default: 3600)
/// - `JWT_REFRESH_TTL_SECS`: Refresh token lifetime (default: 259200)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use tasknest_api::config::{Args, Config};
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load(&Args::parse())?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use clap::Parser;
use config::File;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tasknest_shared::auth::password::PasswordConfig;
use tasknest_shared::db::pool::DatabaseConfig as PoolConfig;

/// Minimum accepted length of `jwt.secret`
pub const MIN_SECRET_LEN: usize = 32;

const CONFIG_FILE_STEM: &str = "config";
const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "tasknest-api", version, about = "TaskNest TODO API server")]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// PostgreSQL connection URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:3000
    #[arg(long)]
    pub listen_url: Option<String>,

    /// Token signing secret
    #[arg(long)]
    pub secret: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub password: PasswordConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to
    pub listen_url: String,

    /// Adds Strict-Transport-Security when true
    pub production: bool,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Minimum number of idle connections
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    pub acquire_timeout_seconds: u64,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: i64,
}

impl Config {
    /// Loads configuration from every layer, reading the process environment
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::load_with(args, |key| std::env::var(key).ok())
    }

    /// Loads configuration with an explicit environment lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the merged result
    /// fails [`Config::validate`].
    pub fn load_with<F>(args: &Args, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .set_default("api.listen_url", "127.0.0.1:3000")?
            .set_default("api.production", false)?
            .set_default("api.cors_origins", vec!["*"])?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("database.min_connections", 1_i64)?
            .set_default("database.acquire_timeout_seconds", 30_i64)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.access_ttl_secs", 3600_i64)?
            .set_default("jwt.refresh_ttl_secs", 259_200_i64)?;

        let defaults = PasswordConfig::default();
        builder = builder
            .set_default("password.memory_kib", i64::from(defaults.memory_kib))?
            .set_default("password.iterations", i64::from(defaults.iterations))?
            .set_default("password.parallelism", i64::from(defaults.parallelism))?;

        let explicit = args
            .config
            .clone()
            .or_else(|| env("CONFIG").map(PathBuf::from));
        let config_file = match explicit {
            Some(path) => Some(path),
            None => find_config_file(&search_dirs()),
        };
        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "Loading config file");
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder
            .set_override_option("database.url", env("DATABASE_URL"))?
            .set_override_option("database.max_connections", env("DATABASE_MAX_CONNECTIONS"))?
            .set_override_option("api.listen_url", env("LISTEN_URL"))?
            .set_override_option("api.production", env("PRODUCTION"))?
            .set_override_option("jwt.secret", env("JWT_SECRET"))?
            .set_override_option("jwt.access_ttl_secs", env("JWT_ACCESS_TTL_SECS"))?
            .set_override_option("jwt.refresh_ttl_secs", env("JWT_REFRESH_TTL_SECS"))?
            .set_override_option(
                "api.cors_origins",
                env("CORS_ORIGINS").map(|origins| split_origins(&origins)),
            )?;

        // Command line wins over everything
        builder = builder
            .set_override_option("database.url", args.database_url.clone())?
            .set_override_option("api.listen_url", args.listen_url.clone())?
            .set_override_option("jwt.secret", args.secret.clone())?;

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects configurations the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url is required (set DATABASE_URL or --database-url)");
        }

        if self.jwt.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("jwt.secret must be at least {} characters long", MIN_SECRET_LEN);
        }

        if self.jwt.access_ttl_secs <= 0 || self.jwt.refresh_ttl_secs <= 0 {
            anyhow::bail!("token lifetimes must be positive");
        }

        if self.jwt.access_ttl_secs >= self.jwt.refresh_ttl_secs {
            anyhow::bail!("jwt.access_ttl_secs must be shorter than jwt.refresh_ttl_secs");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> &str {
        &self.api.listen_url
    }

    /// Pool settings for [`tasknest_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout_seconds: self.database.acquire_timeout_seconds,
            ..Default::default()
        }
    }
}

/// Directories searched for a config file, highest priority first
fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    if let Some(config_dir) = dirs::config_dir() {
        dirs.push(config_dir.join("tasknest"));
    }
    dirs.push(PathBuf::from("/etc/tasknest"));
    dirs
}

/// First `config.<ext>` that exists in `dirs`
fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)))
        })
        .find(|candidate| candidate.is_file())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
