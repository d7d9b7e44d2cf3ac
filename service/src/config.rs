use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default identity provider path segment used by the platform login redirect.
pub const DEFAULT_IDENTITY_PROVIDER: &str = "aad";

/// Upper bound for the idle durations: one week.
const MAX_IDLE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

/// Where the caller's principal is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrincipalSource {
    /// Only the platform-injected `x-ms-client-principal` header.
    Header,
    /// Only the platform identity endpoint, queried with forwarded cookies.
    Endpoint,
    /// The header when present, else the identity endpoint when the request carries credentials.
    Auto,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PrincipalSourceParseError;

impl FromStr for PrincipalSource {
    type Err = PrincipalSourceParseError;
    fn from_str(source: &str) -> Result<PrincipalSource, Self::Err> {
        match source.to_lowercase().as_str() {
            "header" => Ok(PrincipalSource::Header),
            "endpoint" => Ok(PrincipalSource::Endpoint),
            "auto" => Ok(PrincipalSource::Auto),
            _ => Err(PrincipalSourceParseError),
        }
    }
}

impl fmt::Display for PrincipalSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrincipalSource::Header => write!(f, "header"),
            PrincipalSource::Endpoint => write!(f, "endpoint"),
            PrincipalSource::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Where to read the caller's principal from: the injected header, the identity endpoint, or both.
    #[arg(
        long,
        env,
        default_value_t = PrincipalSource::Auto,
        value_parser = clap::builder::PossibleValuesParser::new([
            "HEADER", "ENDPOINT", "AUTO",
            "header", "endpoint", "auto"
        ])
            .map(|s| s.parse::<PrincipalSource>().unwrap()),
    )]
    pub principal_source: PrincipalSource,

    /// Full URL of the platform identity endpoint. Takes precedence over `public_origin`.
    #[arg(long, env)]
    identity_endpoint_url: Option<String>,

    /// Public origin of this site, e.g. `https://portal.example.com`. When set and no
    /// identity endpoint URL is given, `/.auth/me` on this origin is queried.
    #[arg(long, env)]
    public_origin: Option<String>,

    /// Identity provider reported when neither the platform nor the principal names one.
    #[arg(long, env, default_value = DEFAULT_IDENTITY_PROVIDER)]
    default_identity_provider: String,

    /// Timeout in seconds for identity endpoint calls. 0 leaves calls unbounded.
    #[arg(long, env, default_value_t = 0)]
    pub identity_request_timeout_secs: u64,

    /// Where `/signin` and `/create-account` redirect to.
    #[arg(long, env, default_value = "/.auth/login/aad")]
    login_url: String,

    /// Where `/signout` redirects to.
    #[arg(long, env, default_value = "/.auth/logout")]
    logout_url: String,

    /// Seconds of inactivity before the idle session warning is shown.
    #[arg(long, env, default_value_t = 28 * 60, value_parser = clap::value_parser!(u64).range(1..=MAX_IDLE_SECS))]
    pub idle_warning_secs: u64,

    /// Seconds of inactivity before the session is forcibly signed out.
    #[arg(long, env, default_value_t = 30 * 60, value_parser = clap::value_parser!(u64).range(1..=MAX_IDLE_SECS))]
    pub idle_logout_secs: u64,

    /// Length in seconds of the visible countdown once the warning is shown.
    #[arg(long, env, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub idle_countdown_secs: u32,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Builds a config from defaults and environment only, ignoring process arguments.
    pub fn from_env() -> Self {
        dotenv().ok();
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }

    pub fn set_identity_endpoint_url(mut self, url: String) -> Self {
        self.identity_endpoint_url = Some(url);
        self
    }

    pub fn set_public_origin(mut self, origin: String) -> Self {
        self.public_origin = Some(origin);
        self
    }

    pub fn set_principal_source(mut self, source: PrincipalSource) -> Self {
        self.principal_source = source;
        self
    }

    pub fn identity_endpoint_url(&self) -> Option<&str> {
        self.identity_endpoint_url.as_deref()
    }

    pub fn public_origin(&self) -> Option<&str> {
        self.public_origin.as_deref()
    }

    pub fn default_identity_provider(&self) -> &str {
        &self.default_identity_provider
    }

    pub fn identity_request_timeout(&self) -> Option<Duration> {
        (self.identity_request_timeout_secs > 0)
            .then(|| Duration::from_secs(self.identity_request_timeout_secs))
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }

    pub fn idle_warning_after(&self) -> Duration {
        Duration::from_secs(self.idle_warning_secs)
    }

    pub fn idle_logout_after(&self) -> Duration {
        Duration::from_secs(self.idle_logout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
