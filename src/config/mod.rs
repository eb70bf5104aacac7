use std::env;
use std::fmt;
use std::time::Duration;

use rocket::figment::{Figment, providers::{Env, Format, Toml}};
use rocket::Config as RocketConfig;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_PRODUCTION_API: &str = "https://djserver-production-ffe37b1b53b5.herokuapp.com/";
const DEFAULT_STAGING_API: &str = "https://nrityaserver-2b241e0a97e5.herokuapp.com/";
const DEFAULT_LOCAL_API: &str = "http://localhost:8000/";
const DEFAULT_PRODUCTION_WEBAPP: &str = "https://www.nritya.co.in/";
const DEFAULT_STAGING_WEBAPP: &str = "https://nritya-webapp-ssr-1-b3a1c0b4b8f2.herokuapp.com/";

pub struct Config;

impl Config {
    fn figment() -> Figment {
        // Get the current profile
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_").split("_"))
    }

    fn string_or(key: &str, default: &str) -> String {
        Self::figment()
            .extract_inner(key)
            .unwrap_or_else(|_| default.to_string())
    }

    pub fn jwt_secret() -> String {
        Self::string_or("jwt_secret", "default-secret")
    }

    pub fn mongodb_uri() -> String {
        Self::string_or("mongodb_uri", "mongodb://localhost:27017")
    }

    pub fn mongodb_database() -> String {
        Self::string_or("mongodb_database", "nritya")
    }

    pub fn kyc_submit_timeout() -> Duration {
        let secs: u64 = Self::figment()
            .extract_inner("kyc_submit_timeout_secs")
            .unwrap_or(60);
        Duration::from_secs(secs)
    }

    pub fn http_timeout() -> Duration {
        let secs: u64 = Self::figment()
            .extract_inner("http_timeout_secs")
            .unwrap_or(30);
        Duration::from_secs(secs)
    }

    pub fn api_url(environment: Environment) -> String {
        match environment {
            Environment::Production => Self::string_or("production_api_url", DEFAULT_PRODUCTION_API),
            Environment::Staging => Self::string_or("staging_api_url", DEFAULT_STAGING_API),
            Environment::Local => Self::string_or("local_api_url", DEFAULT_LOCAL_API),
        }
    }

    /// The public web app has no local deployment; local falls back to staging.
    pub fn webapp_url(environment: Environment) -> String {
        match environment {
            Environment::Production => {
                Self::string_or("production_webapp_url", DEFAULT_PRODUCTION_WEBAPP)
            }
            Environment::Staging | Environment::Local => {
                Self::string_or("staging_webapp_url", DEFAULT_STAGING_WEBAPP)
            }
        }
    }
}

/// Backend deployment a screen targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema, FromFormField,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[field(value = "production")]
    Production,
    #[default]
    #[field(value = "staging")]
    Staging,
    #[field(value = "local")]
    Local,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Local => "local",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URLs for every environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Endpoints {
    production: Url,
    staging: Url,
    local: Url,
    production_webapp: Url,
    staging_webapp: Url,
}

impl Endpoints {
    pub fn load() -> Result<Self, url::ParseError> {
        Ok(Endpoints {
            production: parse_base(&Config::api_url(Environment::Production))?,
            staging: parse_base(&Config::api_url(Environment::Staging))?,
            local: parse_base(&Config::api_url(Environment::Local))?,
            production_webapp: parse_base(&Config::webapp_url(Environment::Production))?,
            staging_webapp: parse_base(&Config::webapp_url(Environment::Staging))?,
        })
    }

    pub fn new(production: &str, staging: &str, local: &str, webapp: &str) -> Result<Self, url::ParseError> {
        Ok(Endpoints {
            production: parse_base(production)?,
            staging: parse_base(staging)?,
            local: parse_base(local)?,
            production_webapp: parse_base(webapp)?,
            staging_webapp: parse_base(webapp)?,
        })
    }

    pub fn api_base(&self, environment: Environment) -> &Url {
        match environment {
            Environment::Production => &self.production,
            Environment::Staging => &self.staging,
            Environment::Local => &self.local,
        }
    }

    pub fn webapp_base(&self, environment: Environment) -> &Url {
        match environment {
            Environment::Production => &self.production_webapp,
            Environment::Staging | Environment::Local => &self.staging_webapp,
        }
    }

    /// Appends escaped path segments to the environment's API base.
    /// An empty trailing segment yields a trailing slash.
    pub fn api_url(&self, environment: Environment, segments: &[&str]) -> Url {
        join_segments(self.api_base(environment), segments)
    }

    pub fn webapp_url(&self, environment: Environment, segments: &[&str]) -> Url {
        join_segments(self.webapp_base(environment), segments)
    }
}

fn parse_base(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
