use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::session::SESSION_TTL;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("{name} has an invalid value {value:?}: {reason}")]
	Invalid {
		name: &'static str,
		value: String,
		reason: String,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
	Sql,
	Memory,
}

impl FromStr for Backend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sql" | "sqlite" => Ok(Backend::Sql),
			"memory" | "mock" => Ok(Backend::Memory),
			other => Err(format!("expected `sql` or `memory`, got `{other}`")),
		}
	}
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub bind_addr: String,
	pub backend: Backend,
	pub max_connections: u32,
	pub acquire_timeout: Duration,
	pub bcrypt_cost: u32,
	pub session_ttl: Duration,
	pub static_dir: PathBuf,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			database_url: "sqlite:bookstore.db?mode=rwc".to_string(),
			bind_addr: "0.0.0.0:8800".to_string(),
			backend: Backend::Sql,
			max_connections: 5,
			acquire_timeout: Duration::from_secs(3),
			bcrypt_cost: bcrypt::DEFAULT_COST,
			session_ttl: SESSION_TTL,
			static_dir: PathBuf::from("static"),
		}
	}
}

impl Config {
	/// Reads the process environment, after `.env` has been loaded.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let defaults = Config::default();
		Ok(Config {
			database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
			bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
			backend: parse(&lookup, "STORE_BACKEND", defaults.backend)?,
			max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
			acquire_timeout: Duration::from_secs(parse(
				&lookup,
				"DB_ACQUIRE_TIMEOUT_SECS",
				defaults.acquire_timeout.as_secs(),
			)?),
			bcrypt_cost: parse(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?,
			session_ttl: Duration::from_secs(parse(
				&lookup,
				"SESSION_TTL_SECS",
				defaults.session_ttl.as_secs(),
			)?),
			static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
		})
	}
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: ToString,
{
	match lookup(name) {
		None => Ok(default),
		Some(value) => match value.trim().parse() {
			Ok(parsed) => Ok(parsed),
			Err(e) => Err(ConfigError::Invalid {
				name,
				reason: e.to_string(),
				value,
			}),
		},
	}
}
