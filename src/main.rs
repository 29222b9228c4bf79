// online bookstore

mod api;
mod app;
mod auth;
mod checkout;
mod config;
mod error;
mod memory;
mod pages;
mod reports;
mod session;
mod sql;
mod stock;
mod store;
mod types;

#[cfg(test)]
mod integration_tests;

use anyhow::Context;
use tracing::info;

use crate::app::AppState;
use crate::config::{Backend, Config};
use crate::memory::MemoryStore;
use crate::sql::SqlStore;
use crate::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	// a missing .env is fine, the environment may already carry everything
	dotenvy::dotenv().ok();
	app::setup_tracing();

	let config = Config::from_env().context("invalid configuration")?;

	match config.backend {
		Backend::Sql => {
			let store = SqlStore::connect(&config)
				.await
				.with_context(|| format!("can't connect to database {}", config.database_url))?;
			serve(store.clone(), &config).await?;
			store.close().await;
		},
		Backend::Memory => {
			info!("serving from the in-memory store, nothing will be persisted");
			serve(MemoryStore::new(), &config).await?;
		},
	}
	Ok(())
}

async fn serve<S: Store>(store: S, config: &Config) -> anyhow::Result<()> {
	let state = AppState::new(store, config.bcrypt_cost).with_session_ttl(config.session_ttl);
	let app = app::router(state, &config.static_dir);

	let listener = tokio::net::TcpListener::bind(&config.bind_addr)
		.await
		.with_context(|| format!("can't bind {}", config.bind_addr))?;
	info!(addr = %config.bind_addr, "listening");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("server error")?;
	info!("shut down");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(%err, "can't listen for ctrl-c");
		// never resolve: without a signal handler the server runs until killed
		std::future::pending::<()>().await;
	}
}
