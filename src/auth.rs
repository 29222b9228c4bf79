//! Customer registration and login. Passwords are stored as bcrypt hashes and
//! hashing runs on the blocking pool so it never stalls request handling.

use tokio::task::spawn_blocking;
use tracing::{info, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use crate::types::{Customer, Login, NewCustomer, Registration};

pub async fn hash_password(password: String, cost: u32) -> StoreResult<String> {
	spawn_blocking(move || bcrypt::hash(password, cost))
		.await
		.map_err(|e| StoreError::Storage(format!("hashing task failed: {e}")))?
		.map_err(|e| StoreError::Storage(format!("can't hash password: {e}")))
}

pub async fn verify_password(password: String, hash: String) -> StoreResult<bool> {
	let verified = spawn_blocking(move || bcrypt::verify(password, &hash))
		.await
		.map_err(|e| StoreError::Storage(format!("verify task failed: {e}")))?;
	// a malformed stored hash can't match anything
	Ok(verified.unwrap_or(false))
}

fn required(field: &str, value: &str) -> StoreResult<String> {
	let value = value.trim();
	if value.is_empty() {
		Err(StoreError::validation(format!("{field} is required")))
	} else {
		Ok(value.to_string())
	}
}

fn optional(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

#[instrument(skip_all, fields(username = %registration.username))]
pub async fn register<S: Store>(store: &S, registration: Registration, cost: u32) -> StoreResult<Customer> {
	let username = required("username", &registration.username)?;
	let email = required("email", &registration.email)?;
	let first_name = required("first name", &registration.first_name)?;
	let last_name = required("last name", &registration.last_name)?;
	if registration.password.is_empty() {
		return Err(StoreError::validation("password is required"));
	}

	let password_hash = hash_password(registration.password, cost).await?;
	let customer = store
		.create_customer(NewCustomer {
			username,
			password_hash,
			first_name,
			last_name,
			email,
			phone: optional(registration.phone),
			shipping_address: optional(registration.shipping_address),
		})
		.await?;
	info!(customer_id = customer.customer_id, "customer registered");
	Ok(customer)
}

/// Unknown usernames and wrong passwords fail the same way.
#[instrument(skip_all, fields(username = %login.username))]
pub async fn login<S: Store>(store: &S, login: &Login) -> StoreResult<Customer> {
	let Some(credentials) = store.find_credentials(login.username.trim()).await? else {
		warn!("login for unknown user");
		return Err(StoreError::InvalidCredentials);
	};
	if !verify_password(login.password.clone(), credentials.password_hash.clone()).await? {
		warn!("wrong password");
		return Err(StoreError::InvalidCredentials);
	}
	Ok(credentials.into_customer())
}
