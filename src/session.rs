//! Server-side session context: opened on login, holds the customer and their
//! cart, dropped on logout or after sitting idle for the session ttl. The
//! browser only keeps the token cookie.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tower_cookies::{Cookie, Cookies};
use tracing::debug;
use uuid::Uuid;

use crate::checkout::Cart;
use crate::types::{Cid, Customer};

pub const SESSION_COOKIE: &str = "bookstore_session";
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Session {
	pub token: Uuid,
	pub customer: Customer,
	pub cart: Cart,
	last_seen: Instant,
}

#[derive(Debug, Clone)]
pub struct Sessions {
	open: Arc<Mutex<HashMap<Uuid, Session>>>,
	ttl: Duration,
}

impl Default for Sessions {
	fn default() -> Self {
		Self::with_ttl(SESSION_TTL)
	}
}

/// Looks a session up and marks it used; an idle one is dropped instead.
fn live(open: &mut HashMap<Uuid, Session>, token: Uuid, ttl: Duration) -> Option<&mut Session> {
	if open.get(&token).is_some_and(|s| s.last_seen.elapsed() >= ttl) {
		open.remove(&token);
		debug!("session expired");
		return None;
	}
	let session = open.get_mut(&token)?;
	session.last_seen = Instant::now();
	Some(session)
}

impl Sessions {
	pub fn with_ttl(ttl: Duration) -> Self {
		Sessions {
			open: Arc::default(),
			ttl,
		}
	}

	pub async fn open(&self, customer: Customer) -> Uuid {
		let token = Uuid::new_v4();
		let mut open = self.open.lock().await;
		let before = open.len();
		open.retain(|_, s| s.last_seen.elapsed() < self.ttl);
		if open.len() < before {
			debug!(expired = before - open.len(), "idle sessions dropped");
		}
		debug!(customer_id = customer.customer_id, "session opened");
		open.insert(
			token,
			Session {
				token,
				customer,
				cart: Cart::default(),
				last_seen: Instant::now(),
			},
		);
		token
	}

	pub async fn get(&self, token: Uuid) -> Option<Session> {
		live(&mut *self.open.lock().await, token, self.ttl).cloned()
	}

	pub async fn close(&self, token: Uuid) -> Option<Session> {
		let closed = self.open.lock().await.remove(&token);
		if closed.is_some() {
			debug!("session closed");
		}
		closed
	}

	/// Runs `f` on the session's cart; `None` when the session is gone.
	pub async fn with_cart<R>(&self, token: Uuid, f: impl FnOnce(&mut Cart) -> R) -> Option<R> {
		live(&mut *self.open.lock().await, token, self.ttl).map(|s| f(&mut s.cart))
	}

	/// Empties the cart after a paid checkout, but only in the buyer's own session.
	pub async fn clear_paid_cart(&self, token: Uuid, customer_id: Cid) -> bool {
		match live(&mut *self.open.lock().await, token, self.ttl) {
			Some(session) if session.customer.customer_id == customer_id => {
				session.cart.clear();
				true
			},
			_ => false,
		}
	}

	/// Keeps open sessions in step after a profile change.
	pub async fn refresh_customer(&self, customer: &Customer) {
		for session in self.open.lock().await.values_mut() {
			if session.customer.customer_id == customer.customer_id {
				session.customer = customer.clone();
			}
		}
	}
}

pub fn token(cookies: &Cookies) -> Option<Uuid> {
	cookies
		.get(SESSION_COOKIE)
		.and_then(|c| Uuid::parse_str(c.value()).ok())
}

pub fn set_cookie(cookies: &Cookies, token: Uuid) {
	let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
	cookie.set_path("/");
	cookie.set_http_only(true);
	cookies.add(cookie);
}

pub fn clear_cookie(cookies: &Cookies) {
	let mut cookie = Cookie::new(SESSION_COOKIE, "");
	cookie.set_path("/");
	cookies.remove(cookie);
}
