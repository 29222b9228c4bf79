use std::path::Path;
use std::time::Duration;

use axum::{
	response::Redirect,
	routing::{get, post, put},
	Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::{api, pages, session::Sessions, store::Store};

/// Shared by every handler; the store decides where the data lives.
#[derive(Clone)]
pub struct AppState<S: Store> {
	pub store: S,
	pub sessions: Sessions,
	pub bcrypt_cost: u32,
}

impl<S: Store> AppState<S> {
	pub fn new(store: S, bcrypt_cost: u32) -> Self {
		AppState {
			store,
			sessions: Sessions::default(),
			bcrypt_cost,
		}
	}

	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.sessions = Sessions::with_ttl(ttl);
		self
	}
}

pub fn router<S: Store>(state: AppState<S>, static_dir: impl AsRef<Path>) -> Router {
	let api = Router::new()
		.route("/books", post(api::create_book::<S>))
		.route(
			"/books/:isbn",
			get(api::get_book::<S>)
				.put(api::update_book::<S>)
				.delete(api::delete_book::<S>),
		)
		.route(
			"/publishers",
			get(api::list_publishers::<S>).post(api::create_publisher::<S>),
		)
		.route("/orders", post(api::place_order::<S>))
		.route("/customers/:customer/orders", get(api::customer_orders::<S>))
		.route("/customers/:customer", put(api::update_profile::<S>))
		.route(
			"/admin/publisher-orders",
			get(api::list_publisher_orders::<S>).post(api::create_publisher_order::<S>),
		)
		.route(
			"/admin/publisher-orders/:id/confirm",
			post(api::confirm_publisher_order::<S>),
		)
		.route("/admin/low-stock", get(api::low_stock::<S>))
		.route("/reports/previous-month-sales", get(api::previous_month_sales::<S>))
		.route("/reports/sales-by-date", get(api::sales_by_date::<S>))
		.route("/reports/top-customers", get(api::top_customers::<S>))
		.route("/reports/top-books", get(api::top_books::<S>))
		.route("/reports/book-order-count/:isbn", get(api::book_order_count::<S>));

	Router::new()
		.route("/", get(|| async { Redirect::to("/store") }))
		.route("/books", get(api::list_books::<S>))
		.route("/register", post(api::register::<S>))
		.route("/login", post(api::login::<S>))
		.route("/logout", post(api::logout::<S>))
		.nest("/api", api)
		.nest("/store", pages::routes::<S>())
		.nest_service("/static", ServeDir::new(static_dir))
		.layer(CookieManagerLayer::new())
		.layer(CorsLayer::permissive())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// `RUST_LOG` wins when set, otherwise our crate and request traces at info.
pub fn setup_tracing() {
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("bookstore=info,tower_http=info"));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.compact()
		.init();
}
