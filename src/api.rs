//! JSON handlers behind `/books`, `/register`, `/login`, `/logout` and `/api`.

use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection, QueryRejection},
		Path, Query, State,
	},
	http::StatusCode,
	Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use tracing::info;
use uuid::Uuid;

use crate::{
	app::AppState,
	auth,
	checkout::{self, Checkout},
	error::{StoreError, StoreResult},
	reports::{self, BookOrderCount, BookSales, CustomerSpend, DailySales, MonthlySales},
	session,
	stock,
	store::Store,
	types::{
		Book, BookUpdate, Cid, Customer, CustomerOrder, Login, NewBook, NewPublisher,
		NewPublisherOrder, Oid, ProfileUpdate, Publisher, PublisherOrder, Registration,
	},
};

type ApiResult<T> = StoreResult<Json<T>>;
type Created<T> = StoreResult<(StatusCode, Json<T>)>;

pub fn today() -> NaiveDate {
	Local::now().date_naive()
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> StoreResult<T> {
	payload
		.map(|Json(value)| value)
		.map_err(|rejection| StoreError::validation(rejection.body_text()))
}

fn path<T>(param: Result<Path<T>, PathRejection>) -> StoreResult<T> {
	param
		.map(|Path(value)| value)
		.map_err(|rejection| StoreError::validation(rejection.body_text()))
}

fn created<T>(value: T) -> Created<T> {
	Ok((StatusCode::CREATED, Json(value)))
}

// catalog

pub async fn list_books<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Vec<Book>> {
	Ok(Json(state.store.list_books().await?))
}

pub async fn get_book<S: Store>(
	State(state): State<AppState<S>>,
	isbn: Result<Path<String>, PathRejection>,
) -> ApiResult<Book> {
	Ok(Json(state.store.get_book(&path(isbn)?).await?))
}

pub async fn create_book<S: Store>(
	State(state): State<AppState<S>>,
	payload: Result<Json<NewBook>, JsonRejection>,
) -> Created<Book> {
	let book = body(payload)?.validated()?;
	created(state.store.create_book(book).await?)
}

pub async fn update_book<S: Store>(
	State(state): State<AppState<S>>,
	isbn: Result<Path<String>, PathRejection>,
	payload: Result<Json<BookUpdate>, JsonRejection>,
) -> ApiResult<Book> {
	let isbn = path(isbn)?;
	let update = body(payload)?.validated()?;
	Ok(Json(state.store.update_book(&isbn, update).await?))
}

pub async fn delete_book<S: Store>(
	State(state): State<AppState<S>>,
	isbn: Result<Path<String>, PathRejection>,
) -> StoreResult<StatusCode> {
	state.store.delete_book(&path(isbn)?).await?;
	Ok(StatusCode::NO_CONTENT)
}

pub async fn list_publishers<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Vec<Publisher>> {
	Ok(Json(state.store.list_publishers().await?))
}

pub async fn create_publisher<S: Store>(
	State(state): State<AppState<S>>,
	payload: Result<Json<NewPublisher>, JsonRejection>,
) -> Created<Publisher> {
	let publisher = body(payload)?;
	created(state.store.create_publisher(&publisher.name).await?)
}

// customers

pub async fn register<S: Store>(
	State(state): State<AppState<S>>,
	payload: Result<Json<Registration>, JsonRejection>,
) -> Created<Customer> {
	let registration = body(payload)?;
	created(auth::register(&state.store, registration, state.bcrypt_cost).await?)
}

#[derive(Debug, Serialize)]
pub struct LoggedIn {
	pub customer: Customer,
	pub token: Uuid,
}

pub async fn login<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	payload: Result<Json<Login>, JsonRejection>,
) -> ApiResult<LoggedIn> {
	let login = body(payload)?;
	let customer = auth::login(&state.store, &login).await?;
	let token = state.sessions.open(customer.clone()).await;
	session::set_cookie(&cookies, token);
	info!(customer_id = customer.customer_id, "logged in");
	Ok(Json(LoggedIn { customer, token }))
}

pub async fn logout<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> StatusCode {
	if let Some(token) = session::token(&cookies) {
		state.sessions.close(token).await;
	}
	session::clear_cookie(&cookies);
	StatusCode::NO_CONTENT
}

pub async fn update_profile<S: Store>(
	State(state): State<AppState<S>>,
	username: Result<Path<String>, PathRejection>,
	payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Customer> {
	let username = path(username)?;
	let profile = body(payload)?.validated()?;
	let customer = state.store.update_profile(&username, profile).await?;
	state.sessions.refresh_customer(&customer).await;
	Ok(Json(customer))
}

// customer ledger

pub async fn place_order<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	payload: Result<Json<Checkout>, JsonRejection>,
) -> Created<CustomerOrder> {
	let checkout = body(payload)?;
	let order = checkout::place_order(&state.store, &checkout, today()).await?;
	// a session cart that was just paid for must not be bought twice
	if let Some(token) = session::token(&cookies) {
		state.sessions.clear_paid_cart(token, checkout.customer_id).await;
	}
	created(order)
}

pub async fn customer_orders<S: Store>(
	State(state): State<AppState<S>>,
	customer_id: Result<Path<Cid>, PathRejection>,
) -> ApiResult<Vec<CustomerOrder>> {
	Ok(Json(state.store.customer_orders(path(customer_id)?).await?))
}

// publisher ledger

pub async fn list_publisher_orders<S: Store>(
	State(state): State<AppState<S>>,
) -> ApiResult<Vec<PublisherOrder>> {
	Ok(Json(state.store.list_publisher_orders().await?))
}

pub async fn create_publisher_order<S: Store>(
	State(state): State<AppState<S>>,
	payload: Result<Json<NewPublisherOrder>, JsonRejection>,
) -> Created<PublisherOrder> {
	let order = body(payload)?;
	created(
		state
			.store
			.create_publisher_order(order.isbn.trim(), order.quantity, today())
			.await?,
	)
}

pub async fn confirm_publisher_order<S: Store>(
	State(state): State<AppState<S>>,
	order_id: Result<Path<Oid>, PathRejection>,
) -> ApiResult<PublisherOrder> {
	Ok(Json(state.store.confirm_publisher_order(path(order_id)?).await?))
}

pub async fn low_stock<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Vec<Book>> {
	Ok(Json(stock::low_stock(state.store.list_books().await?)))
}

// reports

pub async fn previous_month_sales<S: Store>(State(state): State<AppState<S>>) -> ApiResult<MonthlySales> {
	Ok(Json(reports::previous_month_sales(&state.store, today()).await?))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
	pub date: String,
}

pub async fn sales_by_date<S: Store>(
	State(state): State<AppState<S>>,
	query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<DailySales> {
	let Query(query) = query.map_err(|rejection| StoreError::validation(rejection.body_text()))?;
	let date = reports::parse_date(&query.date)?;
	Ok(Json(reports::sales_on(&state.store, date).await?))
}

pub async fn top_customers<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Vec<CustomerSpend>> {
	Ok(Json(state.store.top_customers(reports::TOP_CUSTOMERS).await?))
}

pub async fn top_books<S: Store>(State(state): State<AppState<S>>) -> ApiResult<Vec<BookSales>> {
	Ok(Json(state.store.top_books(reports::TOP_BOOKS).await?))
}

pub async fn book_order_count<S: Store>(
	State(state): State<AppState<S>>,
	isbn: Result<Path<String>, PathRejection>,
) -> ApiResult<BookOrderCount> {
	Ok(Json(state.store.book_order_count(&path(isbn)?).await?))
}
