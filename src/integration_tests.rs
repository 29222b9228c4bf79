//! Behaviour every [`Store`] must share, run against the SQLite store on a
//! private `:memory:` database and against the in-memory store, followed by a
//! few checks through the JSON handlers.

use axum::{
	body::Body,
	extract::{Path, Query, State},
	http::{header, Request, Response, StatusCode},
	response::IntoResponse,
	Json, Router,
};
use chrono::NaiveDate;
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
	api::{self, DateQuery},
	app::{self, AppState},
	auth,
	checkout::{self, Checkout},
	error::StoreError,
	memory::MemoryStore,
	reports::{self, TOP_BOOKS, TOP_CUSTOMERS},
	sql::SqlStore,
	stock::is_low,
	store::Store,
	types::{BookUpdate, CartLine, Customer, NewBook, NewCustomer, OrderStatus, Pid, ProfileUpdate, Registration},
};

fn day(month: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(2026, month, d).unwrap()
}

fn new_book(isbn: &str, p_id: Pid, price: f64, stock: i64, threshold: i64) -> NewBook {
	NewBook {
		isbn: isbn.into(),
		title: format!("Title of {isbn}"),
		author: Some("Ursula K. Le Guin".into()),
		p_id,
		pub_year: 1969,
		price,
		category: "Science".into(),
		stock_quantity: stock,
		threshold,
	}
}

async fn publisher<S: Store>(store: &S) -> Pid {
	store.create_publisher("Penguin").await.unwrap().p_id
}

async fn customer<S: Store>(store: &S, username: &str) -> Customer {
	store
		.create_customer(NewCustomer {
			username: username.into(),
			password_hash: "$2b$04$not-a-real-hash".into(),
			first_name: username.to_uppercase(),
			last_name: "Tester".into(),
			email: format!("{username}@example.com"),
			phone: None,
			shipping_address: None,
		})
		.await
		.unwrap()
}

fn line(isbn: &str, quantity: i64) -> CartLine {
	CartLine { isbn: isbn.into(), quantity }
}

fn card_checkout(customer_id: i64, items: Vec<CartLine>) -> Checkout {
	Checkout {
		customer_id,
		card_number: "4111 1111 1111 1111".into(),
		items,
	}
}

async fn stock_of<S: Store>(store: &S, isbn: &str) -> i64 {
	store.get_book(isbn).await.unwrap().stock_quantity
}

async fn created_book_is_listed_once<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 2)).await.unwrap();
	store.create_book(new_book("ISBN-2", p_id, 7.25, 1, 0)).await.unwrap();

	let books = store.list_books().await.unwrap();
	assert_eq!(books.iter().filter(|b| b.isbn == "ISBN-1").count(), 1);
	let book = books.iter().find(|b| b.isbn == "ISBN-1").unwrap();
	assert_eq!(book.publisher_name.as_deref(), Some("Penguin"));
	assert_eq!(book.author_name.as_deref(), Some("Ursula K. Le Guin"));
	assert_eq!(book.price, 12.5);
}

async fn duplicate_isbn_is_rejected<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("X", p_id, 1.0, 1, 0)).await.unwrap();
	let again = store.create_book(new_book("X", p_id, 2.0, 9, 0)).await;
	assert!(matches!(again, Err(StoreError::DuplicateKey(_))), "{again:?}");
	assert_eq!(store.get_book("X").await.unwrap().price, 1.0);
}

async fn unknown_publisher_is_rejected<S: Store>(store: S) {
	let created = store.create_book(new_book("X", 999, 1.0, 1, 0)).await;
	assert!(matches!(created, Err(StoreError::Validation(_))), "{created:?}");
	assert!(store.list_books().await.unwrap().is_empty());
}

async fn update_is_idempotent<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 2)).await.unwrap();

	let update = BookUpdate {
		title: "The Dispossessed".into(),
		author: Some("U. K. Le Guin".into()),
		p_id,
		pub_year: 1974,
		price: 15.0,
		category: "History".into(),
		stock_quantity: 4,
		threshold: 1,
	};
	let first = store.update_book("ISBN-1", update.clone()).await.unwrap();
	let second = store.update_book("ISBN-1", update.clone()).await.unwrap();
	assert_eq!(first, second);
	assert_eq!(second.title, "The Dispossessed");
	assert_eq!(second.author_name.as_deref(), Some("U. K. Le Guin"));
	assert_eq!(second.stock_quantity, 4);

	let missing = store.update_book("NOPE", update).await;
	assert!(matches!(missing, Err(StoreError::NotFound(_))), "{missing:?}");
}

async fn update_links_an_author_when_none_is_linked<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	let mut book = new_book("ISBN-1", p_id, 3.0, 1, 0);
	book.author = None;
	assert_eq!(store.create_book(book.clone()).await.unwrap().author_name, None);

	let mut update = book.update();
	update.author = Some("Anonymous".into());
	let updated = store.update_book("ISBN-1", update).await.unwrap();
	assert_eq!(updated.author_name.as_deref(), Some("Anonymous"));
}

async fn delete_is_idempotent<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 2)).await.unwrap();

	store.delete_book("ISBN-1").await.unwrap();
	assert!(store.list_books().await.unwrap().iter().all(|b| b.isbn != "ISBN-1"));
	store.delete_book("ISBN-1").await.unwrap();
	store.delete_book("never-existed").await.unwrap();
	assert!(matches!(store.get_book("ISBN-1").await, Err(StoreError::NotFound(_))));
}

async fn confirm_restocks_exactly_once<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 10)).await.unwrap();
	assert!(is_low(&store.get_book("ISBN-1").await.unwrap()));

	let order = store.create_publisher_order("ISBN-1", 8, day(10, 1)).await.unwrap();
	assert_eq!(order.status, OrderStatus::Pending);
	assert_eq!(order.title.as_deref(), Some("Title of ISBN-1"));
	assert_eq!(stock_of(&store, "ISBN-1").await, 5);

	let confirmed = store.confirm_publisher_order(order.order_id).await.unwrap();
	assert_eq!(confirmed.status, OrderStatus::Confirmed);
	let book = store.get_book("ISBN-1").await.unwrap();
	assert_eq!(book.stock_quantity, 13);
	assert!(!is_low(&book));

	let again = store.confirm_publisher_order(order.order_id).await;
	assert!(matches!(again, Err(StoreError::AlreadyConfirmed(id)) if id == order.order_id));
	assert_eq!(stock_of(&store, "ISBN-1").await, 13);

	let unknown = store.confirm_publisher_order(order.order_id + 1000).await;
	assert!(matches!(unknown, Err(StoreError::NotFound(_))), "{unknown:?}");
}

async fn publisher_orders_are_checked_and_listed<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 10)).await.unwrap();

	let zero = store.create_publisher_order("ISBN-1", 0, day(10, 1)).await;
	assert!(matches!(zero, Err(StoreError::Validation(_))), "{zero:?}");
	let unknown = store.create_publisher_order("NOPE", 3, day(10, 1)).await;
	assert!(matches!(unknown, Err(StoreError::NotFound(_))), "{unknown:?}");

	let older = store.create_publisher_order("ISBN-1", 2, day(10, 1)).await.unwrap();
	let newer = store.create_publisher_order("ISBN-1", 3, day(10, 2)).await.unwrap();
	let listed = store.list_publisher_orders().await.unwrap();
	let ids: Vec<i64> = listed.iter().map(|o| o.order_id).collect();
	assert_eq!(ids, vec![newer.order_id, older.order_id]);
	assert_eq!(listed[0].publisher_name.as_deref(), Some("Penguin"));
}

async fn checkout_prices_from_catalog_and_takes_stock<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 12.5, 10, 2)).await.unwrap();
	store.create_book(new_book("ISBN-B", p_id, 7.25, 3, 1)).await.unwrap();
	let alice = customer(&store, "alice").await;

	let order = checkout::place_order(
		&store,
		&card_checkout(alice.customer_id, vec![line("ISBN-A", 2), line("ISBN-B", 1), line("ISBN-A", 1)]),
		day(9, 5),
	)
	.await
	.unwrap();
	assert_eq!(order.total_price, 3.0 * 12.5 + 7.25);
	assert_eq!(order.items.len(), 2);
	assert_eq!(stock_of(&store, "ISBN-A").await, 7);
	assert_eq!(stock_of(&store, "ISBN-B").await, 2);

	let history = store.customer_orders(alice.customer_id).await.unwrap();
	assert_eq!(history, vec![order]);
}

async fn failed_checkout_changes_nothing<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 12.5, 10, 2)).await.unwrap();
	store.create_book(new_book("ISBN-B", p_id, 7.25, 1, 1)).await.unwrap();
	let alice = customer(&store, "alice").await;

	let short = checkout::place_order(
		&store,
		&card_checkout(alice.customer_id, vec![line("ISBN-A", 2), line("ISBN-B", 2)]),
		day(9, 5),
	)
	.await;
	assert!(
		matches!(&short, Err(StoreError::InsufficientStock { isbn, requested: 2, available: 1 }) if isbn == "ISBN-B"),
		"{short:?}"
	);

	let mut bad_card = card_checkout(alice.customer_id, vec![line("ISBN-A", 1)]);
	bad_card.card_number = "4111 1111 1111 111".into();
	assert!(matches!(
		checkout::place_order(&store, &bad_card, day(9, 5)).await,
		Err(StoreError::Validation(_))
	));

	let unknown_book = card_checkout(alice.customer_id, vec![line("ISBN-A", 1), line("NOPE", 1)]);
	assert!(matches!(
		checkout::place_order(&store, &unknown_book, day(9, 5)).await,
		Err(StoreError::NotFound(_))
	));

	let empty = card_checkout(alice.customer_id, vec![]);
	assert!(matches!(
		checkout::place_order(&store, &empty, day(9, 5)).await,
		Err(StoreError::Validation(_))
	));

	assert_eq!(stock_of(&store, "ISBN-A").await, 10);
	assert_eq!(stock_of(&store, "ISBN-B").await, 1);
	assert!(store.customer_orders(alice.customer_id).await.unwrap().is_empty());
	assert_eq!(
		store.sales_between(day(1, 1), day(12, 31)).await.unwrap().order_count,
		0
	);
}

async fn customers_are_unique_and_editable<S: Store>(store: S) {
	let alice = customer(&store, "alice").await;
	let twin = store
		.create_customer(NewCustomer {
			username: "alice".into(),
			password_hash: "other".into(),
			first_name: "Other".into(),
			last_name: "Alice".into(),
			email: "other@example.com".into(),
			phone: None,
			shipping_address: None,
		})
		.await;
	assert!(matches!(twin, Err(StoreError::DuplicateKey(_))), "{twin:?}");

	let credentials = store.find_credentials("alice").await.unwrap().unwrap();
	assert_eq!(credentials.password_hash, "$2b$04$not-a-real-hash");
	assert_eq!(credentials.into_customer(), alice);
	assert!(store.find_credentials("nobody").await.unwrap().is_none());

	let profile = ProfileUpdate {
		first_name: "Alice".into(),
		last_name: "Liddell".into(),
		email: "alice@wonderland.example".into(),
		phone: Some("555-0100".into()),
		shipping_address: Some("Down the rabbit hole".into()),
	};
	let updated = store.update_profile("alice", profile.clone()).await.unwrap();
	assert_eq!(updated.customer_id, alice.customer_id);
	assert_eq!(updated.last_name, "Liddell");
	assert_eq!(updated.shipping_address.as_deref(), Some("Down the rabbit hole"));

	assert!(matches!(
		store.update_profile("nobody", profile).await,
		Err(StoreError::NotFound(_))
	));
	assert!(matches!(
		store.customer_orders(alice.customer_id + 1000).await,
		Err(StoreError::NotFound(_))
	));
}

async fn publishers_are_unique<S: Store>(store: S) {
	let penguin = store.create_publisher("Penguin").await.unwrap();
	store.create_publisher("Faber").await.unwrap();
	assert!(matches!(
		store.create_publisher("Penguin").await,
		Err(StoreError::DuplicateKey(_))
	));
	assert!(matches!(store.create_publisher("  ").await, Err(StoreError::Validation(_))));

	let names: Vec<String> = store.list_publishers().await.unwrap().into_iter().map(|p| p.name).collect();
	assert_eq!(names, vec!["Penguin".to_string(), "Faber".to_string()]);
	assert_eq!(store.list_publishers().await.unwrap()[0], penguin);
}

async fn reports_aggregate_the_ledgers<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 12.5, 10, 2)).await.unwrap();
	store.create_book(new_book("ISBN-B", p_id, 7.25, 10, 2)).await.unwrap();
	let alice = customer(&store, "alice").await;
	let bob = customer(&store, "bob").await;

	let sales = [
		(alice.customer_id, line("ISBN-A", 2), day(9, 5)),
		(bob.customer_id, line("ISBN-B", 2), day(9, 20)),
		(alice.customer_id, line("ISBN-B", 1), day(10, 2)),
	];
	for (customer_id, sold, date) in sales {
		checkout::place_order(&store, &card_checkout(customer_id, vec![sold]), date)
			.await
			.unwrap();
	}

	let september = reports::previous_month_sales(&store, day(10, 19)).await.unwrap();
	assert_eq!(september.month, "September 2026");
	assert_eq!(september.total_sales, 39.5);
	assert_eq!(september.order_count, 2);

	let october_second = reports::sales_on(&store, day(10, 2)).await.unwrap();
	assert_eq!(october_second.total_sales, 7.25);
	assert_eq!(october_second.order_count, 1);
	assert_eq!(reports::sales_on(&store, day(10, 3)).await.unwrap().order_count, 0);

	let top = store.top_customers(TOP_CUSTOMERS).await.unwrap();
	let spenders: Vec<(i64, f64)> = top.iter().map(|c| (c.customer_id, c.total_spent)).collect();
	assert_eq!(spenders, vec![(alice.customer_id, 32.25), (bob.customer_id, 14.5)]);

	let books = store.top_books(TOP_BOOKS).await.unwrap();
	let sold: Vec<(&str, i64)> = books.iter().map(|b| (b.isbn.as_str(), b.total_copies_sold)).collect();
	assert_eq!(sold, vec![("ISBN-B", 3), ("ISBN-A", 2)]);
	assert_eq!(store.top_books(1).await.unwrap().len(), 1);

	let first = store.create_publisher_order("ISBN-A", 4, day(10, 1)).await.unwrap();
	store.create_publisher_order("ISBN-A", 6, day(10, 2)).await.unwrap();
	store.confirm_publisher_order(first.order_id).await.unwrap();
	let ordered = store.book_order_count("ISBN-A").await.unwrap();
	assert_eq!(ordered.total_quantity_ordered, 10);
	assert_eq!(ordered.title, "Title of ISBN-A");
	assert_eq!(store.book_order_count("ISBN-B").await.unwrap().total_quantity_ordered, 0);
	assert!(matches!(
		store.book_order_count("NOPE").await,
		Err(StoreError::NotFound(_))
	));
}

async fn sold_books_stay_in_the_ledger_after_delete<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 12.5, 10, 2)).await.unwrap();
	let alice = customer(&store, "alice").await;
	checkout::place_order(&store, &card_checkout(alice.customer_id, vec![line("ISBN-A", 1)]), day(9, 5))
		.await
		.unwrap();

	store.delete_book("ISBN-A").await.unwrap();
	let history = store.customer_orders(alice.customer_id).await.unwrap();
	assert_eq!(history[0].items[0].title, "Title of ISBN-A");
	assert_eq!(store.top_books(TOP_BOOKS).await.unwrap()[0].isbn, "ISBN-A");
}

async fn editing_an_author_leaves_other_books_alone<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	let first = new_book("ISBN-1", p_id, 3.0, 1, 0);
	store.create_book(first.clone()).await.unwrap();
	store.create_book(new_book("ISBN-2", p_id, 4.0, 1, 0)).await.unwrap();

	let mut update = first.update();
	update.author = Some("Someone Else".into());
	let edited = store.update_book("ISBN-1", update.clone()).await.unwrap();
	assert_eq!(edited.author_name.as_deref(), Some("Someone Else"));
	let other = store.get_book("ISBN-2").await.unwrap();
	assert_eq!(other.author_name.as_deref(), Some("Ursula K. Le Guin"));

	update.author = Some("Ursula K. Le Guin".into());
	let restored = store.update_book("ISBN-1", update).await.unwrap();
	assert_eq!(restored.author_name.as_deref(), Some("Ursula K. Le Guin"));
}

async fn repeated_lines_share_the_shelf<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 2.0, 3, 0)).await.unwrap();
	let alice = customer(&store, "alice").await;

	let short = store
		.place_order(alice.customer_id, &[line("ISBN-A", 2), line("ISBN-A", 2)], day(9, 5))
		.await;
	assert!(matches!(short, Err(StoreError::InsufficientStock { .. })), "{short:?}");
	assert_eq!(stock_of(&store, "ISBN-A").await, 3);
	assert!(store.customer_orders(alice.customer_id).await.unwrap().is_empty());

	let order = store
		.place_order(alice.customer_id, &[line("ISBN-A", 1), line("ISBN-A", 2)], day(9, 5))
		.await
		.unwrap();
	assert_eq!(order.total_price, 6.0);
	assert_eq!(stock_of(&store, "ISBN-A").await, 0);
}

async fn oversized_quantities_are_rejected<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 2.0, 5, 0)).await.unwrap();
	store.create_book(new_book("ISBN-B", p_id, 2.0, i64::MAX - 1, 0)).await.unwrap();
	let alice = customer(&store, "alice").await;

	let huge = vec![line("ISBN-A", i64::MAX), line("ISBN-A", 2)];
	let rejected = checkout::place_order(&store, &card_checkout(alice.customer_id, huge.clone()), day(9, 5)).await;
	assert!(matches!(rejected, Err(StoreError::Validation(_))), "{rejected:?}");
	assert!(store.place_order(alice.customer_id, &huge, day(9, 5)).await.is_err());
	assert_eq!(stock_of(&store, "ISBN-A").await, 5);
	assert!(store.customer_orders(alice.customer_id).await.unwrap().is_empty());

	let order = store.create_publisher_order("ISBN-B", 5, day(10, 1)).await.unwrap();
	let overflow = store.confirm_publisher_order(order.order_id).await;
	assert!(matches!(overflow, Err(StoreError::Validation(_))), "{overflow:?}");
	assert_eq!(stock_of(&store, "ISBN-B").await, i64::MAX - 1);
	let listed = store.list_publisher_orders().await.unwrap();
	assert_eq!(listed[0].status, OrderStatus::Pending);
}

async fn concurrent_checkouts_never_oversell<S: Store>(store: S) {
	let p_id = publisher(&store).await;
	store.create_book(new_book("ISBN-A", p_id, 5.0, 3, 0)).await.unwrap();
	let mut buyers = Vec::new();
	for name in ["ann", "ben", "cat", "dan", "eve"] {
		buyers.push(customer(&store, name).await.customer_id);
	}

	let mut checkouts = JoinSet::new();
	for customer_id in buyers {
		let store = store.clone();
		checkouts.spawn(async move { store.place_order(customer_id, &[line("ISBN-A", 1)], day(10, 1)).await });
	}
	let mut sold = 0;
	while let Some(outcome) = checkouts.join_next().await {
		match outcome.unwrap() {
			Ok(_) => sold += 1,
			Err(StoreError::InsufficientStock { .. }) => {},
			Err(other) => panic!("unexpected checkout failure: {other:?}"),
		}
	}
	assert_eq!(sold, 3);
	assert_eq!(stock_of(&store, "ISBN-A").await, 0);
	assert_eq!(
		store.sales_between(day(1, 1), day(12, 31)).await.unwrap().order_count,
		3
	);
}

macro_rules! store_suite {
	($($name:ident),* $(,)?) => {
		mod sql_store {
			use super::*;

			$(
				#[tokio::test]
				async fn $name() {
					super::$name(SqlStore::in_memory().await.unwrap()).await;
				}
			)*
		}

		mod memory_store {
			use super::*;

			$(
				#[tokio::test]
				async fn $name() {
					super::$name(MemoryStore::new()).await;
				}
			)*
		}
	};
}

store_suite!(
	created_book_is_listed_once,
	duplicate_isbn_is_rejected,
	unknown_publisher_is_rejected,
	update_is_idempotent,
	update_links_an_author_when_none_is_linked,
	delete_is_idempotent,
	confirm_restocks_exactly_once,
	publisher_orders_are_checked_and_listed,
	checkout_prices_from_catalog_and_takes_stock,
	failed_checkout_changes_nothing,
	customers_are_unique_and_editable,
	publishers_are_unique,
	reports_aggregate_the_ledgers,
	sold_books_stay_in_the_ledger_after_delete,
	editing_an_author_leaves_other_books_alone,
	repeated_lines_share_the_shelf,
	oversized_quantities_are_rejected,
	concurrent_checkouts_never_oversell,
);

// handlers

fn state() -> AppState<MemoryStore> {
	AppState::new(MemoryStore::new(), 4)
}

async fn with_publisher(state: &AppState<MemoryStore>) -> Pid {
	let (status, Json(publisher)) = api::create_publisher(
		State(state.clone()),
		Ok(Json(serde_json::from_value(serde_json::json!({ "name": "Penguin" })).unwrap())),
	)
	.await
	.unwrap();
	assert_eq!(status, StatusCode::CREATED);
	publisher.p_id
}

#[tokio::test]
async fn book_lifecycle_through_handlers() {
	let state = state();
	let p_id = with_publisher(&state).await;

	let payload = serde_json::from_value(serde_json::json!({
		"isbn": "ISBN-1",
		"title": "Cosmos",
		"author": "Carl Sagan",
		"p_id": p_id.to_string(),
		"pub_year": "1980",
		"price": "12.50",
		"category": "Science",
		"stock_quantity": 5,
		"threshold": 10,
	}))
	.unwrap();
	let (status, Json(book)) = api::create_book(State(state.clone()), Ok(Json(payload))).await.unwrap();
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(book.price, 12.5);

	let Json(low) = api::low_stock(State(state.clone())).await.unwrap();
	assert_eq!(low.len(), 1);

	let Json(listed) = api::list_books(State(state.clone())).await.unwrap();
	assert_eq!(listed, vec![book.clone()]);

	let status = api::delete_book(State(state.clone()), Ok(Path("ISBN-1".to_string()))).await.unwrap();
	assert_eq!(status, StatusCode::NO_CONTENT);

	let missing = api::get_book(State(state.clone()), Ok(Path("ISBN-1".to_string()))).await;
	assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_book_is_a_bad_request() {
	let state = state();
	let p_id = with_publisher(&state).await;
	let mut book = new_book("ISBN-1", p_id, 1.0, 1, 0);
	book.stock_quantity = -4;
	let rejected = api::create_book(State(state.clone()), Ok(Json(book))).await;
	assert_eq!(rejected.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn replenishment_through_handlers() {
	let state = state();
	let p_id = with_publisher(&state).await;
	state.store.create_book(new_book("ISBN-1", p_id, 12.5, 5, 10)).await.unwrap();

	let order = serde_json::from_value(serde_json::json!({ "isbn": "ISBN-1", "quantity": "8" })).unwrap();
	let (status, Json(order)) = api::create_publisher_order(State(state.clone()), Ok(Json(order)))
		.await
		.unwrap();
	assert_eq!(status, StatusCode::CREATED);

	let Json(confirmed) = api::confirm_publisher_order(State(state.clone()), Ok(Path(order.order_id)))
		.await
		.unwrap();
	assert_eq!(confirmed.status, OrderStatus::Confirmed);

	let again = api::confirm_publisher_order(State(state.clone()), Ok(Path(order.order_id))).await;
	assert_eq!(again.into_response().status(), StatusCode::CONFLICT);

	let Json(low) = api::low_stock(State(state.clone())).await.unwrap();
	assert!(low.is_empty());

	let Json(count) = api::book_order_count(State(state.clone()), Ok(Path("ISBN-1".to_string())))
		.await
		.unwrap();
	assert_eq!(count.total_quantity_ordered, 8);
}

#[tokio::test]
async fn reports_through_handlers() {
	let state = state();
	let bad = api::sales_by_date(
		State(state.clone()),
		Ok(Query(DateQuery { date: "yesterday".into() })),
	)
	.await;
	assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

	let Json(daily) = api::sales_by_date(
		State(state.clone()),
		Ok(Query(DateQuery { date: "2026-10-02".into() })),
	)
	.await
	.unwrap();
	assert_eq!(daily.order_count, 0);

	let Json(top) = api::top_customers(State(state.clone())).await.unwrap();
	assert!(top.is_empty());
}

#[tokio::test]
async fn register_and_edit_profile_through_handlers() {
	let state = state();
	let registration = serde_json::from_value(serde_json::json!({
		"username": "jdoe",
		"email": "jdoe@example.com",
		"password": "hunter22",
		"firstName": "John",
		"lastName": "Doe",
	}))
	.unwrap();
	let (status, Json(customer)) = api::register(State(state.clone()), Ok(Json(registration)))
		.await
		.unwrap();
	assert_eq!(status, StatusCode::CREATED);

	let token = state.sessions.open(customer.clone()).await;
	let profile = serde_json::from_value(serde_json::json!({
		"firstName": "Johnny",
		"lastName": "Doe",
		"email": "johnny@example.com",
		"address": "1 Main St",
	}))
	.unwrap();
	let Json(updated) = api::update_profile(State(state.clone()), Ok(Path("jdoe".to_string())), Ok(Json(profile)))
		.await
		.unwrap();
	assert_eq!(updated.shipping_address.as_deref(), Some("1 Main St"));
	assert_eq!(state.sessions.get(token).await.unwrap().customer.first_name, "Johnny");

	let Json(orders) = api::customer_orders(State(state.clone()), Ok(Path(customer.customer_id)))
		.await
		.unwrap();
	assert!(orders.is_empty());
}

// over http, with the cookie layer in place

fn json_request(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
	let mut request = Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(cookie) = cookie {
		request = request.header(header::COOKIE, cookie);
	}
	request.body(Body::from(body.to_string())).unwrap()
}

fn form_request(uri: &str, cookie: &str, body: &'static str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(header::COOKIE, cookie)
		.body(Body::from(body))
		.unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
	app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(token: Uuid) -> String {
	format!("bookstore_session={token}")
}

async fn shopper(state: &AppState<MemoryStore>, username: &str) -> Customer {
	let registration = Registration {
		username: username.into(),
		email: format!("{username}@example.com"),
		password: "hunter22".into(),
		first_name: username.to_uppercase(),
		last_name: "Shopper".into(),
		phone: None,
		shipping_address: None,
	};
	auth::register(&state.store, registration, state.bcrypt_cost).await.unwrap()
}

async fn cart_count(state: &AppState<MemoryStore>, token: Uuid) -> Option<i64> {
	state.sessions.with_cart(token, |cart| cart.count()).await
}

#[tokio::test]
async fn login_sets_an_http_only_cookie_and_logout_ends_the_session() {
	let state = state();
	let app = app::router(state.clone(), "static");
	let registered = send(
		&app,
		json_request(
			"/register",
			None,
			serde_json::json!({
				"username": "jdoe",
				"email": "jdoe@example.com",
				"password": "hunter22",
				"firstName": "John",
				"lastName": "Doe",
			}),
		),
	)
	.await;
	assert_eq!(registered.status(), StatusCode::CREATED);

	let wrong = send(
		&app,
		json_request("/login", None, serde_json::json!({ "username": "jdoe", "password": "nope" })),
	)
	.await;
	assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
	assert!(wrong.headers().get(header::SET_COOKIE).is_none());

	let response = send(
		&app,
		json_request("/login", None, serde_json::json!({ "username": "jdoe", "password": "hunter22" })),
	)
	.await;
	assert_eq!(response.status(), StatusCode::OK);
	let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
	let body = json_body(response).await;
	let token: Uuid = body["token"].as_str().unwrap().parse().unwrap();
	assert!(set_cookie.starts_with(&session_cookie(token)), "{set_cookie}");
	assert!(set_cookie.contains("HttpOnly"), "{set_cookie}");
	assert_eq!(state.sessions.get(token).await.unwrap().customer.username, "jdoe");

	let out = send(&app, json_request("/logout", Some(&session_cookie(token)), serde_json::json!({}))).await;
	assert_eq!(out.status(), StatusCode::NO_CONTENT);
	assert!(out.headers()[header::SET_COOKIE].to_str().unwrap().starts_with("bookstore_session="));
	assert!(state.sessions.get(token).await.is_none());
}

#[tokio::test]
async fn storefront_checkout_empties_the_cart() {
	let state = state();
	let app = app::router(state.clone(), "static");
	let p_id = with_publisher(&state).await;
	state.store.create_book(new_book("ISBN-1", p_id, 12.5, 4, 0)).await.unwrap();
	let jdoe = shopper(&state, "jdoe").await;
	let token = state.sessions.open(jdoe).await;
	let cookie = session_cookie(token);

	let added = send(&app, form_request("/store/cart/add", &cookie, "isbn=ISBN-1")).await;
	assert_eq!(added.status(), StatusCode::SEE_OTHER);
	send(&app, form_request("/store/cart/add", &cookie, "isbn=ISBN-1")).await;
	assert_eq!(cart_count(&state, token).await, Some(2));

	let paid = send(&app, form_request("/store/checkout", &cookie, "card_number=4111+1111+1111+1111")).await;
	assert_eq!(paid.status(), StatusCode::OK);
	assert_eq!(cart_count(&state, token).await, Some(0));
	assert_eq!(stock_of(&state.store, "ISBN-1").await, 2);
}

#[tokio::test]
async fn api_checkout_empties_only_the_buyers_cart() {
	let state = state();
	let app = app::router(state.clone(), "static");
	let p_id = with_publisher(&state).await;
	state.store.create_book(new_book("ISBN-1", p_id, 12.5, 4, 0)).await.unwrap();
	let jdoe = shopper(&state, "jdoe").await;
	let other = shopper(&state, "other").await;
	let token = state.sessions.open(jdoe.clone()).await;
	let book = state.store.get_book("ISBN-1").await.unwrap();
	state.sessions.with_cart(token, |cart| cart.add(&book)).await.unwrap().unwrap();

	let order = |customer_id: i64| {
		serde_json::json!({
			"customerId": customer_id,
			"cardNumber": "4111111111111111",
			"items": [{ "isbn": "ISBN-1", "quantity": 1 }],
		})
	};

	let someone_else = send(&app, json_request("/api/orders", Some(&session_cookie(token)), order(other.customer_id))).await;
	assert_eq!(someone_else.status(), StatusCode::CREATED);
	assert_eq!(cart_count(&state, token).await, Some(1));

	let own = send(&app, json_request("/api/orders", Some(&session_cookie(token)), order(jdoe.customer_id))).await;
	assert_eq!(own.status(), StatusCode::CREATED);
	assert_eq!(json_body(own).await["customer_id"], jdoe.customer_id);
	assert_eq!(cart_count(&state, token).await, Some(0));
	assert_eq!(stock_of(&state.store, "ISBN-1").await, 2);
}
