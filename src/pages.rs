//! Server-rendered storefront under `/store`. Every page goes through the
//! [`Store`] trait, so the same pages run on the SQL or the in-memory store.

use axum::{
	extract::{
		rejection::{FormRejection, QueryRejection},
		Path, Query, State,
	},
	response::{IntoResponse, Redirect, Response},
	routing::{get, post},
	Form, Router,
};
use maud::{html, Markup, DOCTYPE};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::info;

use crate::{
	api::today,
	app::AppState,
	auth,
	checkout::{self, Cart, Checkout},
	error::{StoreError, StoreResult},
	reports::{self, TOP_BOOKS, TOP_CUSTOMERS},
	session::{self, Session},
	stock::{is_low, shortfall},
	store::Store,
	types::{
		Book, CustomerOrder, Login, NewBook, NewPublisher, NewPublisherOrder, Oid, OrderStatus,
		ProfileUpdate, Publisher, PublisherOrder, Registration, CATEGORIES,
	},
};

pub fn routes<S: Store>() -> Router<AppState<S>> {
	Router::new()
		.route("/", get(home::<S>))
		.route("/login", get(login_page::<S>).post(perform_login::<S>))
		.route("/register", get(register_page::<S>).post(perform_register::<S>))
		.route("/logout", post(perform_logout::<S>))
		.route("/cart", get(cart_page::<S>))
		.route("/cart/add", post(add_to_cart::<S>))
		.route("/cart/remove", post(remove_from_cart::<S>))
		.route("/checkout", post(perform_checkout::<S>))
		.route("/orders", get(order_history::<S>))
		.route("/profile", get(profile_page::<S>).post(update_profile::<S>))
		.route("/admin", get(admin_page::<S>))
		.route("/admin/books", post(admin_add_book::<S>))
		.route("/admin/books/delete", post(admin_delete_book::<S>))
		.route("/admin/publishers", post(admin_add_publisher::<S>))
		.route("/admin/publisher-orders", post(admin_order_copies::<S>))
		.route("/admin/publisher-orders/:id/confirm", post(admin_confirm_order::<S>))
}

async fn current<S: Store>(state: &AppState<S>, cookies: &Cookies) -> Option<Session> {
	let token = session::token(cookies)?;
	state.sessions.get(token).await
}

fn money(amount: f64) -> String {
	format!("${amount:.2}")
}

fn layout(title: &str, session: Option<&Session>, content: Markup) -> Markup {
	html! {
		(DOCTYPE)
		html {
			head {
				meta charset="utf-8";
				title { (title) " | Bookstore" }
				link rel="stylesheet" href="/static/style.css";
			}
			body {
				nav {
					a href="/store" { "Books" }
					@if let Some(session) = session {
						a href="/store/cart" { "Cart (" (session.cart.count()) ")" }
						a href="/store/orders" { "Orders" }
						a href="/store/profile" { "Profile" }
						form.inline method="POST" action="/store/logout" {
							button type="submit" { "Log out " (session.customer.username) }
						}
					} @else {
						a href="/store/login" { "Log in" }
						a href="/store/register" { "Register" }
					}
					a href="/store/admin" { "Admin" }
				}
				main {
					h1 { (title) }
					(content)
				}
			}
		}
	}
}

fn error_block(err: &StoreError) -> Markup {
	html! { p.error { (err) } }
}

fn notice(text: &str) -> Markup {
	html! { p.notice { (text) } }
}

// browsing

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
	#[default]
	Title,
	Isbn,
	Author,
	Category,
}

impl SearchField {
	const ALL: [(SearchField, &'static str); 4] = [
		(SearchField::Title, "title"),
		(SearchField::Isbn, "isbn"),
		(SearchField::Author, "author"),
		(SearchField::Category, "category"),
	];
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Search {
	#[serde(default)]
	pub field: SearchField,
	#[serde(default)]
	pub q: String,
}

/// Case-insensitive substring match; a blank term matches everything.
pub fn matches(book: &Book, search: &Search) -> bool {
	let term = search.q.trim().to_lowercase();
	if term.is_empty() {
		return true;
	}
	let haystack = match search.field {
		SearchField::Title => Some(book.title.as_str()),
		SearchField::Isbn => Some(book.isbn.as_str()),
		SearchField::Author => book.author_name.as_deref(),
		SearchField::Category => Some(book.category.as_str()),
	};
	haystack.is_some_and(|h| h.to_lowercase().contains(&term))
}

pub fn filter(books: Vec<Book>, search: &Search) -> Vec<Book> {
	books.into_iter().filter(|b| matches(b, search)).collect()
}

fn search_form(search: &Search) -> Markup {
	html! {
		form.search method="GET" action="/store" {
			select name="field" {
				@for (field, name) in SearchField::ALL {
					option value=(name) selected[field == search.field] { (name) }
				}
			}
			input type="search" name="q" value=(search.q) placeholder="Search...";
			button type="submit" { "Search" }
			a href="/store" { "Clear" }
		}
	}
}

fn book_table(books: &[Book], can_buy: bool) -> Markup {
	html! {
		@if books.is_empty() {
			p { "No books found." }
		} @else {
			table {
				thead { tr {
					th { "ISBN" }
					th { "Title" }
					th { "Author" }
					th { "Publisher" }
					th { "Year" }
					th { "Category" }
					th { "Price" }
					th { "In stock" }
					@if can_buy { th {} }
				} }
				tbody {
					@for book in books {
						tr {
							td { (book.isbn) }
							td { (book.title) }
							td { (book.author_name.as_deref().unwrap_or("-")) }
							td { (book.publisher_name.as_deref().unwrap_or("-")) }
							td { (book.pub_year) }
							td { (book.category) }
							td { (money(book.price)) }
							td { (book.stock_quantity) }
							@if can_buy {
								td {
									form method="POST" action="/store/cart/add" {
										input type="hidden" name="isbn" value=(book.isbn);
										button type="submit" disabled[book.stock_quantity <= 0] { "Add to cart" }
									}
								}
							}
						}
					}
				}
			}
		}
	}
}

async fn home<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	query: Result<Query<Search>, QueryRejection>,
) -> Markup {
	let search = query.map(|Query(s)| s).unwrap_or_default();
	let session = current(&state, &cookies).await;
	let content = match state.store.list_books().await {
		Ok(books) => html! {
			(search_form(&search))
			(book_table(&filter(books, &search), session.is_some()))
		},
		Err(err) => error_block(&err),
	};
	layout("Browse our collection", session.as_ref(), content)
}

// accounts

fn login_form(error: Option<&StoreError>) -> Markup {
	html! {
		@if let Some(err) = error { (error_block(err)) }
		form.stacked method="POST" action="/store/login" {
			input name="username" placeholder="username" required;
			input name="password" type="password" placeholder="password" required;
			button type="submit" { "Log in" }
		}
		p { "No account yet? " a href="/store/register" { "Register" } }
	}
}

fn register_form(error: Option<&StoreError>) -> Markup {
	html! {
		@if let Some(err) = error { (error_block(err)) }
		form.stacked method="POST" action="/store/register" {
			input name="username" placeholder="username" required;
			input name="password" type="password" placeholder="password" required;
			input name="first_name" placeholder="first name" required;
			input name="last_name" placeholder="last name" required;
			input name="email" type="email" placeholder="email" required;
			input name="phone" placeholder="phone";
			input name="shipping_address" placeholder="shipping address";
			button type="submit" { "Register" }
		}
	}
}

async fn login_page<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Markup {
	let session = current(&state, &cookies).await;
	layout("Log in", session.as_ref(), login_form(None))
}

async fn perform_login<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	form: Result<Form<Login>, FormRejection>,
) -> Response {
	let attempt = match form {
		Ok(Form(login)) => auth::login(&state.store, &login).await,
		Err(rejection) => Err(StoreError::validation(rejection.body_text())),
	};
	match attempt {
		Ok(customer) => {
			let token = state.sessions.open(customer).await;
			session::set_cookie(&cookies, token);
			Redirect::to("/store").into_response()
		},
		Err(err) => layout("Log in", None, login_form(Some(&err))).into_response(),
	}
}

async fn register_page<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Markup {
	let session = current(&state, &cookies).await;
	layout("Register", session.as_ref(), register_form(None))
}

async fn perform_register<S: Store>(
	State(state): State<AppState<S>>,
	form: Result<Form<Registration>, FormRejection>,
) -> Markup {
	let registered = match form {
		Ok(Form(registration)) => auth::register(&state.store, registration, state.bcrypt_cost).await,
		Err(rejection) => Err(StoreError::validation(rejection.body_text())),
	};
	match registered {
		Ok(customer) => layout(
			"Log in",
			None,
			html! {
				(notice(&format!("Welcome, {}! You can log in now.", customer.first_name)))
				(login_form(None))
			},
		),
		Err(err) => layout("Register", None, register_form(Some(&err))),
	}
}

async fn perform_logout<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Redirect {
	if let Some(token) = session::token(&cookies) {
		state.sessions.close(token).await;
	}
	session::clear_cookie(&cookies);
	Redirect::to("/store")
}

fn profile_form(session: &Session) -> Markup {
	let customer = &session.customer;
	html! {
		form.stacked method="POST" action="/store/profile" {
			label { "First name" input name="first_name" value=(customer.first_name) required; }
			label { "Last name" input name="last_name" value=(customer.last_name) required; }
			label { "Email" input name="email" type="email" value=(customer.email) required; }
			label { "Phone" input name="phone" value=(customer.phone.as_deref().unwrap_or("")); }
			label {
				"Shipping address"
				input name="shipping_address" value=(customer.shipping_address.as_deref().unwrap_or(""));
			}
			button type="submit" { "Save" }
		}
	}
}

async fn profile_page<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Response {
	match current(&state, &cookies).await {
		Some(session) => layout("My profile", Some(&session), profile_form(&session)).into_response(),
		None => Redirect::to("/store/login").into_response(),
	}
}

async fn update_profile<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	form: Result<Form<ProfileUpdate>, FormRejection>,
) -> Response {
	let Some(mut session) = current(&state, &cookies).await else {
		return Redirect::to("/store/login").into_response();
	};
	let updated = match form {
		Ok(Form(profile)) => match profile.validated() {
			Ok(profile) => state.store.update_profile(&session.customer.username, profile).await,
			Err(err) => Err(err),
		},
		Err(rejection) => Err(StoreError::validation(rejection.body_text())),
	};
	let banner = match updated {
		Ok(customer) => {
			state.sessions.refresh_customer(&customer).await;
			session.customer = customer;
			notice("Profile updated.")
		},
		Err(err) => error_block(&err),
	};
	let content = html! { (banner) (profile_form(&session)) };
	layout("My profile", Some(&session), content).into_response()
}

// cart and checkout

fn cart_view(cart: &Cart) -> Markup {
	html! {
		@if cart.is_empty() {
			p { "Your cart is empty. " a href="/store" { "Go shopping" } }
		} @else {
			table {
				thead { tr {
					th { "Title" } th { "Price" } th { "Quantity" } th { "Subtotal" } th {}
				} }
				tbody {
					@for item in cart.items() {
						tr {
							td { (item.title) }
							td { (money(item.price)) }
							td { (item.quantity) }
							td { (money(item.price * item.quantity as f64)) }
							td {
								form method="POST" action="/store/cart/remove" {
									input type="hidden" name="isbn" value=(item.isbn);
									button type="submit" { "Remove" }
								}
							}
						}
					}
				}
			}
			p.total { "Total: " (money(cart.total())) }
			form.stacked method="POST" action="/store/checkout" {
				input name="card_number" inputmode="numeric" placeholder="Card number (16 digits)" required;
				button type="submit" { "Place order" }
			}
		}
	}
}

async fn cart_page<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Response {
	match current(&state, &cookies).await {
		Some(session) => layout("Your cart", Some(&session), cart_view(&session.cart)).into_response(),
		None => Redirect::to("/store/login").into_response(),
	}
}

#[derive(Debug, Deserialize)]
struct IsbnForm {
	isbn: String,
}

async fn add_to_cart<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Form(form): Form<IsbnForm>,
) -> Response {
	let Some(session) = current(&state, &cookies).await else {
		return Redirect::to("/store/login").into_response();
	};
	let added = match state.store.get_book(form.isbn.trim()).await {
		Ok(book) => state
			.sessions
			.with_cart(session.token, |cart| cart.add(&book))
			.await
			.unwrap_or_else(|| Err(StoreError::validation("session expired"))),
		Err(err) => Err(err),
	};
	match added {
		Ok(()) => Redirect::to("/store/cart").into_response(),
		Err(err) => {
			let content = html! { (error_block(&err)) (cart_view(&session.cart)) };
			layout("Your cart", Some(&session), content).into_response()
		},
	}
}

async fn remove_from_cart<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Form(form): Form<IsbnForm>,
) -> Redirect {
	if let Some(token) = session::token(&cookies) {
		state.sessions.with_cart(token, |cart| cart.remove(&form.isbn)).await;
	}
	Redirect::to("/store/cart")
}

#[derive(Debug, Deserialize)]
struct CardForm {
	card_number: String,
}

fn receipt(order: &CustomerOrder) -> Markup {
	html! {
		(notice(&format!("Order #{} placed on {}.", order.order_id, order.order_date)))
		(order_table(order))
		a href="/store" { "Continue shopping" }
	}
}

async fn perform_checkout<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Form(form): Form<CardForm>,
) -> Response {
	let Some(session) = current(&state, &cookies).await else {
		return Redirect::to("/store/login").into_response();
	};
	let checkout = Checkout {
		customer_id: session.customer.customer_id,
		card_number: form.card_number,
		items: session.cart.lines(),
	};
	match checkout::place_order(&state.store, &checkout, today()).await {
		Ok(order) => {
			state.sessions.with_cart(session.token, |cart| cart.clear()).await;
			let session = state.sessions.get(session.token).await;
			layout("Thank you", session.as_ref(), receipt(&order)).into_response()
		},
		Err(err) => {
			let content = html! { (error_block(&err)) (cart_view(&session.cart)) };
			layout("Your cart", Some(&session), content).into_response()
		},
	}
}

fn order_table(order: &CustomerOrder) -> Markup {
	html! {
		table {
			thead { tr { th { "Title" } th { "Quantity" } th { "Price" } } }
			tbody {
				@for item in &order.items {
					tr {
						td { (item.title) }
						td { (item.quantity) }
						td { (money(item.price)) }
					}
				}
			}
			tfoot { tr { td colspan="2" { "Total" } td { (money(order.total_price)) } } }
		}
	}
}

async fn order_history<S: Store>(State(state): State<AppState<S>>, cookies: Cookies) -> Response {
	let Some(session) = current(&state, &cookies).await else {
		return Redirect::to("/store/login").into_response();
	};
	let content = match state.store.customer_orders(session.customer.customer_id).await {
		Ok(orders) if orders.is_empty() => html! { p { "No orders yet." } },
		Ok(orders) => html! {
			@for order in &orders {
				section.order {
					h2 { "Order #" (order.order_id) " - " (order.order_date) }
					(order_table(order))
				}
			}
		},
		Err(err) => error_block(&err),
	};
	layout("Order history", Some(&session), content).into_response()
}

// admin

#[derive(Debug, Clone, Default, Deserialize)]
struct AdminQuery {
	date: Option<String>,
	isbn: Option<String>,
}

fn inventory_table(books: &[Book]) -> Markup {
	html! {
		table.inventory {
			thead { tr {
				th { "ISBN" } th { "Title" } th { "Publisher" } th { "Price" }
				th { "Stock" } th { "Threshold" } th { "Reorder" } th {}
			} }
			tbody {
				@for book in books {
					tr.low[is_low(book)] {
						td { (book.isbn) }
						td { (book.title) }
						td { (book.publisher_name.as_deref().unwrap_or("-")) }
						td { (money(book.price)) }
						td { (book.stock_quantity) }
						td { (book.threshold) }
						td {
							form.inline method="POST" action="/store/admin/publisher-orders" {
								input type="hidden" name="isbn" value=(book.isbn);
								input type="number" name="quantity" min="1" value=(shortfall(book).max(1));
								button type="submit" { "Order" }
							}
						}
						td {
							form.inline method="POST" action="/store/admin/books/delete" {
								input type="hidden" name="isbn" value=(book.isbn);
								button type="submit" { "Delete" }
							}
						}
					}
				}
			}
		}
	}
}

fn publisher_orders_table(orders: &[PublisherOrder]) -> Markup {
	html! {
		@if orders.is_empty() {
			p { "No publisher orders." }
		} @else {
			table {
				thead { tr {
					th { "#" } th { "ISBN" } th { "Title" } th { "Publisher" }
					th { "Quantity" } th { "Date" } th { "Status" }
				} }
				tbody {
					@for order in orders {
						tr {
							td { (order.order_id) }
							td { (order.isbn) }
							td { (order.title.as_deref().unwrap_or("-")) }
							td { (order.publisher_name.as_deref().unwrap_or("-")) }
							td { (order.quantity) }
							td { (order.order_date) }
							td {
								@if order.status == OrderStatus::Pending {
									form.inline method="POST" action={ "/store/admin/publisher-orders/" (order.order_id) "/confirm" } {
										button type="submit" { "Confirm" }
									}
								} @else {
									(order.status)
								}
							}
						}
					}
				}
			}
		}
	}
}

fn book_form(publishers: &[Publisher]) -> Markup {
	html! {
		form.stacked method="POST" action="/store/admin/books" {
			input name="isbn" placeholder="ISBN" required;
			input name="title" placeholder="title" required;
			input name="author" placeholder="author";
			select name="p_id" required {
				@for publisher in publishers {
					option value=(publisher.p_id) { (publisher.name) }
				}
			}
			input name="pub_year" type="number" placeholder="year" required;
			input name="price" type="number" step="0.01" min="0" placeholder="price" required;
			select name="category" {
				@for category in CATEGORIES {
					option value=(category) { (category) }
				}
			}
			input name="stock_quantity" type="number" min="0" placeholder="stock" required;
			input name="threshold" type="number" min="0" placeholder="threshold" required;
			button type="submit" { "Add book" }
		}
		form.inline method="POST" action="/store/admin/publishers" {
			input name="name" placeholder="new publisher" required;
			button type="submit" { "Add publisher" }
		}
	}
}

async fn reports_view<S: Store>(store: &S, query: &AdminQuery) -> StoreResult<Markup> {
	let month = reports::previous_month_sales(store, today()).await?;
	let customers = store.top_customers(TOP_CUSTOMERS).await?;
	let books = store.top_books(TOP_BOOKS).await?;

	let daily = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
		Some(raw) => Some(reports::sales_on(store, reports::parse_date(raw)?).await?),
		None => None,
	};
	let ordered = match query.isbn.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
		Some(isbn) => Some(store.book_order_count(isbn).await?),
		None => None,
	};

	Ok(html! {
		p { "Sales in " (month.month) ": " (money(month.total_sales)) " over " (month.order_count) " orders" }
		h3 { "Top customers" }
		ol {
			@for c in &customers {
				li { (c.first_name) " " (c.last_name) " - " (money(c.total_spent)) }
			}
		}
		h3 { "Top books" }
		ol {
			@for b in &books {
				li { (b.title) " (" (b.isbn) ") - " (b.total_copies_sold) " sold" }
			}
		}
		form.inline method="GET" action="/store/admin" {
			input type="date" name="date" value=(query.date.as_deref().unwrap_or(""));
			button type="submit" { "Sales on date" }
		}
		@if let Some(daily) = daily {
			p { (daily.date) ": " (money(daily.total_sales)) " over " (daily.order_count) " orders" }
		}
		form.inline method="GET" action="/store/admin" {
			input name="isbn" placeholder="ISBN" value=(query.isbn.as_deref().unwrap_or(""));
			button type="submit" { "Copies ordered from publisher" }
		}
		@if let Some(ordered) = ordered {
			p { (ordered.title) " (" (ordered.isbn) "): " (ordered.total_quantity_ordered) " copies ordered" }
		}
	})
}

async fn admin_content<S: Store>(store: &S, query: &AdminQuery) -> StoreResult<Markup> {
	let books = store.list_books().await?;
	let publishers = store.list_publishers().await?;
	let orders = store.list_publisher_orders().await?;
	let reports = match reports_view(store, query).await {
		Ok(reports) => reports,
		Err(err) => error_block(&err),
	};
	Ok(html! {
		section {
			h2 { "Inventory" }
			(inventory_table(&books))
			(book_form(&publishers))
		}
		section {
			h2 { "Publisher orders" }
			(publisher_orders_table(&orders))
		}
		section {
			h2 { "Reports" }
			(reports)
		}
	})
}

async fn render_admin<S: Store>(
	state: &AppState<S>,
	cookies: &Cookies,
	query: &AdminQuery,
	error: Option<StoreError>,
) -> Markup {
	let session = current(state, cookies).await;
	let content = match admin_content(&state.store, query).await {
		Ok(content) => content,
		Err(err) => error_block(&err),
	};
	let content = html! {
		@if let Some(err) = &error { (error_block(err)) }
		(content)
	};
	layout("Admin", session.as_ref(), content)
}

async fn admin_page<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	query: Result<Query<AdminQuery>, QueryRejection>,
) -> Markup {
	let query = query.map(|Query(q)| q).unwrap_or_default();
	render_admin(&state, &cookies, &query, None).await
}

/// Redirects back to the admin page, or shows it again with the failure.
async fn after_admin_action<S: Store>(
	state: &AppState<S>,
	cookies: &Cookies,
	outcome: StoreResult<()>,
) -> Response {
	match outcome {
		Ok(()) => Redirect::to("/store/admin").into_response(),
		Err(err) => render_admin(state, cookies, &AdminQuery::default(), Some(err))
			.await
			.into_response(),
	}
}

async fn admin_add_book<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	form: Result<Form<NewBook>, FormRejection>,
) -> Response {
	let outcome = match form {
		Ok(Form(book)) => match book.validated() {
			Ok(book) => state.store.create_book(book).await.map(|_| ()),
			Err(err) => Err(err),
		},
		Err(rejection) => Err(StoreError::validation(rejection.body_text())),
	};
	after_admin_action(&state, &cookies, outcome).await
}

async fn admin_delete_book<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Form(form): Form<IsbnForm>,
) -> Response {
	let outcome = state.store.delete_book(form.isbn.trim()).await;
	after_admin_action(&state, &cookies, outcome).await
}

async fn admin_add_publisher<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Form(publisher): Form<NewPublisher>,
) -> Response {
	let outcome = state.store.create_publisher(&publisher.name).await.map(|_| ());
	after_admin_action(&state, &cookies, outcome).await
}

async fn admin_order_copies<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	form: Result<Form<NewPublisherOrder>, FormRejection>,
) -> Response {
	let outcome = match form {
		Ok(Form(order)) => state
			.store
			.create_publisher_order(order.isbn.trim(), order.quantity, today())
			.await
			.map(|order| info!(order_id = order.order_id, "copies ordered from storefront")),
		Err(rejection) => Err(StoreError::validation(rejection.body_text())),
	};
	after_admin_action(&state, &cookies, outcome).await
}

async fn admin_confirm_order<S: Store>(
	State(state): State<AppState<S>>,
	cookies: Cookies,
	Path(order_id): Path<Oid>,
) -> Response {
	let outcome = state.store.confirm_publisher_order(order_id).await.map(|_| ());
	after_admin_action(&state, &cookies, outcome).await
}
