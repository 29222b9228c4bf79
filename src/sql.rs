use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

use crate::checkout::order_total;
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::reports::{BookOrderCount, BookSales, CustomerSpend, SalesTotals};
use crate::store::Store;
use crate::types::{
	Book, BookUpdate, CartLine, Cid, Customer, CustomerCredentials, CustomerOrder, NewBook,
	NewCustomer, Oid, OrderItem, OrderStatus, Pid, ProfileUpdate, Publisher, PublisherOrder,
};

pub const TABLE_SCHEMA: &str = r#"

CREATE TABLE IF NOT EXISTS publishers (
	p_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books (
	isbn TEXT NOT NULL PRIMARY KEY,
	title TEXT NOT NULL,
	p_id INTEGER NOT NULL,
	pub_year INTEGER NOT NULL,
	price REAL NOT NULL,
	category TEXT NOT NULL,
	stock_quantity INTEGER NOT NULL DEFAULT 0,
	threshold INTEGER NOT NULL DEFAULT 0,
	CHECK(price >= 0),
	CHECK(stock_quantity >= 0),
	CHECK(threshold >= 0),
	FOREIGN KEY(p_id) REFERENCES publishers(p_id)
);

CREATE TABLE IF NOT EXISTS authors (
	a_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS book_authors (
	isbn TEXT NOT NULL,
	a_id INTEGER NOT NULL,
	UNIQUE(isbn, a_id),
	FOREIGN KEY(isbn) REFERENCES books(isbn) ON DELETE CASCADE,
	FOREIGN KEY(a_id) REFERENCES authors(a_id)
);

CREATE TABLE IF NOT EXISTS customers (
	customer_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	username TEXT NOT NULL UNIQUE,
	password_hash TEXT NOT NULL,
	first_name TEXT NOT NULL,
	last_name TEXT NOT NULL,
	email TEXT NOT NULL,
	phone TEXT DEFAULT NULL,
	shipping_address TEXT DEFAULT NULL
);

CREATE TABLE IF NOT EXISTS customer_orders (
	order_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	customer_id INTEGER NOT NULL,
	order_date TEXT NOT NULL,
	total_price REAL NOT NULL,
	FOREIGN KEY(customer_id) REFERENCES customers(customer_id)
);

CREATE TABLE IF NOT EXISTS order_items (
	order_id INTEGER NOT NULL,
	isbn TEXT NOT NULL,
	title TEXT NOT NULL,
	quantity INTEGER NOT NULL,
	price REAL NOT NULL,
	CHECK(quantity > 0),
	FOREIGN KEY(order_id) REFERENCES customer_orders(order_id)
);

CREATE TABLE IF NOT EXISTS book_orders (
	order_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	isbn TEXT NOT NULL,
	quantity INTEGER NOT NULL,
	status TEXT NOT NULL DEFAULT 'Pending',
	order_date TEXT NOT NULL,
	CHECK(quantity > 0),
	CHECK(status IN ('Pending', 'Confirmed'))
);

"#;

// ledger tables keep the isbn without a foreign key: orders outlive the books they mention

const SELECT_BOOKS: &str = r#"
SELECT
	b.isbn, b.title, b.p_id, p.name AS publisher_name,
	GROUP_CONCAT(a.name, ', ') AS author_name,
	b.pub_year, b.price, b.category, b.stock_quantity, b.threshold
FROM
	books b
	LEFT JOIN publishers p ON p.p_id = b.p_id
	LEFT JOIN book_authors ba ON ba.isbn = b.isbn
	LEFT JOIN authors a ON a.a_id = ba.a_id
"#;

const SELECT_PUBLISHER_ORDERS: &str = r#"
SELECT
	o.order_id, o.isbn, b.title, p.name AS publisher_name,
	o.quantity, o.status, o.order_date
FROM
	book_orders o
	LEFT JOIN books b ON b.isbn = o.isbn
	LEFT JOIN publishers p ON p.p_id = b.p_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct PublisherOrderRow {
	order_id: Oid,
	isbn: String,
	title: Option<String>,
	publisher_name: Option<String>,
	quantity: i64,
	status: String,
	order_date: NaiveDate,
}

impl TryFrom<PublisherOrderRow> for PublisherOrder {
	type Error = StoreError;

	fn try_from(row: PublisherOrderRow) -> Result<Self, Self::Error> {
		Ok(PublisherOrder {
			order_id: row.order_id,
			isbn: row.isbn,
			title: row.title,
			publisher_name: row.publisher_name,
			quantity: row.quantity,
			status: row.status.parse()?,
			order_date: row.order_date,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
	order_id: Oid,
	customer_id: Cid,
	order_date: NaiveDate,
	total_price: f64,
}

/// Catalog and ledgers persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqlStore {
	db: Pool<Sqlite>,
}

impl SqlStore {
	pub async fn connect(config: &Config) -> StoreResult<Self> {
		let options = SqliteConnectOptions::from_str(&config.database_url)?
			.create_if_missing(true)
			.foreign_keys(true);

		// set up connection pool
		let db = SqlitePoolOptions::new()
			.max_connections(config.max_connections)
			.acquire_timeout(config.acquire_timeout)
			.connect_with(options)
			.await?;

		let store = SqlStore { db };
		store.schema().await?;
		info!(url = %config.database_url, "connected to database");
		Ok(store)
	}

	/// A private database living in a single pooled connection.
	pub async fn in_memory() -> StoreResult<Self> {
		let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
		let db = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.acquire_timeout(Duration::from_secs(3))
			.connect_with(options)
			.await?;
		let store = SqlStore { db };
		store.schema().await?;
		Ok(store)
	}

	pub async fn schema(&self) -> StoreResult<()> {
		sqlx::query(TABLE_SCHEMA).execute(&self.db).await?;
		Ok(())
	}

	pub async fn close(&self) {
		self.db.close().await;
	}
}

async fn fetch_book(conn: &mut SqliteConnection, isbn: &str) -> StoreResult<Option<Book>> {
	let query = format!("{SELECT_BOOKS} WHERE b.isbn = ? GROUP BY b.isbn");
	let book = sqlx::query_as::<_, Book>(&query)
		.bind(isbn)
		.fetch_optional(conn)
		.await?;
	Ok(book)
}

async fn fetch_publisher_order(conn: &mut SqliteConnection, order_id: Oid) -> StoreResult<PublisherOrder> {
	let query = format!("{SELECT_PUBLISHER_ORDERS} WHERE o.order_id = ?");
	let row = sqlx::query_as::<_, PublisherOrderRow>(&query)
		.bind(order_id)
		.fetch_optional(conn)
		.await?
		.ok_or_else(|| StoreError::not_found(format!("publisher order {order_id}")))?;
	row.try_into()
}

async fn check_publisher(conn: &mut SqliteConnection, p_id: Pid) -> StoreResult<()> {
	let exists: Option<(i64,)> = sqlx::query_as("SELECT p_id FROM publishers WHERE p_id = ?")
		.bind(p_id)
		.fetch_optional(conn)
		.await?;
	match exists {
		Some(_) => Ok(()),
		None => Err(StoreError::validation(format!("publisher {p_id} does not exist"))),
	}
}

/// Links `name` to the book, reusing an existing author of that name.
async fn link_author(conn: &mut SqliteConnection, isbn: &str, name: &str) -> StoreResult<()> {
	let existing: Option<(i64,)> = sqlx::query_as("SELECT a_id FROM authors WHERE name = ? LIMIT 1")
		.bind(name)
		.fetch_optional(&mut *conn)
		.await?;
	let a_id = match existing {
		Some((a_id,)) => a_id,
		None => sqlx::query("INSERT INTO authors (name) VALUES (?)")
			.bind(name)
			.execute(&mut *conn)
			.await?
			.last_insert_rowid(),
	};
	sqlx::query("INSERT OR IGNORE INTO book_authors (isbn, a_id) VALUES (?, ?)")
		.bind(isbn)
		.bind(a_id)
		.execute(&mut *conn)
		.await?;
	Ok(())
}

async fn fetch_customer(conn: &mut SqliteConnection, username: &str) -> StoreResult<Option<Customer>> {
	let customer = sqlx::query_as::<_, Customer>(
		r#"
SELECT customer_id, username, first_name, last_name, email, phone, shipping_address
FROM customers
WHERE username = ?
		"#,
	)
	.bind(username)
	.fetch_optional(conn)
	.await?;
	Ok(customer)
}

impl Store for SqlStore {
	#[instrument(skip(self))]
	async fn list_books(&self) -> StoreResult<Vec<Book>> {
		let query = format!("{SELECT_BOOKS} GROUP BY b.isbn ORDER BY b.isbn");
		let books = sqlx::query_as::<_, Book>(&query).fetch_all(&self.db).await?;
		debug!(count = books.len(), "listed books");
		Ok(books)
	}

	#[instrument(skip(self))]
	async fn get_book(&self, isbn: &str) -> StoreResult<Book> {
		let mut conn = self.db.acquire().await?;
		fetch_book(&mut conn, isbn)
			.await?
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))
	}

	#[instrument(skip(self, book), fields(isbn = %book.isbn))]
	async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
		let mut tx = self.db.begin().await?;
		check_publisher(&mut tx, book.p_id).await?;

		sqlx::query(
			r#"
INSERT INTO books
	(isbn, title, p_id, pub_year, price, category, stock_quantity, threshold)
VALUES
	(?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&book.isbn)
		.bind(&book.title)
		.bind(book.p_id)
		.bind(book.pub_year)
		.bind(book.price)
		.bind(&book.category)
		.bind(book.stock_quantity)
		.bind(book.threshold)
		.execute(&mut *tx)
		.await
		.map_err(|e| match StoreError::from(e) {
			StoreError::DuplicateKey(_) => {
				StoreError::DuplicateKey(format!("book {} already exists", book.isbn))
			},
			other => other,
		})?;

		if let Some(author) = &book.author {
			link_author(&mut tx, &book.isbn, author).await?;
		}

		let created = fetch_book(&mut tx, &book.isbn)
			.await?
			.ok_or_else(|| StoreError::Storage(format!("book {} vanished after insert", book.isbn)))?;
		tx.commit().await?;
		info!("book created");
		Ok(created)
	}

	#[instrument(skip(self, update))]
	async fn update_book(&self, isbn: &str, update: BookUpdate) -> StoreResult<Book> {
		let mut tx = self.db.begin().await?;
		check_publisher(&mut tx, update.p_id).await?;

		let matched = sqlx::query(
			r#"
UPDATE books SET
	title = ?, p_id = ?, pub_year = ?, price = ?, category = ?,
	stock_quantity = ?, threshold = ?
WHERE
	isbn = ?
			"#,
		)
		.bind(&update.title)
		.bind(update.p_id)
		.bind(update.pub_year)
		.bind(update.price)
		.bind(&update.category)
		.bind(update.stock_quantity)
		.bind(update.threshold)
		.bind(isbn)
		.execute(&mut *tx)
		.await?
		.rows_affected();
		if matched == 0 {
			return Err(StoreError::not_found(format!("book {isbn}")));
		}

		if let Some(author) = &update.author {
			// authors are shared, only this book's link moves
			sqlx::query("DELETE FROM book_authors WHERE isbn = ?")
				.bind(isbn)
				.execute(&mut *tx)
				.await?;
			link_author(&mut tx, isbn, author).await?;
		}

		let updated = fetch_book(&mut tx, isbn)
			.await?
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		tx.commit().await?;
		info!("book updated");
		Ok(updated)
	}

	#[instrument(skip(self))]
	async fn delete_book(&self, isbn: &str) -> StoreResult<()> {
		let mut tx = self.db.begin().await?;
		sqlx::query("DELETE FROM book_authors WHERE isbn = ?")
			.bind(isbn)
			.execute(&mut *tx)
			.await?;
		let deleted = sqlx::query("DELETE FROM books WHERE isbn = ?")
			.bind(isbn)
			.execute(&mut *tx)
			.await?
			.rows_affected();
		tx.commit().await?;
		info!(deleted, "book deleted");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn list_publishers(&self) -> StoreResult<Vec<Publisher>> {
		let publishers = sqlx::query_as::<_, Publisher>("SELECT p_id, name FROM publishers ORDER BY p_id")
			.fetch_all(&self.db)
			.await?;
		Ok(publishers)
	}

	#[instrument(skip(self))]
	async fn create_publisher(&self, name: &str) -> StoreResult<Publisher> {
		let name = name.trim();
		if name.is_empty() {
			return Err(StoreError::validation("publisher name is required"));
		}
		let p_id = sqlx::query("INSERT INTO publishers (name) VALUES (?)")
			.bind(name)
			.execute(&self.db)
			.await
			.map_err(|e| match StoreError::from(e) {
				StoreError::DuplicateKey(_) => {
					StoreError::DuplicateKey(format!("publisher {name} already exists"))
				},
				other => other,
			})?
			.last_insert_rowid();
		Ok(Publisher {
			p_id,
			name: name.to_string(),
		})
	}

	#[instrument(skip(self, customer), fields(username = %customer.username))]
	async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
		let customer_id = sqlx::query(
			r#"
INSERT INTO customers
	(username, password_hash, first_name, last_name, email, phone, shipping_address)
VALUES
	(?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&customer.username)
		.bind(&customer.password_hash)
		.bind(&customer.first_name)
		.bind(&customer.last_name)
		.bind(&customer.email)
		.bind(&customer.phone)
		.bind(&customer.shipping_address)
		.execute(&self.db)
		.await
		.map_err(|e| match StoreError::from(e) {
			StoreError::DuplicateKey(_) => {
				StoreError::DuplicateKey(format!("username {} is taken", customer.username))
			},
			other => other,
		})?
		.last_insert_rowid();

		Ok(Customer {
			customer_id,
			username: customer.username,
			first_name: customer.first_name,
			last_name: customer.last_name,
			email: customer.email,
			phone: customer.phone,
			shipping_address: customer.shipping_address,
		})
	}

	#[instrument(skip(self))]
	async fn find_credentials(&self, username: &str) -> StoreResult<Option<CustomerCredentials>> {
		let found = sqlx::query_as::<_, CustomerCredentials>(
			r#"
SELECT
	customer_id, username, password_hash, first_name, last_name,
	email, phone, shipping_address
FROM customers
WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.db)
		.await?;
		Ok(found)
	}

	#[instrument(skip(self, profile))]
	async fn update_profile(&self, username: &str, profile: ProfileUpdate) -> StoreResult<Customer> {
		let mut tx = self.db.begin().await?;
		let matched = sqlx::query(
			r#"
UPDATE customers SET
	first_name = ?, last_name = ?, email = ?, phone = ?, shipping_address = ?
WHERE
	username = ?
			"#,
		)
		.bind(&profile.first_name)
		.bind(&profile.last_name)
		.bind(&profile.email)
		.bind(&profile.phone)
		.bind(&profile.shipping_address)
		.bind(username)
		.execute(&mut *tx)
		.await?
		.rows_affected();
		if matched == 0 {
			return Err(StoreError::not_found(format!("customer {username}")));
		}
		let customer = fetch_customer(&mut tx, username)
			.await?
			.ok_or_else(|| StoreError::not_found(format!("customer {username}")))?;
		tx.commit().await?;
		Ok(customer)
	}

	#[instrument(skip(self, lines), fields(lines = lines.len()))]
	async fn place_order(&self, customer_id: Cid, lines: &[CartLine], date: NaiveDate) -> StoreResult<CustomerOrder> {
		let mut tx = self.db.begin().await?;

		let customer: Option<(i64,)> = sqlx::query_as("SELECT customer_id FROM customers WHERE customer_id = ?")
			.bind(customer_id)
			.fetch_optional(&mut *tx)
			.await?;
		if customer.is_none() {
			return Err(StoreError::not_found(format!("customer {customer_id}")));
		}

		let mut items = Vec::with_capacity(lines.len());
		for line in lines {
			let (title, price, available): (String, f64, i64) =
				sqlx::query_as("SELECT title, price, stock_quantity FROM books WHERE isbn = ?")
					.bind(&line.isbn)
					.fetch_optional(&mut *tx)
					.await?
					.ok_or_else(|| StoreError::not_found(format!("book {}", line.isbn)))?;

			let taken = sqlx::query(
				"UPDATE books SET stock_quantity = stock_quantity - ? WHERE isbn = ? AND stock_quantity >= ?",
			)
			.bind(line.quantity)
			.bind(&line.isbn)
			.bind(line.quantity)
			.execute(&mut *tx)
			.await?
			.rows_affected();
			if taken == 0 {
				return Err(StoreError::InsufficientStock {
					isbn: line.isbn.clone(),
					requested: line.quantity,
					available,
				});
			}

			items.push(OrderItem {
				isbn: line.isbn.clone(),
				title,
				quantity: line.quantity,
				price,
			});
		}

		let total_price = order_total(&items);
		let order_id = sqlx::query("INSERT INTO customer_orders (customer_id, order_date, total_price) VALUES (?, ?, ?)")
			.bind(customer_id)
			.bind(date)
			.bind(total_price)
			.execute(&mut *tx)
			.await?
			.last_insert_rowid();

		for item in &items {
			sqlx::query("INSERT INTO order_items (order_id, isbn, title, quantity, price) VALUES (?, ?, ?, ?, ?)")
				.bind(order_id)
				.bind(&item.isbn)
				.bind(&item.title)
				.bind(item.quantity)
				.bind(item.price)
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;
		Ok(CustomerOrder {
			order_id,
			customer_id,
			order_date: date,
			total_price,
			items,
		})
	}

	#[instrument(skip(self))]
	async fn customer_orders(&self, customer_id: Cid) -> StoreResult<Vec<CustomerOrder>> {
		let mut conn = self.db.acquire().await?;

		let customer: Option<(i64,)> = sqlx::query_as("SELECT customer_id FROM customers WHERE customer_id = ?")
			.bind(customer_id)
			.fetch_optional(&mut *conn)
			.await?;
		if customer.is_none() {
			return Err(StoreError::not_found(format!("customer {customer_id}")));
		}

		let rows = sqlx::query_as::<_, OrderRow>(
			r#"
SELECT order_id, customer_id, order_date, total_price
FROM customer_orders
WHERE customer_id = ?
ORDER BY order_date DESC, order_id DESC
			"#,
		)
		.bind(customer_id)
		.fetch_all(&mut *conn)
		.await?;

		let mut orders = Vec::with_capacity(rows.len());
		for row in rows {
			let items = sqlx::query_as::<_, OrderItem>(
				"SELECT isbn, title, quantity, price FROM order_items WHERE order_id = ? ORDER BY rowid",
			)
			.bind(row.order_id)
			.fetch_all(&mut *conn)
			.await?;
			orders.push(CustomerOrder {
				order_id: row.order_id,
				customer_id: row.customer_id,
				order_date: row.order_date,
				total_price: row.total_price,
				items,
			});
		}
		Ok(orders)
	}

	#[instrument(skip(self))]
	async fn create_publisher_order(&self, isbn: &str, quantity: i64, date: NaiveDate) -> StoreResult<PublisherOrder> {
		if quantity <= 0 {
			return Err(StoreError::validation("order quantity must be positive"));
		}
		let mut tx = self.db.begin().await?;
		if fetch_book(&mut tx, isbn).await?.is_none() {
			return Err(StoreError::not_found(format!("book {isbn}")));
		}
		let order_id = sqlx::query("INSERT INTO book_orders (isbn, quantity, status, order_date) VALUES (?, ?, ?, ?)")
			.bind(isbn)
			.bind(quantity)
			.bind(OrderStatus::Pending.to_string())
			.bind(date)
			.execute(&mut *tx)
			.await?
			.last_insert_rowid();
		let order = fetch_publisher_order(&mut tx, order_id).await?;
		tx.commit().await?;
		info!(order_id, "publisher order created");
		Ok(order)
	}

	#[instrument(skip(self))]
	async fn list_publisher_orders(&self) -> StoreResult<Vec<PublisherOrder>> {
		let query = format!("{SELECT_PUBLISHER_ORDERS} ORDER BY o.order_id DESC");
		sqlx::query_as::<_, PublisherOrderRow>(&query)
			.fetch_all(&self.db)
			.await?
			.into_iter()
			.map(PublisherOrder::try_from)
			.collect()
	}

	#[instrument(skip(self))]
	async fn confirm_publisher_order(&self, order_id: Oid) -> StoreResult<PublisherOrder> {
		let mut tx = self.db.begin().await?;

		let (isbn, quantity, status): (String, i64, String) =
			sqlx::query_as("SELECT isbn, quantity, status FROM book_orders WHERE order_id = ?")
				.bind(order_id)
				.fetch_optional(&mut *tx)
				.await?
				.ok_or_else(|| StoreError::not_found(format!("publisher order {order_id}")))?;
		if status.parse::<OrderStatus>()? == OrderStatus::Confirmed {
			return Err(StoreError::AlreadyConfirmed(order_id));
		}

		let flipped = sqlx::query("UPDATE book_orders SET status = ? WHERE order_id = ? AND status = ?")
			.bind(OrderStatus::Confirmed.to_string())
			.bind(order_id)
			.bind(OrderStatus::Pending.to_string())
			.execute(&mut *tx)
			.await?
			.rows_affected();
		if flipped == 0 {
			return Err(StoreError::AlreadyConfirmed(order_id));
		}

		let stock: i64 = sqlx::query_scalar("SELECT stock_quantity FROM books WHERE isbn = ?")
			.bind(&isbn)
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		let restocked = stock
			.checked_add(quantity)
			.ok_or_else(|| StoreError::validation(format!("stock for {isbn} would overflow")))?;
		sqlx::query("UPDATE books SET stock_quantity = ? WHERE isbn = ?")
			.bind(restocked)
			.bind(&isbn)
			.execute(&mut *tx)
			.await?;

		let order = fetch_publisher_order(&mut tx, order_id).await?;
		tx.commit().await?;
		info!(%isbn, quantity, "publisher order confirmed");
		Ok(order)
	}

	#[instrument(skip(self))]
	async fn sales_between(&self, from: NaiveDate, until: NaiveDate) -> StoreResult<SalesTotals> {
		let (total_sales, order_count): (f64, i64) = sqlx::query_as(
			r#"
SELECT COALESCE(SUM(total_price), 0.0), COUNT(*)
FROM customer_orders
WHERE order_date >= ? AND order_date < ?
			"#,
		)
		.bind(from)
		.bind(until)
		.fetch_one(&self.db)
		.await?;
		Ok(SalesTotals {
			total_sales,
			order_count,
		})
	}

	#[instrument(skip(self))]
	async fn top_customers(&self, limit: i64) -> StoreResult<Vec<CustomerSpend>> {
		let top = sqlx::query_as::<_, CustomerSpend>(
			r#"
SELECT c.customer_id, c.first_name, c.last_name, SUM(o.total_price) AS total_spent
FROM
	customer_orders o
	JOIN customers c ON c.customer_id = o.customer_id
GROUP BY c.customer_id, c.first_name, c.last_name
ORDER BY total_spent DESC, c.customer_id
LIMIT ?
			"#,
		)
		.bind(limit)
		.fetch_all(&self.db)
		.await?;
		Ok(top)
	}

	#[instrument(skip(self))]
	async fn top_books(&self, limit: i64) -> StoreResult<Vec<BookSales>> {
		let top = sqlx::query_as::<_, BookSales>(
			r#"
SELECT isbn, MAX(title) AS title, SUM(quantity) AS total_copies_sold
FROM order_items
GROUP BY isbn
ORDER BY total_copies_sold DESC, isbn
LIMIT ?
			"#,
		)
		.bind(limit)
		.fetch_all(&self.db)
		.await?;
		Ok(top)
	}

	#[instrument(skip(self))]
	async fn book_order_count(&self, isbn: &str) -> StoreResult<BookOrderCount> {
		let (title,): (String,) = sqlx::query_as("SELECT title FROM books WHERE isbn = ?")
			.bind(isbn)
			.fetch_optional(&self.db)
			.await?
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		let (total_quantity_ordered,): (i64,) =
			sqlx::query_as("SELECT COALESCE(SUM(quantity), 0) FROM book_orders WHERE isbn = ?")
				.bind(isbn)
				.fetch_one(&self.db)
				.await?;
		Ok(BookOrderCount {
			isbn: isbn.to_string(),
			title,
			total_quantity_ordered,
		})
	}
}
