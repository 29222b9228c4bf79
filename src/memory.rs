//! In-memory implementation of [`Store`]: the mock data source the storefront
//! can run against without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::checkout::order_total;
use crate::error::{StoreError, StoreResult};
use crate::reports::{BookOrderCount, BookSales, CustomerSpend, SalesTotals};
use crate::store::Store;
use crate::types::{
	Book, BookUpdate, CartLine, Cid, Customer, CustomerCredentials, CustomerOrder, Isbn, NewBook,
	NewCustomer, Oid, OrderItem, OrderStatus, Pid, ProfileUpdate, Publisher, PublisherOrder,
};

type Aid = i64;

#[derive(Debug, Clone)]
struct BookRow {
	title: String,
	p_id: Pid,
	pub_year: i32,
	price: f64,
	category: String,
	stock_quantity: i64,
	threshold: i64,
}

#[derive(Debug, Clone)]
struct PublisherOrderRow {
	isbn: Isbn,
	quantity: i64,
	status: OrderStatus,
	order_date: NaiveDate,
}

#[derive(Debug, Default)]
struct Catalog {
	books: BTreeMap<Isbn, BookRow>,
	publishers: BTreeMap<Pid, String>,
	authors: BTreeMap<Aid, String>,
	book_authors: Vec<(Isbn, Aid)>,
	customers: BTreeMap<Cid, CustomerCredentials>,
	orders: Vec<CustomerOrder>,
	publisher_orders: BTreeMap<Oid, PublisherOrderRow>,
	last_id: i64,
}

impl Catalog {
	fn next_id(&mut self) -> i64 {
		self.last_id += 1;
		self.last_id
	}

	fn listing(&self, isbn: &str, row: &BookRow) -> Book {
		let authors: Vec<&str> = self
			.book_authors
			.iter()
			.filter(|(b, _)| b == isbn)
			.filter_map(|(_, a_id)| self.authors.get(a_id).map(String::as_str))
			.collect();
		Book {
			isbn: isbn.to_string(),
			title: row.title.clone(),
			p_id: row.p_id,
			publisher_name: self.publishers.get(&row.p_id).cloned(),
			author_name: (!authors.is_empty()).then(|| authors.join(", ")),
			pub_year: row.pub_year,
			price: row.price,
			category: row.category.clone(),
			stock_quantity: row.stock_quantity,
			threshold: row.threshold,
		}
	}

	fn book(&self, isbn: &str) -> StoreResult<Book> {
		self.books
			.get(isbn)
			.map(|row| self.listing(isbn, row))
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))
	}

	fn check_publisher(&self, p_id: Pid) -> StoreResult<()> {
		if self.publishers.contains_key(&p_id) {
			Ok(())
		} else {
			Err(StoreError::validation(format!("publisher {p_id} does not exist")))
		}
	}

	fn link_author(&mut self, isbn: &str, name: &str) {
		let existing = self
			.authors
			.iter()
			.find(|(_, n)| n.as_str() == name)
			.map(|(id, _)| *id);
		let a_id = match existing {
			Some(id) => id,
			None => {
				let id = self.next_id();
				self.authors.insert(id, name.to_string());
				id
			},
		};
		if !self.book_authors.iter().any(|(b, a)| b == isbn && *a == a_id) {
			self.book_authors.push((isbn.to_string(), a_id));
		}
	}

	fn publisher_order(&self, order_id: Oid) -> StoreResult<PublisherOrder> {
		let row = self
			.publisher_orders
			.get(&order_id)
			.ok_or_else(|| StoreError::not_found(format!("publisher order {order_id}")))?;
		let book = self.books.get(&row.isbn);
		Ok(PublisherOrder {
			order_id,
			isbn: row.isbn.clone(),
			title: book.map(|b| b.title.clone()),
			publisher_name: book.and_then(|b| self.publishers.get(&b.p_id).cloned()),
			quantity: row.quantity,
			status: row.status,
			order_date: row.order_date,
		})
	}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	catalog: Arc<Mutex<Catalog>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Store for MemoryStore {
	#[instrument(skip(self))]
	async fn list_books(&self) -> StoreResult<Vec<Book>> {
		let catalog = self.catalog.lock().await;
		let books: Vec<Book> = catalog
			.books
			.iter()
			.map(|(isbn, row)| catalog.listing(isbn, row))
			.collect();
		debug!(count = books.len(), "listed books");
		Ok(books)
	}

	#[instrument(skip(self))]
	async fn get_book(&self, isbn: &str) -> StoreResult<Book> {
		self.catalog.lock().await.book(isbn)
	}

	#[instrument(skip(self, book), fields(isbn = %book.isbn))]
	async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
		let mut catalog = self.catalog.lock().await;
		catalog.check_publisher(book.p_id)?;
		if catalog.books.contains_key(&book.isbn) {
			return Err(StoreError::DuplicateKey(format!("book {} already exists", book.isbn)));
		}
		catalog.books.insert(
			book.isbn.clone(),
			BookRow {
				title: book.title,
				p_id: book.p_id,
				pub_year: book.pub_year,
				price: book.price,
				category: book.category,
				stock_quantity: book.stock_quantity,
				threshold: book.threshold,
			},
		);
		if let Some(author) = &book.author {
			catalog.link_author(&book.isbn, author);
		}
		info!("book created");
		catalog.book(&book.isbn)
	}

	#[instrument(skip(self, update))]
	async fn update_book(&self, isbn: &str, update: BookUpdate) -> StoreResult<Book> {
		let mut catalog = self.catalog.lock().await;
		catalog.check_publisher(update.p_id)?;
		let row = catalog
			.books
			.get_mut(isbn)
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		*row = BookRow {
			title: update.title,
			p_id: update.p_id,
			pub_year: update.pub_year,
			price: update.price,
			category: update.category,
			stock_quantity: update.stock_quantity,
			threshold: update.threshold,
		};

		if let Some(author) = update.author {
			catalog.book_authors.retain(|(b, _)| b != isbn);
			catalog.link_author(isbn, &author);
		}
		info!("book updated");
		catalog.book(isbn)
	}

	#[instrument(skip(self))]
	async fn delete_book(&self, isbn: &str) -> StoreResult<()> {
		let mut catalog = self.catalog.lock().await;
		let deleted = catalog.books.remove(isbn).is_some();
		catalog.book_authors.retain(|(b, _)| b != isbn);
		info!(deleted, "book deleted");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn list_publishers(&self) -> StoreResult<Vec<Publisher>> {
		let catalog = self.catalog.lock().await;
		Ok(catalog
			.publishers
			.iter()
			.map(|(p_id, name)| Publisher {
				p_id: *p_id,
				name: name.clone(),
			})
			.collect())
	}

	#[instrument(skip(self))]
	async fn create_publisher(&self, name: &str) -> StoreResult<Publisher> {
		let name = name.trim();
		if name.is_empty() {
			return Err(StoreError::validation("publisher name is required"));
		}
		let mut catalog = self.catalog.lock().await;
		if catalog.publishers.values().any(|n| n == name) {
			return Err(StoreError::DuplicateKey(format!("publisher {name} already exists")));
		}
		let p_id = catalog.next_id();
		catalog.publishers.insert(p_id, name.to_string());
		Ok(Publisher {
			p_id,
			name: name.to_string(),
		})
	}

	#[instrument(skip(self, customer), fields(username = %customer.username))]
	async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
		let mut catalog = self.catalog.lock().await;
		if catalog.customers.values().any(|c| c.username == customer.username) {
			return Err(StoreError::DuplicateKey(format!("username {} is taken", customer.username)));
		}
		let customer_id = catalog.next_id();
		let record = CustomerCredentials {
			customer_id,
			username: customer.username,
			password_hash: customer.password_hash,
			first_name: customer.first_name,
			last_name: customer.last_name,
			email: customer.email,
			phone: customer.phone,
			shipping_address: customer.shipping_address,
		};
		catalog.customers.insert(customer_id, record.clone());
		Ok(record.into_customer())
	}

	#[instrument(skip(self))]
	async fn find_credentials(&self, username: &str) -> StoreResult<Option<CustomerCredentials>> {
		let catalog = self.catalog.lock().await;
		Ok(catalog.customers.values().find(|c| c.username == username).cloned())
	}

	#[instrument(skip(self, profile))]
	async fn update_profile(&self, username: &str, profile: ProfileUpdate) -> StoreResult<Customer> {
		let mut catalog = self.catalog.lock().await;
		let record = catalog
			.customers
			.values_mut()
			.find(|c| c.username == username)
			.ok_or_else(|| StoreError::not_found(format!("customer {username}")))?;
		record.first_name = profile.first_name;
		record.last_name = profile.last_name;
		record.email = profile.email;
		record.phone = profile.phone;
		record.shipping_address = profile.shipping_address;
		Ok(record.clone().into_customer())
	}

	#[instrument(skip(self, lines), fields(lines = lines.len()))]
	async fn place_order(&self, customer_id: Cid, lines: &[CartLine], date: NaiveDate) -> StoreResult<CustomerOrder> {
		let mut catalog = self.catalog.lock().await;
		if !catalog.customers.contains_key(&customer_id) {
			return Err(StoreError::not_found(format!("customer {customer_id}")));
		}

		// check every line before touching stock so a failure leaves nothing behind
		let mut wanted: BTreeMap<&str, i64> = BTreeMap::new();
		let mut items = Vec::with_capacity(lines.len());
		for line in lines {
			let row = catalog
				.books
				.get(&line.isbn)
				.ok_or_else(|| StoreError::not_found(format!("book {}", line.isbn)))?;
			let requested = wanted.entry(line.isbn.as_str()).or_default();
			*requested = requested
				.checked_add(line.quantity)
				.ok_or_else(|| StoreError::validation(format!("quantity for {} is too large", line.isbn)))?;
			if row.stock_quantity < *requested {
				return Err(StoreError::InsufficientStock {
					isbn: line.isbn.clone(),
					requested: *requested,
					available: row.stock_quantity,
				});
			}
			items.push(OrderItem {
				isbn: line.isbn.clone(),
				title: row.title.clone(),
				quantity: line.quantity,
				price: row.price,
			});
		}
		let remaining = wanted
			.into_iter()
			.map(|(isbn, quantity)| {
				catalog
					.books
					.get(isbn)
					.and_then(|row| row.stock_quantity.checked_sub(quantity))
					.map(|left| (isbn, left))
					.ok_or_else(|| StoreError::validation(format!("quantity for {isbn} is too large")))
			})
			.collect::<StoreResult<Vec<_>>>()?;
		for (isbn, left) in remaining {
			if let Some(row) = catalog.books.get_mut(isbn) {
				row.stock_quantity = left;
			}
		}

		let order = CustomerOrder {
			order_id: catalog.next_id(),
			customer_id,
			order_date: date,
			total_price: order_total(&items),
			items,
		};
		catalog.orders.push(order.clone());
		Ok(order)
	}

	#[instrument(skip(self))]
	async fn customer_orders(&self, customer_id: Cid) -> StoreResult<Vec<CustomerOrder>> {
		let catalog = self.catalog.lock().await;
		if !catalog.customers.contains_key(&customer_id) {
			return Err(StoreError::not_found(format!("customer {customer_id}")));
		}
		let mut orders: Vec<CustomerOrder> = catalog
			.orders
			.iter()
			.filter(|o| o.customer_id == customer_id)
			.cloned()
			.collect();
		orders.sort_by(|a, b| {
			b.order_date
				.cmp(&a.order_date)
				.then(b.order_id.cmp(&a.order_id))
		});
		Ok(orders)
	}

	#[instrument(skip(self))]
	async fn create_publisher_order(&self, isbn: &str, quantity: i64, date: NaiveDate) -> StoreResult<PublisherOrder> {
		if quantity <= 0 {
			return Err(StoreError::validation("order quantity must be positive"));
		}
		let mut catalog = self.catalog.lock().await;
		if !catalog.books.contains_key(isbn) {
			return Err(StoreError::not_found(format!("book {isbn}")));
		}
		let order_id = catalog.next_id();
		catalog.publisher_orders.insert(
			order_id,
			PublisherOrderRow {
				isbn: isbn.to_string(),
				quantity,
				status: OrderStatus::Pending,
				order_date: date,
			},
		);
		info!(order_id, "publisher order created");
		catalog.publisher_order(order_id)
	}

	#[instrument(skip(self))]
	async fn list_publisher_orders(&self) -> StoreResult<Vec<PublisherOrder>> {
		let catalog = self.catalog.lock().await;
		catalog
			.publisher_orders
			.keys()
			.rev()
			.map(|order_id| catalog.publisher_order(*order_id))
			.collect()
	}

	#[instrument(skip(self))]
	async fn confirm_publisher_order(&self, order_id: Oid) -> StoreResult<PublisherOrder> {
		let mut catalog = self.catalog.lock().await;
		let (isbn, quantity, status) = catalog
			.publisher_orders
			.get(&order_id)
			.map(|o| (o.isbn.clone(), o.quantity, o.status))
			.ok_or_else(|| StoreError::not_found(format!("publisher order {order_id}")))?;
		if status == OrderStatus::Confirmed {
			return Err(StoreError::AlreadyConfirmed(order_id));
		}
		let book = catalog
			.books
			.get_mut(&isbn)
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		book.stock_quantity = book
			.stock_quantity
			.checked_add(quantity)
			.ok_or_else(|| StoreError::validation(format!("stock for {isbn} would overflow")))?;
		if let Some(order) = catalog.publisher_orders.get_mut(&order_id) {
			order.status = OrderStatus::Confirmed;
		}
		info!(%isbn, quantity, "publisher order confirmed");
		catalog.publisher_order(order_id)
	}

	#[instrument(skip(self))]
	async fn sales_between(&self, from: NaiveDate, until: NaiveDate) -> StoreResult<SalesTotals> {
		let catalog = self.catalog.lock().await;
		Ok(catalog
			.orders
			.iter()
			.filter(|o| o.order_date >= from && o.order_date < until)
			.fold(SalesTotals::default(), |acc, o| SalesTotals {
				total_sales: acc.total_sales + o.total_price,
				order_count: acc.order_count + 1,
			}))
	}

	#[instrument(skip(self))]
	async fn top_customers(&self, limit: i64) -> StoreResult<Vec<CustomerSpend>> {
		let catalog = self.catalog.lock().await;
		let mut spent: BTreeMap<Cid, f64> = BTreeMap::new();
		for order in &catalog.orders {
			*spent.entry(order.customer_id).or_default() += order.total_price;
		}
		let mut top: Vec<CustomerSpend> = spent
			.into_iter()
			.filter_map(|(customer_id, total_spent)| {
				catalog.customers.get(&customer_id).map(|c| CustomerSpend {
					customer_id,
					first_name: c.first_name.clone(),
					last_name: c.last_name.clone(),
					total_spent,
				})
			})
			.collect();
		top.sort_by(|a, b| {
			b.total_spent
				.total_cmp(&a.total_spent)
				.then(a.customer_id.cmp(&b.customer_id))
		});
		top.truncate(usize::try_from(limit).unwrap_or(0));
		Ok(top)
	}

	#[instrument(skip(self))]
	async fn top_books(&self, limit: i64) -> StoreResult<Vec<BookSales>> {
		let catalog = self.catalog.lock().await;
		let mut sold: BTreeMap<&str, BookSales> = BTreeMap::new();
		for item in catalog.orders.iter().flat_map(|o| o.items.iter()) {
			let entry = sold.entry(item.isbn.as_str()).or_insert_with(|| BookSales {
				isbn: item.isbn.clone(),
				title: item.title.clone(),
				total_copies_sold: 0,
			});
			entry.total_copies_sold += item.quantity;
		}
		let mut top: Vec<BookSales> = sold.into_values().collect();
		top.sort_by(|a, b| {
			b.total_copies_sold
				.cmp(&a.total_copies_sold)
				.then_with(|| a.isbn.cmp(&b.isbn))
		});
		top.truncate(usize::try_from(limit).unwrap_or(0));
		Ok(top)
	}

	#[instrument(skip(self))]
	async fn book_order_count(&self, isbn: &str) -> StoreResult<BookOrderCount> {
		let catalog = self.catalog.lock().await;
		let book = catalog
			.books
			.get(isbn)
			.ok_or_else(|| StoreError::not_found(format!("book {isbn}")))?;
		let total_quantity_ordered = catalog
			.publisher_orders
			.values()
			.filter(|o| o.isbn == isbn)
			.map(|o| o.quantity)
			.sum();
		Ok(BookOrderCount {
			isbn: isbn.to_string(),
			title: book.title.clone(),
			total_quantity_ordered,
		})
	}
}
