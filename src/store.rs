//! The data-source interface every surface of the bookstore goes through.
//!
//! Two implementations exist: [`crate::sql::SqlStore`] over a SQLite pool and
//! [`crate::memory::MemoryStore`], an in-memory catalog used for demos and
//! tests. The REST API and the storefront pages are generic over this trait,
//! so the backing store is picked once at startup.

use std::future::Future;

use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::reports::{BookOrderCount, BookSales, CustomerSpend, SalesTotals};
use crate::types::{
	Book, BookUpdate, CartLine, Cid, Customer, CustomerCredentials, CustomerOrder, NewBook,
	NewCustomer, Oid, ProfileUpdate, Publisher, PublisherOrder,
};

pub trait Store: Clone + Send + Sync + 'static {
	// catalog

	fn list_books(&self) -> impl Future<Output = StoreResult<Vec<Book>>> + Send;

	fn get_book(&self, isbn: &str) -> impl Future<Output = StoreResult<Book>> + Send;

	/// Inserts an already validated book and links its author, if any.
	fn create_book(&self, book: NewBook) -> impl Future<Output = StoreResult<Book>> + Send;

	/// Rewrites the book row and its author's name in one transaction.
	fn update_book(
		&self,
		isbn: &str,
		update: BookUpdate,
	) -> impl Future<Output = StoreResult<Book>> + Send;

	/// Succeeds whether or not the book existed.
	fn delete_book(&self, isbn: &str) -> impl Future<Output = StoreResult<()>> + Send;

	fn list_publishers(&self) -> impl Future<Output = StoreResult<Vec<Publisher>>> + Send;

	fn create_publisher(&self, name: &str) -> impl Future<Output = StoreResult<Publisher>> + Send;

	// customers

	fn create_customer(
		&self,
		customer: NewCustomer,
	) -> impl Future<Output = StoreResult<Customer>> + Send;

	fn find_credentials(
		&self,
		username: &str,
	) -> impl Future<Output = StoreResult<Option<CustomerCredentials>>> + Send;

	fn update_profile(
		&self,
		username: &str,
		profile: ProfileUpdate,
	) -> impl Future<Output = StoreResult<Customer>> + Send;

	// customer ledger

	/// Records a sale priced from the live catalog and takes the sold copies out
	/// of stock. Either every line is applied or none is.
	fn place_order(
		&self,
		customer_id: Cid,
		lines: &[CartLine],
		date: NaiveDate,
	) -> impl Future<Output = StoreResult<CustomerOrder>> + Send;

	fn customer_orders(
		&self,
		customer_id: Cid,
	) -> impl Future<Output = StoreResult<Vec<CustomerOrder>>> + Send;

	// publisher ledger

	fn create_publisher_order(
		&self,
		isbn: &str,
		quantity: i64,
		date: NaiveDate,
	) -> impl Future<Output = StoreResult<PublisherOrder>> + Send;

	fn list_publisher_orders(&self) -> impl Future<Output = StoreResult<Vec<PublisherOrder>>> + Send;

	/// Moves a pending order to confirmed and adds its quantity to the book's
	/// stock, atomically.
	fn confirm_publisher_order(
		&self,
		order_id: Oid,
	) -> impl Future<Output = StoreResult<PublisherOrder>> + Send;

	// reporting

	/// Sales with `from <= order_date < until`.
	fn sales_between(
		&self,
		from: NaiveDate,
		until: NaiveDate,
	) -> impl Future<Output = StoreResult<SalesTotals>> + Send;

	fn top_customers(&self, limit: i64) -> impl Future<Output = StoreResult<Vec<CustomerSpend>>> + Send;

	fn top_books(&self, limit: i64) -> impl Future<Output = StoreResult<Vec<BookSales>>> + Send;

	fn book_order_count(&self, isbn: &str) -> impl Future<Output = StoreResult<BookOrderCount>> + Send;
}
