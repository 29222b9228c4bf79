use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

pub type Isbn = String;
/// publisher id
pub type Pid = i64;
/// customer id
pub type Cid = i64;
/// order id, for both ledgers
pub type Oid = i64;

pub const CATEGORIES: [&str; 5] = ["Science", "Art", "Religion", "History", "Geography"];

/// A book as the catalog lists it, joined with its publisher and authors.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
	pub isbn: Isbn,
	pub title: String,
	pub p_id: Pid,
	pub publisher_name: Option<String>,
	pub author_name: Option<String>,
	pub pub_year: i32,
	pub price: f64,
	pub category: String,
	pub stock_quantity: i64,
	pub threshold: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
	pub isbn: Isbn,
	pub title: String,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(deserialize_with = "lenient::int")]
	pub p_id: Pid,
	#[serde(deserialize_with = "lenient::int")]
	pub pub_year: i32,
	#[serde(deserialize_with = "lenient::float")]
	pub price: f64,
	#[serde(default = "default_category")]
	pub category: String,
	#[serde(deserialize_with = "lenient::int")]
	pub stock_quantity: i64,
	#[serde(deserialize_with = "lenient::int")]
	pub threshold: i64,
}

/// Every mutable column of a book; the ISBN never changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookUpdate {
	pub title: String,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(deserialize_with = "lenient::int")]
	pub p_id: Pid,
	#[serde(deserialize_with = "lenient::int")]
	pub pub_year: i32,
	#[serde(deserialize_with = "lenient::float")]
	pub price: f64,
	#[serde(default = "default_category")]
	pub category: String,
	#[serde(deserialize_with = "lenient::int")]
	pub stock_quantity: i64,
	#[serde(deserialize_with = "lenient::int")]
	pub threshold: i64,
}

fn default_category() -> String {
	CATEGORIES[0].to_string()
}

fn check_book_fields(title: &str, price: f64, stock: i64, threshold: i64) -> StoreResult<()> {
	if title.trim().is_empty() {
		return Err(StoreError::validation("title is required"));
	}
	if !price.is_finite() || price < 0.0 {
		return Err(StoreError::validation("price must be a non-negative number"));
	}
	if stock < 0 {
		return Err(StoreError::validation("stock_quantity must not be negative"));
	}
	if threshold < 0 {
		return Err(StoreError::validation("threshold must not be negative"));
	}
	Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

impl NewBook {
	/// Trims text fields and rejects values the catalog cannot hold.
	pub fn validated(mut self) -> StoreResult<Self> {
		self.isbn = self.isbn.trim().to_string();
		if self.isbn.is_empty() {
			return Err(StoreError::validation("isbn is required"));
		}
		check_book_fields(&self.title, self.price, self.stock_quantity, self.threshold)?;
		self.title = self.title.trim().to_string();
		self.category = self.category.trim().to_string();
		self.author = non_blank(self.author);
		Ok(self)
	}

	pub fn update(&self) -> BookUpdate {
		BookUpdate {
			title: self.title.clone(),
			author: self.author.clone(),
			p_id: self.p_id,
			pub_year: self.pub_year,
			price: self.price,
			category: self.category.clone(),
			stock_quantity: self.stock_quantity,
			threshold: self.threshold,
		}
	}
}

impl BookUpdate {
	pub fn validated(mut self) -> StoreResult<Self> {
		check_book_fields(&self.title, self.price, self.stock_quantity, self.threshold)?;
		self.title = self.title.trim().to_string();
		self.category = self.category.trim().to_string();
		self.author = non_blank(self.author);
		Ok(self)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Publisher {
	pub p_id: Pid,
	pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPublisher {
	pub name: String,
}

/// Public view of a customer, never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Customer {
	pub customer_id: Cid,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub shipping_address: Option<String>,
}

/// A customer row together with the stored bcrypt hash, used only by login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerCredentials {
	pub customer_id: Cid,
	pub username: String,
	pub password_hash: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub shipping_address: Option<String>,
}

impl CustomerCredentials {
	pub fn into_customer(self) -> Customer {
		Customer {
			customer_id: self.customer_id,
			username: self.username,
			first_name: self.first_name,
			last_name: self.last_name,
			email: self.email,
			phone: self.phone,
			shipping_address: self.shipping_address,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
	pub username: String,
	pub email: String,
	pub password: String,
	#[serde(alias = "firstName")]
	pub first_name: String,
	#[serde(alias = "lastName")]
	pub last_name: String,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default, alias = "address")]
	pub shipping_address: Option<String>,
}

/// What the store persists for a new customer: the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCustomer {
	pub username: String,
	pub password_hash: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileUpdate {
	#[serde(alias = "firstName")]
	pub first_name: String,
	#[serde(alias = "lastName")]
	pub last_name: String,
	pub email: String,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default, alias = "address")]
	pub shipping_address: Option<String>,
}

impl ProfileUpdate {
	pub fn validated(mut self) -> StoreResult<Self> {
		self.first_name = self.first_name.trim().to_string();
		self.last_name = self.last_name.trim().to_string();
		self.email = self.email.trim().to_string();
		if self.first_name.is_empty() || self.last_name.is_empty() || self.email.is_empty() {
			return Err(StoreError::validation("first name, last name and email are required"));
		}
		self.phone = non_blank(self.phone);
		self.shipping_address = non_blank(self.shipping_address);
		Ok(self)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
	pub username: String,
	pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
	pub isbn: Isbn,
	#[serde(deserialize_with = "lenient::int")]
	pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
	pub isbn: Isbn,
	pub title: String,
	pub quantity: i64,
	pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrder {
	pub order_id: Oid,
	pub customer_id: Cid,
	pub order_date: NaiveDate,
	pub total_price: f64,
	pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
	Pending,
	Confirmed,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Confirmed => "Confirmed",
		})
	}
}

impl FromStr for OrderStatus {
	type Err = StoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Pending" => Ok(OrderStatus::Pending),
			"Confirmed" => Ok(OrderStatus::Confirmed),
			other => Err(StoreError::Storage(format!("unknown order status {other:?}"))),
		}
	}
}

/// A replenishment order, joined with the book title and publisher name when listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherOrder {
	pub order_id: Oid,
	pub isbn: Isbn,
	pub title: Option<String>,
	pub publisher_name: Option<String>,
	pub quantity: i64,
	pub status: OrderStatus,
	pub order_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPublisherOrder {
	pub isbn: Isbn,
	#[serde(deserialize_with = "lenient::int")]
	pub quantity: i64,
}

/// Forms coming from the storefront send numbers as text, and earlier clients
/// sent `p_id` as a string; both shapes are accepted, anything else is a
/// validation failure.
mod lenient {
	use serde::{de::Error, Deserialize, Deserializer};

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Int(i64),
		Float(f64),
		Text(String),
	}

	pub fn int<'de, D, T>(d: D) -> Result<T, D::Error>
	where
		D: Deserializer<'de>,
		T: TryFrom<i64>,
	{
		let value = match Option::<Raw>::deserialize(d)? {
			Some(Raw::Int(v)) => v,
			Some(Raw::Float(v)) if v.fract() == 0.0 && v.is_finite() => v as i64,
			Some(Raw::Text(s)) => s
				.trim()
				.parse::<i64>()
				.map_err(|_| D::Error::custom(format!("{s:?} is not a whole number")))?,
			_ => return Err(D::Error::custom("expected a whole number")),
		};
		T::try_from(value).map_err(|_| D::Error::custom(format!("{value} is out of range")))
	}

	pub fn float<'de, D>(d: D) -> Result<f64, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Option::<Raw>::deserialize(d)? {
			Some(Raw::Int(v)) => Ok(v as f64),
			Some(Raw::Float(v)) => Ok(v),
			Some(Raw::Text(s)) => s
				.trim()
				.parse::<f64>()
				.map_err(|_| D::Error::custom(format!("{s:?} is not a number"))),
			None => Err(D::Error::custom("expected a number")),
		}
	}
}
