//! Customer checkout: the session cart, payment-card format check and the
//! hand-off to the store that records the sale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use crate::types::{Book, CartLine, Cid, CustomerOrder, Isbn, OrderItem};

pub const CARD_DIGITS: usize = 16;

pub fn round_cents(amount: f64) -> f64 {
	(amount * 100.0).round() / 100.0
}

pub fn order_total(items: &[OrderItem]) -> f64 {
	round_cents(items.iter().map(|i| i.price * i.quantity as f64).sum())
}

/// Format check only: spaces are ignored, then exactly sixteen digits.
pub fn validate_card(raw: &str) -> StoreResult<()> {
	let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
	if digits.len() == CARD_DIGITS && digits.chars().all(|c| c.is_ascii_digit()) {
		Ok(())
	} else {
		Err(StoreError::validation(format!(
			"card number must be exactly {CARD_DIGITS} digits"
		)))
	}
}

/// Rejects empty carts and non-positive quantities, folding repeated ISBNs
/// into one line.
pub fn normalize_lines(lines: &[CartLine]) -> StoreResult<Vec<CartLine>> {
	if lines.is_empty() {
		return Err(StoreError::validation("cart is empty"));
	}
	let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
	for line in lines {
		let isbn = line.isbn.trim();
		if isbn.is_empty() {
			return Err(StoreError::validation("cart line without isbn"));
		}
		if line.quantity <= 0 {
			return Err(StoreError::validation(format!(
				"quantity for {isbn} must be positive"
			)));
		}
		match merged.iter_mut().find(|l| l.isbn == isbn) {
			Some(existing) => {
				existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
					StoreError::validation(format!("quantity for {isbn} is too large"))
				})?;
			},
			None => merged.push(CartLine {
				isbn: isbn.to_string(),
				quantity: line.quantity,
			}),
		}
	}
	Ok(merged)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Checkout {
	#[serde(alias = "customerId")]
	pub customer_id: Cid,
	#[serde(alias = "cardNumber")]
	pub card_number: String,
	pub items: Vec<CartLine>,
}

#[instrument(skip(store, checkout), fields(customer_id = checkout.customer_id))]
pub async fn place_order<S: Store>(
	store: &S,
	checkout: &Checkout,
	today: NaiveDate,
) -> StoreResult<CustomerOrder> {
	validate_card(&checkout.card_number)?;
	let lines = normalize_lines(&checkout.items)?;
	let order = store.place_order(checkout.customer_id, &lines, today).await?;
	info!(order_id = order.order_id, total = order.total_price, "order placed");
	Ok(order)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
	pub isbn: Isbn,
	pub title: String,
	pub price: f64,
	pub quantity: i64,
}

/// Cart held in the customer's session until checkout or logout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
	items: Vec<CartItem>,
}

impl Cart {
	pub fn items(&self) -> &[CartItem] {
		&self.items
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn count(&self) -> i64 {
		self.items.iter().map(|i| i.quantity).sum()
	}

	pub fn total(&self) -> f64 {
		round_cents(self.items.iter().map(|i| i.price * i.quantity as f64).sum())
	}

	/// Adds one copy, refusing to hold more copies than the shelf has.
	pub fn add(&mut self, book: &Book) -> StoreResult<()> {
		let in_cart = self
			.items
			.iter()
			.find(|i| i.isbn == book.isbn)
			.map_or(0, |i| i.quantity);
		if in_cart + 1 > book.stock_quantity {
			return Err(StoreError::InsufficientStock {
				isbn: book.isbn.clone(),
				requested: in_cart + 1,
				available: book.stock_quantity,
			});
		}
		match self.items.iter_mut().find(|i| i.isbn == book.isbn) {
			Some(item) => {
				item.quantity += 1;
				item.price = book.price;
			},
			None => self.items.push(CartItem {
				isbn: book.isbn.clone(),
				title: book.title.clone(),
				price: book.price,
				quantity: 1,
			}),
		}
		Ok(())
	}

	pub fn remove(&mut self, isbn: &str) {
		self.items.retain(|i| i.isbn != isbn);
	}

	pub fn clear(&mut self) {
		self.items.clear();
	}

	pub fn lines(&self) -> Vec<CartLine> {
		self.items
			.iter()
			.map(|i| CartLine {
				isbn: i.isbn.clone(),
				quantity: i.quantity,
			})
			.collect()
	}
}
