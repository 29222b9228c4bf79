//! Read-only sales projections for the admin dashboard.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::checkout::round_cents;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use crate::types::Isbn;

pub const TOP_CUSTOMERS: i64 = 5;
pub const TOP_BOOKS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SalesTotals {
	pub total_sales: f64,
	pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
	pub month: String,
	pub total_sales: f64,
	pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
	pub date: NaiveDate,
	pub total_sales: f64,
	pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CustomerSpend {
	pub customer_id: i64,
	pub first_name: String,
	pub last_name: String,
	pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BookSales {
	pub isbn: Isbn,
	pub title: String,
	pub total_copies_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BookOrderCount {
	pub isbn: Isbn,
	pub title: String,
	pub total_quantity_ordered: i64,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
	date - Duration::days(i64::from(date.day0()))
}

/// `[start, end)` of the calendar month before the one `today` falls in.
pub fn previous_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
	let end = first_of_month(today);
	let start = first_of_month(end - Duration::days(1));
	(start, end)
}

pub fn parse_date(raw: &str) -> StoreResult<NaiveDate> {
	NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
		.map_err(|_| StoreError::validation(format!("{raw:?} is not a YYYY-MM-DD date")))
}

pub async fn previous_month_sales<S: Store>(store: &S, today: NaiveDate) -> StoreResult<MonthlySales> {
	let (start, end) = previous_month(today);
	let totals = store.sales_between(start, end).await?;
	Ok(MonthlySales {
		month: start.format("%B %Y").to_string(),
		total_sales: round_cents(totals.total_sales),
		order_count: totals.order_count,
	})
}

pub async fn sales_on<S: Store>(store: &S, date: NaiveDate) -> StoreResult<DailySales> {
	let next = date
		.succ_opt()
		.ok_or_else(|| StoreError::validation("date is out of range"))?;
	let totals = store.sales_between(date, next).await?;
	Ok(DailySales {
		date,
		total_sales: round_cents(totals.total_sales),
		order_count: totals.order_count,
	})
}
