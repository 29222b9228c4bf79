//! Low-stock signal. Replenishment stays a manual admin action: nothing here
//! creates publisher orders.

use crate::types::Book;

pub fn is_low(book: &Book) -> bool {
	book.stock_quantity <= book.threshold
}

/// Copies an admin would have to order to bring the book back above its threshold.
pub fn shortfall(book: &Book) -> i64 {
	if is_low(book) {
		book.threshold - book.stock_quantity + 1
	} else {
		0
	}
}

pub fn low_stock(books: Vec<Book>) -> Vec<Book> {
	books.into_iter().filter(is_low).collect()
}
