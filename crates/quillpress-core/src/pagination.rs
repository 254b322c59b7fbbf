//! Page-number pagination
//!
//! The storage layer counts rows and fetches one window with
//! `LIMIT`/`OFFSET`; [`Paginator`] turns the raw `?page=` value into that
//! window and wraps the fetched rows in a [`Page`].

use crate::error::{Error, Result};
use serde::Serialize;

/// Represents a single page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
	/// Items in this page
	pub object_list: Vec<T>,
	/// Current page number (1-indexed)
	pub number: usize,
	/// Total number of pages
	pub num_pages: usize,
	/// Total number of items across all pages
	pub count: usize,
	/// Items per page
	pub page_size: usize,
}

impl<T> Page<T> {
	/// Creates a new page with the given parameters.
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_core::Page;
	///
	/// let page = Page::new(vec!["a", "b", "c"], 1, 10, 30, 3);
	/// assert_eq!(page.number, 1);
	/// assert_eq!(page.num_pages, 10);
	/// assert_eq!(page.object_list.len(), 3);
	/// ```
	pub fn new(
		object_list: Vec<T>,
		number: usize,
		num_pages: usize,
		count: usize,
		page_size: usize,
	) -> Self {
		Self {
			object_list,
			number,
			num_pages,
			count,
			page_size,
		}
	}

	/// Returns the 1-based index of the first item on this page
	pub fn start_index(&self) -> usize {
		if self.object_list.is_empty() {
			0
		} else {
			(self.number - 1) * self.page_size + 1
		}
	}

	/// Returns the 1-based index of the last item on this page
	pub fn end_index(&self) -> usize {
		if self.object_list.is_empty() {
			0
		} else {
			self.start_index() + self.object_list.len() - 1
		}
	}

	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	pub fn has_other_pages(&self) -> bool {
		self.has_next() || self.has_previous()
	}

	pub fn next_page_number(&self) -> Option<usize> {
		self.has_next().then(|| self.number + 1)
	}

	pub fn previous_page_number(&self) -> Option<usize> {
		self.has_previous().then(|| self.number - 1)
	}

	pub fn len(&self) -> usize {
		self.object_list.len()
	}

	pub fn is_empty(&self) -> bool {
		self.object_list.is_empty()
	}

	/// Converts every item, keeping the page metadata
	pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
		Page {
			object_list: self.object_list.into_iter().map(f).collect(),
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			page_size: self.page_size,
		}
	}
}

/// Page-number paginator with an empty first page allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
	per_page: usize,
}

impl Paginator {
	/// Creates a paginator; a `per_page` of zero is treated as one
	pub fn new(per_page: usize) -> Self {
		Self {
			per_page: per_page.max(1),
		}
	}

	pub fn per_page(&self) -> usize {
		self.per_page
	}

	/// Number of pages needed for `count` items, at least one
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_core::Paginator;
	///
	/// let paginator = Paginator::new(10);
	/// assert_eq!(paginator.num_pages(0), 1);
	/// assert_eq!(paginator.num_pages(10), 1);
	/// assert_eq!(paginator.num_pages(11), 2);
	/// ```
	pub fn num_pages(&self, count: usize) -> usize {
		count.div_ceil(self.per_page).max(1)
	}

	/// Resolves the raw page parameter against the item count
	///
	/// Missing means page 1, `"last"` means the final page. Anything that is
	/// not a number in `1..=num_pages` is a not-found page.
	pub fn validate_number(&self, raw: Option<&str>, count: usize) -> Result<usize> {
		let num_pages = self.num_pages(count);
		let number = match raw.map(str::trim) {
			None | Some("") => 1,
			Some("last") => num_pages,
			Some(value) => value
				.parse::<usize>()
				.map_err(|_| Error::not_found("page", value))?,
		};
		if number == 0 || number > num_pages {
			return Err(Error::not_found("page", number));
		}
		Ok(number)
	}

	/// Row offset of the first item on page `number`
	pub fn offset(&self, number: usize) -> usize {
		number.saturating_sub(1) * self.per_page
	}

	/// Wraps the rows fetched for page `number`
	pub fn page<T>(&self, object_list: Vec<T>, number: usize, count: usize) -> Page<T> {
		Page::new(
			object_list,
			number,
			self.num_pages(count),
			count,
			self.per_page,
		)
	}
}
