//! One function per page or form submission

pub mod accounts;
pub mod blog;
