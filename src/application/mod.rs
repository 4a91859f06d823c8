//! Application layer containing the store's business operations.
//!
//! [`engine::StoreEngine`] is the entry point. Its operations are split by concern:
//! catalog browsing and order placement live in `engine`, payment confirmation in
//! `payment`, back-office order handling in `admin` and the contact inbox in `contact`.

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod engine;
pub mod page;
pub mod payment;
