pub mod errors;
pub mod order;

pub use errors::DomainError;
pub use order::{Delivery, Item, Order, Payment};
