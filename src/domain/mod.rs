//! Domain layer: value objects, entities and the ports the application talks through.

pub mod contact;
pub mod customer;
pub mod money;
pub mod order;
pub mod ports;
pub mod product;
