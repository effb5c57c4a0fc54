pub mod cart;
pub mod catalog;
pub mod customer;
pub mod errors;
pub mod events;
pub mod order;
pub mod ports;
pub mod review;
