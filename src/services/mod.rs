pub mod client;
pub mod controller;
pub mod debounce;
pub mod query;
