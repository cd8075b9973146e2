pub mod cache;
pub mod controller;
pub mod date_key;
