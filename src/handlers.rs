pub mod auth;
pub mod buyers;
pub mod health;
pub mod items;
pub mod orders;
pub mod sellers;
pub mod transactions;
