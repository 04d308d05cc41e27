pub mod capabilities;
pub mod contracts;
pub mod error;
pub mod jwt;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;
