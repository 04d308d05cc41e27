pub mod middleware;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;
