pub mod contest;
pub mod health;
pub mod payment;
pub mod user;
