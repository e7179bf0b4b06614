pub mod contest;
pub mod payment;
pub mod shared;
pub mod user;
