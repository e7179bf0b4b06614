mod service;

pub use service::{NewUser, ProfilePatch, UserService};
