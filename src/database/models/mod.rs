pub mod expense;
pub mod user;

pub use expense::Expense;
pub use user::{User, UserDto};
