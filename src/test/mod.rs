pub mod utils;

pub use utils::test_utils;

mod auth;
mod cors;
mod events;
