pub mod assignments;
pub mod credentials;
pub mod events;
pub mod profiles;
pub mod reports;
pub mod sessions;
pub mod skills;

pub use assignments::*;
pub use credentials::*;
pub use events::*;
pub use profiles::*;
pub use reports::*;
pub use sessions::*;
