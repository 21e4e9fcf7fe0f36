pub mod product;
pub mod role;
pub mod user;

pub use product::Product;
pub use role::{Role, RoleSummary};
pub use user::{User, UserSummary};
