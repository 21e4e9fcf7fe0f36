pub mod password;
pub mod slug;
pub mod upload;
pub mod validation;

pub use password::{hash_password, verify_password};
pub use slug::generate_slug;
pub use upload::{generate_storage_key, validate_image, UploadedFile};
pub use validation::validate_request;
