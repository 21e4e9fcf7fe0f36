pub mod auth_dto;
pub mod pagination;
pub mod product_dto;
pub mod user_dto;

pub use auth_dto::{
    ChangePasswordRequest,
    LoginRequest,
    RegisterRequest,
    RegisterResponse,
    TokenResponse,
    UpdateProfileRequest,
};
pub use pagination::{PageQuery, Paginated};
pub use product_dto::{
    ChangeProductStatusRequest,
    CreateProductRequest,
    ExportResponse,
    ListProductsQuery,
    ProductResponse,
    UpdateProductRequest,
};
pub use user_dto::{
    ChangeUserStatusRequest,
    CreateUserRequest,
    ListUsersQuery,
    UpdateUserRequest,
    UserResponse,
};
