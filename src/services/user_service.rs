use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};

use crate::config::AppState;
use crate::dto::{
    ChangePasswordRequest, ChangeUserStatusRequest, CreateUserRequest, ListUsersQuery,
    LoginRequest, Paginated, RegisterRequest, RegisterResponse, TokenResponse,
    UpdateProfileRequest, UpdateUserRequest, UserResponse,
};
use crate::interceptors::{AppError, AppResult};
use crate::middleware::{generate_token, AuthUser, Claims};
use crate::models::{role::ROLE_ADMIN, role::ROLE_USER, user::STATUS_INACTIVE, User, UserSummary};
use crate::services::role_service;
use crate::utils::{
    generate_storage_key, hash_password, validate_image, validate_request, verify_password,
    UploadedFile,
};

#[derive(Clone)]
pub struct UserService {
    state: AppState,
}

impl UserService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn to_response(&self, user: &User) -> UserResponse {
        UserResponse::from_user(user, self.state.storage.public_base_url())
    }

    async fn response_with_roles(&self, user: &User) -> AppResult<UserResponse> {
        let roles = role_service::roles_for_user(&self.state.db, user.id).await?;
        Ok(self.to_response(user).with_roles(roles))
    }

    async fn find_user(&self, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(user_id)
            .fetch_optional(&self.state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn ensure_email_unique(&self, email: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id != COALESCE($2, -1))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.state.db)
        .await?;

        if taken {
            return Err(AppError::field_validation("email", "Email has already been taken"));
        }
        Ok(())
    }

    async fn ensure_mobile_unique(&self, mobile: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE mobile = $1 AND id != COALESCE($2, -1))",
        )
        .bind(mobile)
        .bind(exclude_id)
        .fetch_one(&self.state.db)
        .await?;

        if taken {
            return Err(AppError::field_validation("mobile", "Mobile has already been taken"));
        }
        Ok(())
    }

    async fn store_avatar(&self, user: &User, file: &UploadedFile) -> AppResult<String> {
        validate_image("avatar", file)?;

        // Replacement removes the previous object before the new write.
        if let Some(old) = &user.avatar {
            if self.state.storage.public.exists(old).await? {
                self.state.storage.public.delete(old).await?;
            }
        }

        let ext = file.extension().unwrap_or_else(|| "bin".to_string());
        let key = generate_storage_key("avatars", &ext);
        self.state.storage.public.put(&key, &file.bytes).await?;
        Ok(key)
    }

    fn token_response(&self, user: &User, response_user: UserResponse) -> AppResult<TokenResponse> {
        let claims = Claims::with_env_expiration(user.id, user.email.clone());
        let access_token = generate_token(&claims)?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer",
            expires_in: claims.lifetime_seconds(),
            user: response_user,
        })
    }

    /// Self-service registration: default `user` role, token issued in the
    /// same operation.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        validate_request(&request)?;
        self.ensure_email_unique(&request.email, None).await?;

        let password = hash_password(&request.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, password, status)
             VALUES ($1, $2, $3, $4, 'ACTIVE')
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&password)
        .fetch_one(&self.state.db)
        .await?;

        role_service::assign_roles(&self.state.db, user.id, &[ROLE_USER.to_string()]).await?;

        let claims = Claims::with_env_expiration(user.id, user.email.clone());
        let token = generate_token(&claims)?;

        tracing::info!("User {} registered", user.id);

        Ok(RegisterResponse {
            token,
            user: self.response_with_roles(&user).await?,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        validate_request(&request)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(&request.email)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password)? {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        if user.status == STATUS_INACTIVE {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }

        let response_user = self.response_with_roles(&user).await?;
        self.token_response(&user, response_user)
    }

    pub async fn me(&self, auth: &AuthUser) -> AppResult<UserResponse> {
        self.response_with_roles(&auth.user).await
    }

    /// Rotate the session: the presented token is deny-listed, a fresh one is
    /// issued for the same identity.
    pub async fn refresh(&self, auth: &AuthUser, claims: &Claims) -> AppResult<TokenResponse> {
        self.state.redis.deny_token(&claims.jti, claims.remaining_seconds()).await?;

        let response_user = self.response_with_roles(&auth.user).await?;
        self.token_response(&auth.user, response_user)
    }

    pub async fn logout(&self, claims: &Claims) -> AppResult<()> {
        self.state.redis.deny_token(&claims.jti, claims.remaining_seconds()).await
    }

    pub async fn update_profile(
        &self,
        auth: &AuthUser,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        validate_request(&request)?;

        if let Some(mobile) = &request.mobile {
            self.ensure_mobile_unique(mobile, Some(auth.id())).await?;
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                mobile = COALESCE($3, mobile),
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $4
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.mobile)
        .bind(auth.id())
        .fetch_one(&self.state.db)
        .await?;

        self.response_with_roles(&user).await
    }

    pub async fn change_password(
        &self,
        auth: &AuthUser,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        validate_request(&request)?;

        if !verify_password(&request.current_password, &auth.user.password)? {
            return Err(AppError::UnprocessableEntity("Current password is incorrect".to_string()));
        }

        let password = hash_password(&request.password)?;

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password)
            .bind(auth.id())
            .execute(&self.state.db)
            .await?;

        Ok(())
    }

    /// Admin listing with search over names/email and a status filter.
    pub async fn list(&self, query: ListUsersQuery) -> AppResult<Paginated<UserResponse>> {
        let (page, per_page) = query.page.normalized();

        let apply_filters = |qb: &mut QueryBuilder<Postgres>| {
            qb.push(" WHERE deleted_at IS NULL");
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                let pattern = format!("%{}%", search);
                qb.push(" AND (first_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR last_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
                qb.push(" AND status = ").push_bind(status.to_string());
            }
        };

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        apply_filters(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.state.db).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        apply_filters(&mut qb);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let users: Vec<User> = qb.build_query_as().fetch_all(&self.state.db).await?;

        let mut data = Vec::with_capacity(users.len());
        for user in &users {
            data.push(self.response_with_roles(user).await?);
        }

        Ok(Paginated::new(data, total, page, per_page))
    }

    pub async fn create(
        &self,
        request: CreateUserRequest,
        avatar: Option<UploadedFile>,
        actor_id: i64,
    ) -> AppResult<UserResponse> {
        validate_request(&request)?;
        self.ensure_email_unique(&request.email, None).await?;
        if let Some(mobile) = &request.mobile {
            self.ensure_mobile_unique(mobile, None).await?;
        }

        let password = hash_password(&request.password)?;

        let mut avatar_key = None;
        if let Some(file) = &avatar {
            validate_image("avatar", file)?;
            let ext = file.extension().unwrap_or_else(|| "bin".to_string());
            let key = generate_storage_key("avatars", &ext);
            self.state.storage.public.put(&key, &file.bytes).await?;
            avatar_key = Some(key);
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, mobile, password, status, avatar, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.mobile)
        .bind(&password)
        .bind(&request.status)
        .bind(&avatar_key)
        .bind(actor_id)
        .fetch_one(&self.state.db)
        .await?;

        role_service::assign_roles(&self.state.db, user.id, &request.roles).await?;

        self.response_with_roles(&user).await
    }

    async fn audit_summary(&self, user_id: Option<i64>) -> AppResult<Option<UserSummary>> {
        let Some(id) = user_id else { return Ok(None) };

        let summary = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.state.db)
        .await?;

        Ok(summary)
    }

    pub async fn get(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        let created_by = self.audit_summary(user.created_by).await?;
        let updated_by = self.audit_summary(user.updated_by).await?;

        Ok(self
            .response_with_roles(&user)
            .await?
            .with_audit(created_by, updated_by))
    }

    pub async fn update(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
        avatar: Option<UploadedFile>,
        actor_id: i64,
    ) -> AppResult<UserResponse> {
        validate_request(&request)?;
        request.check_password_confirmation()?;

        let user = self.find_user(user_id).await?;
        self.ensure_email_unique(&request.email, Some(user.id)).await?;
        if let Some(mobile) = &request.mobile {
            self.ensure_mobile_unique(mobile, Some(user.id)).await?;
        }

        let avatar_key = match &avatar {
            Some(file) => Some(self.store_avatar(&user, file).await?),
            None => user.avatar.clone(),
        };

        let password = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(plain) => hash_password(plain)?,
            None => user.password.clone(),
        };

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET
                first_name = $1,
                last_name = $2,
                email = $3,
                mobile = $4,
                password = $5,
                status = $6,
                avatar = $7,
                updated_by = $8,
                updated_at = NOW()
             WHERE id = $9
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.mobile)
        .bind(&password)
        .bind(&request.status)
        .bind(&avatar_key)
        .bind(actor_id)
        .bind(user.id)
        .fetch_one(&self.state.db)
        .await?;

        // Full role replace, not additive.
        role_service::sync_roles(&self.state.db, updated.id, &request.roles).await?;

        self.response_with_roles(&updated).await
    }

    pub async fn change_status(
        &self,
        user_id: i64,
        request: ChangeUserStatusRequest,
    ) -> AppResult<(String, Value)> {
        validate_request(&request)?;

        let user = self.find_user(user_id).await?;

        sqlx::query("UPDATE users SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(&request.status)
            .bind(user.id)
            .execute(&self.state.db)
            .await?;

        let message = format!("User {} marked as {}", user.full_name(), request.status);
        Ok((message, json!({ "id": user.id, "status": request.status })))
    }

    /// Soft delete. Admin-role holders are protected from this path.
    pub async fn delete(&self, user_id: i64) -> AppResult<()> {
        let user = self.find_user(user_id).await?;

        if role_service::has_role(&self.state.db, user.id, ROLE_ADMIN).await? {
            return Err(AppError::Forbidden("Cannot delete admin user".to_string()));
        }

        if let Some(avatar) = &user.avatar {
            if self.state.storage.public.exists(avatar).await? {
                self.state.storage.public.delete(avatar).await?;
            }
        }

        sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.state.db)
            .await?;

        Ok(())
    }

    /// Restore from the only-trashed set.
    pub async fn restore(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL
             RETURNING *",
        )
        .bind(user_id)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.response_with_roles(&user).await
    }
}
