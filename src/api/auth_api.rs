// ==========================================
// 停车违章执法系统 - 认证 API
// ==========================================
// 职责: 账户注册、登录校验
// 输出: OfficerContext,由调用方显式传入后续操作
// 密码: Argon2id,PHC 字符串存储
// ==========================================

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::property::UserAccount;
use crate::domain::types::UserRole;
use crate::domain::violation::OfficerContext;
use crate::repository::UserRepository;

/// 最短密码长度
pub const MIN_PASSWORD_LEN: usize = 8;

pub struct AuthApi {
    user_repo: Arc<UserRepository>,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 注册账户
    pub fn register_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> ApiResult<UserAccount> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::ValidationError("用户名不能为空".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::ValidationError(format!(
                "密码长度不能少于{}位",
                MIN_PASSWORD_LEN
            )));
        }

        let hash = hash_password(password)?;
        let user = self.user_repo.create(username, &hash, role)?;
        tracing::info!(username = %user.username, role = %user.role, "账户已创建");
        Ok(user)
    }

    /// 登录
    ///
    /// 用户不存在与密码错误返回同一错误信息。
    pub fn login(&self, username: &str, password: &str) -> ApiResult<OfficerContext> {
        let invalid = || ApiError::Unauthorized("用户名或密码错误".to_string());

        let user = self
            .user_repo
            .find_by_username(username.trim())?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(username = %user.username, "登录失败");
            return Err(invalid());
        }

        Ok(OfficerContext::new(user.username, user.role))
    }

    pub fn list_users(&self) -> ApiResult<Vec<UserAccount>> {
        Ok(self.user_repo.list_all()?)
    }
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::InternalError(format!("密码哈希失败: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
