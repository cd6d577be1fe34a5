use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::{distr::Alphanumeric, Rng};
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::info;

use crate::{
    entity::prelude::*,
    error::ErrorKind,
    ids::{UserId, VideoId, WatchProgressId},
    service::notify,
};

const RESET_TOKEN_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AccountsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("email or password incorrect")]
    InvalidCredentials,

    #[error("no account with that email")]
    UnknownEmail,

    #[error("reset token invalid or expired")]
    InvalidOrExpiredToken,

    #[error("current password incorrect")]
    WrongCurrentPassword,

    #[error("user not found")]
    UserNotFound,

    #[error("video not found")]
    VideoNotFound,

    #[error("password hashing failed")]
    PasswordHash,
}

impl AccountsServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountsServiceError::DbError(_) => ErrorKind::Internal,
            AccountsServiceError::PasswordHash => ErrorKind::Internal,
            AccountsServiceError::DuplicateEmail => ErrorKind::Conflict,
            AccountsServiceError::InvalidCredentials => ErrorKind::Unauthorized,
            AccountsServiceError::WrongCurrentPassword => ErrorKind::Unauthorized,
            AccountsServiceError::UnknownEmail => ErrorKind::NotFound,
            AccountsServiceError::UserNotFound => ErrorKind::NotFound,
            AccountsServiceError::VideoNotFound => ErrorKind::NotFound,
            AccountsServiceError::InvalidOrExpiredToken => ErrorKind::InvalidState,
        }
    }
}

fn hash_password(password: &str) -> Result<String, AccountsServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountsServiceError::PasswordHash)
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn mint_reset_token() -> String {
    let mut rng = rand::rng();
    (0..RESET_TOKEN_LEN)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

#[derive(Clone)]
pub struct AccountsService {
    db: DatabaseConnection,
}

impl AccountsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, DbErr> {
        User::find()
            .filter(UserColumn::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Create an account and greet it. The welcome notification commits with
    /// the user row or not at all.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: UserRole,
    ) -> Result<UserModel, AccountsServiceError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AccountsServiceError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;

        let user = UserActiveModel {
            id: Set(UserId::new()),
            email: Set(email.to_lowercase()),
            password_hash: Set(password_hash),
            display_name: Set(display_name.to_string()),
            role: Set(role),
            avatar: Set(role.default_avatar().to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let txn = self.db.begin().await?;
        let user = User::insert(user).exec_with_returning(&txn).await?;
        Notification::insert(notify::welcome(user.id, user.role))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(user = %user.id, "registered account");
        Ok(user)
    }

    /// Verify credentials. The error does not distinguish an unknown email
    /// from a wrong password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserModel, AccountsServiceError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AccountsServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AccountsServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AccountsServiceError> {
        let user = self.get_user(user_id).await?;

        if !verify_password(old_password, &user.password_hash) {
            return Err(AccountsServiceError::WrongCurrentPassword);
        }

        let mut user: UserActiveModel = user.into();
        user.password_hash = Set(hash_password(new_password)?);
        user.update(&self.db).await?;

        Ok(())
    }

    /// Mint a reset token for the account behind `email`. Each account has
    /// at most one outstanding token; a repeat request replaces it.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<PasswordResetModel, AccountsServiceError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AccountsServiceError::UnknownEmail)?;

        let token = mint_reset_token();
        // Tokens stay valid for one hour.
        let expires_at = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();

        let existing = PasswordReset::find_by_id(user.id).one(&self.db).await?;
        let reset = match existing {
            Some(row) => {
                let mut row: PasswordResetActiveModel = row.into();
                row.token = Set(token);
                row.expires_at = Set(expires_at);
                row.update(&self.db).await?
            }
            None => {
                let row = PasswordResetActiveModel {
                    user_id: Set(user.id),
                    token: Set(token),
                    expires_at: Set(expires_at),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                };
                PasswordReset::insert(row).exec_with_returning(&self.db).await?
            }
        };

        Ok(reset)
    }

    /// Redeem a reset token. Single-use: the row is removed in the same
    /// transaction that rewrites the password hash.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountsServiceError> {
        let reset = PasswordReset::find()
            .filter(PasswordResetColumn::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or(AccountsServiceError::InvalidOrExpiredToken)?;

        let expires_at = chrono::DateTime::parse_from_rfc3339(&reset.expires_at)
            .map_err(|_| AccountsServiceError::InvalidOrExpiredToken)?;
        if expires_at < chrono::Utc::now() {
            PasswordReset::delete_by_id(reset.user_id).exec(&self.db).await?;
            return Err(AccountsServiceError::InvalidOrExpiredToken);
        }

        let user = self.get_user(reset.user_id).await?;
        let password_hash = hash_password(new_password)?;

        let txn = self.db.begin().await?;
        let mut user: UserActiveModel = user.into();
        user.password_hash = Set(password_hash);
        user.update(&txn).await?;
        PasswordReset::delete_by_id(reset.user_id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserModel, AccountsServiceError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)
    }

    pub async fn list_students(&self) -> Result<Vec<UserModel>, AccountsServiceError> {
        let students = User::find()
            .filter(UserColumn::Role.eq(UserRole::Student))
            .all(&self.db)
            .await?;

        Ok(students)
    }

    /// Update display fields. Email, role and credentials have their own
    /// paths and are not touched here.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        display_name: Option<String>,
        avatar: Option<String>,
    ) -> Result<UserModel, AccountsServiceError> {
        let user = self.get_user(user_id).await?;

        let mut user: UserActiveModel = user.into();
        if let Some(display_name) = display_name {
            user.display_name = Set(display_name);
        }
        if let Some(avatar) = avatar {
            user.avatar = Set(avatar);
        }

        let updated = user.update(&self.db).await?;
        Ok(updated)
    }

    /// Upsert the (user, video) progress row. Progress is clamped to 0–100;
    /// a repeat report overwrites, it never appends.
    pub async fn record_watch_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        progress: i32,
    ) -> Result<WatchProgressModel, AccountsServiceError> {
        self.get_user(user_id).await?;
        let video_exists = Video::find_by_id(video_id).one(&self.db).await?.is_some();
        if !video_exists {
            return Err(AccountsServiceError::VideoNotFound);
        }

        let progress = progress.clamp(0, 100);
        let updated_at = chrono::Utc::now().to_rfc3339();

        let existing = WatchProgress::find()
            .filter(WatchProgressColumn::UserId.eq(user_id))
            .filter(WatchProgressColumn::VideoId.eq(video_id))
            .one(&self.db)
            .await?;

        let row = match existing {
            Some(row) => {
                let mut row: WatchProgressActiveModel = row.into();
                row.progress = Set(progress);
                row.updated_at = Set(updated_at);
                row.update(&self.db).await?
            }
            None => {
                let row = WatchProgressActiveModel {
                    id: Set(WatchProgressId::new()),
                    user_id: Set(user_id),
                    video_id: Set(video_id),
                    progress: Set(progress),
                    updated_at: Set(updated_at),
                };
                WatchProgress::insert(row).exec_with_returning(&self.db).await?
            }
        };

        Ok(row)
    }

    /// Reported percentage for a video, 0 when never watched.
    pub async fn video_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<i32, AccountsServiceError> {
        let row = WatchProgress::find()
            .filter(WatchProgressColumn::UserId.eq(user_id))
            .filter(WatchProgressColumn::VideoId.eq(video_id))
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.progress).unwrap_or(0))
    }

    pub async fn is_video_watched(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<bool, AccountsServiceError> {
        Ok(self.video_progress(user_id, video_id).await? >= WATCHED_THRESHOLD)
    }
}
