//! User Service - local accounts, Google federation, profiles and admin
//! user management

use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::infrastructure::auth::{hash_password, verify_password};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::oauth::GoogleProfile;
use crate::models::user::{self, ProfileUpdate, Role};
use crate::models::{cart, favorite};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    /// Not required for Google-only accounts setting a first password
    pub current_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    /// Matches name or email
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<user::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> DomainResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::Validation("Invalid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn hash(password: &str) -> DomainResult<String> {
    hash_password(password).map_err(|e| DomainError::Internal(format!("password hashing failed: {}", e)))
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> DomainResult<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn get_user(db: &DatabaseConnection, id: i32) -> DomainResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

/// Create a local account with the `user` role.
pub async fn signup(db: &DatabaseConnection, input: SignupInput) -> DomainResult<user::Model> {
    let name = input.name.trim().to_string();
    let email = normalize_email(&input.email);

    if name.is_empty() {
        return Err(DomainError::Validation("Name is required".into()));
    }
    validate_email(&email)?;
    validate_password(&input.password)?;

    if find_by_email(db, &email).await?.is_some() {
        return Err(DomainError::Conflict(
            "User already exists with this email".into(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(Some(hash(&input.password)?)),
        role: Set(Role::User),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("New account created: {}", user.email);
    Ok(user)
}

/// Check an email/password pair. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(db: &DatabaseConnection, input: LoginInput) -> DomainResult<user::Model> {
    let email = normalize_email(&input.email);
    let invalid = || DomainError::Unauthorized("Invalid email or password".into());

    let Some(user) = find_by_email(db, &email).await? else {
        tracing::warn!("Login attempt for unknown email: {}", email);
        return Err(invalid());
    };

    let Some(stored) = user.password_hash.as_deref() else {
        return Err(DomainError::Unauthorized(
            "This account uses Google sign-in".into(),
        ));
    };

    match verify_password(&input.password, stored) {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", user.id);
            Err(invalid())
        }
        Err(e) => {
            tracing::error!("Stored hash for user {} is unreadable: {}", user.id, e);
            Err(invalid())
        }
    }
}

/// Find or create the account for a Google identity. Matching is by
/// provider id first, then by email, which links Google to an existing
/// local account.
pub async fn upsert_google_user(db: &DatabaseConnection, profile: GoogleProfile) -> DomainResult<user::Model> {
    let now = chrono::Utc::now().to_rfc3339();

    if let Some(existing) = user::Entity::find()
        .filter(user::Column::GoogleId.eq(profile.sub.as_str()))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let email = normalize_email(&profile.email);

    if let Some(existing) = find_by_email(db, &email).await? {
        tracing::info!("Linking Google account to existing user {}", existing.id);
        let keep_avatar = existing.avatar.is_some();
        let mut active: user::ActiveModel = existing.into();
        active.google_id = Set(Some(profile.sub));
        if !keep_avatar {
            active.avatar = Set(profile.picture);
        }
        active.updated_at = Set(now);
        return Ok(active.update(db).await?);
    }

    let name = profile
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let user = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(None),
        google_id: Set(Some(profile.sub)),
        role: Set(Role::User),
        avatar: Set(profile.picture),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("New account created via Google: {}", user.email);
    Ok(user)
}

pub async fn update_profile(
    db: &DatabaseConnection,
    id: i32,
    update: ProfileUpdate,
) -> DomainResult<user::Model> {
    let user = get_user(db, id).await?;
    let mut active: user::ActiveModel = user.into();

    if let Some(name) = update.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("Name cannot be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(v) = update.avatar {
        active.avatar = Set(Some(v));
    }
    if let Some(v) = update.phone {
        active.phone = Set(Some(v));
    }
    if let Some(v) = update.address {
        active.address = Set(Some(v));
    }
    if let Some(v) = update.city {
        active.city = Set(Some(v));
    }
    if let Some(v) = update.postal_code {
        active.postal_code = Set(Some(v));
    }
    if let Some(v) = update.country {
        active.country = Set(Some(v));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

pub async fn change_password(db: &DatabaseConnection, id: i32, change: PasswordChange) -> DomainResult<()> {
    let user = get_user(db, id).await?;

    if let Some(stored) = user.password_hash.as_deref() {
        let current = change.current_password.as_deref().unwrap_or_default();
        let matches = verify_password(current, stored).unwrap_or(false);
        if !matches {
            return Err(DomainError::Unauthorized(
                "Current password is incorrect".into(),
            ));
        }
    }
    validate_password(&change.new_password)?;

    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(Some(hash(&change.new_password)?));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    active.update(db).await?;

    tracing::info!("Password changed for user {}", id);
    Ok(())
}

pub async fn list_users(db: &DatabaseConnection, filter: UserFilter) -> DomainResult<UserPage> {
    let mut query = user::Entity::find();

    if let Some(q) = &filter.search
        && !q.trim().is_empty()
    {
        let q = q.trim();
        query = query.filter(
            Condition::any()
                .add(user::Column::Name.contains(q))
                .add(user::Column::Email.contains(q)),
        );
    }

    let page = filter.page.unwrap_or(1).max(1);
    let limit = filter.limit.unwrap_or(20).clamp(1, 100);

    let paginator = query
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(db, limit);
    let total = paginator.num_items().await?;
    let users = paginator.fetch_page(page - 1).await?;

    Ok(UserPage {
        users,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    })
}

pub async fn update_role(
    db: &DatabaseConnection,
    acting_admin_id: i32,
    target_id: i32,
    role: Role,
) -> DomainResult<user::Model> {
    if acting_admin_id == target_id {
        return Err(DomainError::InvalidState(
            "You cannot change your own role".into(),
        ));
    }

    let user = get_user(db, target_id).await?;
    let mut active: user::ActiveModel = user.into();
    active.role = Set(role);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    tracing::info!(
        "Admin {} set role of user {} to {:?}",
        acting_admin_id,
        target_id,
        role
    );
    Ok(updated)
}

/// Delete a customer account with its cart and favorites. Orders are kept.
pub async fn delete_user(db: &DatabaseConnection, target_id: i32) -> DomainResult<()> {
    let user = get_user(db, target_id).await?;
    if user.is_admin() {
        return Err(DomainError::Forbidden("Cannot delete an admin user".into()));
    }

    let txn = db.begin().await?;

    favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(target_id))
        .exec(&txn)
        .await?;
    // cart_items follow through ON DELETE CASCADE
    cart::Entity::delete_many()
        .filter(cart::Column::UserId.eq(target_id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(target_id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted user {}", target_id);
    Ok(())
}
