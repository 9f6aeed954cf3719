//! Caller identity supplied by the authenticating gateway.
//!
//! The gateway verifies tokens and forwards the identity in trusted headers.
//! This service never authenticates on its own; it only reads those headers
//! and checks ownership.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-auth-user-id";
pub const USERNAME_HEADER: &str = "x-auth-username";
pub const EMAIL_HEADER: &str = "x-auth-email";
pub const ROLES_HEADER: &str = "x-auth-roles";

const ADMIN_ROLE: &str = "admin";

/// Column widths of `users.username` and `users.email`.
pub const USERNAME_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub is_admin: bool,
}

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = header(USER_ID_HEADER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(AppError::Unauthorized)?;
        let username = header(USERNAME_HEADER).ok_or(AppError::Unauthorized)?;
        let username: String = username.chars().take(USERNAME_MAX_CHARS).collect();
        // A truncated address would be wrong, so an oversized one is dropped
        let email = header(EMAIL_HEADER)
            .filter(|e| e.chars().count() <= EMAIL_MAX_CHARS)
            .unwrap_or_default();
        let is_admin = header(ROLES_HEADER)
            .map(|roles| {
                roles
                    .split(',')
                    .any(|r| r.trim().eq_ignore_ascii_case(ADMIN_ROLE))
            })
            .unwrap_or(false);

        Ok(CurrentUser {
            id,
            username,
            email: email.to_string(),
            is_admin,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        CurrentUser::from_headers(&parts.headers)
    }
}

/// A caller carrying the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// Mutations and deletions are allowed only on resources the caller owns.
pub fn ensure_owner(resource_owner: Uuid, caller: &CurrentUser) -> Result<(), AppError> {
    if resource_owner == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const ID: &str = "7d1b0e9e-3c4f-4a53-9a55-5f1f3c1d2b10";

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_full_identity_parsed() {
        let user = CurrentUser::from_headers(&headers(&[
            (USER_ID_HEADER, ID),
            (USERNAME_HEADER, "budi"),
            (EMAIL_HEADER, "budi@ums.ac.id"),
            (ROLES_HEADER, "member, Admin"),
        ]))
        .unwrap();
        assert_eq!(user.id.to_string(), ID);
        assert_eq!(user.username, "budi");
        assert_eq!(user.email, "budi@ums.ac.id");
        assert!(user.is_admin);
    }

    #[test]
    fn test_email_and_roles_optional() {
        let user =
            CurrentUser::from_headers(&headers(&[(USER_ID_HEADER, ID), (USERNAME_HEADER, "budi")]))
                .unwrap();
        assert_eq!(user.email, "");
        assert!(!user.is_admin);
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        assert!(matches!(
            CurrentUser::from_headers(&HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            CurrentUser::from_headers(&headers(&[(USER_ID_HEADER, ID)])),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            CurrentUser::from_headers(&headers(&[
                (USER_ID_HEADER, "not-a-uuid"),
                (USERNAME_HEADER, "budi")
            ])),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_oversized_identity_fields_bounded() {
        let long_name = "u".repeat(USERNAME_MAX_CHARS + 20);
        let long_email = format!("{}@ums.ac.id", "a".repeat(EMAIL_MAX_CHARS));
        let user = CurrentUser::from_headers(&headers(&[
            (USER_ID_HEADER, ID),
            (USERNAME_HEADER, long_name.as_str()),
            (EMAIL_HEADER, long_email.as_str()),
        ]))
        .unwrap();
        assert_eq!(user.username.chars().count(), USERNAME_MAX_CHARS);
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_ensure_owner() {
        let user =
            CurrentUser::from_headers(&headers(&[(USER_ID_HEADER, ID), (USERNAME_HEADER, "budi")]))
                .unwrap();
        assert!(ensure_owner(user.id, &user).is_ok());
        assert!(matches!(
            ensure_owner(Uuid::new_v4(), &user),
            Err(AppError::Forbidden)
        ));
    }
}
