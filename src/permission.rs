use std::collections::HashSet;

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use async_trait::async_trait;

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
    Unauthenticated,
}

/// Decides whether the caller behind a request may perform an action such
/// as `plan-types:write`.
#[async_trait(?Send)]
pub trait PermissionChecker: Send + Sync {
    async fn check_permission(&self, request: &HttpRequest, action: &str) -> Access;
}

pub async fn require_permission(
    checker: &dyn PermissionChecker,
    request: &HttpRequest,
    action: &str,
) -> Result<(), Error> {
    match checker.check_permission(request, action).await {
        Access::Allowed => Ok(()),
        Access::Denied => {
            tracing::info!(action, "permission denied");
            Err(Error::PermissionDenied {
                action: action.to_owned(),
            })
        }
        Access::Unauthenticated => Err(Error::AuthenticationRequired),
    }
}

fn bearer_token(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Grants every action to callers presenting one of the admin tokens. Any
/// other bearer token is authenticated but holds no permissions.
#[derive(Clone, Debug, Default)]
pub struct TokenPermissionChecker {
    admin_tokens: HashSet<String>,
}

impl TokenPermissionChecker {
    pub fn new<I, S>(admin_tokens: I) -> TokenPermissionChecker
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TokenPermissionChecker {
            admin_tokens: admin_tokens.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait(?Send)]
impl PermissionChecker for TokenPermissionChecker {
    async fn check_permission(&self, request: &HttpRequest, _action: &str) -> Access {
        match bearer_token(request) {
            Some(token) if self.admin_tokens.contains(token) => Access::Allowed,
            Some(_) => Access::Denied,
            None => Access::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn checker() -> TokenPermissionChecker {
        TokenPermissionChecker::new(vec!["s3cret"])
    }

    #[actix_rt::test]
    async fn missing_or_blank_credentials_are_unauthenticated() {
        let bare = TestRequest::default().to_http_request();
        let blank = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic czNjcmV0"))
            .to_http_request();

        for request in &[bare, blank, basic] {
            assert_eq!(
                checker().check_permission(request, "plan-types:write").await,
                Access::Unauthenticated
            );
        }
    }

    #[actix_rt::test]
    async fn only_admin_tokens_are_allowed() {
        let admin = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer s3cret"))
            .to_http_request();
        let member = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer guess"))
            .to_http_request();

        assert_eq!(
            require_permission(&checker(), &admin, "activity-types:write").await,
            Ok(())
        );
        assert_eq!(
            require_permission(&checker(), &member, "activity-types:write").await,
            Err(Error::PermissionDenied {
                action: "activity-types:write".into()
            })
        );
    }
}
