//! Request authorization.

use std::collections::{HashMap, HashSet};

use http::{HeaderMap, header};

use crate::error::ApiError;

/// Permission needed to toggle debug nodes.
pub const DEBUG_WRITE: &str = "debug.write";

/// Permission granting everything.
pub const WILDCARD: &str = "*";

/// Decides whether a request may use a permission.
pub trait Authorizer: Send + Sync + 'static {
    /// `Ok(())` when the request carries `permission`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] without usable credentials,
    /// [`ApiError::Forbidden`] when they lack the permission.
    fn authorize(&self, headers: &HeaderMap, permission: &'static str) -> Result<(), ApiError>;
}

/// Grants every request every permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _headers: &HeaderMap, _permission: &'static str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Bearer tokens, each with a set of permissions.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthorizer {
    tokens: HashMap<String, HashSet<String>>,
}

impl TokenAuthorizer {
    /// Authorizer accepting the given tokens.
    pub fn new<T, P>(tokens: T) -> Self
    where
        T: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, perms)| (token, perms.into_iter().collect()))
                .collect(),
        }
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is known.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

impl Authorizer for TokenAuthorizer {
    fn authorize(&self, headers: &HeaderMap, permission: &'static str) -> Result<(), ApiError> {
        let granted = bearer(headers)
            .and_then(|token| self.tokens.get(token))
            .ok_or(ApiError::Unauthorized)?;
        if granted.contains(permission) || granted.contains(WILDCARD) {
            Ok(())
        } else {
            tracing::debug!(permission, "permission denied");
            Err(ApiError::Forbidden(permission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn authorizer() -> TokenAuthorizer {
        TokenAuthorizer::new([
            ("writer".to_owned(), vec![DEBUG_WRITE.to_owned()]),
            ("reader".to_owned(), vec!["debug.read".to_owned()]),
            ("admin".to_owned(), vec![WILDCARD.to_owned()]),
        ])
    }

    fn headers(auth: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = auth {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(auth));
        }
        headers
    }

    #[rstest]
    #[case(Some("Bearer writer"), Ok(()))]
    #[case(Some("bearer admin"), Ok(()))]
    #[case(Some("Bearer reader"), Err(ApiError::Forbidden(DEBUG_WRITE)))]
    #[case(Some("Bearer nobody"), Err(ApiError::Unauthorized))]
    #[case(Some("Basic writer"), Err(ApiError::Unauthorized))]
    #[case(None, Err(ApiError::Unauthorized))]
    fn bearer_tokens(#[case] auth: Option<&'static str>, #[case] expected: Result<(), ApiError>) {
        assert_eq!(authorizer().authorize(&headers(auth), DEBUG_WRITE), expected);
    }

    #[test]
    fn allow_all_needs_no_credentials() {
        assert_eq!(AllowAll.authorize(&HeaderMap::new(), DEBUG_WRITE), Ok(()));
    }
}
