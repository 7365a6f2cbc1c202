use crate::services::auth::Principal;

/// Identity resolved for one request.
///
/// Lives in the request's extensions from the auth middleware to the handler
/// and is dropped with the request. Never store it anywhere longer-lived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityContext {
    Anonymous,
    Authenticated(Principal),
}

impl SecurityContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(p) => Some(p),
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(p) => Some(p),
        }
    }
}
