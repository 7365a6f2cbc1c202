use std::collections::BTreeSet;

use serde::Serialize;

/// Role every regular account carries; also the requirement for routes that
/// no access rule names.
pub const DEFAULT_ROLE: &str = "USER";

/// Authenticated identity.
///
/// Built by the credential store at login and rebuilt from a verified token on
/// every request. Roles are a flat set; there is no hierarchy between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(id: i64, username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Strip the `ROLE_` prefix some credential stores persist.
pub fn normalize_role(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("ROLE_")
        .unwrap_or(trimmed)
        .to_string()
}
