//! Ordered route access table.
//!
//! Rules are checked top-down and the first rule whose path pattern and method
//! match decides. A request no rule matches needs the `USER` role. The table is
//! built once in `app.rs` and shared read-only.
//!
//! Pattern syntax (ant style, segment based):
//! - `literal` matches one identical segment
//! - `*` matches exactly one segment
//! - `**` matches zero or more segments

use axum::http::Method;
use thiserror::Error;

use crate::middleware::auth::context::SecurityContext;
use crate::services::auth::principal::DEFAULT_ROLE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(String),
}

impl Requirement {
    pub fn role(name: impl Into<String>) -> Self {
        Self::Role(name.into())
    }

    fn admits(&self, ctx: &SecurityContext) -> bool {
        match self {
            Requirement::Public => true,
            Requirement::Authenticated => ctx.is_authenticated(),
            Requirement::Role(name) => ctx.principal().is_some_and(|p| p.has_role(name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("pattern has an empty segment: {0}")]
    EmptySegment(String),
    #[error("wildcards must fill a whole segment: {0}")]
    PartialWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        let Some(body) = raw.strip_prefix('/') else {
            return Err(PolicyError::NotAbsolute(raw.to_string()));
        };

        let mut segments = Vec::new();
        if !body.is_empty() {
            for part in body.split('/') {
                let segment = match part {
                    "" => return Err(PolicyError::EmptySegment(raw.to_string())),
                    "*" => Segment::Any,
                    "**" => Segment::Rest,
                    p if p.contains('*') => {
                        return Err(PolicyError::PartialWildcard(raw.to_string()));
                    }
                    p => Segment::Literal(p.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self { segments })
    }

    pub fn matches(&self, path: &str) -> bool {
        match canonical_segments(path) {
            Some(segments) => match_segments(&self.segments, &segments),
            None => false,
        }
    }
}

/// Split a request path into segments, or `None` when it is not canonical.
///
/// A single trailing slash is ignored. Dot segments, empty interior segments,
/// backslashes and percent-encoded `.`, `/`, `\` make the path non-canonical;
/// such paths match no rule and fall through to the default requirement.
fn canonical_segments(path: &str) -> Option<Vec<&str>> {
    let body = path.strip_prefix('/')?;
    let body = body.strip_suffix('/').unwrap_or(body);
    if body.is_empty() {
        return Some(Vec::new());
    }

    let lowered = body.to_ascii_lowercase();
    if body.contains('\\')
        || lowered.contains("%2e")
        || lowered.contains("%2f")
        || lowered.contains("%5c")
    {
        return None;
    }

    let mut out = Vec::new();
    for segment in body.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        out.push(segment);
    }
    Some(out)
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((Segment::Any, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first().is_some_and(|s| s == lit) && match_segments(rest, &path[1..])
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    Only(Method),
}

impl MethodMatch {
    fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Only(m) => m == method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub method: MethodMatch,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.pattern.matches(path)
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// The application's route table.
    pub fn standard() -> Result<Self, PolicyError> {
        let mut builder = Self::builder()
            .any_method("/signup/**", Requirement::Public)
            .any_method("/authenticate", Requirement::Public)
            .rule(Method::GET, "/health", Requirement::Public);

        for prefix in PUBLIC_READ_PREFIXES {
            builder = builder.rule(Method::GET, &format!("/{prefix}/**"), Requirement::Public);
        }

        builder
            .rule(Method::GET, "/me", Requirement::Authenticated)
            .build()
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// The rule that decides `(method, path)`, or `None` when the default applies.
    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|r| r.matches(method, path))
    }

    pub fn requirement_for(&self, method: &Method, path: &str) -> &Requirement {
        self.matching_rule(method, path)
            .map(|r| &r.requirement)
            .unwrap_or(&self.fallback)
    }

    pub fn authorize(&self, method: &Method, path: &str, ctx: &SecurityContext) -> Decision {
        if self.requirement_for(method, path).admits(ctx) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Read-only resources anyone may GET.
pub const PUBLIC_READ_PREFIXES: &[&str] = &[
    "consultation",
    "content",
    "contenttype",
    "event",
    "globalsettings",
    "powerpoint",
    "role",
    "rssfeed",
    "schedule",
    "useravailability",
];

#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    entries: Vec<(String, MethodMatch, Requirement)>,
}

impl AccessPolicyBuilder {
    pub fn rule(mut self, method: Method, pattern: &str, requirement: Requirement) -> Self {
        self.entries
            .push((pattern.to_string(), MethodMatch::Only(method), requirement));
        self
    }

    pub fn any_method(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.entries
            .push((pattern.to_string(), MethodMatch::Any, requirement));
        self
    }

    pub fn build(self) -> Result<AccessPolicy, PolicyError> {
        let rules = self
            .entries
            .into_iter()
            .map(|(pattern, method, requirement)| {
                Ok(AccessRule {
                    pattern: PathPattern::parse(&pattern)?,
                    method,
                    requirement,
                })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        Ok(AccessPolicy {
            rules,
            fallback: Requirement::role(DEFAULT_ROLE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::Principal;

    fn anonymous() -> SecurityContext {
        SecurityContext::Anonymous
    }

    fn with_roles(roles: &[&str]) -> SecurityContext {
        SecurityContext::Authenticated(Principal::new(1, "alice", roles.iter().copied()))
    }

    fn policy() -> AccessPolicy {
        AccessPolicy::standard().unwrap()
    }

    #[test]
    fn double_star_matches_zero_or_more_segments() {
        let p = PathPattern::parse("/event/**").unwrap();
        assert!(p.matches("/event"));
        assert!(p.matches("/event/"));
        assert!(p.matches("/event/3"));
        assert!(p.matches("/event/3/attendees"));
        assert!(!p.matches("/events"));
        assert!(!p.matches("/eventx/3"));
        assert!(!p.matches("/api/event/3"));
    }

    #[test]
    fn single_star_matches_one_segment() {
        let p = PathPattern::parse("/user/*/schedule").unwrap();
        assert!(p.matches("/user/5/schedule"));
        assert!(!p.matches("/user/schedule"));
        assert!(!p.matches("/user/5/6/schedule"));
    }

    #[test]
    fn double_star_in_the_middle() {
        let p = PathPattern::parse("/a/**/z").unwrap();
        assert!(p.matches("/a/z"));
        assert!(p.matches("/a/b/c/z"));
        assert!(!p.matches("/a/b/c"));
    }

    #[test]
    fn exact_pattern_tolerates_trailing_slash_only() {
        let p = PathPattern::parse("/authenticate").unwrap();
        assert!(p.matches("/authenticate"));
        assert!(p.matches("/authenticate/"));
        assert!(!p.matches("/authenticate/extra"));
        assert!(!p.matches("/Authenticate"));
    }

    #[test]
    fn non_canonical_paths_never_match() {
        let p = PathPattern::parse("/event/**").unwrap();
        assert!(!p.matches("/event/../user/1"));
        assert!(!p.matches("/event/./3"));
        assert!(!p.matches("/event//3"));
        assert!(!p.matches("/event/%2e%2e/user"));
        assert!(!p.matches("/event/%2F..%2Fuser"));
        assert!(!p.matches("/event\\..\\user"));
        assert!(!p.matches("event/3"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(matches!(
            PathPattern::parse("event/**"),
            Err(PolicyError::NotAbsolute(_))
        ));
        assert!(matches!(
            PathPattern::parse("/event//x"),
            Err(PolicyError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/event/ab*"),
            Err(PolicyError::PartialWildcard(_))
        ));
    }

    #[test]
    fn public_reads_allow_anonymous_get_only() {
        let policy = policy();
        for prefix in PUBLIC_READ_PREFIXES {
            let path = format!("/{prefix}/5");
            assert_eq!(
                policy.authorize(&Method::GET, &path, &anonymous()),
                Decision::Allow,
                "GET {path}"
            );
            assert_eq!(
                policy.authorize(&Method::DELETE, &path, &anonymous()),
                Decision::Deny,
                "DELETE {path}"
            );
        }
    }

    #[test]
    fn head_is_not_treated_as_get() {
        assert_eq!(
            policy().authorize(&Method::HEAD, "/event/1", &anonymous()),
            Decision::Deny
        );
    }

    #[test]
    fn signup_and_authenticate_accept_every_method() {
        let policy = policy();
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            assert_eq!(
                policy.authorize(&method, "/signup", &anonymous()),
                Decision::Allow
            );
            assert_eq!(
                policy.authorize(&method, "/signup/confirm", &anonymous()),
                Decision::Allow
            );
            assert_eq!(
                policy.authorize(&method, "/authenticate", &anonymous()),
                Decision::Allow
            );
        }
    }

    #[test]
    fn unmatched_routes_require_user_role() {
        let policy = policy();
        let cases = [
            (Method::DELETE, "/event/3"),
            (Method::POST, "/schedule"),
            (Method::GET, "/user/1"),
            (Method::GET, "/no/such/route"),
            (Method::GET, "/event/../user/1"),
        ];

        for (method, path) in cases {
            assert!(policy.matching_rule(&method, path).is_none(), "{method} {path}");
            assert_eq!(policy.authorize(&method, path, &anonymous()), Decision::Deny);
            assert_eq!(
                policy.authorize(&method, path, &with_roles(&["GUEST"])),
                Decision::Deny
            );
            assert_eq!(
                policy.authorize(&method, path, &with_roles(&[])),
                Decision::Deny
            );
            assert_eq!(
                policy.authorize(&method, path, &with_roles(&["GUEST", "USER"])),
                Decision::Allow
            );
        }
    }

    #[test]
    fn authenticated_requirement_ignores_roles() {
        let policy = policy();
        assert_eq!(
            policy.authorize(&Method::GET, "/me", &with_roles(&[])),
            Decision::Allow
        );
        assert_eq!(
            policy.authorize(&Method::GET, "/me", &anonymous()),
            Decision::Deny
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = AccessPolicy::builder()
            .rule(Method::GET, "/admin/**", Requirement::role("ADMIN"))
            .any_method("/**", Requirement::Public)
            .build()
            .unwrap();

        assert_eq!(
            policy.authorize(&Method::GET, "/admin/panel", &with_roles(&["USER"])),
            Decision::Deny
        );
        assert_eq!(
            policy.authorize(&Method::GET, "/admin/panel", &with_roles(&["ADMIN"])),
            Decision::Allow
        );
        assert_eq!(
            policy.authorize(&Method::POST, "/admin/panel", &anonymous()),
            Decision::Allow
        );
    }

    #[test]
    fn catch_all_placed_first_shadows_everything() {
        let policy = AccessPolicy::builder()
            .any_method("/**", Requirement::Authenticated)
            .rule(Method::GET, "/event/**", Requirement::Public)
            .build()
            .unwrap();

        assert_eq!(
            policy.authorize(&Method::GET, "/event/1", &anonymous()),
            Decision::Deny
        );
    }

    #[test]
    fn role_names_are_case_sensitive() {
        assert_eq!(
            policy().authorize(&Method::DELETE, "/event/3", &with_roles(&["user"])),
            Decision::Deny
        );
    }
}
