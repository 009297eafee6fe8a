//! Role names embedded in access-token claims.

/// Full administrative access (destination management, all-jobs views).
pub const ROLE_ADMIN: &str = "admin";

/// Regular end user. Sees and dispatches only their own jobs.
pub const ROLE_MEMBER: &str = "member";
