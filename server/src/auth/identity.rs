use std::collections::HashSet;

use pawmart_misc::api::role::ADMIN_ROLE;

/// The authenticated caller of a request. Roles are always loaded from
/// storage at request time, never trusted from the token itself, so a
/// role change takes effect on the very next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,

    pub roles: HashSet<String>,
}

impl Identity {
    pub fn new(name: impl ToString, roles: HashSet<String>) -> Self {
        Self {
            name: name.to_string(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Admin is a set membership check. A user holding the admin role
    /// alongside any other roles is still an admin.
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Whether this identity may operate on a resource owned by `owner`.
    /// Admins can access everything, others only their own resources.
    pub fn can_access_owned(&self, owner: &str) -> bool {
        self.is_admin() || self.name == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str, roles: &[&str]) -> Identity {
        Identity::new(name, roles.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn test_is_admin() {
        assert!(identity("root", &["admin"]).is_admin());
        assert!(identity("mixed", &["customer", "admin"]).is_admin());
        assert!(identity("mixed2", &["admin", "customer", "seller"]).is_admin());

        assert!(!identity("alice", &["customer"]).is_admin());
        assert!(!identity("bob", &[]).is_admin());
        // Role names are exact matches, no prefixes.
        assert!(!identity("eve", &["administrator"]).is_admin());
    }

    #[test]
    fn test_has_role() {
        let id = identity("alice", &["customer", "seller"]);
        assert!(id.has_role("customer"));
        assert!(id.has_role("seller"));
        assert!(!id.has_role("admin"));
        assert!(!id.has_role(""));
    }

    #[test]
    fn test_can_access_owned() {
        let alice = identity("alice", &["customer"]);
        assert!(alice.can_access_owned("alice"));
        assert!(!alice.can_access_owned("bob"));

        let root = identity("root", &["admin"]);
        assert!(root.can_access_owned("root"));
        assert!(root.can_access_owned("alice"));
        assert!(root.can_access_owned("anyone"));
    }
}
