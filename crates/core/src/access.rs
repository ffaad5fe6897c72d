//! Access policy evaluation.
//!
//! Every write path asks [`evaluate`] whether a subject may perform an action
//! on a resource. Callers resolve existence first, so a denial on a resource
//! that exists always surfaces as 401/403 and never as 404.
//!
//! | Resource                 | Read       | Create        | Update / Delete             |
//! |--------------------------|------------|---------------|-----------------------------|
//! | Title, Category, Genre   | anyone     | admin         | admin                       |
//! | Review, Comment          | anyone     | authenticated | author, moderator, admin    |
//! | User                     | self/admin | admin         | admin                       |

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Who is asking. Identity resolution happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Anonymous,
    Authenticated { user_id: DbId, role: Role },
}

impl Subject {
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Subject::Anonymous => None,
            Subject::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Subject::Anonymous => None,
            Subject::Authenticated { role, .. } => Some(*role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_write(self) -> bool {
        !matches!(self, Action::Read)
    }
}

/// What is being acted on. Authored resources carry their author's id once
/// the row exists; `None` means the resource is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Title,
    Category,
    Genre,
    Review { author_id: Option<DbId> },
    Comment { author_id: Option<DbId> },
    User { user_id: Option<DbId> },
}

impl Resource {
    fn label(&self) -> &'static str {
        match self {
            Resource::Title => "title",
            Resource::Category => "category",
            Resource::Genre => "genre",
            Resource::Review { .. } => "review",
            Resource::Comment { .. } => "comment",
            Resource::User { .. } => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The subject is anonymous and the action needs an identity.
    AuthenticationRequired,
    /// Only admins may perform this action.
    AdminOnly,
    /// Only the author, a moderator, or an admin may perform this action.
    NotAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `subject` may perform `action` on `resource`.
pub fn evaluate(subject: &Subject, action: Action, resource: &Resource) -> Decision {
    let author_id = match resource {
        Resource::User { user_id } => return evaluate_user(subject, action, *user_id),
        _ if !action.is_write() => return Decision::Allow,
        Resource::Title | Resource::Category | Resource::Genre => None,
        Resource::Review { author_id } | Resource::Comment { author_id } => Some(*author_id),
    };

    let (user_id, role) = match subject {
        Subject::Anonymous => return Decision::Deny(DenyReason::AuthenticationRequired),
        Subject::Authenticated { user_id, role } => (*user_id, *role),
    };

    match author_id {
        // Catalog entities.
        None if role.is_admin() => Decision::Allow,
        None => Decision::Deny(DenyReason::AdminOnly),
        // Authored entities.
        Some(_) if action == Action::Create || role.can_moderate() => Decision::Allow,
        Some(Some(author)) if author == user_id => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::NotAuthor),
    }
}

fn evaluate_user(subject: &Subject, action: Action, target: Option<DbId>) -> Decision {
    match subject {
        Subject::Anonymous => Decision::Deny(DenyReason::AuthenticationRequired),
        Subject::Authenticated { role, .. } if role.is_admin() => Decision::Allow,
        Subject::Authenticated { user_id, .. } => {
            if action == Action::Read && target == Some(*user_id) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::AdminOnly)
            }
        }
    }
}

/// Evaluate and convert a denial into the matching [`CoreError`].
pub fn authorize(subject: &Subject, action: Action, resource: &Resource) -> Result<(), CoreError> {
    match evaluate(subject, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::AuthenticationRequired) => Err(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        )),
        Decision::Deny(DenyReason::AdminOnly) => Err(CoreError::Forbidden(format!(
            "Admin role required to modify this {}",
            resource.label()
        ))),
        Decision::Deny(DenyReason::NotAuthor) => Err(CoreError::Forbidden(format!(
            "Only the author, a moderator, or an admin may modify this {}",
            resource.label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: DbId = 1;
    const OTHER: DbId = 2;

    fn user(id: DbId, role: Role) -> Subject {
        Subject::Authenticated { user_id: id, role }
    }

    fn review_by(author: DbId) -> Resource {
        Resource::Review {
            author_id: Some(author),
        }
    }

    #[test]
    fn anyone_may_read_public_resources() {
        let resources = [
            Resource::Title,
            Resource::Category,
            Resource::Genre,
            review_by(AUTHOR),
            Resource::Comment {
                author_id: Some(AUTHOR),
            },
        ];
        for resource in resources {
            assert!(evaluate(&Subject::Anonymous, Action::Read, &resource).is_allowed());
            assert!(evaluate(&user(OTHER, Role::User), Action::Read, &resource).is_allowed());
        }
    }

    #[test]
    fn anonymous_writes_require_authentication() {
        let decision = evaluate(
            &Subject::Anonymous,
            Action::Create,
            &Resource::Review { author_id: None },
        );
        assert_eq!(decision, Decision::Deny(DenyReason::AuthenticationRequired));

        let err = authorize(&Subject::Anonymous, Action::Delete, &Resource::Title).unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[test]
    fn any_authenticated_user_may_create_reviews_and_comments() {
        let subject = user(OTHER, Role::User);
        assert!(evaluate(&subject, Action::Create, &Resource::Review { author_id: None }).is_allowed());
        assert!(
            evaluate(&subject, Action::Create, &Resource::Comment { author_id: None }).is_allowed()
        );
    }

    #[test]
    fn author_may_edit_own_review() {
        let subject = user(AUTHOR, Role::User);
        assert!(evaluate(&subject, Action::Update, &review_by(AUTHOR)).is_allowed());
        assert!(evaluate(&subject, Action::Delete, &review_by(AUTHOR)).is_allowed());
    }

    #[test]
    fn non_author_is_forbidden_not_missing() {
        let subject = user(OTHER, Role::User);
        assert_eq!(
            evaluate(&subject, Action::Update, &review_by(AUTHOR)),
            Decision::Deny(DenyReason::NotAuthor)
        );
        let err = authorize(&subject, Action::Update, &review_by(AUTHOR)).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn moderators_and_admins_may_edit_any_review_or_comment() {
        for role in [Role::Moderator, Role::Admin] {
            let subject = user(OTHER, role);
            assert!(evaluate(&subject, Action::Update, &review_by(AUTHOR)).is_allowed());
            assert!(evaluate(
                &subject,
                Action::Delete,
                &Resource::Comment {
                    author_id: Some(AUTHOR)
                }
            )
            .is_allowed());
        }
    }

    #[test]
    fn catalog_writes_are_admin_only() {
        for resource in [Resource::Title, Resource::Category, Resource::Genre] {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(evaluate(&user(AUTHOR, Role::Admin), action, &resource).is_allowed());
                assert_eq!(
                    evaluate(&user(AUTHOR, Role::Moderator), action, &resource),
                    Decision::Deny(DenyReason::AdminOnly)
                );
                assert_eq!(
                    evaluate(&user(AUTHOR, Role::User), action, &resource),
                    Decision::Deny(DenyReason::AdminOnly)
                );
            }
        }
    }

    #[test]
    fn users_may_read_themselves_only() {
        let subject = user(AUTHOR, Role::User);
        assert!(evaluate(
            &subject,
            Action::Read,
            &Resource::User {
                user_id: Some(AUTHOR)
            }
        )
        .is_allowed());
        assert!(!evaluate(
            &subject,
            Action::Read,
            &Resource::User {
                user_id: Some(OTHER)
            }
        )
        .is_allowed());
        assert!(!evaluate(
            &subject,
            Action::Update,
            &Resource::User {
                user_id: Some(AUTHOR)
            }
        )
        .is_allowed());
        assert!(evaluate(
            &user(OTHER, Role::Admin),
            Action::Delete,
            &Resource::User {
                user_id: Some(AUTHOR)
            }
        )
        .is_allowed());
    }
}
