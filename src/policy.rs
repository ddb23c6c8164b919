// src/policy.rs

//! Who may do what. Handlers ask here instead of checking roles inline.

use crate::{error::AppError, utils::jwt::Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource {
    Inquiry { author_id: Option<i64>, is_private: bool },
    Comment { author_id: i64 },
    Content { published: bool },
    Product,
    Order { owner_id: i64 },
    HeroImage,
    /// Admin-only views: user directory, all orders, unpublished listings.
    BackOffice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub fn authorize(subject: Option<&Viewer>, resource: Resource, action: Action) -> Decision {
    let admin = subject.is_some_and(Viewer::is_admin);
    let inquiry_manager = admin || subject.is_some_and(|v| v.can_manage_inquiry);
    let content_manager = admin || subject.is_some_and(|v| v.can_manage_content);
    let is = |owner: Option<i64>| matches!((subject, owner), (Some(v), Some(id)) if v.id == id);

    let allowed = match (resource, action) {
        (Resource::Inquiry { is_private, author_id }, Action::Read) => {
            !is_private || inquiry_manager || is(author_id)
        }
        (Resource::Inquiry { .. }, Action::Create) => true,
        (Resource::Inquiry { author_id, .. }, _) => inquiry_manager || is(author_id),

        (Resource::Comment { .. }, Action::Read) => true,
        (Resource::Comment { .. }, Action::Create) => subject.is_some(),
        (Resource::Comment { author_id }, _) => inquiry_manager || is(Some(author_id)),

        (Resource::Content { published }, Action::Read) => published || content_manager,
        (Resource::Content { .. }, _) => content_manager,

        (Resource::Product | Resource::HeroImage, Action::Read) => true,
        (Resource::Product | Resource::HeroImage, _) => admin,

        (Resource::Order { owner_id }, Action::Read) => admin || is(Some(owner_id)),
        (Resource::Order { .. }, Action::Create) => subject.is_some(),
        (Resource::Order { .. }, _) => admin,

        (Resource::BackOffice, _) => admin,
    };

    if allowed { Decision::Allow } else { Decision::Deny }
}

/// `authorize` as a `Result`: anonymous callers get 401 on writes, everyone else 403.
pub fn ensure(subject: Option<&Viewer>, resource: Resource, action: Action) -> Result<(), AppError> {
    match authorize(subject, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny if subject.is_none() && action != Action::Read => {
            Err(AppError::AuthError("Login required".to_string()))
        }
        Decision::Deny => Err(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn viewer(id: i64, role: Role) -> Viewer {
        Viewer {
            id,
            name: format!("user-{id}"),
            role,
            is_expert: false,
            can_manage_content: false,
            can_manage_inquiry: false,
        }
    }

    const PRIVATE_BY_1: Resource = Resource::Inquiry {
        author_id: Some(1),
        is_private: true,
    };

    #[test]
    fn private_inquiry_read_admission() {
        let author = viewer(1, Role::User);
        let stranger = viewer(2, Role::User);
        let admin = viewer(3, Role::Admin);
        let mut manager = viewer(4, Role::User);
        manager.can_manage_inquiry = true;

        assert_eq!(authorize(Some(&author), PRIVATE_BY_1, Action::Read), Decision::Allow);
        assert_eq!(authorize(Some(&admin), PRIVATE_BY_1, Action::Read), Decision::Allow);
        assert_eq!(authorize(Some(&manager), PRIVATE_BY_1, Action::Read), Decision::Allow);
        assert_eq!(authorize(Some(&stranger), PRIVATE_BY_1, Action::Read), Decision::Deny);
        assert_eq!(authorize(None, PRIVATE_BY_1, Action::Read), Decision::Deny);
    }

    #[test]
    fn guest_inquiry_can_only_be_edited_by_staff() {
        let guest_post = Resource::Inquiry {
            author_id: None,
            is_private: false,
        };
        assert_eq!(authorize(None, guest_post, Action::Create), Decision::Allow);
        assert_eq!(authorize(None, guest_post, Action::Update), Decision::Deny);
        assert_eq!(
            authorize(Some(&viewer(5, Role::User)), guest_post, Action::Delete),
            Decision::Deny
        );
        assert_eq!(
            authorize(Some(&viewer(6, Role::Admin)), guest_post, Action::Delete),
            Decision::Allow
        );
    }

    #[test]
    fn unpublished_content_needs_content_permission() {
        let draft = Resource::Content { published: false };
        let mut editor = viewer(1, Role::User);
        assert_eq!(authorize(Some(&editor), draft, Action::Read), Decision::Deny);
        editor.can_manage_content = true;
        assert_eq!(authorize(Some(&editor), draft, Action::Read), Decision::Allow);
        assert_eq!(authorize(Some(&editor), draft, Action::Update), Decision::Allow);
        assert_eq!(
            authorize(None, Resource::Content { published: true }, Action::Read),
            Decision::Allow
        );
    }

    #[test]
    fn orders_are_private_to_their_owner() {
        let order = Resource::Order { owner_id: 1 };
        assert_eq!(authorize(Some(&viewer(1, Role::User)), order, Action::Read), Decision::Allow);
        assert_eq!(authorize(Some(&viewer(2, Role::User)), order, Action::Read), Decision::Deny);
        assert_eq!(authorize(Some(&viewer(1, Role::User)), order, Action::Update), Decision::Deny);
        assert_eq!(authorize(Some(&viewer(9, Role::Admin)), order, Action::Update), Decision::Allow);
    }

    #[test]
    fn anonymous_writes_are_unauthorized_not_forbidden() {
        assert!(matches!(
            ensure(None, Resource::Product, Action::Create),
            Err(AppError::AuthError(_))
        ));
        assert!(matches!(
            ensure(Some(&viewer(1, Role::User)), Resource::Product, Action::Create),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure(None, Resource::Content { published: false }, Action::Read),
            Err(AppError::Forbidden(_))
        ));
    }
}
