//! Authorization decisions checked before every mutating operation.

use crate::error::AppError;
use crate::models::{Event, UserProfile};

/// Something a viewer wants to do that needs permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    UpdateEvent,
    DeleteEvent,
    JoinEvent,
    ViewParticipants,
    ViewAllEvents,
    ManageCatalog,
}

/// Decide whether `viewer` may perform `action`, optionally on `event`
pub fn authorize(viewer: &UserProfile, action: Action, event: Option<&Event>) -> Result<(), AppError> {
    let is_owner = event.map_or(false, |e| e.created_by == viewer.user_id);

    let allowed = match action {
        Action::UpdateEvent => is_owner,
        Action::DeleteEvent | Action::ViewParticipants => is_owner || viewer.is_admin,
        Action::JoinEvent => event.is_some() && !is_owner,
        Action::ViewAllEvents | Action::ManageCatalog => viewer.is_admin,
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!("Denied {:?} for {}", action, viewer.user_id);
        Err(AppError::Forbidden(denial_message(action).to_string()))
    }
}

fn denial_message(action: Action) -> &'static str {
    match action {
        Action::UpdateEvent => "only the event creator can edit this event",
        Action::DeleteEvent => "only the event creator or an admin can delete this event",
        Action::JoinEvent => "event creators cannot join their own event",
        Action::ViewParticipants => "only the event creator or an admin can see participants",
        Action::ViewAllEvents | Action::ManageCatalog => "admin only",
    }
}

/// Admin status comes from one configured email, compared exactly
pub fn is_admin_email(email: Option<&str>, admin_email: &str) -> bool {
    !admin_email.is_empty() && email == Some(admin_email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event_by(owner: &str) -> Event {
        Event {
            event_id: "evt".into(),
            name: "Morning Badminton".into(),
            category: "Badminton".into(),
            city: "Pune".into(),
            area: "Baner".into(),
            time: Utc::now(),
            location: None,
            created_by: owner.into(),
            joined_users: Default::default(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn viewer(id: &str, admin: bool) -> UserProfile {
        UserProfile {
            user_id: id.into(),
            is_admin: admin,
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_update_is_creator_only() {
        let event = event_by("alice");
        assert!(authorize(&viewer("alice", false), Action::UpdateEvent, Some(&event)).is_ok());
        assert!(authorize(&viewer("root", true), Action::UpdateEvent, Some(&event)).is_err());
        assert!(authorize(&viewer("bob", false), Action::UpdateEvent, Some(&event)).is_err());
    }

    #[test]
    fn test_delete_allows_creator_and_admin() {
        let event = event_by("alice");
        assert!(authorize(&viewer("alice", false), Action::DeleteEvent, Some(&event)).is_ok());
        assert!(authorize(&viewer("root", true), Action::DeleteEvent, Some(&event)).is_ok());
        assert!(matches!(
            authorize(&viewer("bob", false), Action::DeleteEvent, Some(&event)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_creator_cannot_join() {
        let event = event_by("alice");
        assert!(authorize(&viewer("alice", false), Action::JoinEvent, Some(&event)).is_err());
        assert!(authorize(&viewer("bob", false), Action::JoinEvent, Some(&event)).is_ok());
    }

    #[test]
    fn test_catalog_is_admin_only() {
        assert!(authorize(&viewer("root", true), Action::ManageCatalog, None).is_ok());
        assert!(authorize(&viewer("bob", false), Action::ManageCatalog, None).is_err());
    }

    #[test]
    fn test_all_events_view_is_admin_only() {
        assert!(authorize(&viewer("root", true), Action::ViewAllEvents, None).is_ok());
        assert!(authorize(&viewer("alice", false), Action::ViewAllEvents, None).is_err());
    }

    #[test]
    fn test_admin_email_comparison_is_exact() {
        assert!(is_admin_email(Some("admin@sportsbuddy.app"), "admin@sportsbuddy.app"));
        assert!(!is_admin_email(Some("Admin@sportsbuddy.app"), "admin@sportsbuddy.app"));
        assert!(!is_admin_email(None, "admin@sportsbuddy.app"));
        assert!(!is_admin_email(Some(""), ""));
    }
}
