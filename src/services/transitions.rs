use crate::errors::AppError;
use crate::models::{Role, TicketStatus};

/// Outcome of an approved status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: TicketStatus,
    pub approved_by: Role,
}

/// Maps a role's requested status onto the stored status.
///
/// Sub-admins may book, decline, or forward; forwarding puts the ticket back
/// in the pending queue with the sub-admin recorded as approver. Super-admins
/// may only book or decline.
pub fn resolve_transition(role: Role, requested: &str) -> Result<Transition, AppError> {
    let status = match (role, requested) {
        (_, "booked") => TicketStatus::Booked,
        (_, "declined") => TicketStatus::Declined,
        (Role::SubAdmin, "forwarded") => TicketStatus::Pending,
        (Role::SubAdmin, _) => {
            return Err(AppError::Validation(format!(
                "invalid status for sub-admin: {requested}"
            )))
        }
        (Role::SuperAdmin, _) => {
            return Err(AppError::Validation(
                "super-admin can only approve or decline".to_string(),
            ))
        }
    };

    Ok(Transition {
        status,
        approved_by: role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_admin_forward_returns_to_pending() {
        let t = resolve_transition(Role::SubAdmin, "forwarded").unwrap();
        assert_eq!(t.status, TicketStatus::Pending);
        assert_eq!(t.approved_by, Role::SubAdmin);
    }

    #[test]
    fn test_sub_admin_book_and_decline() {
        assert_eq!(
            resolve_transition(Role::SubAdmin, "booked").unwrap().status,
            TicketStatus::Booked
        );
        assert_eq!(
            resolve_transition(Role::SubAdmin, "declined").unwrap().status,
            TicketStatus::Declined
        );
    }

    #[test]
    fn test_sub_admin_rejects_other_statuses() {
        for status in ["pending", "cancelled", "", "Booked"] {
            assert!(matches!(
                resolve_transition(Role::SubAdmin, status),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_super_admin_book_and_decline() {
        let t = resolve_transition(Role::SuperAdmin, "booked").unwrap();
        assert_eq!(t.status, TicketStatus::Booked);
        assert_eq!(t.approved_by, Role::SuperAdmin);

        let t = resolve_transition(Role::SuperAdmin, "declined").unwrap();
        assert_eq!(t.status, TicketStatus::Declined);
    }

    #[test]
    fn test_super_admin_cannot_forward() {
        assert!(matches!(
            resolve_transition(Role::SuperAdmin, "forwarded"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_transition(Role::SuperAdmin, "pending"),
            Err(AppError::Validation(_))
        ));
    }
}
