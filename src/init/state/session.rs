use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An issued bearer token and whom it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: Uuid, user_id: i64, now: DateTime<Utc>, valid_for: chrono::Duration) -> Self {
        Session {
            token,
            user_id,
            created_at: now,
            expires_at: now + valid_for,
        }
    }

    pub fn is_unexpired_at(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= now && self.expires_at > now
    }

    pub fn is_unexpired(&self) -> bool {
        self.is_unexpired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_window() {
        let now = Utc::now();
        let session = Session::new(Uuid::new_v4(), 7, now, chrono::Duration::hours(1));

        assert!(session.is_unexpired_at(now));
        assert!(session.is_unexpired_at(now + chrono::Duration::minutes(59)));
        assert!(!session.is_unexpired_at(now + chrono::Duration::hours(1)));
        assert!(!session.is_unexpired_at(now - chrono::Duration::seconds(1)));
    }
}
