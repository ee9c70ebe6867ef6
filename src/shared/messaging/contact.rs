//! Contact Data Structure
//!
//! Users are listed to each other as contacts. A contact with shared message
//! history is a chat partner and carries the most recent message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::auth::UserProfile;
use crate::shared::messaging::Message;

/// A user with existing chat history and that conversation's last message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPartner {
    #[serde(flatten)]
    pub user: UserProfile,
    pub last_message: Option<Message>,
}

impl ChatPartner {
    /// Timestamp used to order partners, most recent activity first
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or(self.user.updated_at)
    }
}

/// Sort partners by most recent activity, newest first.
pub fn sort_by_recent_activity(partners: &mut [ChatPartner]) {
    partners.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
}

/// Sort contacts alphabetically by full name, case-insensitively.
pub fn sort_by_name(contacts: &mut [UserProfile]) {
    contacts.sort_by(|a, b| {
        a.full_name
            .to_lowercase()
            .cmp(&b.full_name.to_lowercase())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn user(name: &str, updated_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            profile_pic: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn test_sort_by_name() {
        let now = Utc::now();
        let mut contacts = vec![user("carol", now), user("Bob", now), user("alice", now)];
        sort_by_name(&mut contacts);
        let names: Vec<_> = contacts.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(names, vec!["alice", "Bob", "carol"]);
    }

    #[test]
    fn test_sort_by_recent_activity_prefers_messages() {
        let now = Utc::now();
        let quiet = ChatPartner {
            user: user("quiet", now - Duration::hours(1)),
            last_message: None,
        };
        let chatty_user = user("chatty", now - Duration::days(3));
        let chatty = ChatPartner {
            last_message: Some(Message {
                id: Uuid::new_v4(),
                sender_id: chatty_user.id,
                receiver_id: Uuid::new_v4(),
                text: Some("latest".to_string()),
                image: None,
                created_at: now,
            }),
            user: chatty_user,
        };

        let mut partners = vec![quiet, chatty];
        sort_by_recent_activity(&mut partners);
        assert_eq!(partners[0].user.full_name, "chatty");
    }
}
