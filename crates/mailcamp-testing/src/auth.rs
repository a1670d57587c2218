//! Mock identity for HTTP tests.
//!
//! The gateway normally injects `x-mailcamp-user-id`; tests set it directly.

use http::{HeaderName, HeaderValue};
use uuid::Uuid;

use mailcamp_auth_types::identity::USER_ID_HEADER;
use mailcamp_domain::id::UserId;

/// A test user whose identity header can be attached to requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub user_id: UserId,
}

impl MockAuth {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// A user with a random id.
    pub fn random() -> Self {
        Self::new(UserId(Uuid::new_v4()))
    }

    /// The header pair the gateway would inject.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&self.user_id.to_string())
                .expect("uuid is a valid header value"),
        )
    }
}
