use serde::{Deserialize, Serialize};

use crate::users::repo_types::{NewUser, UserChanges};

/// Request body for `POST /api/user`. Every field may be missing; the
/// handler validates presence.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub number: Option<f64>,
}

impl CreateUserRequest {
    /// Consumes the request, swapping the plaintext password for its hash.
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            password: Some(password_hash),
            number: self.number,
        }
    }
}

/// Request body for `PUT /api/user/:id`. A `password` key, if sent, is
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub number: Option<f64>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            number: r.number,
        }
    }
}

/// `{"msg": "..."}` body used for plain confirmations.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}
