#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use serde_json::json;

use crate::domain::models::ChatError;
use crate::domain::models::User;
use crate::domain::models::ValidatedUser;
use crate::infrastructure::functions::Functions;

pub const GET_USER_FUNCTION: &str = "get-user";
pub const VALIDATE_USER_FUNCTION: &str = "validate-user";

/// Thin wrappers over the identity functions. No authentication happens
/// locally.
#[derive(Default)]
pub struct IdentityService {
    functions: Functions,
}

impl IdentityService {
    pub fn new(functions: Functions) -> IdentityService {
        return IdentityService { functions };
    }

    pub async fn get_user(&self, email: &str, phone: &str) -> Result<User, ChatError> {
        let body = json!({ "email": email, "phone": phone });
        let user = self
            .functions
            .invoke::<_, User>(GET_USER_FUNCTION, &body)
            .await?;
        tracing::debug!(user_id = %user.user_id, is_new = user.is_new, "Fetched user");

        return Ok(user);
    }

    pub async fn validate_user(&self, user_id: &str) -> Result<ValidatedUser, ChatError> {
        let body = json!({ "user_id": user_id });
        return self
            .functions
            .invoke::<_, ValidatedUser>(VALIDATE_USER_FUNCTION, &body)
            .await;
    }
}
