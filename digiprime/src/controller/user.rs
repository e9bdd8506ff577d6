use model::dto::engine::Signup;

use super::{check_not_blank, ControllerError};
use crate::repository::negotiation_engine::NegotiationEngine;
use crate::repository::user::UserRepository;

/// Provision the engine account of a registered local user. Running it again
/// for the same user is harmless.
pub async fn signup(
    signup: Signup,
    users: &dyn UserRepository,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("signup of {}", signup.username);
    check_not_blank("username", &signup.username)?;
    check_not_blank("email", &signup.email)?;
    check_not_blank("password", &signup.password)?;

    if users.get(&signup.username).await.is_none() {
        return Err(ControllerError::NotFound(format!(
            "No local user named {}",
            signup.username
        )));
    }

    engine.signup(&signup).await?;
    Ok(())
}
