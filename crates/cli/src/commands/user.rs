//! User management commands.

use chirp_core::{Email, UserRole};

use chirp_api::db::tokens::generate_token;
use chirp_api::db::{TokenRepository, UserRepository};

use super::CommandError;

/// Create a user and print a freshly minted API token.
///
/// # Errors
///
/// Returns an error on invalid input, a duplicate email, or database failure.
pub async fn create(email: &str, name: &str, role: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let role: UserRole = role.parse().map_err(CommandError::Invalid)?;

    let pool = super::connect().await?;

    let user = UserRepository::new(&pool)
        .create(&email, name, role)
        .await
        .map_err(|e| CommandError::Invalid(e.to_string()))?;

    let token = generate_token();
    TokenRepository::new(&pool)
        .create(user.id, &token, None)
        .await
        .map_err(|e| CommandError::Invalid(e.to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "user created");

    // The raw token is only available here; the database stores its digest.
    #[allow(clippy::print_stdout)]
    {
        println!("user id:   {}", user.id);
        println!("api token: {token}");
    }

    Ok(())
}
