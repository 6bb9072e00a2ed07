//! Login, registration, logout, and profile commands.

use std::io::Write;

use foody_client::validation::{LoginForm, RegisterForm};
use foody_client::{ClientError, FoodyClient};
use foody_core::AuthUser;

use super::CliError;

/// Log in and greet the user.
pub async fn login(
    client: &FoodyClient,
    out: &mut impl Write,
    form: &LoginForm,
) -> Result<(), CliError> {
    let user = client.auth().login(form).await.map_err(ClientError::from)?;
    writeln!(out, "Welcome back, {}!", user.display_name())?;
    Ok(())
}

/// Register, which also logs the new account in.
pub async fn register(
    client: &FoodyClient,
    out: &mut impl Write,
    form: &RegisterForm,
) -> Result<(), CliError> {
    let user = client.auth().register(form).await.map_err(ClientError::from)?;
    writeln!(out, "Welcome, {}! Your account is ready.", user.display_name())?;
    Ok(())
}

/// Log out.
pub async fn logout(client: &FoodyClient, out: &mut impl Write) -> Result<(), CliError> {
    client.auth().logout().await.map_err(ClientError::from)?;
    writeln!(out, "Logged out.")?;
    Ok(())
}

/// Show the logged-in user, fetching the profile if only a token is known.
pub async fn profile(client: &FoodyClient, out: &mut impl Write) -> Result<(), CliError> {
    let user = client
        .auth()
        .hydrate_profile()
        .await
        .map_err(ClientError::from)?;
    write_user(out, &user)?;
    Ok(())
}

fn write_user(out: &mut impl Write, user: &AuthUser) -> std::io::Result<()> {
    writeln!(out, "Name:  {}", user.name.as_deref().unwrap_or("-"))?;
    writeln!(out, "Email: {}", user.email)?;
    writeln!(out, "Phone: {}", user.phone_number.as_deref().unwrap_or("-"))?;
    if let Some(avatar) = &user.avatar {
        writeln!(out, "Avatar: {avatar}")?;
    }
    Ok(())
}
