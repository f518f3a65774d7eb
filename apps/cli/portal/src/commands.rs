//! One function per subcommand.
//!
//! Each returns `Ok(true)` when the action succeeded and `Ok(false)` when it
//! failed in a way the notifier already reported. `Err` is kept for problems
//! outside the session, such as an unreadable avatar file.

use crate::app::App;
use crate::cli::Command;
use crate::error::PortalError;

use common::ErrorLocation;
use models::{Credentials, NewUser, PasswordChange, User};
use session_core::api_client::UploadFile;
use session_core::config::ClientConfig;
use session_core::error::CoreError;

use std::panic::Location;
use std::path::Path;

use log::{debug, info};
use serde_json::{Map, Value};

pub async fn run(app: &App, command: Command) -> Result<bool, PortalError> {
    debug!("Running {command:?}");

    match command {
        Command::Login { username, password } => {
            let result = app.store.login(&Credentials::new(username, password)).await;
            if result.is_verification_error() {
                println!("Your account has not been verified yet. Check your email.");
            }
            Ok(result.is_success())
        }

        Command::Register {
            username,
            email,
            password,
            password_confirm,
            first_name,
            last_name,
            user_type,
            phone,
            organization,
        } => {
            let new_user = NewUser {
                username,
                email,
                password_confirm: password_confirm.unwrap_or_else(|| password.clone()),
                password,
                first_name,
                last_name,
                user_type,
                phone,
                organization,
            };
            Ok(app.store.register(&new_user).await.is_success())
        }

        Command::Logout => Ok(app.store.logout().await.is_success()),

        Command::Me => {
            app.store.check_auth().await;
            match app.store.current_user() {
                Some(user) => {
                    print_user(&user)?;
                    Ok(true)
                }
                None => {
                    println!("Not signed in.");
                    Ok(false)
                }
            }
        }

        Command::Refresh => {
            let refreshed = app.store.refresh_access_token().await;
            if refreshed {
                println!("Access token refreshed.");
            } else {
                println!("Session could not be refreshed. Sign in again.");
            }
            Ok(refreshed)
        }

        Command::Profile { fields } => {
            let changes = profile_changes(fields);
            Ok(app.store.update_profile(&changes).await.is_success())
        }

        Command::ChangePassword { old, new } => {
            let change = PasswordChange {
                old_password: old,
                new_password: new,
            };
            Ok(app.store.change_password(&change).await.is_success())
        }

        Command::Avatar { file, mime } => {
            let upload = read_upload(&file, mime)?;
            Ok(app.store.upload_avatar(upload).await.is_success())
        }

        Command::Navigate { path } => {
            app.store.check_auth().await;
            let location = app.router.navigate(&path).map_err(CoreError::from)?;

            info!("Navigated to {}", location.full_path);
            println!("{} ({})", location.name, location.full_path);
            for (key, value) in &location.params {
                println!("  :{key} = {value}");
            }
            Ok(true)
        }

        Command::Status => {
            let session = app.store.snapshot();
            if session.is_authenticated() {
                println!("Signed in.");
                app.store.check_auth().await;
                if let Some(user) = app.store.current_user() {
                    println!("User: {} (#{})", user.display_name(), user.id);
                }
            } else {
                println!("Signed out.");
            }
            println!("Data directory: {}", app.data_dir.display());
            println!("API: {}", app.config.api.base_url);
            Ok(true)
        }

        Command::Config {
            api_url,
            timeout_secs,
        } => configure(app, api_url, timeout_secs),
    }
}

/// Print the saved config, or apply the given changes to it and save.
///
/// Works on the file as written, so environment overrides active for this
/// run are never persisted.
#[track_caller]
pub fn configure(
    app: &App,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<bool, PortalError> {
    let config_dir = app.config_dir.as_deref().ok_or_else(|| PortalError::Input {
        message: String::from("No config directory known, pass --config-dir"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut config = ClientConfig::load(config_dir).map_err(CoreError::from)?;

    if api_url.is_none() && timeout_secs.is_none() {
        let json = serde_json::to_string_pretty(&config).map_err(|e| PortalError::Portal {
            message: format!("Failed to format config: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
        println!("{json}");
        return Ok(true);
    }

    if let Some(api_url) = api_url {
        config.api.base_url = api_url;
    }
    if let Some(timeout_secs) = timeout_secs {
        config.api.timeout_secs = timeout_secs;
    }

    config.save(config_dir).map_err(CoreError::from)?;
    info!("Saved config to {}", config_dir.display());
    println!("Saved. API: {}", config.api.base_url);
    Ok(true)
}

/// `key=value` pairs to a JSON object. Values that parse as JSON (numbers,
/// booleans, null, quoted strings) keep their type; anything else is a string.
pub fn profile_changes(fields: Vec<(String, String)>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            (key, value)
        })
        .collect()
}

fn print_user(user: &User) -> Result<(), PortalError> {
    let json = serde_json::to_string_pretty(user).map_err(|e| PortalError::Portal {
        message: format!("Failed to format user: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    println!("{json}");
    Ok(())
}

#[track_caller]
fn read_upload(path: &Path, mime: Option<String>) -> Result<UploadFile, PortalError> {
    let bytes = std::fs::read(path).map_err(|e| PortalError::Input {
        message: format!("Cannot read {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PortalError::Input {
            message: format!("Not a file: {}", path.display()),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let upload = UploadFile::new(file_name, bytes);
    match mime.or_else(|| guess_image_mime(path).map(String::from)) {
        Some(mime) => Ok(upload.with_mime(mime)),
        None => Ok(upload),
    }
}

pub fn guess_image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
