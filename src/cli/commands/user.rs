use anyhow::bail;
use serde_json::json;

use crate::auth;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::NewUser;
use crate::database::{DatabaseManager, PgStore, UserRepository};
use crate::forms::{CleanForm, SignupForm};

/// Same rules as the signup page, without the confirmation field.
pub async fn create(username: String, password: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let form = SignupForm {
        username,
        password_confirm: password.clone(),
        password,
    };
    let form = match form.clean() {
        Ok(form) => form,
        Err(rejected) => {
            let messages: Vec<String> = rejected
                .errors
                .fields
                .iter()
                .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
                .collect();
            bail!("invalid account: {}", messages.join("; "));
        }
    };

    let store = PgStore::new(DatabaseManager::connect(&config().database).await?);
    let password_hash = auth::hash_password(form.password).await?;
    let user = UserRepository::create(
        &store,
        NewUser {
            username: form.username,
            password_hash,
        },
    )
    .await?;

    tracing::info!("Created user {} ({})", user.username, user.id);
    match output_format {
        OutputFormat::Text => println!("Created user {} (id {})", user.username, user.id),
        OutputFormat::Json => println!("{}", json!({ "success": true, "data": user })),
    }
    Ok(())
}
