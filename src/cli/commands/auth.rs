use clap::Subcommand;
use serde_json::json;

use crate::auth::JwtIdentity;
use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Save credentials for a user")]
    Login {
        #[arg(help = "User id that owns the stores")]
        user: String,
        #[arg(long, help = "Use an existing bearer token instead of signing one")]
        token: Option<String>,
        #[arg(long, help = "Signing secret (defaults to JWT_SECRET)")]
        secret: Option<String>,
    },

    #[command(about = "Forget saved credentials")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut env = load_environment_config()?;

    match cmd {
        AuthCommands::Login { user, token, secret } => {
            let token = match token {
                Some(token) => token,
                None => {
                    let settings = &config().security;
                    let secret = secret.unwrap_or_else(|| settings.jwt_secret.clone());
                    JwtIdentity::new(secret, settings.jwt_expiry_hours)
                        .issue(&user)
                        .map_err(|e| anyhow::anyhow!("Cannot sign a token: {}", e))?
                }
            };

            env.current_user = Some(user.clone());
            env.token = Some(token);
            save_environment_config(&env)?;
            output_success(output_format, &format!("Logged in as {}", user), Some(json!({ "user": user })))
        }
        AuthCommands::Logout => {
            env.current_user = None;
            env.token = None;
            save_environment_config(&env)?;
            output_success(output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let logged_in = env.token.is_some();
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "authenticated": logged_in,
                        "user": env.current_user,
                        "server": env.server.as_ref().map(|s| s.url.clone()),
                    }))?
                ),
                OutputFormat::Text => match (&env.current_user, logged_in) {
                    (Some(user), true) => println!("Logged in as {}", user),
                    _ => println!("Not logged in"),
                },
            }
            Ok(())
        }
    }
}
