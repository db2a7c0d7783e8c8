use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_environment_config, ping_server, save_environment_config, ServerInfo, ServerStatus};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a server")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Health check the configured server")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut env = load_environment_config()?;

    match cmd {
        ServerCommands::Set { url } => {
            let server = ServerInfo::new(&url)?;
            let message = format!("Server set to {}", server.url);
            let data = json!({ "server": server.url });
            env.server = Some(server);
            save_environment_config(&env)?;
            output_success(output_format, &message, Some(data))
        }
        ServerCommands::Show => match &env.server {
            Some(server) => match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "current_server": server }))?);
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("Current server: {}", server.url);
                    println!("Status: {:?}", server.status);
                    if let Some(at) = server.last_ping {
                        println!("Last ping: {}", at.to_rfc3339());
                    }
                    Ok(())
                }
            },
            None => {
                match output_format {
                    OutputFormat::Json => println!("{}", json!({ "current_server": null })),
                    OutputFormat::Text => println!("No current server set"),
                }
                Ok(())
            }
        },
        ServerCommands::Ping => {
            let server = env
                .server
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("No server configured. Run 'storefront server set <url>' first"))?;

            let status = ping_server(server).await;
            server.update_ping(status);
            let url = server.url.clone();
            save_environment_config(&env)?;

            match status {
                ServerStatus::Up => output_success(output_format, &format!("{} is up", url), Some(json!({ "status": status }))),
                _ => Err(anyhow::anyhow!("{} is not responding", url)),
            }
        }
    }
}
