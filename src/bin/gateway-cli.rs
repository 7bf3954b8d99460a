use clap::{Parser, Subcommand};
use gateway_sdk::{ClientError, GatewayClient};
use serde::Serialize;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the memory gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8002")]
    url: String,

    /// JSON-RPC mount path on the gateway.
    #[arg(long, default_value = gateway_sdk::DEFAULT_MOUNT_PATH)]
    mount: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every exposed capability with its kind and backend route
    Capabilities,
    /// List callable tools
    Tools,
    /// List resources and resource templates
    Resources,
    /// Call a tool
    Call {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// Read a resource by URI
    Read { uri: String },
    /// Check the backend through the native passthrough
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = GatewayClient::new(&cli.url).with_mount_path(&cli.mount);

    match cli.command {
        Commands::Health => print_json(&client.health().await?)?,
        command => {
            client.initialize().await?;
            run(&client, command).await?;
        }
    }
    Ok(())
}

async fn run(client: &GatewayClient, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Capabilities => {
            for cap in client.list_capabilities().await? {
                println!("{:<18} {:<28} {:<6} {}", cap.kind, cap.name, cap.method, cap.path);
            }
        }
        Commands::Tools => {
            for tool in client.list_tools().await? {
                println!("{:<28} {}", tool.name, tool.description);
            }
        }
        Commands::Resources => {
            for resource in client.list_resources().await? {
                println!("{:<40} {}", resource.uri, resource.description);
            }
            for template in client.list_resource_templates().await? {
                println!("{:<40} {}", template.uri_template, template.description);
            }
        }
        Commands::Call { name, args } => {
            let args: Value = serde_json::from_str(&args)?;
            let result = client.call_tool(&name, args).await?;
            if result.is_error {
                eprintln!("Error: tool returned an error result");
            }
            print_text(&result.text());
        }
        Commands::Read { uri } => match client.read_resource(&uri).await {
            Ok(result) => {
                for content in result.contents {
                    print_text(&content.text);
                }
            }
            Err(ClientError::Rpc { code, message, data }) => {
                eprintln!("Error {}: {}", code, message);
                if let Some(data) = data {
                    print_json(&data)?;
                }
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Health => print_json(&client.health().await?)?,
    }
    Ok(())
}

/// Pretty-print JSON text, or print it raw.
fn print_text(text: &str) {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string())),
        Err(_) => println!("{}", text),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
