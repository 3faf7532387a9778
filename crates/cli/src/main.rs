use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "denti")]
#[command(about = "Denti CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: DENTI_CONFIG_PATH or ~/.denti/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway (health endpoint + bot webhook).
    Serve {
        /// Config file path (default: DENTI_CONFIG_PATH or ~/.denti/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Webhook port (default from config or 3978)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one message through the dispatcher and print the reply.
    Ask {
        /// Config file path (default: DENTI_CONFIG_PATH or ~/.denti/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// The message text.
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("denti {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { config, text }) => {
            if let Err(e) = run_ask(config, text).await {
                log::error!("ask failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(denti::config::default_config_path);
    let dir = denti::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = denti::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    denti::gateway::run_gateway(config).await
}

async fn run_ask(
    config_path: Option<std::path::PathBuf>,
    text: Vec<String>,
) -> anyhow::Result<()> {
    let message = text.join(" ");
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("no message text given");
    }
    let (config, _path) = denti::config::load_config(config_path)?;
    let dispatcher = denti::gateway::build_dispatcher(&config)?;
    let reply = dispatcher.handle_message(message).await?;
    println!("{}", reply);
    Ok(())
}
