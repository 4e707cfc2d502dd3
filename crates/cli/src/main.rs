use clap::{Parser, Subcommand};
use packaroo::intent::{self, Intent};

#[derive(Parser)]
#[command(name = "packaroo")]
#[command(about = "Packaroo package assistant CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config, workspace, SYSTEM.md).
    Init {
        /// Config file path (default: PACKAROO_CONFIG_PATH or ~/.packaroo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the assistant HTTP server (chat, agent info, direct tool access).
    Serve {
        /// Config file path (default: PACKAROO_CONFIG_PATH or ~/.packaroo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config, AI_SERVICE_PORT, or 3004)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with a running server (interactive).
    Chat {
        /// Config file path (default: PACKAROO_CONFIG_PATH or ~/.packaroo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// User id sent with each message (needed to list your packages).
        #[arg(long, value_name = "ID")]
        user_id: Option<String>,

        /// Auth token sent with each message (needed for private lookups).
        #[arg(long, value_name = "TOKEN")]
        auth_token: Option<String>,

        /// Conversation id echoed back by the server.
        #[arg(long, value_name = "ID")]
        conversation: Option<String>,
    },

    /// Show which package lookup a message would trigger, without calling anything.
    Classify {
        /// Message text
        text: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("packaroo {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat {
            config,
            user_id,
            auth_token,
            conversation,
        }) => {
            if let Err(e) = run_chat(config, user_id, auth_token, conversation).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Classify { text }) => run_classify(&text),
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(packaroo::config::default_config_path);
    let dir = packaroo::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = packaroo::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = Some(p);
    }
    packaroo::gateway::run_gateway(config, path).await
}

fn run_classify(text: &str) {
    let gated = intent::should_use_tools(text);
    let resolved = if gated {
        intent::classify(text)
    } else {
        Intent::None
    };
    println!("tools: {}", if gated { "yes" } else { "no" });
    match resolved {
        Intent::FindById { id } => println!("intent: find package by id {}", id),
        Intent::TrackByNumber { number } => println!("intent: track package {}", number),
        Intent::ListUserPackages => println!("intent: list user packages (needs user id and token)"),
        Intent::None => println!("intent: none"),
    }
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    user_id: Option<String>,
    auth_token: Option<String>,
    conversation: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = packaroo::config::load_config(config_path)?;
    let bind = packaroo::config::resolve_server_bind(&config);
    let host = if bind == "0.0.0.0" { "127.0.0.1" } else { bind.as_str() };
    let url = format!(
        "http://{}:{}/chat",
        host,
        packaroo::config::resolve_server_port(&config)
    );
    let client = reqwest::Client::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        let body = serde_json::json!({
            "message": input,
            "userId": user_id,
            "authToken": auth_token,
            "conversationId": conversation,
        });
        match send_turn(&client, &url, &body).await {
            Ok(reply) => println!("< {}", reply.trim()),
            Err(e) => eprintln!("chat error: {}", e),
        }
    }

    Ok(())
}

async fn send_turn(
    client: &reqwest::Client,
    url: &str,
    body: &serde_json::Value,
) -> anyhow::Result<String> {
    let res = client.post(url).json(body).send().await?;
    let status = res.status();
    if !status.is_success() {
        anyhow::bail!("server returned {}", status);
    }
    let json: serde_json::Value = res.json().await?;
    if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
        log::debug!("server reported: {}", err);
    }
    Ok(json
        .get("response")
        .and_then(|r| r.as_str())
        .unwrap_or("")
        .to_string())
}
