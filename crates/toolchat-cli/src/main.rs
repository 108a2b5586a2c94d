//! toolchat command-line interface
//!
//! `toolchat chat` (the default) talks to a model that can call tools served
//! by `toolchat serve`, which the chat command spawns as a child process
//! unless another server is configured.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};

use toolchat_core::chat::{ChatSession, ConversationHistory, SessionError};
use toolchat_core::config::{ChatConfig, ConfigError, ConfigOverrides, ServerSettings};
use toolchat_core::logging::{log_file_path, ConsoleLogger, Logger, SharedLogger};
use toolchat_core::mcp::{serve_stdio, McpClient, McpError};
use toolchat_core::providers::{create_provider, Provider, ProviderError};
use toolchat_core::tools::{ToolBackend, ToolRegistry};
use toolchat_core::types::Message;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "toolchat", version, about = "Chat with a language model that can call MCP tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session (default)
    Chat(ChatArgs),
    /// Run the calculator tool server on stdin/stdout
    Serve,
    /// Send a fixed three-message conversation without tools and print the reply
    Demo(ModelArgs),
    /// Print the effective configuration
    Config(ModelArgs),
}

#[derive(Debug, Default, Args)]
struct ModelArgs {
    /// Config file; otherwise .config/toolchat/config.yaml, then the user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider ID (`openai`-compatible endpoint or `mock`)
    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    model: Option<String>,

    /// Base URL of the chat completions API
    #[arg(long)]
    api_base: Option<String>,

    /// Print debug lines
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, Args)]
struct ChatArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Tool server command and arguments, e.g. `--server-cmd python server.py`
    #[arg(long, num_args = 1.., value_name = "CMD")]
    server_cmd: Vec<String>,

    /// Streamable HTTP endpoint of a running tool server
    #[arg(long, conflicts_with = "server_cmd")]
    server_url: Option<String>,

    #[arg(long)]
    system_prompt: Option<String>,
}

impl ModelArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            ..Default::default()
        }
    }
}

impl ChatArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_command: self.server_cmd.clone(),
            server_url: self.server_url.clone(),
            system_prompt: self.system_prompt.clone(),
            ..self.model.overrides()
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Commands
// ============================================================================

fn load_config(
    path: Option<&std::path::Path>,
    overrides: &ConfigOverrides,
    logger: &dyn Logger,
) -> CliResult<ChatConfig> {
    let workspace_root = std::env::current_dir()?;
    let (mut config, level) = ChatConfig::discover(path, &workspace_root)?;
    logger.debug(&format!("Using {} configuration", level.as_str()));

    config.merge_cli(overrides);
    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn connect(server: &ServerSettings, logger: SharedLogger) -> CliResult<McpClient> {
    if let Some(url) = &server.url {
        return Ok(McpClient::connect_http(url, logger).await?);
    }

    let program = match &server.command {
        Some(command) => command.clone(),
        None => std::env::current_exe()?.to_string_lossy().into_owned(),
    };
    Ok(McpClient::connect_child_process(&program, &server.args, logger).await?)
}

async fn run_chat(args: ChatArgs, logger: SharedLogger) -> CliResult<()> {
    let config = load_config(args.model.config.as_deref(), &args.overrides(), logger.as_ref())?;

    logger.debug(&format!("Debug log file: {}", log_file_path().display()));

    let provider = create_provider(&config.model.provider, logger.clone());
    let client = match connect(&config.server, logger.clone()).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            report_end(logger.as_ref(), false);
            return Err(e);
        }
    };

    chat_over(
        &config,
        provider,
        client,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        logger,
    )
    .await
}

/// Run a session over an open connection, then close it whatever the outcome
async fn chat_over<R, W>(
    config: &ChatConfig,
    provider: Arc<dyn Provider>,
    client: Arc<McpClient>,
    input: R,
    output: W,
    logger: SharedLogger,
) -> CliResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    logger.info("Tool server connected: true");

    let result = converse(config, provider, client.clone(), input, output, logger.clone()).await;

    let connected = release(client, logger.as_ref()).await;
    report_end(logger.as_ref(), connected);

    result
}

async fn converse<R, W>(
    config: &ChatConfig,
    provider: Arc<dyn Provider>,
    client: Arc<McpClient>,
    input: R,
    output: W,
    logger: SharedLogger,
) -> CliResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let registry = ToolRegistry::new(client as Arc<dyn ToolBackend>, logger.clone());
    let history = match &config.system_prompt {
        Some(prompt) => ConversationHistory::with_system_prompt(prompt),
        None => ConversationHistory::new(),
    };

    let mut session = ChatSession::new(provider, config.provider_model(), registry, logger)
        .with_options(config.completion_options())
        .with_history(history);

    session.start().await?;
    session.run(input, output).await?;
    Ok(())
}

/// Close the connection; returns whether it is still open afterwards
///
/// The session must be gone, so `client` is the last handle.
async fn release(client: Arc<McpClient>, logger: &dyn Logger) -> bool {
    match Arc::try_unwrap(client) {
        Ok(client) => {
            if let Err(e) = client.close().await {
                logger.warn(&format!("Failed to close tool server connection: {}", e));
            }
            false
        }
        Err(_) => {
            logger.warn("Tool server connection is still shared; leaving it open");
            true
        }
    }
}

fn report_end(logger: &dyn Logger, connected: bool) {
    logger.info(&format!("Tool server connected after session: {}", connected));
    logger.info("Chat session ended.");
}

async fn run_serve() -> CliResult<()> {
    let logger: SharedLogger = Arc::new(ConsoleLogger::with_prefix("[toolchat-server]").stderr_only());
    serve_stdio(logger).await?;
    Ok(())
}

fn demo_conversation() -> Vec<Message> {
    vec![
        Message::user("Say this is a test"),
        Message::assistant("Yes this is a test."),
        Message::user("why do you think i am testing you?"),
    ]
}

async fn run_demo<W>(args: ModelArgs, logger: SharedLogger, mut output: W) -> CliResult<()>
where
    W: AsyncWrite + Unpin,
{
    let config = load_config(args.config.as_deref(), &args.overrides(), logger.as_ref())?;

    let provider = create_provider(&config.model.provider, logger);
    let options = config.completion_options();
    let reply = provider
        .complete(&demo_conversation(), &config.provider_model(), &options)
        .await?;

    output
        .write_all(format!("{}\n", reply.content_or_empty()).as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}

fn run_config(args: ModelArgs) -> CliResult<()> {
    let logger = ConsoleLogger::new().verbose(args.verbose);
    let mut config = load_config(args.config.as_deref(), &args.overrides(), &logger)?;
    if config.model.api_key.as_deref().is_some_and(|key| !key.is_empty()) {
        config.model.api_key = Some("********".to_string());
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn console(verbose: bool) -> SharedLogger {
    Arc::new(ConsoleLogger::new().verbose(verbose))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Command::Chat(ChatArgs::default()));
    // stdout belongs to the protocol while serving
    let serving = matches!(command, Command::Serve);

    let result = match command {
        Command::Chat(args) => {
            let logger = console(args.model.verbose);
            run_chat(args, logger).await
        }
        Command::Serve => run_serve().await,
        Command::Demo(args) => {
            let logger = console(args.verbose);
            run_demo(args, logger, tokio::io::stdout()).await
        }
        Command::Config(args) => run_config(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if serving => {
            eprintln!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            println!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    use rmcp::ServiceExt;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;
    use toolchat_core::logging::{MemoryLogger, NoOpLogger};
    use toolchat_core::mcp::Calculator;
    use toolchat_core::providers::MockProvider;
    use toolchat_core::{CompletionOptions, ProviderModelConfig};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["toolchat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_chat_overrides() {
        let cli = Cli::try_parse_from([
            "toolchat",
            "chat",
            "--model",
            "llama3.2",
            "--server-cmd",
            "python",
            "server.py",
        ])
        .unwrap();

        let Some(Command::Chat(args)) = cli.command else {
            panic!("expected chat command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.model.as_deref(), Some("llama3.2"));
        assert_eq!(overrides.server_command, vec!["python".to_string(), "server.py".to_string()]);
    }

    #[test]
    fn test_server_cmd_conflicts_with_url() {
        let result = Cli::try_parse_from([
            "toolchat",
            "chat",
            "--server-cmd",
            "toolchat",
            "--server-url",
            "http://localhost:8000/mcp",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_demo_conversation_is_sent_as_is() {
        let provider = MockProvider::fixed("Because you are testing me.", Arc::new(NoOpLogger::new()));

        let reply = provider
            .complete(&demo_conversation(), &ProviderModelConfig::new("qwen3:4b"), &CompletionOptions::new())
            .await
            .unwrap();

        assert_eq!(reply.content_or_empty(), "Because you are testing me.");
        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2], Message::user("why do you think i am testing you?"));
        assert!(!request.options.has_tools());
    }

    fn mock_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model:\n  provider: mock\n  model: qwen3:4b\n").unwrap();
        path
    }

    /// Client connected to an in-process calculator; the server either
    /// serves until the client leaves or quits right after the handshake
    async fn calculator_client(keep_serving: bool) -> (Arc<McpClient>, JoinHandle<()>) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            if let Ok(service) = Calculator::new(Arc::new(NoOpLogger::new())).serve(server_io).await {
                if keep_serving {
                    let _ = service.waiting().await;
                } else {
                    let _ = service.cancel().await;
                }
            }
        });
        let client = McpClient::connect_stream(client_io, Arc::new(NoOpLogger::new()))
            .await
            .unwrap();
        (Arc::new(client), server)
    }

    #[tokio::test]
    async fn test_demo_command_prints_the_reply() {
        let dir = tempfile::tempdir().unwrap();
        let args = ModelArgs {
            config: Some(mock_config(&dir)),
            provider: Some("mock".to_string()),
            ..Default::default()
        };
        let mut output = Vec::new();

        run_demo(args, Arc::new(NoOpLogger::new()), &mut output).await.unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Echo: why do you think i am testing you?\n"
        );
    }

    #[tokio::test]
    async fn test_exit_closes_the_tool_server() {
        let (client, server) = calculator_client(true).await;
        let logger = Arc::new(MemoryLogger::new());
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::echo(Arc::new(NoOpLogger::new())));
        let input: &[u8] = b"exit\n";
        let mut output = Vec::new();

        chat_over(&ChatConfig::default(), provider, client, input, &mut output, logger.clone())
            .await
            .unwrap();

        assert!(logger.contains("Tool server connected: true"));
        assert!(logger.contains("Tool server connected after session: false"));
        assert!(logger.contains("Chat session ended."));
        // The server only stops once the client has closed the connection
        timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_discovery_failure_still_closes_and_reports() {
        let (client, server) = calculator_client(false).await;
        timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
        let logger = Arc::new(MemoryLogger::new());
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::echo(Arc::new(NoOpLogger::new())));
        let input: &[u8] = b"hello\n";
        let mut output = Vec::new();

        let result = timeout(
            Duration::from_secs(5),
            chat_over(&ChatConfig::default(), provider, client, input, &mut output, logger.clone()),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(CliError::Session(SessionError::Discovery(_)))));
        assert!(logger.contains("Tool server connected after session: false"));
        assert!(logger.contains("Chat session ended."));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let args = ChatArgs {
            model: ModelArgs {
                config: Some(mock_config(&dir)),
                ..Default::default()
            },
            server_cmd: vec![dir.path().join("no-such-server").to_string_lossy().into_owned()],
            ..Default::default()
        };
        let logger = Arc::new(MemoryLogger::new());

        let err = run_chat(args, logger.clone()).await.unwrap_err();

        assert!(matches!(err, CliError::Mcp(_)));
        assert!(!logger.contains("Tool server connected: true"));
        assert!(logger.contains("Tool server connected after session: false"));
        assert!(logger.contains("Chat session ended."));
    }
}
