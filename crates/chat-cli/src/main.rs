use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use orchestrator::{ModelSpecialistFactory, Orchestrator, OrchestratorError, StrategyKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;
use user_proxy::UserProxy;

/// Used when RUST_LOG is unset. Keeps `--debug` delegation traces visible.
const DEFAULT_LOG_FILTER: &str = "warn,proxy_debug=info";

#[derive(Debug, Parser)]
#[command(name = "chat")]
#[command(about = "Chat with the GitHub and math specialists through the user proxy")]
struct Args {
    /// Routing strategy: keyword, llm or rule (default: ORCHESTRATOR_TYPE, else keyword)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<StrategyKind>,

    /// Trace proxy delegation
    #[arg(long)]
    debug: bool,

    /// Print each reply only once it is complete
    #[arg(long)]
    no_stream: bool,
}

fn parse_strategy(value: &str) -> Result<StrategyKind, OrchestratorError> {
    value.parse()
}

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.contains(&line.trim().to_lowercase().as_str())
}

fn print_banner(kind: StrategyKind) {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("🤖 AI Agent System with User Proxy ({} routing)", kind);
    println!("{}", rule);
    println!("Architecture: User → Proxy → Orchestrator → Specialized Agents\n");
    println!("Type 'help' for commands, 'quit' to exit");
    println!("{}\n", rule);
}

fn prompt() {
    print!("You: ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let kind = match args.strategy {
        Some(kind) => kind,
        None => StrategyKind::from_env()?,
    };
    let factory = ModelSpecialistFactory::from_env()?;
    let orchestrator = Orchestrator::new(kind, Arc::new(factory));

    println!("🔄 Initializing User Proxy Agent...");
    let mut proxy = UserProxy::new(orchestrator).with_debug(args.debug);
    if let Err(e) = proxy.initialize().await {
        error!(error = %e, "INIT_FAILED");
        println!("❌ Failed to initialize: {}", e);
        return Err(e.into());
    }
    print_banner(kind);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt();
            continue;
        }
        if is_exit(input) {
            println!("\n👋 Goodbye!");
            break;
        }

        if let Some(reply) = proxy.handle_command(input) {
            println!("\n{}\n", reply);
            prompt();
            continue;
        }

        print!("\n🤖 Assistant: ");
        let _ = std::io::stdout().flush();
        if args.no_stream {
            match proxy.process_message(input).await {
                Ok(reply) => println!("{}\n", reply),
                Err(e) => println!("\n❌ Error: {}\n", e),
            }
        } else {
            match proxy.process_message_stream(input).await {
                Ok(mut fragments) => {
                    while let Some(fragment) = fragments.next().await {
                        match fragment {
                            Ok(text) => {
                                print!("{}", text);
                                let _ = std::io::stdout().flush();
                            }
                            Err(e) => {
                                print!("\n❌ Error: {}", e);
                                break;
                            }
                        }
                    }
                    println!("\n");
                }
                Err(e) => println!("\n❌ Error: {}\n", e),
            }
        }
        prompt();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_filter_shows_proxy_debug() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        assert!(filter.to_string().contains("proxy_debug=info"));
    }

    #[test]
    fn test_exit_words() {
        assert!(is_exit("quit"));
        assert!(is_exit(" BYE "));
        assert!(!is_exit("quitting"));
    }

    #[test]
    fn test_strategy_flag() {
        let args = Args::try_parse_from(["chat", "--strategy", "rule", "--debug"]).unwrap();
        assert_eq!(args.strategy, Some(StrategyKind::Rule));
        assert!(args.debug);

        assert!(Args::try_parse_from(["chat", "--strategy", "magic"]).is_err());
    }
}
