// Kai CLI
// Usage:
//   kai-cli ask <context-id> <message>
//   kai-cli todos
//   kai-cli terminate <workflow-id> <reason>

use kai_sdk::models::{AuthUser, OpenAIToolCall, OpenAIToolCallParams, TodoQuery};
use kai_sdk::{logging, Config, KaiContext};

const USAGE: &str = "usage: kai-cli ask <context-id> <message> | todos | terminate <workflow-id> <reason>";

enum Command {
    Ask { context_id: String, message: String },
    Todos,
    Terminate { workflow_id: String, reason: String },
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args.first().map(String::as_str)? {
        "ask" if args.len() >= 3 => Some(Command::Ask {
            context_id: args[1].clone(),
            message: args[2..].join(" "),
        }),
        "todos" => Some(Command::Todos),
        "terminate" if args.len() >= 3 => Some(Command::Terminate {
            workflow_id: args[1].clone(),
            reason: args[2..].join(" "),
        }),
        _ => None,
    }
}

fn current_user(config: &Config) -> Result<AuthUser, Box<dyn std::error::Error>> {
    let user_id = config.user_id.clone().ok_or("KAI_USER_ID is not set")?;
    Ok(AuthUser::new(user_id))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let _guard = logging::init(&config.log_file)?;

    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {}", e);
        return Err(e.into());
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let context = KaiContext::from_config(&config)?;

    match command {
        Command::Ask { context_id, message } => {
            let params = OpenAIToolCallParams {
                user: current_user(&config)?,
                tool_call_message: OpenAIToolCall { message, context_id },
            };
            let response = context.workflows().ask_kai(None, params).await?;
            tracing::info!("askKai finished ({} / {})", response.workflow_id, response.run_id);
            println!("{}", response.result.text);
        }
        Command::Todos => {
            let user = current_user(&config)?;
            let page = context.todos().list(&user.id, TodoQuery::default()).await?;
            for todo in &page.data {
                println!("[{}] {} ({})", todo.status.as_str(), todo.title, todo.id);
            }
            println!("{} of {} todos, page {}/{}", page.data.len(), page.total, page.page, page.total_pages);
        }
        Command::Terminate { workflow_id, reason } => {
            context.temporal().terminate_workflow(&workflow_id, &reason).await?;
            println!("terminated {}", workflow_id);
        }
    }

    Ok(())
}
