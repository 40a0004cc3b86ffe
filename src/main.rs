//! CLI entry point for parley.
//!
//! Wires the demo weather function into the orchestration loop and renders
//! the conversation as `role: content` lines, either for a single prompt or
//! as an interactive session.

mod cli;

use clap::Parser;
use parley::build_info;
use parley::config::load_config;
use parley::decode::Arguments;
use parley::orchestrator::{LoopEvent, Orchestrator, TurnOutcome};
use parley::registry::FunctionRegistry;
use parley::render::Renderer;
use parley::schema::{FunctionSpec, Property, SchemaObject};
use parley::types::Role;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful weather assistant.";

/// Example backend returning canned weather data. A production deployment
/// would call a real weather API here.
fn get_current_weather(args: &Arguments) -> String {
    let location = args.string("location").unwrap_or_default();
    let unit = args.string("unit").unwrap_or("fahrenheit");
    let temperature = if unit == "celsius" { 22.5 } else { 72.0 };
    serde_json::json!({
        "location": location,
        "unit": unit,
        "temperature": temperature,
    })
    .to_string()
}

fn weather_function_spec() -> FunctionSpec {
    FunctionSpec::new(
        "get_current_weather",
        "Get the current weather in a given location",
        SchemaObject::new()
            .property(
                Property::string("location", "The city and state, e.g. San Francisco, CA")
                    .required(),
            )
            .property(
                Property::string_enum(
                    "unit",
                    "The temperature unit to use. Infer this from the users location.",
                    &["fahrenheit", "celsius"],
                )
                .required(),
            ),
    )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    // Apply CLI overrides.
    if let Some(model) = &args.model {
        config.api.model = model.clone();
    }
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }
    if args.no_color {
        config.display.color = false;
    }
    if config.orchestrator.system_prompt.trim().is_empty() {
        config.orchestrator.system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
    }

    let renderer = Renderer::new(config.display.color);

    if config.api.base_url.is_empty() {
        renderer.error(
            "No API base URL configured. Set api.base_url in parley.toml or PARLEY_BASE_URL env var.",
        );
        std::process::exit(1);
    }

    let mut registry = FunctionRegistry::new();
    if let Err(e) = registry.register(weather_function_spec(), get_current_weather) {
        renderer.error(&e.to_string());
        std::process::exit(1);
    }

    let model_name = config.api.model.clone();
    let show_function_calls = config.display.show_function_calls;
    let mut orchestrator = Orchestrator::new(config, registry);

    // Render the seeded system prompt before the event stream takes over.
    for message in orchestrator.transcript().messages() {
        renderer.message(message.role, message.content.as_deref().unwrap_or_default());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    orchestrator.set_event_sink(Some(tx));
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let LoopEvent::MessageAppended(message) = event else {
                continue;
            };
            if let Some(call) = &message.function_call {
                if show_function_calls {
                    renderer.function_call(&call.name, &call.arguments);
                }
            } else if message.role == Role::Function {
                if show_function_calls {
                    renderer.message(
                        message.role,
                        message.content.as_deref().unwrap_or_default(),
                    );
                }
            } else {
                renderer.message(
                    message.role,
                    message.content.as_deref().unwrap_or_default(),
                );
            }
        }
    });

    let ok = match &args.prompt {
        Some(prompt) => run_turn_and_report(&mut orchestrator, prompt, renderer).await,
        None => {
            renderer.banner(&format!(
                "parley {}, model {model_name} (type `exit` to quit)",
                build_info::startup_metadata_line()
            ));
            interactive_loop(&mut orchestrator, renderer).await
        }
    };

    // Dropping the orchestrator closes the event sink and ends the printer.
    drop(orchestrator);
    let _ = printer.await;

    if !ok {
        std::process::exit(1);
    }
}

/// Read user lines from stdin until EOF or an exit command.
async fn interactive_loop(orchestrator: &mut Orchestrator, renderer: Renderer) -> bool {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return true,
            Err(e) => {
                renderer.error(&format!("stdin: {e}"));
                return false;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            return true;
        }
        if !run_turn_and_report(orchestrator, input, renderer).await {
            return false;
        }
    }
}

/// Run one user turn; conversation lines are rendered by the event printer.
async fn run_turn_and_report(
    orchestrator: &mut Orchestrator,
    input: &str,
    renderer: Renderer,
) -> bool {
    match orchestrator.run_turn(input).await {
        // Already rendered through the MessageAppended stream.
        Ok(TurnOutcome::Answered(_)) => true,
        Ok(TurnOutcome::Incomplete { reason, .. }) => {
            renderer.warn(&format!("response incomplete ({reason:?})"));
            true
        }
        Ok(TurnOutcome::Cancelled) => {
            renderer.warn("turn cancelled");
            true
        }
        Err(e) => {
            renderer.error(&e.to_string());
            false
        }
    }
}
