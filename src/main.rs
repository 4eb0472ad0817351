//! easyhttp command line.
//!
//! Loads interface declarations from a TOML file and either lists their
//! compiled routes or performs one call.
//!
//! ```text
//! easyhttp --config client.toml routes
//! easyhttp --config client.toml call users get -a id=42 --trace-id abc
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use easyhttp::config::load_config;
use easyhttp::observability::correlation::CorrelationScope;
use easyhttp::observability::logging::init_logging;
use easyhttp::{Arg, ClientConfig, CompiledRoute, HttpClient};

#[derive(Parser)]
#[command(name = "easyhttp")]
#[command(about = "Call declared HTTP interfaces from the command line", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "easyhttp.toml")]
    config: PathBuf,

    /// Overrides `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled route of every declared method
    Routes {
        /// Only this interface
        interface: Option<String>,
    },
    /// Invoke one method and print the reply
    Call {
        interface: String,
        method: String,

        /// Argument as name=value; values are parsed as JSON when possible,
        /// `@path` sends a file
        #[arg(short = 'a', long = "arg", value_parser = parse_pair)]
        args: Vec<(String, String)>,

        /// Correlation id attached to the request
        #[arg(long)]
        trace_id: Option<String>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    init_logging(level);

    tracing::debug!(
        path = %cli.config.display(),
        interfaces = config.interfaces.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Routes { interface } => print_routes(&config, interface.as_deref())?,
        Commands::Call {
            interface,
            method,
            args,
            trace_id,
        } => {
            let declared = config
                .interface(&interface)
                .ok_or_else(|| format!("unknown interface '{interface}'"))?;
            let client = HttpClient::from_config(declared, &config)?;
            let args = positional_args(&client, &method, &args)?;

            let _scope = trace_id.map(CorrelationScope::enter);
            match client.invoke(&method, &args)? {
                Some(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                None => println!("(no content)"),
            }
        }
    }

    Ok(())
}

fn print_routes(config: &ClientConfig, only: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    for declared in &config.interfaces {
        if only.is_some_and(|name| name != declared.name) {
            continue;
        }
        let client = HttpClient::from_config(declared, config)?;
        println!("{client}");
        for method in &client.interface().methods {
            let route = client.route(&method.name)?;
            println!("  {:<20} {}", method.name, route);
            if let CompiledRoute::Remote(template) = route.as_ref() {
                for (var, index) in &template.path_slots {
                    println!("  {:<20}   path   {{{var}}} <- arg {index}", "");
                }
                for slot in &template.query_slots {
                    let role = if template.multipart { "part" } else { "field" };
                    println!("  {:<20}   {role:<6} {} <- arg {}", "", slot.name, slot.index);
                }
                for slot in &template.header_slots {
                    println!("  {:<20}   header {} <- arg {}", "", slot.name, slot.index);
                }
                if let Some(index) = template.body_index {
                    println!("  {:<20}   body   <- arg {index}", "");
                }
            }
        }
    }
    Ok(())
}

/// Orders `name=value` pairs by the method's declared parameters.
fn positional_args(
    client: &HttpClient,
    method: &str,
    pairs: &[(String, String)],
) -> Result<Vec<Arg>, Box<dyn std::error::Error>> {
    let descriptor = client
        .interface()
        .find(method)
        .ok_or_else(|| format!("unknown method '{method}'"))?;

    let mut args = vec![Arg::Null; descriptor.params.len()];
    for (name, value) in pairs {
        let index = descriptor
            .params
            .iter()
            .position(|p| &p.name == name)
            .ok_or_else(|| format!("method '{method}' has no parameter '{name}'"))?;
        args[index] = match value.strip_prefix('@') {
            Some(path) => Arg::file(path),
            None => serde_json::from_str::<Value>(value)
                .map(Arg::from)
                .unwrap_or_else(|_| Arg::from(value.as_str())),
        };
    }
    Ok(args)
}
