//! gql — run a single GraphQL operation from the command line
//!
//! Usage:
//!   gql run <endpoint> <query | @file> [--var k=<json>]... [--header k:v]... [--close]
//!   gql version
//!   gql help

use gql_http::{CancellationToken, ClientBuilder, Request};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("gql {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(
        r#"gql — GraphQL-over-HTTP command line client

USAGE:
    gql <COMMAND> [OPTIONS]

COMMANDS:
    run <endpoint> <query|@file>   Execute one operation and print its data
    version                        Show version information
    help                           Show this help message

RUN OPTIONS:
    --var <name>=<json>            Bind a variable (value parsed as JSON, else string)
    --header <name>:<value>        Append a request header
    --close                        Close the connection after the request

ENVIRONMENT:
    RUST_LOG                       Log filter, e.g. gql_http=debug
    GQL_HTTP_TIMEOUT_SECS          Request timeout (default 30)
    GQL_PROXY_URL                  Proxy for all requests"#
    );
}

struct RunArgs {
    endpoint: String,
    request: Request,
    close: bool,
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut positional = Vec::new();
    let mut vars = Vec::new();
    let mut headers = Vec::new();
    let mut close = false;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--var" => vars.push(it.next().ok_or("--var needs a value")?.clone()),
            "--header" => headers.push(it.next().ok_or("--header needs a value")?.clone()),
            "--close" => close = true,
            _ => positional.push(arg.clone()),
        }
    }

    let [endpoint, query] = <[String; 2]>::try_from(positional)
        .map_err(|_| "expected <endpoint> and <query>".to_string())?;

    let query = match query.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?,
        None => query,
    };

    let mut request = Request::new(query);
    for var in vars {
        let (name, raw) = var
            .split_once('=')
            .ok_or_else(|| format!("invalid --var {var:?}, expected name=value"))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        request.set_variable(name, value);
    }
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid --header {header:?}, expected name:value"))?;
        request.add_header(name.trim(), value.trim());
    }

    Ok(RunArgs {
        endpoint,
        request,
        close,
    })
}

async fn cmd_run(args: &[String]) -> ExitCode {
    let run = match parse_run_args(args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match ClientBuilder::new(run.endpoint)
        .close_connection_after_request(run.close)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    match client
        .execute::<serde_json::Value>(&cancel, &run.request)
        .await
    {
        Ok(data) => {
            let data = data.unwrap_or(serde_json::Value::Null);
            match serde_json::to_string_pretty(&data) {
                Ok(s) => println!("{s}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
