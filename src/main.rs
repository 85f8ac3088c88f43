use axum::{
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue},
    routing::post,
    Json, Router,
};
use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use std::net::SocketAddr;
use std::process;
use terminal_size::{terminal_size, Width};
use tokio::io::AsyncReadExt;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use formbody::config::{self, FormPluginOptions, HostDefaults, DEFAULT_HOST, DEFAULT_PORT};
use formbody::decoder::bytes_body;
use formbody::{FormBody, FormPlugin, ParsedFormBody};

async fn echo_form(FormBody(body): FormBody) -> Json<ParsedFormBody> {
    Json(body)
}

fn build_app(plugin: FormPlugin) -> Router {
    let routes = Router::new().route("/", post(echo_form));
    plugin
        .register(routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Env switches first, then `--options` JSON on top.
fn resolve_options(options_json: Option<&str>) -> FormPluginOptions {
    let from_env = FormPluginOptions::from_env();
    let Some(raw) = options_json else {
        return from_env;
    };

    let parsed = serde_json::from_str::<serde_json::Value>(raw)
        .map_err(formbody::ConfigError::from)
        .and_then(FormPluginOptions::from_json);
    match parsed {
        Ok(mut options) => {
            options.multipart = options.multipart.or(from_env.multipart);
            options.urlencoded = options.urlencoded.or(from_env.urlencoded);
            options
        }
        Err(e) => {
            tracing::error!(%e, "Invalid --options value");
            eprintln!("{}: {}", yansi::Paint::red("Invalid --options value"), e);
            process::exit(1);
        }
    }
}

fn print_body_table(body: &ParsedFormBody) {
    if body.is_empty() {
        println!("(empty form)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }

    table.set_header(vec!["Field", "Value"]);
    for (name, value) in body.iter() {
        table.add_row(vec![name.to_string(), value.to_csv()]);
    }
    println!("\n{table}\n");
}

#[derive(Parser)]
#[command(
    name = "formbody",
    author,
    version,
    about = "Form body parsing for axum",
    long_about = r#"formbody: parse multipart and urlencoded form bodies into flat field maps.

Poisoning defaults are read from ON_CONSTRUCTOR_POISONING / ON_PROTO_POISONING (ignore|error|remove).
FORM_MULTIPART / FORM_URLENCODED switch the content types on or off.

Examples:
  1) Run the echo server:
      formbody serve --port 8080
  2) Parse a body from stdin:
      printf 'a=1&a=2' | formbody parse --content-type application/x-www-form-urlencoded
"#,
    after_help = "Use `formbody <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
    /// Plugin options as JSON, e.g. '{"onProtoPoisoning":"error"}'
    #[arg(long, global = true)]
    options: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a server echoing parsed `POST /` bodies as JSON
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse a form body read from stdin
    Parse {
        /// Content-Type of the body, including any boundary parameter
        #[arg(long)]
        content_type: String,
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    config::load_env_file(cli.env_file.as_deref());
    let options = resolve_options(cli.options.as_deref());
    let plugin = FormPlugin::new(options, HostDefaults::from_env());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(config::get_host);
            let port = port.unwrap_or_else(config::get_port);
            serve(plugin, &host, port).await;
        }
        Commands::Parse { content_type, json } => {
            parse_stdin(plugin, &content_type, json).await;
        }
    }
}

async fn serve(plugin: FormPlugin, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!(
                "{}: {} (defaults are {}:{})",
                yansi::Paint::red("Invalid host/port format"),
                e,
                DEFAULT_HOST,
                DEFAULT_PORT
            );
            process::exit(1);
        }
    };

    let content_types: Vec<&str> = plugin.content_types().iter().map(|ct| ct.as_str()).collect();
    let app = build_app(plugin);
    tracing::info!(%addr, ?content_types, "Starting formbody echo server");
    println!(
        "{} {}",
        yansi::Paint::new("Echo server running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e
            );
            process::exit(1);
        }
    }
}

async fn parse_stdin(plugin: FormPlugin, content_type: &str, json: bool) {
    let header = match HeaderValue::from_str(content_type) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::red("Invalid content type"), e);
            process::exit(1);
        }
    };
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, header);

    let parser = match plugin.parser_for(&headers) {
        Some(parser) => parser,
        None => {
            eprintln!(
                "{} {}",
                yansi::Paint::red("No form parser registered for"),
                content_type
            );
            process::exit(1);
        }
    };

    let mut raw = Vec::new();
    if let Err(e) = tokio::io::stdin().read_to_end(&mut raw).await {
        tracing::error!(%e, "Failed to read stdin");
        eprintln!("{}: {}", yansi::Paint::red("Failed to read stdin"), e);
        process::exit(1);
    }

    match parser.parse(bytes_body(raw), &headers).await {
        Ok(body) if json => match serde_json::to_string_pretty(&body) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("{}: {}", yansi::Paint::red("Failed to serialize body"), e);
                process::exit(1);
            }
        },
        Ok(body) => print_body_table(&body),
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::red("Failed to parse form body"), e);
            process::exit(1);
        }
    }
}
