//! # QuickQR CLI
//!
//! Command-line interface for generating QR symbols and content cards.
//!
//! ## Usage
//!
//! ```bash
//! # Encode a URL, print the data URL
//! quickqr encode example.com --type url
//!
//! # Full JSON result (data URL + metadata)
//! quickqr encode example.com --type url --json
//!
//! # Write the PNG instead
//! quickqr encode "555-1234:See you at 6" --type sms --size 8 --ec Q --png sms.png
//!
//! # Encode a JSON array of requests in parallel
//! quickqr batch requests.json > results.json
//!
//! # Render a content card
//! quickqr card "Soup of the day" --title Menu --png card.png
//!
//! # Content advice and checks
//! quickqr suggest example.com/ --type url
//! quickqr analyze "hello world" --type text
//! quickqr validate-url https://example.com
//!
//! # List categories and error-correction levels
//! quickqr types
//! ```
//!
//! Logging goes to stderr. `--verbose` enables debug output; `RUST_LOG`
//! overrides both.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quickqr::{
    Category, Config, EncodeRequest, ErrorCorrection, Generator, QuickQrError,
    advice::{self, RuleAdvisor},
    card::{CardStyle, TextBlock, TextRenderer},
    catalog,
    compose::{LogoRef, Rgb, png},
};

/// QuickQR - QR symbols and content cards from typed content
#[derive(Parser, Debug)]
#[command(name = "quickqr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (QUICKQR_* environment variables override it)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode content as a QR symbol
    Encode(EncodeArgs),

    /// Encode a JSON array of requests ("-" reads stdin)
    Batch {
        input: PathBuf,
    },

    /// Render a text block as a content card
    Card {
        body: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Font pixel size (defaults to the configured size)
        #[arg(long)]
        font_size: Option<u32>,

        #[arg(long, default_value = "#000000")]
        fg: String,

        #[arg(long, default_value = "#FFFFFF")]
        bg: String,

        /// Write a PNG file instead of printing a data URL
        #[arg(long = "png", value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Suggest improvements for content
    Suggest {
        content: String,

        #[arg(long = "type", default_value = "text")]
        category: String,

        /// Free-form context passed to the advisor
        #[arg(long)]
        context: Option<String>,
    },

    /// Run quick checks on content
    Analyze {
        content: String,

        #[arg(long = "type", default_value = "text")]
        category: String,
    },

    /// Check whether a URL is an absolute http(s) URL
    ValidateUrl {
        url: String,
    },

    /// List content categories and error-correction levels
    Types,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Content to encode (omit when using --request)
    content: Option<String>,

    /// Content category (url, text, contact, wifi, email, phone, sms, content)
    #[arg(long = "type", default_value = "text")]
    category: String,

    /// Read the whole request from a JSON file instead
    #[arg(long, value_name = "FILE", conflicts_with = "content")]
    request: Option<PathBuf>,

    /// Pixels per module (1-40)
    #[arg(long)]
    size: Option<u32>,

    /// Error-correction level (L, M, Q, H)
    #[arg(long)]
    ec: Option<String>,

    /// Quiet-zone width in modules (0-10)
    #[arg(long)]
    border: Option<u32>,

    #[arg(long)]
    fg: Option<String>,

    #[arg(long)]
    bg: Option<String>,

    #[arg(long)]
    logo: Option<String>,

    /// Content card body drawn above the symbol
    #[arg(long = "text", value_name = "BODY")]
    text_block: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Hosted content id (for --type content)
    #[arg(long)]
    content_id: Option<String>,

    /// Generate a random content id (for --type content)
    #[arg(long, conflicts_with = "content_id")]
    new_content_id: bool,

    /// Write the PNG to a file instead of printing a data URL
    #[arg(long = "png", value_name = "FILE")]
    out: Option<PathBuf>,

    /// Print the full JSON result (data URL + metadata)
    #[arg(long)]
    json: bool,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, QuickQrError> {
    let config = match path {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.with_env()
}

/// Returns whether every requested operation succeeded.
fn run() -> Result<bool, QuickQrError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode(args) => run_encode(config, args),
        Commands::Batch { input } => run_batch(config, &input),
        Commands::Card {
            body,
            title,
            description,
            font_size,
            fg,
            bg,
            out,
        } => {
            let renderer = TextRenderer::new(config.card.clone());
            let style = CardStyle {
                font_size: font_size.unwrap_or(config.card.font_size),
                font_color: fg.parse()?,
                background: bg.parse()?,
            };
            let block = TextBlock {
                body,
                title,
                description,
            };
            match out {
                Some(path) => {
                    let canvas = renderer.render(&block, &style)?;
                    std::fs::write(&path, png::to_png_bytes(&canvas)?)?;
                    info!(path = %path.display(), "content card written");
                    println!("Saved to {}", path.display());
                }
                None => println!("{}", renderer.render_data_url(&block, &style)?),
            }
            Ok(true)
        }
        Commands::Suggest {
            content,
            category,
            context,
        } => {
            let category = parse_category(&category);
            let advice = advice::advise(
                Some(&RuleAdvisor),
                &content,
                &category,
                context.as_deref(),
            );
            println!("{}", serde_json::to_string_pretty(&advice)?);
            Ok(true)
        }
        Commands::Analyze { content, category } => {
            let analysis = advice::analyze(&content, &parse_category(&category));
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(true)
        }
        Commands::ValidateUrl { url } => {
            let valid = advice::validate_url(&url);
            println!("{}", serde_json::json!({ "url": url, "valid": valid }));
            Ok(valid)
        }
        Commands::Types => {
            let listing = serde_json::json!({
                "categories": catalog::categories(),
                "error_correction_levels": catalog::error_correction_levels(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(true)
        }
    }
}

/// Unknown names become `Category::Other` and pass content through.
fn parse_category(name: &str) -> Category {
    Category::from(name.to_string())
}

fn build_request(args: &EncodeArgs) -> Result<EncodeRequest, QuickQrError> {
    let mut request = match (&args.request, &args.content) {
        (Some(path), _) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        (None, Some(content)) => EncodeRequest::new(content.clone(), parse_category(&args.category)),
        (None, None) => {
            return Err(QuickQrError::InvalidRequest(
                "either CONTENT or --request is required".to_string(),
            ));
        }
    };

    if let Some(size) = args.size {
        request.symbol_size = Some(size);
    }
    if let Some(level) = &args.ec {
        request.error_correction = Some(level.parse::<ErrorCorrection>()?);
    }
    if let Some(border) = args.border {
        request.border_modules = Some(border);
    }
    if let Some(fg) = &args.fg {
        request.foreground_color = fg.parse::<Rgb>()?;
    }
    if let Some(bg) = &args.bg {
        request.background_color = bg.parse::<Rgb>()?;
    }
    if let Some(logo) = &args.logo {
        request.logo_ref = Some(LogoRef(logo.clone()));
    }
    if args.text_block.is_some() {
        request.text_block = args.text_block.clone();
    }
    if args.title.is_some() {
        request.title = args.title.clone();
    }
    if args.description.is_some() {
        request.description = args.description.clone();
    }
    if let Some(id) = &args.content_id {
        request.content_id = Some(id.clone());
    }
    if args.new_content_id {
        request = request.with_new_content_id();
    }
    Ok(request)
}

fn run_encode(config: Config, args: EncodeArgs) -> Result<bool, QuickQrError> {
    let request = build_request(&args)?;
    let result = Generator::new(config).encode(&request);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    let Some(data_url) = &result.encoded_data else {
        if !args.json {
            let message = result.error_message.as_deref().unwrap_or("encoding failed");
            eprintln!("Error: {}", message);
        }
        return Ok(false);
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, png::from_data_url(data_url)?)?;
            info!(path = %path.display(), "symbol written");
            if !args.json {
                println!("Saved to {}", path.display());
            }
        }
        None if !args.json => println!("{}", data_url),
        None => {}
    }
    Ok(true)
}

fn run_batch(config: Config, input: &Path) -> Result<bool, QuickQrError> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };

    let results = Generator::new(config).encode_batch_json(&text)?;

    let succeeded = results.iter().filter(|r| r.success).count();
    info!(total = results.len(), succeeded, "batch finished");
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(succeeded == results.len())
}
