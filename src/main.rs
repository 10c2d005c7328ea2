use cafe_locator::config::{AppConfig, API_KEY_ENV};
use cafe_locator::hours::parse_local_time;
use cafe_locator::location::{Coordinates, GeolocationOptions, Geolocator};
use cafe_locator::ContactCard;
use chrono::{NaiveDateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Cafe Locator: the coffee shop's contact card in your terminal.
///
/// Shows the address, how far away you are, whether the shop is open,
/// and map links for viewing, directions, and embedding.
///
/// Examples:
///   cafe
///   cafe --lat 40.7580 --lng -73.9855
///   cafe --auto
///   cafe --at "2026-10-24 06:30" --json
///   cafe --serve --port 8080
#[derive(Parser)]
#[command(name = "cafe", version, about, long_about = None)]
struct Cli {
    /// Your latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    lat: Option<f64>,

    /// Your longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lng: Option<f64>,

    /// Detect your position via IP geolocation.
    #[arg(long, short = 'a')]
    auto: bool,

    /// Offline mode: only use the cached position.
    #[arg(long)]
    offline: bool,

    /// Geolocation timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Evaluate opening hours at this shop-local time (YYYY-MM-DD HH:MM).
    #[arg(long)]
    at: Option<String>,

    /// IANA timezone of the shop (e.g. America/New_York). Overrides config.
    #[arg(long)]
    tz: Option<String>,

    /// Config file. Defaults to ~/.cafe/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to the config path and exit.
    #[arg(long)]
    init_config: bool,

    /// Map provider key for the embed link.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Print the contact card as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Start the HTTP API instead of printing the card.
    #[arg(long)]
    serve: bool,

    /// Bind address for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for --serve.
    #[arg(long, short = 'p', default_value_t = 3000)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.serve);

    // ── Load config ─────────────────────────────────────────────

    let mut config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Some(ref key) = cli.api_key {
        config.maps_api_key = Some(key.clone());
    }
    if let Some(ref tz) = cli.tz {
        config.timezone = Some(tz.clone());
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if cli.init_config {
        let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
        if let Err(e) = config.save_to(&path) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        eprintln!("  Wrote {}", path.display());
        return;
    }

    // ── Serve ───────────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(cafe_locator::server::start(config, &cli.host, cli.port));
        return;
    }

    // ── Shop-local time ─────────────────────────────────────────

    let at = match &cli.at {
        Some(s) => parse_local_time(s).unwrap_or_else(|| {
            eprintln!("Error: Invalid time '{}'. Use YYYY-MM-DD HH:MM.", s);
            std::process::exit(1);
        }),
        None => config.local_time(Utc::now()),
    };

    // ── Visitor position ────────────────────────────────────────

    let card = build_card(&cli, &config, at);

    eprint!("{}", card.render());
    if cli.json {
        match serde_json::to_string_pretty(&card) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(serving: bool) {
    let default = if serving { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig, cafe_locator::ConfigError> {
    match &cli.config {
        Some(path) if cli.init_config && !path.exists() => Ok(AppConfig::default()),
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env(|k| std::env::var(k).ok());
            Ok(config)
        }
        None => AppConfig::load(),
    }
}

fn build_card(cli: &Cli, config: &AppConfig, at: NaiveDateTime) -> ContactCard {
    let options = GeolocationOptions {
        timeout: Duration::from_secs(cli.timeout),
        ..GeolocationOptions::default()
    };

    // Priority: --lat/--lng > --auto > cached position (if any) > address only
    if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
        let coords = Coordinates::new(lat, lng);
        if !coords.is_valid() {
            eprintln!("Error: Invalid coordinates. Lat: -90..90, Lng: -180..180");
            std::process::exit(1);
        }
        let mut geo = Geolocator::new(options);
        let pos = geo.remember(coords);
        return ContactCard::build(config, Some(pos), at);
    }

    let mut geo = Geolocator::new(options);
    if cli.auto && !cli.offline {
        return ContactCard::from_lookup(config, geo.locate(), at);
    }

    geo.set_offline(true);
    match geo.locate() {
        Ok(pos) => ContactCard::build(config, Some(pos), at),
        Err(e) if cli.offline || cli.auto => ContactCard::from_lookup(config, Err(e), at),
        Err(_) => ContactCard::build(config, None, at),
    }
}
