use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use friendsta::gallery::upload;
use friendsta::gallery::{
    BlendMode, FilterSettings, GatewayError, LocalGateway, PhotoGateway, TokenGate,
};
use friendsta::imaging::RustBackend;
use friendsta::{config, export, output, scan};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "friendsta")]
#[command(version)]
#[command(about = "Photo gallery back end with byte-budget image compression")]
#[command(long_about = "\
Photo gallery back end with byte-budget image compression

Uploads are compressed before they are stored: images larger than the byte
budget are scaled so the longest edge fits max_dimension, then re-encoded at
decreasing quality until they fit or the quality floor is reached. Smaller
images are stored untouched.

Data directory layout:

  friendsta-data/
  ├── objects/          # Stored images, keyed {unix_millis}-{file name}
  ├── photos.json       # Photo table (id, url, size, filter, details)
  └── filter.json       # Gallery-wide color overlay

Uploading, editing, deleting and changing the filter need the admin token
(--token or FRIENDSTA_TOKEN) whose SHA-256 matches auth.admin_token_sha256.

Run 'friendsta gen-config' to generate a documented friendsta.toml.")]
struct Cli {
    /// Config file
    #[arg(long, default_value = "friendsta.toml", global = true)]
    config: PathBuf,

    /// Data directory (overrides storage.data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Admin token for mutating commands
    #[arg(long, env = "FRIENDSTA_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images to the byte budget and write them to a directory
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where compressed images are written
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,
    },
    /// Compress and add images to the gallery
    Upload {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// List photos, newest first
    List,
    /// Edit a photo's caption and exposure details (empty value clears)
    Edit(EditArgs),
    /// Delete a photo and its stored image
    Delete {
        /// Photo id
        id: u64,
    },
    /// Show or change the color overlay
    #[command(subcommand)]
    Filter(FilterCommand),
    /// Print a stock friendsta.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct EditArgs {
    /// Photo id
    id: u64,
    #[arg(long)]
    caption: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long, value_parser = parse_date_taken)]
    date_taken: Option<DateTaken>,
    /// Shutter speed, e.g. 1/250
    #[arg(long)]
    shutter: Option<String>,
    /// Aperture, e.g. f/2.8
    #[arg(long)]
    aperture: Option<String>,
    #[arg(long)]
    iso: Option<String>,
}

/// `--date-taken` value; `None` clears the stored date.
#[derive(Debug, Clone, PartialEq)]
struct DateTaken(Option<DateTime<Utc>>);

#[derive(Subcommand)]
enum FilterCommand {
    /// Print the current filter
    Show,
    /// Change some filter values
    Set {
        /// Overlay color as #rrggbb
        #[arg(long)]
        color: Option<String>,
        /// Overlay opacity in percent (0-100)
        #[arg(long)]
        opacity: Option<u8>,
        /// CSS mix-blend-mode keyword
        #[arg(long)]
        blend_mode: Option<BlendMode>,
    },
    /// Restore the default filter
    Reset,
}

/// Global options needed by every command except `gen-config`.
struct Settings {
    config_path: PathBuf,
    data_dir: Option<PathBuf>,
    token: Option<String>,
}

/// Loaded configuration plus the sign-in gate built from it.
struct Context {
    config: config::GalleryConfig,
    gate: TokenGate,
    data_dir: PathBuf,
}

impl Settings {
    fn load(&self) -> Result<Context, config::ConfigError> {
        let config = config::load_config(&self.config_path)?;
        let format = config.compression.output_mime_type;
        if !format.honours_quality() {
            warn!(
                format = format.mime_type(),
                "output format is lossless; quality steps cannot shrink it"
            );
        }
        let gate = TokenGate::new(
            config.auth.admin_token_sha256.as_deref(),
            self.token.as_deref(),
        );
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| config.storage.data_dir.clone());
        Ok(Context {
            config,
            gate,
            data_dir,
        })
    }
}

impl Context {
    fn gateway(&self) -> Result<LocalGateway, GatewayError> {
        LocalGateway::open(&self.data_dir, &self.config.storage.public_base_url)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let settings = Settings {
        config_path: cli.config,
        data_dir: cli.data_dir,
        token: cli.token,
    };

    match cli.command {
        Command::Compress { inputs, out_dir } => {
            let ctx = settings.load()?;
            init_thread_pool(&ctx.config.processing);
            let files = scan::collect_inputs(&inputs)?;
            if files.is_empty() {
                println!("No images found");
                return Ok(());
            }
            let results = export::compress_files(
                &RustBackend::new(),
                &files,
                &ctx.config.compression,
                &out_dir,
            )?;
            for (i, (path, result)) in files.iter().zip(&results).enumerate() {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                for line in output::format_compress_result(i + 1, &name, result) {
                    println!("{}", line);
                }
            }
            for line in output::format_compress_summary(&results) {
                println!("{}", line);
            }
            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                return Err(format!("{} of {} images failed", failed, results.len()).into());
            }
        }
        Command::Upload { inputs } => {
            let ctx = settings.load()?;
            let gateway = ctx.gateway()?;
            let files = scan::collect_inputs(&inputs)?;
            if files.is_empty() {
                println!("No images found");
                return Ok(());
            }
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_upload_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = upload::process_files(
                &RustBackend::new(),
                &gateway,
                &ctx.gate,
                &files,
                &ctx.config.compression,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = report?;
            output::print_upload_summary(&report);
            if !report.failed.is_empty() {
                return Err(format!(
                    "{} of {} uploads failed",
                    report.failed.len(),
                    report.total()
                )
                .into());
            }
        }
        Command::List => {
            let gateway = settings.load()?.gateway()?;
            output::print_photo_list(&gateway.list()?);
        }
        Command::Edit(args) => {
            let ctx = settings.load()?;
            let gateway = ctx.gateway()?;
            let mut details = gateway.get(args.id)?.details();
            if let Some(caption) = args.caption {
                details.caption = Some(caption);
            }
            if let Some(DateTaken(date_taken)) = args.date_taken {
                details.date_taken = date_taken;
            }
            if let Some(shutter) = args.shutter {
                details.shutter_speed = Some(shutter);
            }
            if let Some(aperture) = args.aperture {
                details.aperture = Some(aperture);
            }
            if let Some(iso) = args.iso {
                details.iso = Some(iso);
            }
            let photo = upload::edit_photo(&gateway, &ctx.gate, args.id, details)?;
            output::print_photo(&photo);
        }
        Command::Delete { id } => {
            let ctx = settings.load()?;
            let photo = upload::delete_photo(&ctx.gateway()?, &ctx.gate, id)?;
            println!("Deleted #{} {}", photo.id, photo.file_name());
        }
        Command::Filter(command) => {
            let ctx = settings.load()?;
            let gateway = ctx.gateway()?;
            match command {
                FilterCommand::Show => output::print_filter(&gateway.load_filter()?),
                FilterCommand::Set {
                    color,
                    opacity,
                    blend_mode,
                } => {
                    let mut filter = gateway.load_filter()?;
                    if let Some(color) = color {
                        filter.color = color;
                    }
                    if let Some(opacity) = opacity {
                        filter.opacity = opacity;
                    }
                    if let Some(blend_mode) = blend_mode {
                        filter.blend_mode = blend_mode;
                    }
                    upload::update_filter(&gateway, &ctx.gate, &filter)?;
                    output::print_filter(&filter);
                }
                FilterCommand::Reset => {
                    let filter = FilterSettings::default();
                    upload::update_filter(&gateway, &ctx.gate, &filter)?;
                    output::print_filter(&filter);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only command output. `RUST_LOG`
/// overrides the default `warn` level.
fn init_logging() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Accept a full RFC 3339 timestamp, a bare date (midnight UTC), or an
/// empty value to clear the date.
fn parse_date_taken(value: &str) -> Result<DateTaken, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DateTaken(None));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(DateTaken(Some(ts.with_timezone(&Utc))));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| DateTaken(Some(date.and_time(NaiveTime::MIN).and_utc())))
        .map_err(|_| format!("'{value}' is not an RFC 3339 timestamp or YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_taken_accepts_timestamp_and_bare_date() {
        assert_eq!(
            parse_date_taken("2024-05-01T08:30:00+02:00"),
            Ok(DateTaken(Some(Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap())))
        );
        assert_eq!(
            parse_date_taken("2024-05-01"),
            Ok(DateTaken(Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())))
        );
    }

    #[test]
    fn empty_date_taken_clears() {
        assert_eq!(parse_date_taken(""), Ok(DateTaken(None)));
        assert_eq!(parse_date_taken("  "), Ok(DateTaken(None)));
    }

    #[test]
    fn edit_accepts_empty_date_taken() {
        let cli = Cli::try_parse_from(["friendsta", "edit", "7", "--date-taken", ""]).unwrap();
        match cli.command {
            Command::Edit(args) => assert_eq!(args.date_taken, Some(DateTaken(None))),
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn malformed_date_taken_is_rejected() {
        assert!(parse_date_taken("yesterday").is_err());
        assert!(Cli::try_parse_from(["friendsta", "edit", "7", "--date-taken", "5/1/24"]).is_err());
    }
}
