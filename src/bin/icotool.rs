use clap::{Parser, Subcommand};
use icomaker::{Config, ContainerHeader, DirectoryEntry, IconContainer, IconEntry};
use serde::Serialize;
use std::error::Error;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

//===========================================================================//

#[derive(Parser)]
#[command(name = "icotool", version, about = "Builds and inspects ICO files")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an ICO file from a single source image.
    Create {
        /// Output path (defaults to the image path with an .ico extension).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Comma-separated resolutions (defaults to the configured list).
        #[arg(short, long, value_delimiter = ',')]
        sizes: Vec<u32>,
        /// Source image (PNG, JPEG, BMP or GIF).
        input: PathBuf,
    },
    /// Show the header and directory entries of an ICO file.  Entries are
    /// numbered from 0, the same INDEX that `extract` takes.
    List {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
        ico: PathBuf,
    },
    /// Write one embedded image out as a PNG or BMP file.
    Extract {
        /// Output path (defaults to ICO.INDEX.png or ICO.INDEX.bmp).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        ico: PathBuf,
        /// Entry number as shown by `list`, counted from 0 over the entries
        /// that decoded; entries rejected for an out-of-range payload are
        /// not counted, so this can differ from the position on disk.
        index: usize,
    },
}

#[derive(Serialize)]
struct Listing<'a> {
    header: ContainerHeader,
    entries: Vec<ListedEntry<'a>>,
    rejected: Vec<String>,
}

#[derive(Serialize)]
struct ListedEntry<'a> {
    index: usize,
    format: &'static str,
    #[serde(flatten)]
    directory: &'a DirectoryEntry,
}

impl<'a> Listing<'a> {
    fn new(container: &'a IconContainer) -> Listing<'a> {
        Listing {
            header: container.header(),
            entries: container
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| ListedEntry {
                    index,
                    format: payload_format(entry),
                    directory: entry.directory(),
                })
                .collect(),
            rejected: container.rejected().iter().map(|e| e.to_string()).collect(),
        }
    }
}

//===========================================================================//

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.config.as_deref().map(Config::load) {
        Some(Ok(config)) => config,
        Some(Err(err)) => {
            eprintln!("Failed to load config: {}", err);
            return ExitCode::FAILURE;
        }
        None => Config::default(),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("Failed to set up logging: {}", err);
        return ExitCode::FAILURE;
    }
    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_new(&config.log_level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_file {
        Some(ref path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn run(command: Command, config: &Config) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Create { output, sizes, input } => {
            let sizes = if sizes.is_empty() { &config.resolutions } else { &sizes };
            let out_path = output.unwrap_or_else(|| input.with_extension("ico"));
            info!("Loading {}", input.display());
            let source = image::open(&input)?;
            let bytes = config.encoder().encode_to_path(&source, sizes, &out_path)?;
            let container = IconContainer::decode(&bytes)?;
            print!("{}", format_listing(&out_path, &container));
        }
        Command::List { json, ico } => {
            let container = IconContainer::read(fs::File::open(&ico)?)?;
            for problem in container.rejected() {
                warn!("{}", problem);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&Listing::new(&container))?);
            } else {
                print!("{}", format_listing(&ico, &container));
            }
        }
        Command::Extract { output, ico, index } => {
            let container = IconContainer::read(fs::File::open(&ico)?)?;
            let entry = select_entry(&container, &ico, index)?;
            let (data, extension) = entry.to_image_file()?;
            let out_path = output.unwrap_or_else(|| {
                PathBuf::from(format!("{}.{}.{}", ico.display(), index, extension))
            });
            fs::write(&out_path, data)?;
            info!("Extracted entry {} to {}", index, out_path.display());
        }
    }
    Ok(())
}

fn payload_format(entry: &IconEntry) -> &'static str {
    if entry.is_png() {
        "PNG"
    } else {
        "BMP"
    }
}

fn select_entry<'a>(
    container: &'a IconContainer,
    ico: &Path,
    index: usize,
) -> Result<&'a IconEntry, Box<dyn Error>> {
    match container.entries().get(index) {
        Some(entry) => Ok(entry),
        None => Err(format!(
            "{} has {} readable entries (0 to {}), but index is {}",
            ico.display(),
            container.entries().len(),
            container.entries().len().saturating_sub(1),
            index
        )
        .into()),
    }
}

fn format_listing(path: &Path, container: &IconContainer) -> String {
    let mut out = String::new();
    let header = container.header();
    let _ = writeln!(out, "{}", path.display());
    let _ = writeln!(
        out,
        "Type: {}  |  Count: {}",
        container.resource_type(),
        header.entry_count
    );
    for (index, entry) in container.entries().iter().enumerate() {
        let dir = entry.directory();
        let _ = writeln!(
            out,
            "Entry {}: {}x{} {}, BitCount={}",
            index,
            entry.width(),
            entry.height(),
            payload_format(entry),
            dir.bits_per_pixel
        );
        let _ = writeln!(out, "    Width     {}", entry.width());
        let _ = writeln!(out, "    Height    {}", entry.height());
        let _ = writeln!(out, "    Colors    {}", dir.color_count);
        let _ = writeln!(out, "    Planes    {}", dir.planes);
        let _ = writeln!(out, "    BitCount  {}", dir.bits_per_pixel);
        let _ = writeln!(out, "    Size      {}", dir.data_size);
        let _ = writeln!(out, "    Offset    {}", dir.data_offset);
        match entry.payload_dimensions() {
            Ok((w, h)) if w != entry.width() || h != entry.height() => {
                let _ = writeln!(out, "    Payload   {}x{}", w, h);
            }
            Ok(_) => {}
            Err(err) => {
                let _ = writeln!(out, "    Payload   unreadable: {}", err);
            }
        }
    }
    for problem in container.rejected() {
        let _ = writeln!(out, "Rejected: {}", problem);
    }
    out
}

//===========================================================================//


//===========================================================================//
