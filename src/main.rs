use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use zpl_label::{
    load_bitmap, BitmapSource, Error, GraphicEncoding, ImageStore, LabelConfig, LabelSide, Limits,
    PhysicalSize, PreviewRequest, PrintDensity, ProductLabel, Result, Unit, DEFAULT_PUBLIC_PREFIX,
};

//
// cargo run -- render label.png --width 4 --height 6 --dpi 203
//
#[derive(Debug, Parser)]
#[command(name = "zpl-label", version, about = "Render bitmaps and product labels as ZPL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fit an image onto a label and emit it as a ^GFA graphic
    Render(RenderArgs),
    /// Compose a front or side product label from JSON catalogue data
    Product(ProductArgs),
    /// Print a Labelary preview URL for a ZPL file
    PreviewUrl(PreviewArgs),
    /// Copy an image into the upload store
    Store(StoreArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// File path, http(s) URL or base64 data URL
    source: BitmapSource,
    /// Label width; required unless --config is given
    #[arg(long)]
    width: Option<f64>,
    /// Label height; derived from the image aspect ratio when omitted
    #[arg(long)]
    height: Option<f64>,
    /// Unit of --width and --height [default: in]
    #[arg(long)]
    unit: Option<Unit>,
    /// Printer resolution
    #[arg(long, env = "ZPL_LABEL_DPI")]
    dpi: Option<u32>,
    /// Resolution the source image was authored at
    #[arg(long)]
    source_dpi: Option<u32>,
    /// JSON render configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Use ZPL ASCII compression for the graphic data
    #[arg(long)]
    compress: bool,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product JSON
    product: PathBuf,
    #[arg(long, default_value = "front")]
    side: LabelSide,
    /// Graphic placed on the label, e.g. a user manual QR code
    #[arg(long)]
    image: Option<BitmapSource>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    /// ZPL document
    zpl: PathBuf,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,
    #[arg(long, default_value = "in")]
    unit: Unit,
    #[arg(long, default_value_t = 203)]
    dpi: u32,
    /// Download the PNG preview to this path (needs the `http` feature)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct StoreArgs {
    file: PathBuf,
    /// Nickname used as the file name stem
    #[arg(long, default_value = "image")]
    name: String,
    #[arg(long, env = "ZPL_LABEL_UPLOAD_DIR", default_value = "uploads/images/generated_images")]
    dir: PathBuf,
    #[arg(long, default_value = DEFAULT_PUBLIC_PREFIX)]
    prefix: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render(args) => render(args).await,
        Command::Product(args) => product(args).await,
        Command::PreviewUrl(args) => preview_url(args).await,
        Command::Store(args) => store(args),
    };

    if let Err(err) = result {
        error!("{:?}", err);
        eprintln!("error: {}", err);
        if err.suggests_reupload() {
            eprintln!("the image could not be read; try uploading it again");
        }
        process::exit(1);
    }
}

async fn render(args: RenderArgs) -> Result<()> {
    let base = match &args.config {
        Some(path) => LabelConfig::from_json(&fs::read_to_string(path)?)?,
        None => {
            let width = args.width.ok_or_else(|| {
                Error::InvalidConfig("--width is required without --config".to_string())
            })?;
            LabelConfig::new(width, args.unit.unwrap_or_default())
        }
    };

    let options = apply_overrides(base, &args).validate()?;
    let zpl = zpl_label::source_to_zpl(args.source, &options).await?;
    write_output(args.output.as_deref(), &zpl)
}

/// Command line flags win over the config file, but only when given.
fn apply_overrides(mut config: LabelConfig, args: &RenderArgs) -> LabelConfig {
    if let Some(width) = args.width {
        config = LabelConfig { width, ..config };
    }
    if let Some(unit) = args.unit {
        config = LabelConfig { unit, ..config };
    }
    if let Some(height) = args.height {
        config = config.height(height);
    }
    if let Some(dpi) = args.dpi {
        config = config.target_dpi(dpi);
    }
    if let Some(dpi) = args.source_dpi {
        config = config.source_dpi(dpi);
    }
    if args.compress {
        config = config.encoding(GraphicEncoding::Compressed);
    }
    config
}

async fn product(args: ProductArgs) -> Result<()> {
    let json = fs::read_to_string(&args.product)?;
    let product: ProductLabel =
        serde_json::from_str(&json).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let graphic = match args.image {
        Some(source) => Some(load_bitmap(source, &Limits::default()).await?),
        None => None,
    };

    let zpl = product.compose(args.side, graphic.as_ref())?.render()?;
    write_output(args.output.as_deref(), &zpl)
}

async fn preview_url(args: PreviewArgs) -> Result<()> {
    let zpl = fs::read_to_string(&args.zpl)?;
    let density = PrintDensity::from_dpi(args.dpi).ok_or_else(|| {
        Error::InvalidConfig(format!("{} dpi is not a supported print density", args.dpi))
    })?;
    let request = PreviewRequest::new(
        zpl,
        PhysicalSize::new(args.width, args.height, args.unit),
        density,
    );
    println!("{}", request.url()?);

    if let Some(path) = args.output {
        let png = fetch_preview(&request).await?;
        fs::write(&path, png)?;
        info!("preview written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "http")]
async fn fetch_preview(request: &PreviewRequest) -> Result<Vec<u8>> {
    request.fetch_png().await
}

#[cfg(not(feature = "http"))]
async fn fetch_preview(_request: &PreviewRequest) -> Result<Vec<u8>> {
    Err(Error::Preview(
        "built without the `http` feature".to_string(),
    ))
}

fn store(args: StoreArgs) -> Result<()> {
    let bytes = fs::read(&args.file)?;
    let extension = args.file.extension().and_then(|e| e.to_str());
    let store = ImageStore::new(&args.dir, args.prefix)?;
    let public = store.save(&args.name, extension, &bytes)?;
    println!("{}", public);
    Ok(())
}

fn write_output(path: Option<&Path>, zpl: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, zpl)?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", zpl),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_args(args: &[&str]) -> RenderArgs {
        let cli = Cli::try_parse_from(
            ["zpl-label", "render", "label.png"]
                .iter()
                .chain(args.iter())
                .copied(),
        )
        .unwrap();
        match cli.command {
            Command::Render(args) => args,
            other => panic!("parsed {:?}", other),
        }
    }

    #[test]
    fn width_keeps_config_unit() {
        let base = LabelConfig::new(101.6, Unit::Millimeter).height(152.4);
        let config = apply_overrides(base, &render_args(&["--config", "c.json", "--width", "50"]));
        assert_eq!(config.width, 50.0);
        assert_eq!(config.unit, Unit::Millimeter);
        assert_eq!(config.height, Some(152.4));
    }

    #[test]
    fn unit_alone_overrides_config() {
        let base = LabelConfig::new(4.0, Unit::Millimeter);
        let config = apply_overrides(base, &render_args(&["--config", "c.json", "--unit", "in"]));
        assert_eq!(config.width, 4.0);
        assert_eq!(config.unit, Unit::Inch);
    }

    #[test]
    fn untouched_flags_leave_config_alone() {
        let base = LabelConfig::new(4.0, Unit::Inch)
            .height(6.0)
            .target_dpi(203)
            .encoding(GraphicEncoding::Compressed);
        let config = apply_overrides(base.clone(), &render_args(&["--config", "c.json"]));
        assert_eq!(config, base);
    }

    #[test]
    fn flags_without_config() {
        let args = render_args(&["--width", "2", "--dpi", "300", "--compress"]);
        assert_eq!(args.unit, None);
        let config = apply_overrides(LabelConfig::new(1.0, Unit::Inch), &args);
        assert_eq!(config.width, 2.0);
        assert_eq!(config.target_dpi, Some(300));
        assert_eq!(config.encoding, GraphicEncoding::Compressed);
    }
}
