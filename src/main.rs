//! pixmat: command-line tool for checking conversions by hand
//!
//! Inspects how an image maps onto a matrix, blurs files, compares the
//! direct mapping with an encode/decode round trip, and grabs screen
//! regions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixmat::{
    buffer::ImageBuffer,
    capture::{self, MockScreens, ScreenProvider},
    config, convert,
    image_mat::ImageMat,
    model::{ContainerFormat, Point, Rect},
    resource::ResourceSet,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "pixmat")]
#[command(about = "Inspect buffer/matrix conversions, blur images and grab screens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print how an image maps onto a matrix (path or :/resource)
    Info {
        /// Image file or packaged resource path
        path: String,
    },
    /// Blur an image file
    Blur {
        /// Input image
        input: PathBuf,
        /// Blur radius; the kernel is 2 * radius + 1 wide
        #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
        radius: i32,
        /// Output file path
        #[arg(short, long)]
        out: PathBuf,
        /// Output container (png, jpeg, bmp, webp); guessed from --out if
        /// omitted
        #[arg(long)]
        format: Option<ContainerFormat>,
        /// Input container; detected from the file contents if omitted
        #[arg(long)]
        input_format: Option<ContainerFormat>,
    },
    /// Compare the direct mapping with an encode/decode round trip
    Roundtrip {
        /// Image file or packaged resource path
        path: String,
        /// Container for the round trip (defaults to PIXMAT_ROUNDTRIP_FORMAT)
        #[arg(long)]
        format: Option<ContainerFormat>,
    },
    /// Grab a region of the screen showing a window
    Grab {
        /// Global x of the window used to pick the screen
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        window_x: i32,
        /// Global y of the window used to pick the screen
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        window_y: i32,
        /// Region left edge, relative to the screen
        #[arg(long, default_value_t = 0)]
        x: i32,
        /// Region top edge, relative to the screen
        #[arg(long, default_value_t = 0)]
        y: i32,
        /// Region width; negative extends to the screen edge
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        width: i32,
        /// Region height; negative extends to the screen edge
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        height: i32,
        /// Use synthetic screens instead of the real display
        #[arg(long)]
        mock: bool,
        /// Output file path
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    // Respects RUST_LOG, default level: info
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixmat=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { path } => info_cmd(&path),
        Commands::Blur {
            input,
            radius,
            out,
            format,
            input_format,
        } => blur_cmd(input, input_format, radius, out, format),
        Commands::Roundtrip { path, format } => roundtrip_cmd(&path, format),
        Commands::Grab {
            window_x,
            window_y,
            x,
            y,
            width,
            height,
            mock,
            out,
        } => grab_cmd(Point::new(window_x, window_y), Rect::new(x, y, width, height), mock, out),
    }
}

fn load(path: &str) -> Result<ImageBuffer> {
    let bytes = ResourceSet::bundled()
        .read(path)
        .with_context(|| format!("Cannot read {}", path))?;
    ImageBuffer::from_encoded(&bytes).with_context(|| format!("Cannot decode {}", path))
}

fn info_cmd(path: &str) -> Result<()> {
    let img = load(path)?;
    let mat = convert::image_to_mat(&img);

    let report = serde_json::json!({
        "path": path,
        "width": img.width(),
        "height": img.height(),
        "format": img.format(),
        "bytes_per_line": img.bytes_per_line(),
        "elem_type": convert::elem_type_for(img.format()).map(|t| t.to_string()),
        "zero_copy": mat.is_view(),
        "step": mat.step(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn blur_cmd(
    input: PathBuf,
    input_format: Option<ContainerFormat>,
    radius: i32,
    out: PathBuf,
    format: Option<ContainerFormat>,
) -> Result<()> {
    let mut wrapper = ImageMat::open(&input, input_format);
    if wrapper.is_null() {
        anyhow::bail!("Cannot open {}", input.display());
    }
    let img = wrapper.image();
    info!("Loaded {} ({}x{} {})", input.display(), img.width(), img.height(), img.format());

    wrapper.gaussian_blur(radius);
    wrapper
        .image()
        .save(&out, format)
        .with_context(|| format!("Cannot write {}", out.display()))?;

    println!("Blurred image saved to: {}", out.display());
    Ok(())
}

fn roundtrip_cmd(path: &str, format: Option<ContainerFormat>) -> Result<()> {
    let img = load(path)?;
    let format = format.unwrap_or_else(config::roundtrip_format);

    let direct = convert::image_to_mat(&img);
    let via = convert::try_image_to_mat_via(&img, format)?;

    // Both sides are BGR(A) after conversion; compare the color channels
    let mut max_diff = 0u8;
    if !direct.is_empty() && direct.elem_type().depth_bytes() == 1 && direct.channels() >= 3 {
        for r in 0..direct.rows().min(via.rows()) {
            for c in 0..direct.cols().min(via.cols()) {
                let a = direct.pixel(r, c);
                let b = via.pixel(r, c);
                for ch in 0..3 {
                    max_diff = max_diff.max(a[ch].abs_diff(b[ch]));
                }
            }
        }
    }

    let report = serde_json::json!({
        "path": path,
        "container": format,
        "direct": {
            "rows": direct.rows(),
            "cols": direct.cols(),
            "elem_type": direct.elem_type().to_string(),
            "empty": direct.is_empty(),
        },
        "round_trip": {
            "rows": via.rows(),
            "cols": via.cols(),
            "elem_type": via.elem_type().to_string(),
        },
        "max_channel_diff": max_diff,
        "lossless": format.is_lossless(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn grab_cmd(window: Point, rect: Rect, mock: bool, out: PathBuf) -> Result<()> {
    let provider: Box<dyn ScreenProvider> = if mock {
        Box::new(MockScreens::new())
    } else {
        capture::create_default_provider()?
    };
    info!("Using {} screens", provider.name());

    let img = capture::try_grab_image(&window, rect, provider.as_ref())?;
    img.save(&out, None)
        .with_context(|| format!("Cannot write {}", out.display()))?;

    println!("Grabbed {}x{} saved to: {}", img.width(), img.height(), out.display());
    Ok(())
}
