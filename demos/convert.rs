use clap::Parser;
use image_to_pdf::{Compression, ConvertError, Info, Raster, SaveOptions};
use std::{io::BufWriter, path::PathBuf};

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    /// Images to convert, one page each
    #[arg(required = true, value_name = "image_file")]
    inputs: Vec<PathBuf>,
    #[arg(short = 'o', long = "output", value_name = "file_path")]
    output_file_path: PathBuf,
    #[arg(long = "dpi", default_value_t = 72.0)]
    dpi: f32,
    /// Flate compress colour data even where JPEG would be used
    #[arg(long = "lossless", conflicts_with = "lossy")]
    lossless: bool,
    /// JPEG compress colour data even for palette images
    #[arg(long = "lossy")]
    lossy: bool,
    #[arg(long = "quality", default_value_t = 75)]
    quality: u8,
    #[arg(long = "title")]
    title: Option<String>,
}

fn main() {
    env_logger::init();
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ConvertError> {
    let arguments = CliArguments::parse();
    log::debug!("{:?}", arguments);

    let mut options = SaveOptions::new()
        .resolution(arguments.dpi)
        .jpeg_quality(arguments.quality);
    if arguments.lossless {
        options = options.compression(Compression::Lossless);
    } else if arguments.lossy {
        options = options.compression(Compression::Lossy);
    }
    if let Some(title) = &arguments.title {
        options = options.info(Info::new().title(title.as_str()));
    }

    let images = arguments
        .inputs
        .iter()
        .map(|path| image::open(path).map(Raster::from))
        .collect::<Result<Vec<_>, _>>()?;

    let out = std::fs::File::create(&arguments.output_file_path)?;
    image_to_pdf::save_all(&images, BufWriter::new(out), &options)?;
    log::info!(
        "Saved {} page(s) to {:?}",
        images.len(),
        arguments.output_file_path
    );
    Ok(())
}
