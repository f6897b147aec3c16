use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use motionblend_core::io::naming::frame_number_from_path;
use motionblend_core::io::tga::TgaHeader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input TGA sub-frame
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let header = TgaHeader::parse(&bytes)?;

    println!("File:        {}", args.file.display());
    match frame_number_from_path(&args.file) {
        Some(n) => println!("Frame:       {}", n),
        None => println!("Frame:       (no numeric suffix)"),
    }
    println!("Dimensions:  {}x{}", header.width, header.height);
    println!("Pixel depth: {} bpp", header.pixel_depth);
    println!(
        "Origin:      {}-{}",
        if header.origin_top() { "top" } else { "bottom" },
        if header.origin_right() { "right" } else { "left" }
    );
    println!("Encoding:    {}", if header.is_rle() { "RLE" } else { "raw" });
    println!("Image type:  {}", header.image_type);

    let payload = bytes.len().saturating_sub(header.data_offset());
    println!("Payload:     {} bytes", payload);
    if let Err(e) = header.check_supported() {
        println!("Supported:   no ({e})");
    } else {
        println!("Supported:   yes");
    }

    Ok(())
}
