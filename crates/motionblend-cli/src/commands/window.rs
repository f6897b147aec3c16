use anyhow::Result;
use clap::Args;
use motionblend_core::config::{BlendConfig, MotionBlendConfig};

#[derive(Args)]
pub struct WindowArgs {
    /// Sub-frames per output frame
    #[arg(long)]
    pub blend_rate: Option<u32>,

    /// Shutter angle in degrees (1-360)
    #[arg(long)]
    pub shutter_angle: Option<u32>,
}

pub fn run(args: &WindowArgs, config: &MotionBlendConfig) -> Result<()> {
    let blend = BlendConfig {
        blend_rate: args.blend_rate.unwrap_or(config.blend.blend_rate),
        shutter_angle: args.shutter_angle.unwrap_or(config.blend.shutter_angle),
    };
    let window = blend.window()?;

    println!("Blend rate:     {}", window.blend_rate());
    println!("Shutter angle:  {}\u{b0}", blend.shutter_angle);
    println!("Accepted:       {}", window);
    println!("Merged/frame:   {}", window.accepted_count());

    let ignored: Vec<String> = (0..window.blend_rate())
        .filter(|&slot| window.should_ignore(u64::from(slot)))
        .map(|slot| slot.to_string())
        .collect();
    if ignored.is_empty() {
        println!("Ignored:        none");
    } else if ignored.len() <= 32 {
        println!("Ignored:        {}", ignored.join(", "));
    } else {
        println!("Ignored:        {} slots", ignored.len());
    }

    Ok(())
}
