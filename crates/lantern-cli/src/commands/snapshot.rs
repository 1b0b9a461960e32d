//! GPU scene-to-PNG snapshot command

use anyhow::{Context, Result};
use lantern_render::WgpuContext;

pub struct SnapshotArgs {
    pub scene: String,
    pub assets: Vec<String>,
    pub output: String,
    pub width: u32,
    pub height: u32,
}

pub fn run(args: SnapshotArgs) -> Result<()> {
    let mut manager = super::load_into_manager(&args.scene, &args.assets)?;
    let mut ctx = pollster::block_on(WgpuContext::new(args.width, args.height))?;

    let stats = manager.next_frame(0.0, 0.0, &mut ctx)?;
    log::info!(
        "rendered {} draw call(s), {} culled",
        stats.draw_calls,
        stats.culled
    );

    let pixels = pollster::block_on(ctx.read_pixels())?;
    let image = image::RgbaImage::from_raw(args.width, args.height, pixels)
        .context("framebuffer size mismatch")?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output))?;

    println!("Wrote {} ({}x{})", args.output, args.width, args.height);
    Ok(())
}
