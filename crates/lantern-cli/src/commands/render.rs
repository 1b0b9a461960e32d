//! Headless render loop command

use anyhow::Result;
use lantern_render::HeadlessContext;

pub struct RenderArgs {
    pub scene: String,
    pub assets: Vec<String>,
    pub frames: u32,
    pub dt: f32,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut manager = super::load_into_manager(&args.scene, &args.assets)?;
    let mut ctx = HeadlessContext::new();

    let mut time = 0.0;
    for frame in 0..args.frames {
        let stats = manager.next_frame(time, args.dt, &mut ctx)?;
        println!(
            "frame {frame}: {} draw call(s), {} triangle(s), {} culled, {} incomplete",
            stats.draw_calls, stats.triangles, stats.culled, stats.incomplete
        );
        time += args.dt;
    }

    println!(
        "programs: {}, buffers: {}, textures: {}",
        ctx.num_programs(),
        ctx.num_buffers(),
        ctx.num_textures()
    );
    Ok(())
}
