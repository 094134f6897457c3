#![allow(clippy::cast_precision_loss)]
//! A grid of points drawn as ray-cast spheres with per-point radii.

use anyhow::Context;
use clap::Parser;
use vizkit::{
    paths, Actor, Options, PolyData, PolyDataMapper, RenderWindow, RenderWindowInteractor,
    ShaderProgram, Vec3, RADIUS_ATTRIBUTE,
};

#[derive(Parser, Debug)]
#[command(about = "Point grid rendered as sphere impostors")]
struct Args {
    /// Points per side of the grid
    #[arg(long, default_value_t = 5)]
    size: usize,

    /// Sphere shader file in the shader directory
    #[arg(long, default_value = "sphere.wgsl")]
    shader: String,
}

/// A `n x n x n` grid with spacing 10 and a "radii" point array that
/// shrinks away from the center.
fn point_grid(n: usize) -> anyhow::Result<PolyData> {
    let n = n.max(2);
    let mut data = PolyData::new();
    let mut radii = Vec::with_capacity(n * n * n);
    let rel = |i: usize| i as f32 / (n - 1) as f32 - 0.5;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                data.points
                    .push(Vec3::new(i as f32, j as f32, k as f32) * 10.0);
                radii.push(8.0 - 10.0 * Vec3::new(rel(i), rel(j), rel(k)).length());
            }
        }
    }
    data.verts = (0..data.points.len() as u32).collect();
    data.add_array("radii", radii)?;
    Ok(data)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_env().context("reading options")?;
    paths::configure(&options);

    let mut mapper = PolyDataMapper::new(point_grid(args.size)?);
    mapper.map_data_array_to_vertex_attribute(RADIUS_ATTRIBUTE, "radii");

    let mut actor = Actor::new(mapper);
    let property = actor.property_mut();
    property.set_color(1.0, 0.0, 0.0);
    property.shader_program = Some(ShaderProgram::sphere_from_file_or_builtin(&args.shader));

    let mut window = RenderWindow::from_options(&options);
    window.set_title("ray cast spheres");
    let renderer = window.renderer_mut();
    renderer.set_background(0.2, 0.3, 0.4);
    renderer.add_actor(actor);

    RenderWindowInteractor::new(window).start()?;
    Ok(())
}
