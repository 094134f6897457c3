//! Minimal scene: a red sphere and a yellow tetrahedron.
//!
//! Optional extras add a cone, the Stanford bunny loaded from PLY with
//! smoothed normals, and a camera that orbits one degree per frame.

use anyhow::Context;
use clap::Parser;
use vizkit::{
    paths, Actor, ConeSource, Options, PlyReader, PolyData, PolyDataNormals, RenderEvent,
    RenderWindow, RenderWindowInteractor, Renderer, SphereSource, Vec3,
};

#[derive(Parser, Debug)]
#[command(about = "Sphere and tetrahedron in an interactive window")]
struct Args {
    /// Add an orange cone next to the sphere
    #[arg(long)]
    cone: bool,

    /// Add the bunny model
    #[arg(long)]
    bunny: bool,

    /// PLY file used by --bunny (defaults to bunny.ply in the data directory)
    #[arg(long, value_name = "FILE")]
    model: Option<std::path::PathBuf>,

    /// Orbit the camera one degree per frame
    #[arg(long)]
    animate: bool,
}

fn tetrahedron() -> PolyData {
    let h = 3.0_f32.sqrt() / 4.0;
    PolyData::from_polygons(
        vec![
            Vec3::new(0.0, 0.0, 6.0_f32.sqrt() / 3.0),
            Vec3::new(-0.5, h, 0.0),
            Vec3::new(0.0, -h, 0.0),
            Vec3::new(0.5, h, 0.0),
        ],
        vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 1], vec![1, 3, 2]],
    )
}

fn add_cone(renderer: &mut Renderer) {
    let cone = ConeSource {
        resolution: 64,
        ..ConeSource::default()
    };
    let mut actor = Actor::from_poly_data(cone.output());
    actor.set_position(1.8, 0.0, 0.0);
    actor.property_mut().set_color(1.0, 0.5, 0.0);
    renderer.add_actor(actor);
}

fn add_bunny(renderer: &mut Renderer, path: std::path::PathBuf) -> anyhow::Result<()> {
    let mesh = PlyReader::new(&path)
        .read()
        .with_context(|| format!("loading {}", path.display()))?;
    let smoothed = PolyDataNormals::default().execute(&mesh);

    let mut actor = Actor::from_poly_data(smoothed);
    actor.set_position(5.0, -1.0, 0.0);
    actor.set_scale(10.0);
    actor.property_mut().set_color(1.0, 1.0, 0.5);
    renderer.add_actor(actor);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_env().context("reading options")?;
    paths::configure(&options);

    let mut window = RenderWindow::from_options(&options);
    window.set_title("hello");
    let renderer = window.renderer_mut();
    renderer.set_background(0.2, 0.3, 0.4);

    let mut sphere = Actor::from_poly_data(SphereSource::new(Vec3::ZERO, 1.0).output());
    sphere.property_mut().set_color(1.0, 0.0, 0.0);
    renderer.add_actor(sphere);

    let mut tetra = Actor::from_poly_data(tetrahedron());
    tetra.set_position(3.2, 0.0, 0.0);
    tetra.property_mut().set_color(1.0, 1.0, 0.0);
    renderer.add_actor(tetra);

    if args.cone {
        add_cone(renderer);
    }
    if args.bunny {
        let path = args.model.unwrap_or_else(|| paths::data_file("bunny.ply"));
        add_bunny(renderer, path)?;
    }
    if args.animate {
        renderer.add_observer(RenderEvent::End, |renderer| {
            renderer.camera_mut().azimuth(1.0);
        });
    }

    RenderWindowInteractor::new(window).start()?;
    Ok(())
}
