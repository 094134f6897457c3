//! Ray-cast volume rendering of an iron protein density field.

use anyhow::Context;
use clap::Parser;
use vizkit::{
    paths, Actor, ColorTransferFunction, InteractorStyle, Interpolation, LegacyVtkReader,
    Options, OutlineFilter, PiecewiseFunction, RenderWindow, RenderWindowInteractor, Volume,
    VolumeProperty,
};

#[derive(Parser, Debug)]
#[command(about = "Volume rendering of a scalar field")]
struct Args {
    /// Legacy VTK structured points file (defaults to ironProt.vtk in the data directory)
    #[arg(value_name = "FILE")]
    input: Option<std::path::PathBuf>,

    /// Use nearest-neighbour sampling instead of trilinear
    #[arg(long)]
    nearest: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_env().context("reading options")?;
    paths::configure(&options);

    let path = args.input.unwrap_or_else(|| paths::data_file("ironProt.vtk"));
    let data = LegacyVtkReader::new(&path)
        .read()
        .with_context(|| format!("loading {}", path.display()))?;

    let mut opacity = PiecewiseFunction::new();
    opacity.add_point(0.0, 0.0);
    opacity.add_point(255.0, 0.2);

    let mut color = ColorTransferFunction::new();
    color.add_rgb_point(0.0, 1.0, 0.0, 0.0);
    color.add_rgb_point(255.0, 0.0, 0.0, 1.0);

    let property = VolumeProperty {
        color,
        scalar_opacity: opacity,
        interpolation: if args.nearest {
            Interpolation::Nearest
        } else {
            Interpolation::Linear
        },
        ..VolumeProperty::default()
    };

    let mut outline = Actor::from_poly_data(OutlineFilter.execute(&data.bounds()));
    outline.property_mut().set_color(0.0, 0.0, 0.0);

    let mut volume = Volume::new(data)?;
    volume.set_property(property);

    let mut window = RenderWindow::from_options(&options);
    window.set_title("volume rendering");
    let renderer = window.renderer_mut();
    renderer.set_background(1.0, 1.0, 1.0);
    renderer.add_volume(volume);
    renderer.add_actor(outline);

    let mut interactor = RenderWindowInteractor::new(window);
    interactor.set_interactor_style(InteractorStyle::TrackballCamera);
    interactor.start()?;
    Ok(())
}
