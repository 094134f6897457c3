//! Isosurfaces and a cut plane through a noisy scalar field.

use anyhow::Context;
use clap::Parser;
use vizkit::{
    paths, Actor, ColorTransferFunction, ContourFilter, Cutter, ImageData,
    ImageDataGeometryFilter, InteractorStyle, LegacyVtkReader, Options, OutlineFilter, Plane,
    PolyData, PolyDataMapper, RenderWindow, RenderWindowInteractor, Vec3,
};

#[derive(Parser, Debug)]
#[command(about = "Contours and a cut plane of a scalar volume")]
struct Args {
    /// Legacy VTK structured points file (defaults to noise.vtk in the data directory)
    #[arg(value_name = "FILE")]
    input: Option<std::path::PathBuf>,

    /// Also show the boundary of the grid colored by the scalars
    #[arg(long)]
    boundary: bool,
}

fn outline(data: &ImageData) -> Actor {
    Actor::from_poly_data(OutlineFilter.execute(&data.bounds()))
}

fn colored(data: PolyData, range: (f32, f32)) -> Actor {
    let mut mapper = PolyDataMapper::new(data);
    mapper.set_scalar_range(range.0, range.1);
    Actor::new(mapper)
}

fn boundary_with_color_map(data: &ImageData, range: (f32, f32)) -> Actor {
    let mut transfer = ColorTransferFunction::new();
    transfer.add_rgb_point(range.0, 1.0, 0.0, 0.0);
    transfer.add_rgb_point(range.1, 0.0, 0.0, 1.0);

    let mut mapper = PolyDataMapper::new(ImageDataGeometryFilter.execute(data));
    mapper.set_scalar_range(range.0, range.1);
    mapper.set_lookup_table(transfer);
    Actor::new(mapper)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_env().context("reading options")?;
    paths::configure(&options);

    let path = args.input.unwrap_or_else(|| paths::data_file("noise.vtk"));
    let data = LegacyVtkReader::new(&path)
        .read()
        .with_context(|| format!("loading {}", path.display()))?;
    let range = data
        .scalar_range()
        .context("the dataset has no point scalars")?;

    let mut contour = ContourFilter::new();
    contour.set_value(0, 1.5);
    contour.set_value(1, 3.0);
    contour.set_value(2, 4.5);
    let surfaces = contour.execute(&data)?;

    let cut = Cutter::new(Plane::new(Vec3::ZERO, Vec3::ONE)).execute(&data)?;

    let mut window = RenderWindow::from_options(&options);
    window.set_title("isosurfaces");
    let renderer = window.renderer_mut();
    renderer.set_background(0.2, 0.3, 0.4);
    renderer.add_actor(outline(&data));
    if args.boundary {
        renderer.add_actor(boundary_with_color_map(&data, range));
    }
    renderer.add_actor(colored(surfaces, range));
    renderer.add_actor(colored(cut, range));

    let mut interactor = RenderWindowInteractor::new(window);
    interactor.set_interactor_style(InteractorStyle::TrackballCamera);
    interactor.start()?;
    Ok(())
}
