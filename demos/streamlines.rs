//! Streamlines through a two-swirl vector field, seeded from a plane widget.
//!
//! Push the plane with PageUp/PageDown and tilt it with the arrow keys; the
//! lines are hidden while the plane moves and retraced when the key is
//! released.

use anyhow::Context;
use clap::Parser;
use vizkit::{
    paths, read_vector_field, Actor, ActorId, ColorTransferFunction, ImageData,
    InteractorStyle, Options, OutlineFilter, PlaneWidget, PolyData, PolyDataMapper,
    RenderWindow, RenderWindowInteractor, Renderer, RibbonFilter, StreamTracer, TubeFilter,
};

#[derive(Parser, Debug)]
#[command(about = "Interactive streamlines of a vector field")]
struct Args {
    /// Raw .vec vector field (defaults to TwoSwirls_64x64x64.vec in the data directory)
    #[arg(value_name = "FILE")]
    input: Option<std::path::PathBuf>,

    /// Draw tubes instead of ribbons
    #[arg(long)]
    tubes: bool,

    /// Seed grid subdivisions per side
    #[arg(long, default_value_t = 16)]
    resolution: u32,
}

/// How traced lines are turned into surfaces.
#[derive(Debug, Clone, Copy)]
enum Sweep {
    Ribbons(RibbonFilter),
    Tubes(TubeFilter),
}

impl Sweep {
    fn new(tubes: bool) -> Self {
        if tubes {
            Self::Tubes(TubeFilter {
                radius: 0.25,
                number_of_sides: 5,
            })
        } else {
            Self::Ribbons(RibbonFilter {
                width: 0.25,
                vary_width: true,
                ..RibbonFilter::default()
            })
        }
    }

    fn apply(self, lines: &PolyData) -> vizkit::Result<PolyData> {
        Ok(match self {
            Self::Ribbons(filter) => filter.execute(lines)?,
            Self::Tubes(filter) => filter.execute(lines)?,
        })
    }
}

fn tracer() -> StreamTracer {
    StreamTracer {
        maximum_propagation_time: 200.0,
        integration_step_length: 0.2,
        step_length: 0.1,
        compute_vorticity: true,
        ..StreamTracer::default()
    }
}

/// Traces from `seeds` and builds the colored surface mapper.
fn streamlines(field: &ImageData, seeds: &PolyData, sweep: Sweep) -> vizkit::Result<PolyDataMapper> {
    let lines = tracer().execute(field, &seeds.points)?;
    let range = lines.scalar_range().unwrap_or((0.0, 1.0));
    let surface = sweep.apply(&lines)?;

    let mut transfer = ColorTransferFunction::new();
    transfer.add_rgb_point(range.0, 1.0, 0.0, 0.0);
    transfer.add_rgb_point(range.1, 0.0, 0.0, 1.0);

    let mut mapper = PolyDataMapper::new(surface);
    mapper.set_scalar_range(range.0, range.1);
    mapper.set_lookup_table(transfer);
    Ok(mapper)
}

fn retrace(renderer: &mut Renderer, id: ActorId, field: &ImageData, seeds: &PolyData, sweep: Sweep) {
    let Some(actor) = renderer.actor_mut(id) else {
        return;
    };
    actor.set_visibility(true);
    match streamlines(field, seeds, sweep) {
        Ok(mapper) => actor.set_mapper(mapper),
        Err(err) => log::error!("could not retrace streamlines: {err}"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = Options::from_env().context("reading options")?;
    paths::configure(&options);

    let path = args
        .input
        .unwrap_or_else(|| paths::data_file("TwoSwirls_64x64x64.vec"));
    let field = read_vector_field(&path)?;
    let sweep = Sweep::new(args.tubes);

    let mut widget = PlaneWidget::new();
    widget.set_resolution(args.resolution);
    widget.place_widget(&field.bounds());

    let mapper = streamlines(&field, &widget.poly_data(), sweep)?;

    let mut window = RenderWindow::from_options(&options);
    window.set_title("streamlines");
    let renderer = window.renderer_mut();
    renderer.set_background(0.2, 0.3, 0.4);
    let lines = renderer.add_actor(Actor::new(mapper));
    renderer.add_actor(Actor::from_poly_data(OutlineFilter.execute(&field.bounds())));

    widget.on_start_interaction(move |renderer| {
        if let Some(actor) = renderer.actor_mut(lines) {
            actor.set_visibility(false);
        }
    });
    widget.on_end_interaction(move |renderer, seeds| {
        retrace(renderer, lines, &field, seeds, sweep);
    });

    let mut interactor = RenderWindowInteractor::new(window);
    interactor.set_interactor_style(InteractorStyle::TrackballCamera);
    interactor.set_plane_widget(widget);
    interactor.start()?;
    Ok(())
}
