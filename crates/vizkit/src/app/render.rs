//! Per-frame synchronization of the scene with its GPU copy.

use std::collections::HashMap;

use glam::{Mat4, Vec4};
use vizkit_core::Bounds;
use vizkit_render::{
    FrameContents, MeshGeometry, MeshRenderData, MeshUniforms, RenderEngine, RenderError,
    SphereRenderData, SphereUniforms, VolumeDescriptor, VolumeRenderData,
};

use super::App;
use crate::actor::Actor;
use crate::plane_widget::PlaneWidget;
use crate::renderer::{ActorId, RenderEvent, VolumeId};
use crate::volume::{Interpolation, Volume};

const WIDGET_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

struct ActorGpu {
    generation: u64,
    meshes: Vec<MeshRenderData>,
    spheres: Option<SphereRenderData>,
}

struct VolumeGpu {
    generation: u64,
    data: VolumeRenderData,
}

/// GPU copies of everything in the scene, rebuilt when their source changes.
#[derive(Default)]
pub(crate) struct GpuScene {
    actors: HashMap<ActorId, ActorGpu>,
    volumes: HashMap<VolumeId, VolumeGpu>,
    widget: Option<(u64, MeshRenderData)>,
}

fn upload_actor(engine: &mut RenderEngine, actor: &Actor) -> ActorGpu {
    let property = actor.property();
    let model = actor.model_matrix();
    let meshes = actor
        .mesh_geometries()
        .iter()
        .map(|geometry| {
            let uniforms = MeshUniforms::new(
                model,
                property.rgba(),
                property.lighting(),
                geometry.colors.is_some(),
                false,
            );
            engine.create_mesh(geometry, &uniforms)
        })
        .collect();

    let spheres = match (actor.sphere_geometry(), &property.shader_program) {
        (Some(geometry), Some(program)) => {
            let uniforms = SphereUniforms::new(
                model,
                property.rgba(),
                property.lighting(),
                geometry.colors.is_some(),
            );
            match engine.create_spheres(&geometry, &uniforms, program) {
                Ok(data) => Some(data),
                Err(err) => {
                    log::error!("cannot draw spheres: {err}");
                    None
                }
            }
        }
        _ => None,
    };

    ActorGpu {
        generation: actor.generation(),
        meshes,
        spheres,
    }
}

fn upload_volume(engine: &RenderEngine, volume: &Volume) -> Option<VolumeGpu> {
    let input = volume.input();
    let scalars = match input.require_scalars() {
        Ok(scalars) => scalars,
        Err(err) => {
            log::warn!("volume skipped: {err}");
            return None;
        }
    };
    let range = volume.scalar_range();
    let property = volume.property();
    let lut = property.lookup_table(range);
    let desc = VolumeDescriptor {
        dimensions: input.dimensions(),
        scalars,
        scalar_range: range,
        bounds: input.bounds(),
        model: volume.model_matrix(),
        lut: &lut,
        linear: property.interpolation == Interpolation::Linear,
        unit_distance: property.scalar_opacity_unit_distance,
        sample_distance: volume.sample_distance(),
    };
    Some(VolumeGpu {
        generation: volume.generation(),
        data: engine.create_volume(&desc),
    })
}

fn upload_widget(engine: &RenderEngine, widget: &PlaneWidget) -> MeshRenderData {
    let geometry = MeshGeometry::lines(&widget.representation(), false);
    let uniforms = MeshUniforms::new(Mat4::IDENTITY, WIDGET_COLOR, Vec4::ZERO, false, true);
    engine.create_mesh(&geometry, &uniforms)
}

impl App {
    fn sync_gpu(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let gpu = &mut self.gpu;

        gpu.actors
            .retain(|id, _| self.renderer.actor(*id).is_some());
        for (id, actor) in self.renderer.actors() {
            let stale = gpu
                .actors
                .get(&id)
                .map_or(true, |cached| cached.generation != actor.generation());
            if stale {
                log::debug!("uploading actor {id:?}");
                gpu.actors.insert(id, upload_actor(engine, actor));
            }
        }

        gpu.volumes
            .retain(|id, _| self.renderer.volume(*id).is_some());
        for (id, volume) in self.renderer.volumes() {
            let stale = gpu
                .volumes
                .get(&id)
                .map_or(true, |cached| cached.generation != volume.generation());
            if stale {
                log::debug!("uploading volume {id:?}");
                match upload_volume(engine, volume) {
                    Some(data) => {
                        gpu.volumes.insert(id, data);
                    }
                    None => {
                        gpu.volumes.remove(&id);
                    }
                }
            }
        }

        match self.plane_widget.as_ref().filter(|w| w.enabled()) {
            Some(widget) => {
                if gpu
                    .widget
                    .as_ref()
                    .map_or(true, |(generation, _)| *generation != widget.generation())
                {
                    gpu.widget = Some((widget.generation(), upload_widget(engine, widget)));
                }
            }
            None => gpu.widget = None,
        }
    }

    fn scene_bounds(&self) -> Bounds {
        let widget = self
            .plane_widget
            .as_ref()
            .filter(|w| w.enabled())
            .map_or(Bounds::EMPTY, |w| w.representation().bounds());
        self.renderer.visible_bounds().union(&widget)
    }

    /// Draws one frame, firing the renderer's start and end observers.
    pub(super) fn render(&mut self) {
        if self.engine.is_none() {
            return;
        }
        if !self.renderer.is_camera_set() {
            self.renderer.reset_camera();
        }
        self.renderer.invoke(RenderEvent::Start);
        self.sync_gpu();

        let mut camera = self.renderer.camera().clone();
        camera.reset_clipping_range(&self.scene_bounds());

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.update_camera(&camera);

        let mut frame = FrameContents {
            background: self.renderer.background(),
            ..FrameContents::default()
        };
        for (id, actor) in self.renderer.actors() {
            if !actor.visibility() {
                continue;
            }
            if let Some(cached) = self.gpu.actors.get(&id) {
                frame.meshes.extend(cached.meshes.iter());
                frame.spheres.extend(cached.spheres.iter());
            }
        }
        if let Some((_, widget)) = &self.gpu.widget {
            frame.meshes.push(widget);
        }
        for (id, volume) in self.renderer.volumes() {
            if !volume.visibility() {
                continue;
            }
            if let Some(cached) = self.gpu.volumes.get(&id) {
                frame.volumes.push(&cached.data);
            }
        }

        match engine.render(&frame) {
            Ok(()) => {}
            Err(RenderError::SurfaceLost) => {
                let (width, height) = (engine.width, engine.height);
                engine.resize(width, height);
            }
            Err(RenderError::Timeout) => {
                log::warn!("surface timeout");
            }
            Err(err) => {
                self.fail(err);
                return;
            }
        }

        self.renderer.invoke(RenderEvent::End);
    }
}
