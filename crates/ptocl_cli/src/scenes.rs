//! Built-in scenes.

use std::f64::consts::PI;

use anyhow::{Context, Result};
use ptocl_core::{Camera, Material, Scene, Shape, ShapeId};
use ptocl_math::{point, rotation_x, rotation_y, rotation_z, scaling, translation, vector, Tuple4};

use crate::config::{RenderSettings, SceneName};

/// Cells along each side of the height field.
const GRID: usize = 16;

/// Leaf size used when the height field has to be subdivided to fit the
/// compiler's child-group capacity.
const MESH_LEAF_SIZE: usize = 8;

/// Build the scene named in `settings`, subdividing root groups when a
/// threshold is configured.
pub fn build(settings: &RenderSettings) -> Result<Scene> {
    let mut scene = match settings.scene {
        SceneName::Reference => reference(settings),
        SceneName::Groups => groups(settings),
    }
    .with_context(|| format!("failed to build {:?} scene", settings.scene))?;

    if settings.divide_threshold > 0 {
        let root_groups: Vec<ShapeId> = scene
            .roots()
            .iter()
            .copied()
            .filter(|&id| scene[id].is_group())
            .collect();
        for id in root_groups {
            scene.divide(id, settings.divide_threshold)?;
        }
    }

    log::info!(
        "built {:?} scene: {} shapes, {} roots",
        settings.scene,
        scene.len(),
        scene.roots().len()
    );
    Ok(scene)
}

fn camera(settings: &RenderSettings, from: Tuple4, to: Tuple4) -> Result<Camera> {
    Ok(Camera::new(settings.width, settings.height, PI / 3.0)
        .look_at(from, to)?
        .with_aperture(settings.aperture)
        .with_focal_length(settings.focal_length))
}

/// A walled room: two spheres, a capped cylinder, a tilted cube, a small
/// group of triangles and an emissive sphere above the ceiling.
pub fn reference(settings: &RenderSettings) -> Result<Scene> {
    let mut scene = Scene::new(camera(settings, point(0.0, 0.1, -1.5), point(0.0, 0.05, 0.0))?);
    let wall = Material::diffuse(0.9, 0.8, 0.7);

    scene.add_root(
        Shape::plane()
            .with_label("floor")
            .with_transform(translation(0.0, -0.4, 0.0))?
            .with_material(wall),
    );
    scene.add_root(
        Shape::plane()
            .with_label("ceiling")
            .with_transform(translation(0.0, 0.4, 0.0))?
            .with_material(wall),
    );
    scene.add_root(
        Shape::plane()
            .with_label("left wall")
            .with_transform(translation(-0.6, 0.0, 0.0) * rotation_z(PI / 2.0))?
            .with_material(Material::diffuse(0.75, 0.25, 0.25)),
    );
    scene.add_root(
        Shape::plane()
            .with_label("right wall")
            .with_transform(translation(0.6, 0.0, 0.0) * rotation_z(PI / 2.0))?
            .with_material(Material::diffuse(0.25, 0.25, 0.75)),
    );
    scene.add_root(
        Shape::plane()
            .with_label("back wall")
            .with_transform(translation(0.0, 0.0, 0.4) * rotation_x(PI / 2.0))?
            .with_material(wall),
    );

    scene.add_root(
        Shape::sphere()
            .with_label("left sphere")
            .with_transform(translation(-0.25, -0.24, 0.1) * scaling(0.16, 0.16, 0.16))?
            .with_material(wall),
    );
    scene.add_root(
        Shape::sphere()
            .with_label("right sphere")
            .with_transform(translation(0.25, -0.24, 0.1) * scaling(0.16, 0.16, 0.16))?
            .with_material(
                Material::mirror()
                    .with_reflectivity(0.8)
                    .with_color(0.97, 0.97, 0.843),
            ),
    );

    scene.add_root(
        Shape::cylinder(0.0, 0.4, true)
            .with_label("cylinder")
            .with_transform(translation(0.45, -0.5, -0.2) * scaling(0.075, 1.0, 0.075))?
            .with_material(Material::diffuse(0.92, 0.4, 0.8)),
    );
    scene.add_root(
        Shape::cube()
            .with_label("cube")
            .with_transform(
                translation(-0.3, -0.375, -0.3)
                    * scaling(0.1, 0.05, 0.04)
                    * rotation_y(PI / 4.0)
                    * rotation_z(PI / 2.0),
            )?
            .with_material(Material::diffuse(0.25, 0.25, 0.75)),
    );

    let group = scene.add_root(
        Shape::group("triangles")
            .with_transform(translation(0.15, 0.0, -0.25))?
            .with_material(Material::diffuse(0.7, 0.4, 0.9)),
    );
    for (p1, p2, p3) in [
        (point(-0.2, -0.4, 0.0), point(0.0, -0.4, 0.0), point(0.0, -0.1, 0.0)),
        (point(0.0, -0.4, 0.0), point(0.2, -0.4, 0.0), point(0.0, -0.1, 0.0)),
        (point(0.1, -0.4, -0.4), point(0.0, -0.1, 0.0), point(0.0, -0.4, 0.0)),
    ] {
        scene.insert_child(group, Shape::triangle(p1, p2, p3))?;
    }

    scene.add_root(
        Shape::sphere()
            .with_label("light")
            .with_transform(translation(0.0, 1.36, 0.0))?
            .with_material(Material::light_bulb().with_emission(9.0, 8.0, 6.0))
            .with_shadow(false),
    );

    Ok(scene)
}

/// A smooth-shaded height field, one group per grid row, subdivided so every
/// group fits the compiled layout.
pub fn groups(settings: &RenderSettings) -> Result<Scene> {
    let mut scene = Scene::new(camera(settings, point(0.0, 0.9, -1.6), point(0.0, -0.2, 0.0))?);

    scene.add_root(
        Shape::plane()
            .with_label("floor")
            .with_transform(translation(0.0, -0.5, 0.0))?
            .with_material(Material::diffuse(0.9, 0.8, 0.7)),
    );

    let landscape = scene.add_root(
        Shape::group("landscape")
            .with_transform(translation(0.0, -0.3, 0.0))?
            .with_material(Material::diffuse(0.35, 0.6, 0.3)),
    );
    let step = 1.2 / GRID as f64;
    for row in 0..GRID {
        let row_group = scene.insert_child(landscape, Shape::group(format!("row{row}")))?;
        let z0 = -0.6 + row as f64 * step;
        for col in 0..GRID {
            let x0 = -0.6 + col as f64 * step;
            let corners = [(x0, z0), (x0 + step, z0), (x0 + step, z0 + step), (x0, z0 + step)];
            for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
                let (p1, n1) = surface(corners[a]);
                let (p2, n2) = surface(corners[b]);
                let (p3, n3) = surface(corners[c]);
                scene.insert_child(row_group, Shape::smooth_triangle(p1, p2, p3, n1, n2, n3))?;
            }
        }
    }
    scene.refresh_bounds(landscape)?;
    scene.divide(landscape, MESH_LEAF_SIZE)?;

    scene.add_root(
        Shape::sphere()
            .with_label("light")
            .with_transform(translation(0.0, 2.0, -0.5) * scaling(0.5, 0.5, 0.5))?
            .with_material(Material::light_bulb().with_emission(9.0, 8.0, 6.0))
            .with_shadow(false),
    );

    Ok(scene)
}

/// Point and normal on `y = 0.08 sin(4x) cos(4z)`.
fn surface((x, z): (f64, f64)) -> (Tuple4, Tuple4) {
    let y = 0.08 * (4.0 * x).sin() * (4.0 * z).cos();
    let dy_dx = 0.32 * (4.0 * x).cos() * (4.0 * z).cos();
    let dy_dz = -0.32 * (4.0 * x).sin() * (4.0 * z).sin();
    (point(x, y, z), vector(-dy_dx, 1.0, -dy_dz).normalize())
}
