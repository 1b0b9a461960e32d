//! glTF/GLB import
//!
//! Meshes become geometries in the standard position/normal/uv layout,
//! materials become providers, images become textures, and the node tree
//! becomes a symbol scene with transforms and surfaces attached, ready to be
//! merged into a live scene.
//!
//! Sub-assets register under `<filename>#<name>` so two files can both ship
//! a "body" mesh.

use crate::{AssetLibrary, AssetParser, Options, TextureAsset};
use glam::{Mat4, Vec4};
use lantern_component::{attach_surface, Surface, Transform};
use lantern_core::{LanternError, Result};
use lantern_data::Provider;
use lantern_geometry::{standard_attributes, Geometry};
use lantern_scene::Scene;
use log::warn;

pub struct GltfParser;

const DEFAULT_EFFECT: &str = "basic";

fn import_error(filename: &str, detail: impl std::fmt::Display) -> LanternError {
    LanternError::ImportError(format!("{filename}: {detail}"))
}

fn sub_asset(filename: &str, name: &str) -> String {
    format!("{filename}#{name}")
}

fn mesh_name(mesh: &gltf::Mesh<'_>) -> String {
    mesh.name()
        .map(String::from)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()))
}

fn material_name(material: &gltf::Material<'_>) -> String {
    material
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0)))
}

fn texture_name(texture: &gltf::Texture<'_>) -> String {
    texture
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("texture_{}", texture.index()))
}

/// Interleave one primitive into the standard vertex layout.
fn build_geometry(
    filename: &str,
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<Geometry> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|iter| iter.collect())
        .ok_or_else(|| import_error(filename, "primitive has no positions"))?;
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|iter| iter.collect())
        .unwrap_or_else(|| vec![[0.0; 3]; positions.len()]);
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let mut data = Vec::with_capacity(positions.len() * 8);
    for (i, position) in positions.iter().enumerate() {
        data.extend_from_slice(position);
        data.extend_from_slice(normals.get(i).unwrap_or(&[0.0; 3]));
        data.extend_from_slice(uvs.get(i).unwrap_or(&[0.0; 2]));
    }

    Geometry::new(standard_attributes(), data, indices)
}

fn build_material(
    filename: &str,
    material: &gltf::Material<'_>,
    options: &Options,
) -> Provider {
    let pbr = material.pbr_metallic_roughness();
    let mut provider = Provider::new("material")
        .with("diffuse_color", Vec4::from_array(pbr.base_color_factor()))
        .with("metallic", pbr.metallic_factor())
        .with("roughness", pbr.roughness_factor());

    if let Some(info) = pbr.base_color_texture() {
        provider.set(
            "diffuse_map",
            sub_asset(filename, &texture_name(&info.texture())),
        );
    }

    options.process_material(provider)
}

fn rgba8_pixels(filename: &str, image: &gltf::image::Data) -> Option<Vec<u8>> {
    use gltf::image::Format;
    match image.format {
        Format::R8G8B8A8 => Some(image.pixels.clone()),
        Format::R8G8B8 => Some(
            image
                .pixels
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
        ),
        other => {
            warn!("{filename}: skipping texture with unsupported format {other:?}");
            None
        }
    }
}

/// Recreate a glTF node subtree inside the symbol scene.
fn build_node(
    filename: &str,
    node: &gltf::Node<'_>,
    parent: lantern_core::NodeId,
    symbol: &mut Scene,
    geometry_keys: &[Vec<String>],
    material_keys: &[Option<String>],
    options: &Options,
    library: &AssetLibrary,
) -> Result<()> {
    let base = node
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let base = options.process_node_name(&base);

    // glTF names need not be unique; suffix until the scene accepts one.
    let mut name = base.clone();
    let mut attempt = 1;
    let id = loop {
        match symbol.create_node(name.clone()) {
            Ok(id) => break id,
            Err(_) => {
                name = format!("{base}_{attempt}");
                attempt += 1;
            }
        }
    };
    symbol.add_child(parent, id)?;

    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    symbol.add_component(id, Transform::new(local))?;

    if let Some(mesh) = node.mesh() {
        let keys = &geometry_keys[mesh.index()];
        for (i, key) in keys.iter().enumerate() {
            // Extra primitives hang off child nodes so each gets one surface.
            let target = if i == 0 {
                id
            } else {
                let child = symbol.create_node(format!("{name}_prim{i}"))?;
                symbol.add_child(id, child)?;
                symbol.add_component(child, Transform::identity())?;
                child
            };

            let material = mesh
                .primitives()
                .nth(i)
                .and_then(|p| p.material().index())
                .and_then(|index| material_keys.get(index).cloned().flatten())
                .and_then(|key| library.material(&key).cloned())
                .unwrap_or_else(|| Provider::new("material").with("diffuse_color", Vec4::ONE));

            let surface = Surface::new(
                key.clone(),
                material,
                options.effect_override().unwrap_or(DEFAULT_EFFECT),
            );
            let surface = match options.technique_override() {
                Some(technique) => surface.with_technique(technique),
                None => surface,
            };
            attach_surface(symbol, target, surface)?;
        }
    }

    for child in node.children() {
        build_node(
            filename,
            &child,
            id,
            symbol,
            geometry_keys,
            material_keys,
            options,
            library,
        )?;
    }

    Ok(())
}

impl AssetParser for GltfParser {
    fn name(&self) -> &'static str {
        "gltf"
    }

    fn parse(
        &self,
        filename: &str,
        bytes: &[u8],
        options: &Options,
        library: &mut AssetLibrary,
    ) -> Result<()> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|e| import_error(filename, e))?;

        // Geometries, keyed per mesh so node building can look them up.
        let mut geometry_keys: Vec<Vec<String>> = Vec::new();
        for mesh in document.meshes() {
            let base = mesh_name(&mesh);
            let mut keys = Vec::new();
            for (i, primitive) in mesh.primitives().enumerate() {
                let name = if mesh.primitives().len() == 1 {
                    base.clone()
                } else {
                    format!("{base}_{i}")
                };
                let key = sub_asset(filename, &name);
                let geometry =
                    options.process_geometry(build_geometry(filename, &primitive, &buffers)?);
                library.set_geometry(key.clone(), geometry);
                keys.push(key);
            }
            geometry_keys.push(keys);
        }

        // Textures reference images by source index; several textures may
        // share one image.
        for texture in document.textures() {
            let Some(image) = images.get(texture.source().index()) else {
                warn!(
                    "{filename}: texture '{}' references a missing image",
                    texture_name(&texture)
                );
                continue;
            };
            let Some(pixels) = rgba8_pixels(filename, image) else {
                continue;
            };
            library.set_texture(
                sub_asset(filename, &texture_name(&texture)),
                TextureAsset::new(image.width, image.height, pixels),
            );
        }

        let mut material_keys: Vec<Option<String>> = Vec::new();
        for material in document.materials() {
            let key = sub_asset(filename, &material_name(&material));
            library.set_material(key.clone(), build_material(filename, &material, options));
            material_keys.push(Some(key));
        }

        let mut symbol = Scene::new();
        if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
            let root = symbol.root();
            for node in scene.nodes() {
                build_node(
                    filename,
                    &node,
                    root,
                    &mut symbol,
                    &geometry_keys,
                    &material_keys,
                    options,
                    library,
                )?;
            }
        }
        library.set_symbol(filename, symbol);

        Ok(())
    }
}
