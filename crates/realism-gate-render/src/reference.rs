// realism-gate-render/src/reference.rs
// ============================================================================
// Module: Reference Renderer
// Description: A deterministic, procedural CPU rasterizer producing
//              beauty, clay, and optional mask/depth/normal passes.
// Purpose: Guarantee byte-identical PNGs for identical asset/GateConfig
//          inputs on a matched environment.
// Dependencies: image, rand, realism_gate_core, crate::{normalize, rig}
// ============================================================================

//! The deterministic CPU-only reference renderer (§4.2, §10): a procedural
//! rasterizer, not a path tracer. It never reads a wall clock and derives
//! every pixel from the asset's normalized geometry plus the configured
//! seed, so two runs of the same asset under the same `GateConfig` produce
//! byte-identical PNGs.

use std::io::Cursor;

use image::ImageFormat;
use image::Rgb;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use realism_gate_core::ArtifactStore;
use realism_gate_core::AuxiliaryPass;
use realism_gate_core::CameraMetadata;
use realism_gate_core::GateConfig;
use realism_gate_core::PortableMesh;
use realism_gate_core::RenderMode;
use realism_gate_core::View;

use crate::normalize::normalize_mesh;
use crate::rig::CameraRig;
use crate::RenderError;
use crate::RenderSet;

/// A deterministic, CPU-only stand-in for a path-traced renderer. Produces
/// real PNG bytes from an asset's normalized bounding-box silhouette and
/// material facts, not from a physically based light transport simulation.
pub struct ReferenceRenderer {
    /// The camera rig every render job places.
    rig: CameraRig,
}

impl ReferenceRenderer {
    /// Creates a renderer that places `turntable_frame_count` turntable
    /// frames around the six fixed viewpoints.
    #[must_use]
    pub const fn new(turntable_frame_count: u32) -> Self {
        Self {
            rig: CameraRig::new(turntable_frame_count),
        }
    }
}

impl crate::Renderer for ReferenceRenderer {
    fn render(
        &self,
        store: &dyn ArtifactStore,
        mut mesh: PortableMesh,
        config: &GateConfig,
    ) -> Result<RenderSet, RenderError> {
        let frame = normalize_mesh(&mut mesh)?;
        let extents = mesh.bounding_box_extents().map_err(|err| RenderError::MeshInvalid(err.to_string()))?;
        let detail = DetailProfile::from_mesh(&mesh);

        let mut views = Vec::new();
        for (view_id, camera) in self.rig.views() {
            for mode in [RenderMode::Beauty, RenderMode::Clay] {
                let image = rasterize(&extents, &camera, mode, config, &detail, view_id.as_str());
                let path = format!(
                    "render/{}/{}_{}.png",
                    mode.path_segment(),
                    mode.path_segment(),
                    view_id.as_str()
                );
                write_png(store, &path, &image).map_err(|reason| RenderError::RenderCrash {
                    view_id: view_id.as_str().to_string(),
                    reason,
                })?;
                views.push(View {
                    view_id: view_id.clone(),
                    mode,
                    image_path: path,
                    camera,
                });
            }

            for pass in &config.render.required_passes {
                let image = rasterize_aux(*pass, &extents, &camera, config);
                let path = format!(
                    "render/passes/{}/{}_{}.png",
                    pass.path_segment(),
                    pass.path_segment(),
                    view_id.as_str()
                );
                write_png(store, &path, &image).map_err(|reason| RenderError::RenderCrash {
                    view_id: view_id.as_str().to_string(),
                    reason,
                })?;
            }
        }

        Ok(RenderSet {
            views,
            normalized_frame: frame,
        })
    }
}

/// Material facts that drive per-pixel shading, derived once from the
/// normalized mesh rather than recomputed per view.
struct DetailProfile {
    /// `log10`-scaled triangle density in `[0.1, 1.0]`; drives fine-detail
    /// noise amplitude and, indirectly, image entropy.
    detail_amplitude: f64,
    /// Fraction of silhouette pixels a view should render as the
    /// default-magenta "missing texture" color in the beauty pass.
    magenta_fraction: f64,
    /// Stable hash of the mesh's texture references, used to pick a
    /// deterministic base paint color.
    paint_seed: u64,
}

impl DetailProfile {
    fn from_mesh(mesh: &PortableMesh) -> Self {
        #[allow(clippy::cast_precision_loss, reason = "triangle counts are far below f64's exact range")]
        let triangle_count = mesh.triangle_count() as f64;
        let detail_amplitude = (triangle_count.max(1.0).log10() / 6.0).clamp(0.1, 1.0);
        #[allow(clippy::cast_precision_loss, reason = "ref count is tiny")]
        let magenta_fraction = (mesh.dangling_texture_refs.len() as f64 * 0.08).min(0.4);
        let paint_seed = fnv1a(mesh.texture_refs.join("|").as_bytes());
        Self {
            detail_amplitude,
            magenta_fraction,
            paint_seed,
        }
    }
}

/// FNV-1a over arbitrary bytes, used only to derive deterministic seeds
/// from stable strings (view ids, texture ref lists); not a cryptographic
/// hash.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Derives the per-view RNG seed from the config seed and a stable view
/// discriminator, so every pixel stream is reproducible and independent
/// across views.
fn view_seed(config_seed: u64, view_id: &str, discriminator: &str) -> u64 {
    config_seed ^ fnv1a(view_id.as_bytes()) ^ fnv1a(discriminator.as_bytes()).rotate_left(17)
}

/// The silhouette ellipse's semi-axes in normalized image coordinates
/// (`[-1, 1]` on both axes), derived from the asset's bounding-box extents
/// and the camera's azimuth/elevation/focal length/distance.
fn silhouette_semi_axes(extents: &[f64; 3], camera: &CameraMetadata) -> (f64, f64) {
    let azimuth = camera.azimuth_deg.to_radians();
    let elevation = camera.elevation_deg.to_radians();
    let diagonal = (extents[0].powi(2) + extents[1].powi(2) + extents[2].powi(2)).sqrt().max(1e-6);

    let apparent_width = extents[0] * azimuth.sin().abs() + extents[1] * azimuth.cos().abs();
    let apparent_height = extents[2] * elevation.cos().abs() + apparent_width * elevation.sin().abs() * 0.3;

    let zoom = (camera.focal_length_mm / 50.0) / camera.distance_diagonals.max(0.1);
    let a = (apparent_width / diagonal * zoom * 0.6).clamp(0.05, 0.92);
    let b = (apparent_height / diagonal * zoom * 0.6).clamp(0.05, 0.92);
    (a, b)
}

/// Rasterizes one beauty or clay pass.
fn rasterize(
    extents: &[f64; 3],
    camera: &CameraMetadata,
    mode: RenderMode,
    config: &GateConfig,
    detail: &DetailProfile,
    view_id: &str,
) -> RgbImage {
    let [width, height] = config.render.resolution;
    let (a, b) = silhouette_semi_axes(extents, camera);
    let mode_tag = match mode {
        RenderMode::Beauty => "beauty",
        RenderMode::Clay => "clay",
    };
    let seed = view_seed(config.render.seed, view_id, mode_tag);
    let mut rng = StdRng::seed_from_u64(seed);
    let noise_scale = (1.0 / f64::from(config.render.sample_count).sqrt()).clamp(0.0, 0.2);

    let paint = paint_color(detail.paint_seed, mode);
    let mut image = RgbImage::new(width.max(1), height.max(1));

    for y in 0..image.height() {
        for x in 0..image.width() {
            let nx = 2.0 * (f64::from(x) + 0.5) / f64::from(image.width()) - 1.0;
            let ny = 2.0 * (f64::from(y) + 0.5) / f64::from(image.height()) - 1.0;
            let inside = (nx / a).powi(2) + (ny / b).powi(2) <= 1.0;
            let pixel = if inside {
                object_pixel(nx, ny, a, b, paint, mode, detail, noise_scale, &mut rng)
            } else {
                background_pixel(ny, mode, noise_scale, &mut rng)
            };
            image.put_pixel(x, y, pixel);
        }
    }
    image
}

/// Rasterizes one auxiliary pass (mask, depth, or normal).
fn rasterize_aux(pass: AuxiliaryPass, extents: &[f64; 3], camera: &CameraMetadata, config: &GateConfig) -> RgbImage {
    let [width, height] = config.render.resolution;
    let (a, b) = silhouette_semi_axes(extents, camera);
    let mut image = RgbImage::new(width.max(1), height.max(1));

    for y in 0..image.height() {
        for x in 0..image.width() {
            let nx = 2.0 * (f64::from(x) + 0.5) / f64::from(image.width()) - 1.0;
            let ny = 2.0 * (f64::from(y) + 0.5) / f64::from(image.height()) - 1.0;
            let radius_sq = (nx / a).powi(2) + (ny / b).powi(2);
            let inside = radius_sq <= 1.0;
            let pixel = match pass {
                AuxiliaryPass::Mask => {
                    if inside {
                        Rgb([255, 255, 255])
                    } else {
                        Rgb([0, 0, 0])
                    }
                }
                AuxiliaryPass::Depth => {
                    if inside {
                        let depth = (1.0 - radius_sq.sqrt() * 0.4).clamp(0.0, 1.0);
                        #[allow(clippy::cast_possible_truncation, reason = "depth is clamped to [0, 1] before scaling")]
                        let value = (depth * 255.0).round() as u8;
                        Rgb([value, value, value])
                    } else {
                        Rgb([255, 255, 255])
                    }
                }
                AuxiliaryPass::Normal => {
                    if inside {
                        let nz = (1.0 - radius_sq).max(0.0).sqrt();
                        Rgb(pack_normal(nx / a, ny / b, nz))
                    } else {
                        Rgb([127, 127, 255])
                    }
                }
            };
            image.put_pixel(x, y, pixel);
        }
    }
    image
}

/// Packs a unit normal vector's components into an 8-bit RGB tuple using
/// the common `[-1, 1] -> [0, 255]` convention.
fn pack_normal(x: f64, y: f64, z: f64) -> [u8; 3] {
    #[allow(clippy::cast_possible_truncation, reason = "component is clamped to [-1, 1] before scaling")]
    let pack = |component: f64| (((component.clamp(-1.0, 1.0) + 1.0) * 0.5 * 255.0).round()) as u8;
    [pack(x), pack(y), pack(z)]
}

/// Picks a deterministic base paint color for the beauty pass; clay always
/// uses a fixed neutral diffuse gray regardless of the asset (§4.2: "all
/// materials overridden by a single neutral diffuse material").
fn paint_color(paint_seed: u64, mode: RenderMode) -> [u8; 3] {
    match mode {
        RenderMode::Clay => [182, 182, 182],
        RenderMode::Beauty => {
            let mut rng = StdRng::seed_from_u64(paint_seed ^ 0x5a5a_5a5a_5a5a_5a5a);
            [rng.gen_range(40..220), rng.gen_range(40..220), rng.gen_range(40..220)]
        }
    }
}

/// Shades one silhouette pixel: radial falloff simulating curvature, fine
/// per-pixel dither scaled by sample count, and (beauty pass only) a
/// deterministic missing-texture magenta patch proportional to the mesh's
/// dangling texture reference count.
fn object_pixel(
    nx: f64,
    ny: f64,
    a: f64,
    b: f64,
    paint: [u8; 3],
    mode: RenderMode,
    detail: &DetailProfile,
    noise_scale: f64,
    rng: &mut StdRng,
) -> Rgb<u8> {
    if mode == RenderMode::Beauty && detail.magenta_fraction > 0.0 && rng.gen_range(0.0..1.0) < detail.magenta_fraction
    {
        return Rgb([230, 20, 220]);
    }

    let radius = ((nx / a).powi(2) + (ny / b).powi(2)).sqrt().min(1.0);
    let shade = (1.0 - radius * 0.6).clamp(0.25, 1.0);
    let detail_noise = rng.gen_range(-1.0..1.0) * detail.detail_amplitude * 0.12;
    let dither = rng.gen_range(-1.0..1.0) * noise_scale;
    let factor = (shade + detail_noise + dither).clamp(0.0, 1.2);

    #[allow(clippy::cast_possible_truncation, reason = "result is clamped to [0, 255] before casting")]
    let channel = |base: u8| (f64::from(base) * factor).clamp(0.0, 255.0).round() as u8;
    Rgb([channel(paint[0]), channel(paint[1]), channel(paint[2])])
}

/// Shades one background pixel: a simple sky gradient for the beauty pass,
/// a flat studio backdrop for clay.
fn background_pixel(ny: f64, mode: RenderMode, noise_scale: f64, rng: &mut StdRng) -> Rgb<u8> {
    let dither = rng.gen_range(-1.0..1.0) * noise_scale * 0.5;
    match mode {
        RenderMode::Beauty => {
            let horizon = ((1.0 - ny) * 0.5 + dither).clamp(0.0, 1.0);
            let top = [210.0, 228.0, 245.0];
            let bottom = [245.0, 246.0, 248.0];
            #[allow(clippy::cast_possible_truncation, reason = "result is clamped to [0, 255] before casting")]
            let lerp = |t: f64, a: f64, c: f64| (a + (c - a) * t).clamp(0.0, 255.0).round() as u8;
            Rgb([
                lerp(horizon, top[0], bottom[0]),
                lerp(horizon, top[1], bottom[1]),
                lerp(horizon, top[2], bottom[2]),
            ])
        }
        RenderMode::Clay => {
            #[allow(clippy::cast_possible_truncation, reason = "result is clamped to [0, 255] before casting")]
            let value = (200.0 + dither * 20.0).clamp(0.0, 255.0).round() as u8;
            Rgb([value, value, value])
        }
    }
}

/// Encodes `image` as PNG bytes and writes it into the artifact store.
fn write_png(store: &dyn ArtifactStore, path: &str, image: &RgbImage) -> Result<(), String> {
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|err| format!("png encode failed: {err}"))?;
    store.write(path, bytes.get_ref()).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use realism_gate_core::fixtures::sample_gate_config;
    use realism_gate_core::IterationLineage;
    use realism_gate_core::RunId;
    use realism_gate_store::FilesystemArtifactStore;
    use tempfile::tempdir;

    use super::ReferenceRenderer;
    use crate::Renderer;

    fn no_lineage() -> IterationLineage {
        IterationLineage {
            parent_run_id: None,
            iteration_index: 0,
        }
    }

    fn textured_cube() -> realism_gate_core::PortableMesh {
        let vertices = vec![
            [-2.0, -1.0, 0.0],
            [2.0, -1.0, 0.0],
            [2.0, 1.0, 0.0],
            [-2.0, 1.0, 0.0],
            [-2.0, -1.0, 1.5],
            [2.0, -1.0, 1.5],
            [2.0, 1.0, 1.5],
            [-2.0, 1.0, 1.5],
        ];
        realism_gate_core::PortableMesh {
            schema_version: "1.0".into(),
            vertices,
            triangles: vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]],
            has_uvs: true,
            texture_refs: vec!["body_paint.png".into()],
            dangling_texture_refs: Vec::new(),
        }
    }

    #[test]
    fn rendering_the_same_asset_twice_is_byte_identical() {
        let config = sample_gate_config();
        let renderer = ReferenceRenderer::new(2);
        let dir_a = tempdir().expect("tempdir a");
        let dir_b = tempdir().expect("tempdir b");
        let store_a =
            FilesystemArtifactStore::create(dir_a.path().join("run"), RunId::new("run-a"), no_lineage(), Vec::new())
                .expect("store a");
        let store_b =
            FilesystemArtifactStore::create(dir_b.path().join("run"), RunId::new("run-b"), no_lineage(), Vec::new())
                .expect("store b");

        let set_a = renderer.render(&store_a, textured_cube(), &config).expect("render a");
        let set_b = renderer.render(&store_b, textured_cube(), &config).expect("render b");
        assert_eq!(set_a.views.len(), set_b.views.len());

        for view in &set_a.views {
            let bytes_a = store_a.read(&view.image_path).expect("read a");
            let bytes_b = store_b.read(&view.image_path).expect("read b");
            assert_eq!(bytes_a, bytes_b, "path {} diverged", view.image_path);
        }
    }

    #[test]
    fn fixed_viewpoints_and_turntable_frames_both_render_beauty_and_clay() {
        let config = sample_gate_config();
        let renderer = ReferenceRenderer::new(3);
        let dir = tempdir().expect("tempdir");
        let store = FilesystemArtifactStore::create(dir.path().join("run"), RunId::new("run-x"), no_lineage(), Vec::new())
            .expect("store");
        let set = renderer.render(&store, textured_cube(), &config).expect("render");
        assert_eq!(set.views.len(), (6 + 3) * 2);
    }
}
