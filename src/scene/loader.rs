//! Asset loading: OBJ mesh and texture image.
//!
//! Loading runs on a background thread. [`PendingLoad`] is the UI-side
//! handle: it reports the outcome exactly once through [`PendingLoad::poll`]
//! and, once dropped or cancelled, guarantees the outcome is never delivered.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use super::{Geometry, GroupNode, Material, MeshNode, SceneNode};
use crate::config::AssetPaths;
use crate::error::{ViewerError, ViewerResult};

// ─────────────────────────────────────────────────────────────────────────────
// OBJ
// ─────────────────────────────────────────────────────────────────────────────

fn obj_load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Parse OBJ text into a group with one mesh node per OBJ object.
///
/// `origin` names the source in errors and becomes the group name.
pub fn parse_obj<R: BufRead>(reader: &mut R, origin: &Path) -> ViewerResult<SceneNode> {
    // Materials come from the configured texture, .mtl files are ignored.
    let (models, _materials) =
        tobj::load_obj_buf(reader, &obj_load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| ViewerError::ObjParse {
            path: origin.to_path_buf(),
            details: e.to_string(),
        })?;

    let mut children = Vec::with_capacity(models.len());
    for model in models {
        let obj_mesh = model.mesh;
        let positions: Vec<Vec3> = obj_mesh
            .positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        // OBJ puts v=0 at the bottom of the image, egui at the top.
        let uvs: Vec<Vec2> = obj_mesh
            .texcoords
            .chunks_exact(2)
            .map(|c| Vec2::new(c[0], 1.0 - c[1]))
            .collect();
        let uvs = if uvs.len() == positions.len() {
            uvs
        } else {
            Vec::new()
        };

        let vertex_count = positions.len();
        if let Some(bad) = obj_mesh
            .indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(ViewerError::ObjParse {
                path: origin.to_path_buf(),
                details: format!(
                    "object '{}' references vertex {} but has {} vertices",
                    model.name, bad, vertex_count
                ),
            });
        }

        debug!(
            "OBJ model '{}': {} vertices, {} triangles",
            model.name,
            vertex_count,
            obj_mesh.indices.len() / 3
        );
        if obj_mesh.indices.len() < 3 {
            continue;
        }
        children.push(SceneNode::Mesh(MeshNode {
            name: model.name,
            transform: Mat4::IDENTITY,
            geometry: Geometry {
                positions,
                uvs,
                indices: obj_mesh.indices,
            },
            material: Material::default(),
        }));
    }

    if children.is_empty() {
        return Err(ViewerError::EmptyModel {
            details: format!("{} contains no triangles", origin.display()),
        });
    }

    let name = origin
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    Ok(SceneNode::Group(GroupNode {
        name,
        transform: Mat4::IDENTITY,
        children,
    }))
}

/// Load an OBJ file from disk.
pub fn load_obj(path: &Path) -> ViewerResult<SceneNode> {
    let file = File::open(path).map_err(|source| ViewerError::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(&mut BufReader::new(file), path)
}

// ─────────────────────────────────────────────────────────────────────────────
// Texture
// ─────────────────────────────────────────────────────────────────────────────

/// Decoded RGBA8 pixels, ready to upload to egui.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(self.size, &self.rgba)
    }
}

/// Decode a texture image from disk.
pub fn load_texture(path: &Path) -> ViewerResult<TextureImage> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => ViewerError::IoRead {
            path: path.to_path_buf(),
            source,
        },
        source => ViewerError::TextureDecode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(TextureImage {
        size,
        rgba: rgba.into_raw(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Background loading
// ─────────────────────────────────────────────────────────────────────────────

/// A successfully loaded mesh + texture pair.
#[derive(Debug, Clone)]
pub struct LoadedAssets {
    pub paths: AssetPaths,
    pub model: SceneNode,
    pub texture: TextureImage,
}

pub type LoadOutcome = ViewerResult<LoadedAssets>;

/// Load both assets synchronously. The texture is only read once the mesh
/// parsed.
pub fn load_assets(paths: &AssetPaths) -> LoadOutcome {
    let started = Instant::now();
    let model = load_obj(&paths.model)?;
    let texture = load_texture(&paths.texture).map_err(|e| match e {
        ViewerError::IoRead { path, source } => ViewerError::TextureDecode {
            path,
            source: image::ImageError::IoError(source),
        },
        other => other,
    })?;
    info!(
        model = %paths.model.display(),
        texture = %paths.texture.display(),
        mesh_nodes = model.drawable_count(),
        triangles = model.triangle_count(),
        texture_size = ?texture.size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Loaded assets"
    );
    Ok(LoadedAssets {
        paths: paths.clone(),
        model,
        texture,
    })
}

/// Handle to an in-flight background load.
pub struct PendingLoad {
    paths: AssetPaths,
    rx: Option<Receiver<LoadOutcome>>,
    alive: Arc<AtomicBool>,
}

impl PendingLoad {
    /// Start loading `paths` on a worker thread. `on_done` runs on the worker
    /// after a live result was sent (typically a repaint request).
    pub fn spawn<F>(paths: AssetPaths, on_done: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn_with(paths, load_assets, on_done)
    }

    /// Like [`spawn`](Self::spawn), with `load` doing the work on the worker
    /// instead of [`load_assets`].
    pub fn spawn_with<L, F>(paths: AssetPaths, load: L, on_done: F) -> Self
    where
        L: FnOnce(&AssetPaths) -> LoadOutcome + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);
        let worker_paths = paths.clone();

        let spawned = std::thread::Builder::new()
            .name("meshview-loader".into())
            .spawn(move || {
                let outcome = load(&worker_paths);
                if !worker_alive.load(Ordering::Acquire) {
                    debug!(model = %worker_paths.model.display(), "Discarding result of cancelled load");
                    return;
                }
                if tx.send(outcome).is_ok() {
                    on_done();
                }
            });
        if let Err(e) = spawned {
            // The receiver then reports a disconnected loader.
            warn!("Could not start loader thread: {e}");
        }

        Self {
            paths,
            rx: Some(rx),
            alive,
        }
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    pub fn is_live(&self) -> bool {
        self.rx.is_some() && self.alive.load(Ordering::Acquire)
    }

    /// Stop waiting; a result arriving later is dropped.
    pub fn cancel(&mut self) {
        self.alive.store(false, Ordering::Release);
        self.rx = None;
    }

    /// Non-blocking check. Yields the outcome at most once.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        if !self.alive.load(Ordering::Acquire) {
            return None;
        }
        let rx = self.rx.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ViewerError::LoaderDisconnected),
        };
        self.rx = None;
        Some(outcome)
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Duration;
    use tempfile::tempdir;

    const QUAD_OBJ: &str = "\
o quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    const TWO_OBJECTS: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";

    #[test]
    fn quad_is_triangulated_with_flipped_uvs() {
        let node = parse_obj(&mut Cursor::new(QUAD_OBJ), Path::new("quad.obj")).unwrap();
        assert_eq!(node.name(), "quad");
        assert_eq!(node.drawable_count(), 1);
        assert_eq!(node.triangle_count(), 2);
        node.visit_drawables(&mut |mesh, _| {
            assert_eq!(mesh.geometry.uvs.len(), mesh.geometry.positions.len());
            let bottom_left = mesh
                .geometry
                .positions
                .iter()
                .position(|p| *p == Vec3::new(-1.0, -1.0, 0.0))
                .unwrap();
            assert_eq!(mesh.geometry.uv(bottom_left), Vec2::new(0.0, 1.0));
        });
    }

    #[test]
    fn each_object_becomes_a_mesh_node() {
        let node = parse_obj(&mut Cursor::new(TWO_OBJECTS), Path::new("two.obj")).unwrap();
        assert!(!node.is_drawable());
        assert_eq!(node.drawable_count(), 2);
        let mut names = Vec::new();
        node.visit_drawables(&mut |mesh, _| names.push(mesh.name.clone()));
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn obj_without_faces_is_empty() {
        let err = parse_obj(&mut Cursor::new("v 0 0 0\nv 1 0 0\n"), Path::new("pts.obj"))
            .unwrap_err();
        assert!(matches!(err, ViewerError::EmptyModel { .. }));
    }

    #[test]
    fn missing_files_fail_with_user_messages() {
        let err = load_obj(Path::new("/nonexistent/model.obj")).unwrap_err();
        assert!(matches!(err, ViewerError::IoRead { .. }));
        assert_eq!(err.user_message(), "Failed to load OBJ file.");
    }

    fn write_assets(dir: &Path) -> AssetPaths {
        let model = dir.join("model.obj");
        std::fs::write(&model, QUAD_OBJ).unwrap();
        let texture = dir.join("texture.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 100, 50, 255]))
            .save(&texture)
            .unwrap();
        AssetPaths { model, texture }
    }

    fn wait(pending: &mut PendingLoad) -> Option<LoadOutcome> {
        for _ in 0..500 {
            if let Some(outcome) = pending.poll() {
                return Some(outcome);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn background_load_reports_once() {
        let dir = tempdir().unwrap();
        let paths = write_assets(dir.path());
        let mut pending = PendingLoad::spawn(paths.clone(), || {});

        let assets = wait(&mut pending).expect("load finished").unwrap();
        assert_eq!(assets.paths, paths);
        assert_eq!(assets.texture.size, [4, 2]);
        assert_eq!(assets.texture.rgba.len(), 4 * 2 * 4);
        assert!(pending.poll().is_none());
        assert!(!pending.is_live());
    }

    #[test]
    fn missing_texture_is_a_texture_error() {
        let dir = tempdir().unwrap();
        let mut paths = write_assets(dir.path());
        paths.texture = dir.path().join("missing.jpg");
        let err = load_assets(&paths).unwrap_err();
        assert!(err.is_texture_error());
    }

    /// Spawns a load whose worker blocks until the returned sender fires.
    /// The second receiver reports `on_done`: `Ok` if it ran, disconnected
    /// once the worker exited without running it.
    fn gated_load(paths: AssetPaths) -> (PendingLoad, mpsc::Sender<()>, Receiver<()>) {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();
        let pending = PendingLoad::spawn_with(
            paths,
            move |paths| {
                let _ = release_rx.recv();
                load_assets(paths)
            },
            move || {
                let _ = done_tx.send(());
            },
        );
        (pending, release_tx, done_rx)
    }

    #[test]
    fn cancelled_load_never_delivers() {
        let dir = tempdir().unwrap();
        let (mut pending, release, done) = gated_load(write_assets(dir.path()));
        assert!(pending.is_live());

        pending.cancel();
        release.send(()).unwrap();
        assert_eq!(
            done.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
        assert!(pending.poll().is_none());
        assert!(!pending.is_live());
    }

    #[test]
    fn dropped_handle_never_runs_on_done() {
        let dir = tempdir().unwrap();
        let (pending, release, done) = gated_load(write_assets(dir.path()));
        drop(pending);
        release.send(()).unwrap();
        assert_eq!(
            done.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn live_gated_load_runs_on_done_and_delivers() {
        let dir = tempdir().unwrap();
        let paths = write_assets(dir.path());
        let (mut pending, release, done) = gated_load(paths.clone());
        assert!(pending.poll().is_none());

        release.send(()).unwrap();
        assert_eq!(done.recv_timeout(Duration::from_secs(5)), Ok(()));
        let assets = wait(&mut pending).expect("load finished").unwrap();
        assert_eq!(assets.paths, paths);
    }
}
