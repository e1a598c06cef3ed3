use anyhow::Context;
use instant::{Duration, Instant};
use overlay_graph::{
    Deg, NodeKind, Optics, OpticsUpdate, Point3, Quaternion, Rotation3, SceneConfig, SceneGraph,
    TransformUpdate, Vector4,
};

const FRAMES: u32 = 90;
const FRAME_TIME: f32 = 1.0 / 30.0;
const SPEED_MPS: f32 = 8.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // phone held in landscape on the dashboard
    let optics = Optics::new(Deg(60.0), 16.0 / 9.0, 0.1, 100.0).context("device intrinsics")?;
    let config = SceneConfig::new()
        .with_optics(optics)
        .with_camera_position([0.0, 1.3, 0.0]);
    let mut graph = SceneGraph::new(config);
    let root = graph.root();

    let grid = graph.spawn(NodeKind::Grid, "ground grid", root);
    graph.set_scale(grid, [40.0, 1.0, 40.0]);

    let lane = graph.spawn(NodeKind::Lane, "guidance lane", root);
    graph.set_route(
        lane,
        (0..=20).map(|i| {
            let z = -(i as f32) * 2.5;
            // gentle curve to the right
            Point3::new(0.002 * z * z, 0.0, z)
        }),
    );

    let frustum = graph.spawn(NodeKind::Generic, "frustum gizmo", graph.camera());
    graph.set_visible(frustum, false);

    let lane_start = graph
        .node(lane)
        .route()
        .get(4)
        .copied()
        .context("route is too short")?;

    let mut total = Duration::ZERO;
    for frame_idx in 0..FRAMES {
        let t = frame_idx as f32 * FRAME_TIME;
        let heading = Quaternion::from_angle_y(Deg(-2.0 * t));
        graph.set_local_transform(
            graph.camera(),
            TransformUpdate::new()
                .with_position([0.0, 1.3, -SPEED_MPS * t])
                .with_rotation(heading),
        );
        if frame_idx == FRAMES / 2 {
            // the device rotated to portrait
            graph
                .try_set_optics(OpticsUpdate::new().with_viewport(1080, 1920))
                .context("rotating viewport")?;
        }

        let start = Instant::now();
        let frame = graph.render_frame();
        total += start.elapsed();

        let world = frame.world(lane).context("lane missing from frame")?;
        let clip = frame.view_projection() * world * Vector4::new(lane_start.x, lane_start.y, lane_start.z, 1.0);
        if clip.w > 0.0 {
            log::info!(
                "frame {frame_idx:>3}: lane marker at ndc ({:+.3}, {:+.3}), {} nodes",
                clip.x / clip.w,
                clip.y / clip.w,
                frame.len()
            );
        } else {
            log::info!("frame {frame_idx:>3}: lane marker behind the camera");
        }
    }

    log::info!(
        "{FRAMES} frames, {:?} average render_frame time, {:?}",
        total / FRAMES,
        graph
    );
    Ok(())
}
