use overlay_graph::{Matrix4, SceneGraph, Vector3};

/// Route `log` output through the test harness; safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

pub fn assert_matrix_near(actual: Matrix4<f32>, expected: Matrix4<f32>) {
    let a: [[f32; 4]; 4] = actual.into();
    let e: [[f32; 4]; 4] = expected.into();
    for c in 0..4 {
        for r in 0..4 {
            assert!(
                (a[c][r] - e[c][r]).abs() < 1e-4,
                "matrix mismatch at column {c}, row {r}:\nactual   {actual:?}\nexpected {expected:?}"
            );
        }
    }
}

pub fn assert_vector_near(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual.x - expected.x).abs() < 1e-4
            && (actual.y - expected.y).abs() < 1e-4
            && (actual.z - expected.z).abs() < 1e-4,
        "vector mismatch: actual {actual:?}, expected {expected:?}"
    );
}

pub fn translation_of(graph: &SceneGraph, id: overlay_graph::NodeId) -> Vector3<f32> {
    graph.world_transform(id).w.truncate()
}
