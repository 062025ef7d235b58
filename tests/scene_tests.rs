use std::cell::RefCell;
use std::rc::Rc;

use quadbatch::device::{DeviceOp, RecordingDevice, ShaderSources, TextureHandle};
use quadbatch::error::Error;
use quadbatch::geometry::{Rectangle, TexturedRectangle};
use quadbatch::{Renderer, Scene};

fn test_renderer() -> (Renderer, Rc<RefCell<Vec<DeviceOp>>>) {
    let device = RecordingDevice::new();
    let log = device.log();
    let shaders = ShaderSources {
        vertex: "// vertex stage",
        fragment: "// fragment stage",
    };
    let renderer = Renderer::new(Box::new(device), &shaders).unwrap();
    (renderer, log)
}

fn draws(ops: &[DeviceOp]) -> Vec<u32> {
    ops.iter()
        .filter_map(|op| match op {
            DeviceOp::Draw { vertex_count } => Some(*vertex_count),
            _ => None,
        })
        .collect()
}

#[test]
fn different_textures_land_in_different_groups() {
    let (mut renderer, log) = test_renderer();
    renderer
        .create_texture_from_pixels("world", 2, 2, &[0u8; 16])
        .unwrap();

    let mut scene = Scene::new();
    scene.add(Rectangle::new(0.0, 0.0, 10.0, 10.0));
    scene.add(TexturedRectangle::new(5.0, 5.0, 10.0, 10.0, "world"));
    assert_eq!(scene.group_count(), 2);

    scene.render(&mut renderer).unwrap();

    // One draw call per group, each covering one quad (6 vertices).
    assert_eq!(draws(&log.borrow()), vec![6, 6]);
}

#[test]
fn shared_texture_collapses_into_one_batch() {
    let (mut renderer, log) = test_renderer();

    let mut scene = Scene::new();
    let n = 5;
    for i in 0..n {
        scene.add(Rectangle::new(i as f32 * 10.0, 0.0, 8.0, 8.0));
    }
    assert_eq!(scene.group_count(), 1);
    assert_eq!(scene.len(), n);

    scene.render(&mut renderer).unwrap();

    let ops = log.borrow();
    assert_eq!(draws(&ops), vec![(n * 6) as u32]);

    let upload = ops
        .iter()
        .find_map(|op| match op {
            DeviceOp::UploadVertices(data) => Some(data.len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(upload, n * 6 * 7);
}

#[test]
fn groups_draw_in_insertion_order() {
    let (mut renderer, log) = test_renderer();
    renderer
        .create_texture_from_pixels("world", 2, 2, &[0u8; 16])
        .unwrap();

    let mut scene = Scene::new();
    // Textured group first, solid fill second.
    scene.add(TexturedRectangle::new(0.0, 0.0, 4.0, 4.0, "world"));
    scene.add(Rectangle::new(9.0, 9.0, 4.0, 4.0));

    scene.render(&mut renderer).unwrap();

    let binds: Vec<TextureHandle> = log
        .borrow()
        .iter()
        .filter_map(|op| match op {
            DeviceOp::BindTexture(handle) => Some(*handle),
            _ => None,
        })
        .collect();
    // "world" was registered after the built-in pixel, so it holds handle 1
    // and must still be drawn first.
    assert_eq!(binds, vec![TextureHandle(1), TextureHandle(0)]);
}

#[test]
fn each_group_flushes_exactly_once() {
    let (mut renderer, log) = test_renderer();
    renderer
        .create_texture_from_pixels("world", 2, 2, &[0u8; 16])
        .unwrap();

    let mut scene = Scene::new();
    scene.add(Rectangle::new(0.0, 0.0, 2.0, 2.0));
    scene.add(Rectangle::new(4.0, 0.0, 2.0, 2.0));
    scene.add(TexturedRectangle::new(0.0, 4.0, 2.0, 2.0, "world"));
    scene.add(TexturedRectangle::new(4.0, 4.0, 2.0, 2.0, "world"));

    scene.render(&mut renderer).unwrap();

    let ops = log.borrow();
    let bind_count = ops
        .iter()
        .filter(|op| matches!(op, DeviceOp::BindTexture(_)))
        .count();
    assert_eq!(bind_count, 2);
    assert_eq!(draws(&ops), vec![12, 12]);
}

#[test]
fn unregistered_batching_key_fails_without_binding() {
    let (mut renderer, log) = test_renderer();

    let mut scene = Scene::new();
    scene.add(TexturedRectangle::new(0.0, 0.0, 2.0, 2.0, "ghost"));

    let err = scene.render(&mut renderer).unwrap_err();
    assert!(matches!(err, Error::UnknownTexture { name } if name == "ghost"));
    assert!(!log
        .borrow()
        .iter()
        .any(|op| matches!(op, DeviceOp::BindTexture(_))));
}

#[test]
fn rendering_an_empty_scene_touches_nothing() {
    let (mut renderer, log) = test_renderer();
    let ops_before = log.borrow().len();

    let scene = Scene::new();
    assert!(scene.is_empty());
    scene.render(&mut renderer).unwrap();

    assert_eq!(log.borrow().len(), ops_before);
}

#[test]
fn serialized_vertices_carry_opaque_white() {
    let (mut renderer, log) = test_renderer();

    let mut scene = Scene::new();
    scene.add(Rectangle::new(0.0, 0.0, 2.0, 2.0));
    scene.render(&mut renderer).unwrap();

    let ops = log.borrow();
    let data = ops
        .iter()
        .find_map(|op| match op {
            DeviceOp::UploadVertices(data) => Some(data.clone()),
            _ => None,
        })
        .unwrap();

    for vertex in data.chunks_exact(7) {
        assert_eq!(&vertex[2..5], &[1.0, 1.0, 1.0]);
    }
}
