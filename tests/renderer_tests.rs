use std::cell::RefCell;
use std::rc::Rc;

use quadbatch::device::{DeviceOp, RecordingDevice, ShaderSources, TextureHandle};
use quadbatch::error::Error;
use quadbatch::geometry::SOLID_TEXTURE;
use quadbatch::utils::{Position, Vertex};
use quadbatch::Renderer;

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

#[test]
fn construction_compiles_and_registers_the_solid_pixel() {
    let (renderer, log) = test_renderer();

    assert_eq!(renderer.textures().len(), 1);
    let entry = renderer.textures().get(SOLID_TEXTURE).unwrap();
    assert_eq!((entry.width, entry.height), (1, 1));

    let ops = log.borrow();
    assert_eq!(
        *ops,
        vec![
            DeviceOp::CompileProgram,
            DeviceOp::CreateTexture {
                width: 1,
                height: 1
            },
        ]
    );
}

#[test]
fn use_texture_on_unknown_name_performs_no_device_call() {
    let (mut renderer, log) = test_renderer();
    let ops_before = log.borrow().len();

    let err = renderer.use_texture("never-loaded").unwrap_err();
    assert!(matches!(err, Error::UnknownTexture { name } if name == "never-loaded"));

    let ops = log.borrow();
    assert_eq!(ops.len(), ops_before);
    assert!(!ops
        .iter()
        .any(|op| matches!(op, DeviceOp::BindTexture(_))));
}

#[test]
fn flush_on_empty_buffer_is_a_no_op() {
    let (mut renderer, log) = test_renderer();
    let ops_before = log.borrow().len();

    assert_eq!(renderer.flush().unwrap(), 0);
    assert_eq!(log.borrow().len(), ops_before);
}

#[test]
fn flush_uploads_then_draws_and_auto_clears() {
    let (mut renderer, log) = test_renderer();
    renderer.draw_quad(0.0, 0.0, 2.0, 2.0).unwrap();
    assert_eq!(renderer.buffer_data().len(), 6 * Vertex::COMPONENTS);

    assert_eq!(renderer.flush().unwrap(), 6);
    assert!(renderer.buffer_data().is_empty());

    let ops = log.borrow();
    let tail = &ops[ops.len() - 2..];
    assert!(matches!(&tail[0], DeviceOp::UploadVertices(data) if data.len() == 42));
    assert!(matches!(tail[1], DeviceOp::Draw { vertex_count: 6 }));
}

#[test]
fn quad_uv_corners_pair_with_position_corners() {
    let (mut renderer, log) = test_renderer();

    let uv = [
        Position::new(0.1, 0.2),
        Position::new(0.3, 0.2),
        Position::new(0.3, 0.4),
        Position::new(0.1, 0.4),
    ];
    renderer.draw_quad_uv(0.0, 0.0, 10.0, 20.0, uv).unwrap();
    renderer.use_texture(SOLID_TEXTURE).unwrap();
    renderer.flush().unwrap();

    let ops = log.borrow();
    let data = ops
        .iter()
        .find_map(|op| match op {
            DeviceOp::UploadVertices(data) => Some(data.clone()),
            _ => None,
        })
        .unwrap();

    let corners = [
        Position::new(-5.0, 10.0),
        Position::new(5.0, 10.0),
        Position::new(5.0, -10.0),
        Position::new(-5.0, -10.0),
    ];
    // Two triangles in fixed winding; UV corner i rides with position
    // corner i on every vertex.
    let winding = [0usize, 1, 2, 0, 2, 3];
    for (slot, &corner) in winding.iter().enumerate() {
        let record = &data[slot * 7..(slot + 1) * 7];
        assert_eq!(record[0], corners[corner].x);
        assert_eq!(record[1], corners[corner].y);
        assert_eq!(&record[2..5], &[1.0, 1.0, 1.0]);
        assert_eq!(record[5], uv[corner].x);
        assert_eq!(record[6], uv[corner].y);
    }
}

#[test]
fn quad_too_large_for_the_buffer_is_rejected_whole() {
    let device = RecordingDevice::new();
    let shaders = ShaderSources {
        vertex: "",
        fragment: "",
    };
    // One component short of a full quad.
    let mut renderer =
        Renderer::with_buffer_capacity(Box::new(device), &shaders, 41).unwrap();

    let err = renderer.draw_quad(0.0, 0.0, 1.0, 1.0).unwrap_err();
    assert!(matches!(err, Error::BufferOverflow { .. }));
    assert!(renderer.buffer_data().is_empty());
}

#[test]
fn load_textures_is_all_or_nothing() {
    use quadbatch::texture::TextureSource;

    let (mut renderer, _log) = test_renderer();
    let sources = [
        TextureSource::new("missing", "no/such/file.png"),
        TextureSource::new("also-missing", "still/no/file.png"),
    ];

    let mut completed = false;
    let err = renderer
        .load_textures(&sources, |_| completed = true)
        .unwrap_err();

    assert!(matches!(err, Error::TextureLoad { name, .. } if name == "missing"));
    assert!(!completed, "callback must not run on failure");
    // Registry untouched apart from the built-in pixel.
    assert_eq!(renderer.textures().len(), 1);
}

#[test]
fn re_registering_a_name_is_last_write_wins() {
    let (mut renderer, _log) = test_renderer();
    renderer
        .create_texture_from_pixels("sprite", 2, 2, &[0u8; 16])
        .unwrap();
    let first = renderer.textures().get("sprite").unwrap().handle;

    renderer
        .create_texture_from_pixels("sprite", 4, 4, &[0u8; 64])
        .unwrap();
    let entry = renderer.textures().get("sprite").unwrap();

    assert_ne!(entry.handle, first);
    assert_eq!((entry.width, entry.height), (4, 4));
    assert_eq!(renderer.textures().len(), 2);
}

#[test]
fn attribute_and_uniform_bindings_are_recorded_and_forwarded() {
    let (mut renderer, log) = test_renderer();
    renderer
        .add_attribute("a_position", 2, Vertex::POSITION_OFFSET, Vertex::STRIDE)
        .unwrap();
    renderer.add_uniform("u_resolution", &[800.0, 600.0]).unwrap();

    assert_eq!(renderer.attributes().len(), 1);
    assert_eq!(renderer.uniforms().len(), 1);

    let ops = log.borrow();
    assert!(ops.iter().any(
        |op| matches!(op, DeviceOp::RegisterAttribute { name } if name == "a_position")
    ));
    assert!(ops.iter().any(|op| matches!(
        op,
        DeviceOp::SetUniform { name, values } if name == "u_resolution" && values == &[800.0, 600.0]
    )));
}

#[test]
fn resize_reaches_the_device_viewport() {
    let (mut renderer, log) = test_renderer();
    renderer.resize(1024, 768).unwrap();
    assert!(log.borrow().iter().any(|op| matches!(
        op,
        DeviceOp::SetViewport {
            width: 1024,
            height: 768
        }
    )));
}

#[test]
fn use_texture_binds_the_registered_handle() {
    let (mut renderer, log) = test_renderer();
    renderer.use_texture(SOLID_TEXTURE).unwrap();
    assert!(log
        .borrow()
        .iter()
        .any(|op| matches!(op, DeviceOp::BindTexture(TextureHandle(0)))));
}
