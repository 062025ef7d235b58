//! Headless demo: batches a small scene against the recording device and
//! prints the resulting device-call stream. Runs anywhere, no GPU needed.

use anyhow::Result;
use quadbatch::device::ShaderSources;
use quadbatch::geometry::{Rectangle, TexturedRectangle};
use quadbatch::{RecordingDevice, Renderer, Scene};

fn main() -> Result<()> {
    env_logger::init();

    let device = RecordingDevice::new();
    let log = device.log();

    let mut renderer = Renderer::new(
        Box::new(device),
        &ShaderSources {
            vertex: quadbatch::app::VERTEX_SHADER,
            fragment: quadbatch::app::FRAGMENT_SHADER,
        },
    )?;
    renderer.create_texture_from_pixels("noise", 2, 2, &[0u8, 0, 0, 255].repeat(4))?;

    let mut scene = Scene::new();
    scene.add(Rectangle::new(0.0, 0.0, 10.0, 10.0));
    scene.add(Rectangle::new(20.0, 0.0, 10.0, 10.0));
    scene.add(TexturedRectangle::new(0.0, 20.0, 8.0, 8.0, "noise"));
    scene.render(&mut renderer)?;

    println!(
        "{} geometries in {} groups produced:",
        scene.len(),
        scene.group_count()
    );
    for op in log.borrow().iter() {
        match op {
            quadbatch::DeviceOp::UploadVertices(data) => {
                println!("  UploadVertices({} components)", data.len())
            }
            other => println!("  {other:?}"),
        }
    }
    Ok(())
}
