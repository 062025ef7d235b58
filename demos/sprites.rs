//! Windowed demo: one solid rectangle and two textured quads batched by
//! texture. The textures are generated in memory so the demo carries no
//! asset files.

use anyhow::Result;
use quadbatch::geometry::{Bounds, Rectangle, TexturedRectangle};
use quadbatch::utils::Position;
use quadbatch::{run_app, WindowConfig};

fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let value = if on { 230 } else { 60 };
            rgba.extend_from_slice(&[value, value, value, 255]);
        }
    }
    rgba
}

fn main() -> Result<()> {
    env_logger::init();

    let config = WindowConfig {
        title: "quadbatch sprites".to_string(),
        width: 800,
        height: 600,
    };

    run_app(
        config,
        |renderer, scene| {
            let checker = checkerboard(64, 8);
            renderer.create_texture_from_pixels("checker", 64, 64, &checker)?;

            // Solid fill batches under the built-in "pixel" texture.
            scene.add(Rectangle::new(-220.0, 0.0, 160.0, 120.0));

            scene.add(TexturedRectangle::new(40.0, 80.0, 200.0, 200.0, "checker"));

            // Bottom-left quarter of the checkerboard only.
            let quarter: Bounds = [
                Position::new(0.0, 0.5),
                Position::new(0.5, 0.5),
                Position::new(0.5, 1.0),
                Position::new(0.0, 1.0),
            ];
            scene.add(TexturedRectangle::with_uv(
                220.0, -120.0, 120.0, 120.0, quarter, "checker",
            ));

            Ok(())
        },
        |_renderer, _scene| {},
    )
}
