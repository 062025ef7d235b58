use crate::utils::Position;

/// Four ordered corners in fixed winding: top-left, top-right, bottom-right,
/// bottom-left. Position bounds and UV bounds share this order so triangle
/// vertex i always pairs position corner i with UV corner i.
pub type Bounds = [Position; 4];

/// Full unit square in corner winding order.
pub const UNIT_UV: Bounds = [
    Position { x: 0.0, y: 0.0 },
    Position { x: 1.0, y: 0.0 },
    Position { x: 1.0, y: 1.0 },
    Position { x: 0.0, y: 1.0 },
];

/// Batching key for untextured shapes: a 1x1 opaque white texture the
/// renderer registers at construction, so solid fills flow through the
/// textured pipeline uniformly.
pub const SOLID_TEXTURE: &str = "pixel";

/// Axis-aligned quad corners around the center `(x, y)`, in winding order.
pub fn quad_bounds(x: f32, y: f32, width: f32, height: f32) -> Bounds {
    [
        Position::new(x - width / 2.0, y + height / 2.0),
        Position::new(x + width / 2.0, y + height / 2.0),
        Position::new(x + width / 2.0, y - height / 2.0),
        Position::new(x - width / 2.0, y - height / 2.0),
    ]
}

/// A solid-fill rectangle. Bounds are computed once at construction and are
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct Rectangle {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    bounds: Bounds,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
            bounds: quad_bounds(x, y, width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// A rectangle sampled from a named texture, optionally from a sub-region of
/// it. Same bounds geometry as [`Rectangle`]; distinguished by its UV quad
/// and by a texture-group identifier that must match a texture registered in
/// the renderer.
#[derive(Debug, Clone)]
pub struct TexturedRectangle {
    rect: Rectangle,
    uv_bounds: Bounds,
    texture_name: String,
}

impl TexturedRectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, texture_name: impl Into<String>) -> Self {
        TexturedRectangle {
            rect: Rectangle::new(x, y, width, height),
            uv_bounds: UNIT_UV,
            texture_name: texture_name.into(),
        }
    }

    /// Samples a sub-region of the texture; `uv_bounds` follows the same
    /// corner winding as the position bounds.
    pub fn with_uv(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        uv_bounds: Bounds,
        texture_name: impl Into<String>,
    ) -> Self {
        TexturedRectangle {
            rect: Rectangle::new(x, y, width, height),
            uv_bounds,
            texture_name: texture_name.into(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.rect.bounds()
    }

    pub fn uv_bounds(&self) -> Bounds {
        self.uv_bounds
    }

    pub fn texture_name(&self) -> &str {
        &self.texture_name
    }
}

/// Closed set of 2D shapes the scene knows how to batch.
#[derive(Debug, Clone)]
pub enum Geometry {
    Rectangle(Rectangle),
    TexturedRectangle(TexturedRectangle),
}

impl Geometry {
    pub fn bounds(&self) -> Bounds {
        match self {
            Geometry::Rectangle(rect) => rect.bounds(),
            Geometry::TexturedRectangle(rect) => rect.bounds(),
        }
    }

    pub fn uv_bounds(&self) -> Bounds {
        match self {
            Geometry::Rectangle(_) => UNIT_UV,
            Geometry::TexturedRectangle(rect) => rect.uv_bounds(),
        }
    }

    /// The batching key. Grouping and texture binding key off this name, not
    /// off any device resource handle.
    pub fn texture_name(&self) -> &str {
        match self {
            Geometry::Rectangle(_) => SOLID_TEXTURE,
            Geometry::TexturedRectangle(rect) => rect.texture_name(),
        }
    }
}

impl From<Rectangle> for Geometry {
    fn from(rect: Rectangle) -> Self {
        Geometry::Rectangle(rect)
    }
}

impl From<TexturedRectangle> for Geometry {
    fn from(rect: TexturedRectangle) -> Self {
        Geometry::TexturedRectangle(rect)
    }
}
