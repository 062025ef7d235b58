use quadbatch::geometry::{
    quad_bounds, Geometry, Rectangle, TexturedRectangle, SOLID_TEXTURE, UNIT_UV,
};
use quadbatch::utils::Position;

#[test]
fn rectangle_bounds_wind_tl_tr_br_bl() {
    let rect = Rectangle::new(0.0, 0.0, 10.0, 20.0);
    assert_eq!(
        rect.bounds(),
        [
            Position::new(-5.0, 10.0),
            Position::new(5.0, 10.0),
            Position::new(5.0, -10.0),
            Position::new(-5.0, -10.0),
        ]
    );
}

#[test]
fn bounds_follow_the_anchor() {
    let bounds = quad_bounds(100.0, -50.0, 4.0, 6.0);
    assert_eq!(bounds[0], Position::new(98.0, -47.0));
    assert_eq!(bounds[2], Position::new(102.0, -53.0));
}

#[test]
fn rectangle_batches_under_the_solid_texture() {
    let geometry: Geometry = Rectangle::new(0.0, 0.0, 1.0, 1.0).into();
    assert_eq!(geometry.texture_name(), SOLID_TEXTURE);
    assert_eq!(geometry.uv_bounds(), UNIT_UV);
}

#[test]
fn textured_rectangle_shares_the_bounds_math() {
    let plain = Rectangle::new(3.0, 4.0, 8.0, 2.0);
    let textured: Geometry = TexturedRectangle::new(3.0, 4.0, 8.0, 2.0, "world").into();
    assert_eq!(textured.bounds(), plain.bounds());
    assert_eq!(textured.texture_name(), "world");
    assert_eq!(textured.uv_bounds(), UNIT_UV);
}

#[test]
fn custom_uv_bounds_are_kept_per_corner() {
    let uv = [
        Position::new(0.0, 0.0),
        Position::new(0.27, 0.0),
        Position::new(0.27, 0.27),
        Position::new(0.0, 0.27),
    ];
    let geometry: Geometry =
        TexturedRectangle::with_uv(0.0, 0.0, 512.0, 512.0, uv, "atlas").into();
    assert_eq!(geometry.uv_bounds(), uv);
}
