use breakshot_core::geometry::reflect;
use breakshot_core::{Ball, Vec2};

/// Elastic contact between two equal-mass balls.
///
/// Velocities are split into the component along the line of centers and the
/// component across it; the balls swap the former and keep the latter.
/// Returns `None` when the centers coincide and the line of centers is
/// undefined.
pub fn exchange_normal_velocities(a: &Ball, b: &Ball) -> Option<(Vec2, Vec2)> {
    let normal = (b.position - a.position).normalized()?;
    let tangent = normal.perp();

    let a_normal = a.velocity.dot(normal);
    let b_normal = b.velocity.dot(normal);
    let a_tangent = a.velocity.dot(tangent);
    let b_tangent = b.velocity.dot(tangent);

    Some((
        normal * b_normal + tangent * a_tangent,
        normal * a_normal + tangent * b_tangent,
    ))
}

/// Mirror `ball`'s velocity off a fixed point on its rim.
///
/// Equivalent to a ball-ball contact against an immovable zero-radius ball at
/// `point`. `None` if the point sits at the ball's center.
pub fn reflect_off_point(ball: &Ball, point: Vec2) -> Option<Vec2> {
    let normal = (point - ball.position).normalized()?;
    Some(reflect(ball.velocity, normal, 1.0))
}
