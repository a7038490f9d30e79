use crate::ball::Ball;
use crate::config::PhysicsConfig;
use crate::vector::Vec2;

/// Gap left between racked balls so the break resolves as a sequence of
/// distinct contacts.
pub const RACK_GAP: f64 = 0.01;

/// Where the cue ball is placed for the break.
pub fn head_spot(config: &PhysicsConfig) -> Vec2 {
    Vec2::new(config.table_width * 0.25, config.table_height * 0.5)
}

/// Where the apex ball of the rack sits.
pub fn foot_spot(config: &PhysicsConfig) -> Vec2 {
    Vec2::new(config.table_width * 0.75, config.table_height * 0.5)
}

/// A triangle of `rows` rows pointing at -X, apex at `apex`.
pub fn triangle_rack(config: &PhysicsConfig, apex: Vec2, rows: usize, gap: f64) -> Vec<Ball> {
    let pitch = 2.0 * config.ball_radius + gap;
    let row_step = pitch * 3.0_f64.sqrt() / 2.0;
    let mut balls = Vec::with_capacity(rows * (rows + 1) / 2);
    for row in 0..rows {
        let x = apex.x + row as f64 * row_step;
        for i in 0..=row {
            let y = apex.y + (i as f64 - row as f64 / 2.0) * pitch;
            balls.push(Ball::new(Vec2::new(x, y), config.ball_radius));
        }
    }
    balls
}

/// Cue ball (id 0) on the head spot and fifteen object balls racked on the foot
/// spot.
pub fn break_layout(config: &PhysicsConfig) -> Vec<Ball> {
    let mut balls = vec![Ball::new(head_spot(config), config.ball_radius)];
    balls.extend(triangle_rack(config, foot_spot(config), 5, RACK_GAP));
    balls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_ball_rack_has_no_overlaps() {
        let config = PhysicsConfig::default();
        let balls = break_layout(&config);
        assert_eq!(balls.len(), 16);
        for (i, a) in balls.iter().enumerate() {
            for b in &balls[i + 1..] {
                let gap = a.position.distance(b.position) - a.radius - b.radius;
                assert!(gap > RACK_GAP * 0.5, "balls overlap or touch: gap {gap}");
            }
        }
    }

    #[test]
    fn rack_fits_on_table() {
        let config = PhysicsConfig::default();
        for ball in break_layout(&config) {
            let p = ball.position;
            assert!(p.x - ball.radius > 0.0 && p.x + ball.radius < config.table_width);
            assert!(p.y - ball.radius > 0.0 && p.y + ball.radius < config.table_height);
        }
    }
}
