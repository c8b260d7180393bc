use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        Vec2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
        .length()
    }

    /// Linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Vec2 {
        Vec2 {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle. `x`/`y` is the minimum corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn location(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Uniform point in `[x, x + width) x [y, y + height)`. Degenerate extents collapse onto
    /// the corner instead of panicking in the sampler.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let dx = if self.width > 0.0 {
            rng.gen_range(0.0..self.width)
        } else {
            0.0
        };
        let dy = if self.height > 0.0 {
            rng.gen_range(0.0..self.height)
        } else {
            0.0
        };
        Vec2 {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

const QUARTER_ARC_DEGREES: f32 = 90.0 / 4.0;

/// Eight-way compass heading. Cardinals sit on their reference angles (E = 0, N = 90,
/// W = 180, S = 270); diagonals cover the middle half of each quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn from_angle_degrees(angle: f32) -> Self {
        if !angle.is_finite() {
            return Self::N;
        }
        let angle = angle.rem_euclid(360.0);
        // (quadrant start, counter-clockwise cardinal, diagonal, clockwise cardinal)
        let quadrants = [
            (0.0, Self::E, Self::NE, Self::N),
            (90.0, Self::N, Self::NW, Self::W),
            (180.0, Self::W, Self::SW, Self::S),
            (270.0, Self::S, Self::SE, Self::E),
        ];
        for (start, first, diagonal, last) in quadrants {
            if angle == start {
                return first;
            }
            if angle > start && angle < start + 90.0 {
                let into = angle - start;
                return if into < QUARTER_ARC_DEGREES {
                    first
                } else if into > QUARTER_ARC_DEGREES * 3.0 {
                    last
                } else {
                    diagonal
                };
            }
        }
        Self::N
    }

    /// Angle of the `from -> to` vector in degrees, normalized to `[0, 360)`.
    pub fn travel_angle(from: Vec2, to: Vec2) -> f32 {
        let degrees = (to.y - from.y).atan2(to.x - from.x).to_degrees();
        if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        }
    }

    pub fn between(from: Vec2, to: Vec2) -> Self {
        Self::from_angle_degrees(Self::travel_angle(from, to))
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::NE => "ne",
            Self::E => "e",
            Self::SE => "se",
            Self::S => "s",
            Self::SW => "sw",
            Self::W => "w",
            Self::NW => "nw",
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn cardinals_sit_on_reference_angles() {
        assert_eq!(Direction::from_angle_degrees(0.0), Direction::E);
        assert_eq!(Direction::from_angle_degrees(90.0), Direction::N);
        assert_eq!(Direction::from_angle_degrees(180.0), Direction::W);
        assert_eq!(Direction::from_angle_degrees(270.0), Direction::S);
        assert_eq!(Direction::from_angle_degrees(360.0), Direction::E);
    }

    #[test]
    fn quadrant_quarters_snap_to_neighbouring_cardinals() {
        assert_eq!(Direction::from_angle_degrees(10.0), Direction::E);
        assert_eq!(Direction::from_angle_degrees(45.0), Direction::NE);
        assert_eq!(Direction::from_angle_degrees(80.0), Direction::N);
        assert_eq!(Direction::from_angle_degrees(100.0), Direction::N);
        assert_eq!(Direction::from_angle_degrees(135.0), Direction::NW);
        assert_eq!(Direction::from_angle_degrees(170.0), Direction::W);
        assert_eq!(Direction::from_angle_degrees(200.0), Direction::W);
        assert_eq!(Direction::from_angle_degrees(225.0), Direction::SW);
        assert_eq!(Direction::from_angle_degrees(260.0), Direction::S);
        assert_eq!(Direction::from_angle_degrees(280.0), Direction::S);
        assert_eq!(Direction::from_angle_degrees(315.0), Direction::SE);
        assert_eq!(Direction::from_angle_degrees(350.0), Direction::E);
    }

    #[test]
    fn quarter_boundaries_belong_to_the_diagonal() {
        assert_eq!(Direction::from_angle_degrees(22.5), Direction::NE);
        assert_eq!(Direction::from_angle_degrees(67.5), Direction::NE);
    }

    #[test]
    fn negative_angles_are_normalized() {
        assert_eq!(Direction::from_angle_degrees(-90.0), Direction::S);
        assert_eq!(Direction::from_angle_degrees(-45.0), Direction::SE);
    }

    #[test]
    fn travel_angle_is_non_negative() {
        let origin = Vec2::ZERO;
        assert_eq!(Direction::travel_angle(origin, Vec2::new(1.0, 0.0)), 0.0);
        assert!((Direction::travel_angle(origin, Vec2::new(0.0, 1.0)) - 90.0).abs() < 1e-3);
        assert!((Direction::travel_angle(origin, Vec2::new(0.0, -1.0)) - 270.0).abs() < 1e-3);
        assert_eq!(Direction::between(origin, Vec2::new(-1.0, -1.0)), Direction::SW);
    }

    #[test]
    fn lerp_hits_exact_endpoints() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(100.0, 0.0);
        assert_eq!(start.lerp(end, 0.5), Vec2::new(50.0, 0.0));
        assert_eq!(start.lerp(end, 1.0), end);
        assert_eq!(start.distance_to(end), 100.0);
    }

    #[test]
    fn random_point_stays_inside_rect() {
        let mut rng = SmallRng::seed_from_u64(7);
        let rect = Rect::new(2.0, 3.0, 0.5, 0.25);
        for _ in 0..64 {
            assert!(rect.contains(rect.random_point(&mut rng)));
        }
    }

    #[test]
    fn random_point_in_empty_rect_is_corner() {
        let mut rng = SmallRng::seed_from_u64(1);
        let rect = Rect::new(4.0, 5.0, 0.0, 0.0);
        assert_eq!(rect.random_point(&mut rng), Vec2::new(4.0, 5.0));
    }
}
