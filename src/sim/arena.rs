//! Arena geometry for the exploration world.

/// Axis-aligned wall rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Bounded arena with the fixed wall course.
#[derive(Debug, Clone)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    rects: Vec<Rect>,
}

/// March step for ray casting, in pixels.
const RAY_STEP: f64 = 2.0;

const WALL_THICKNESS: f64 = 5.0;

impl Arena {
    /// Build the arena: 5px boundary walls along each edge plus three
    /// internal walls at fixed fractions of the arena size, truncated to
    /// whole pixels.
    pub fn new(width: f64, height: f64) -> Self {
        let t = WALL_THICKNESS;
        let rects = vec![
            // Boundary walls.
            Rect { x: 0.0, y: 0.0, w: width, h: t },
            Rect { x: 0.0, y: 0.0, w: t, h: height },
            Rect { x: 0.0, y: height - t, w: width, h: t },
            Rect { x: width - t, y: 0.0, w: t, h: height },
            // Internal walls.
            Rect {
                x: 0.0,
                y: (0.4 * height).floor(),
                w: (0.3 * width).floor(),
                h: t,
            },
            Rect {
                x: (0.5 * width).floor(),
                y: 0.0,
                w: t,
                h: (0.8 * height).floor(),
            },
            Rect {
                x: (0.7 * width).floor(),
                y: (0.6 * height).floor(),
                w: (0.3 * width).floor(),
                h: t,
            },
        ];
        Self {
            width,
            height,
            rects,
        }
    }

    /// Whether the point sits inside any wall.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.rects.iter().any(|rect| rect.contains(x, y))
    }

    /// March a ray outward in 2px steps and return the distance to the
    /// first hit within `range`, if any. Compass convention: heading 0 is
    /// +y and x grows with sin.
    pub fn ray_cast(&self, x: f64, y: f64, heading_deg: f64, range: f64) -> Option<f64> {
        let rad = heading_deg.to_radians();
        let (dx, dy) = (rad.sin(), rad.cos());
        let steps = (range / RAY_STEP) as usize;
        for i in 1..=steps {
            let d = i as f64 * RAY_STEP;
            if self.contains(x + dx * d, y + dy * d) {
                return Some(d);
            }
        }
        None
    }

    /// Proximity reading for one beam: `1 - d/range` on a hit, else 0.
    pub fn proximity(&self, x: f64, y: f64, heading_deg: f64, range: f64) -> f64 {
        match self.ray_cast(x, y, heading_deg, range) {
            Some(distance) => 1.0 - distance / range,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_space_is_free() {
        let arena = Arena::new(500.0, 500.0);
        assert!(!arena.contains(60.0, 60.0));
        assert!(!arena.contains(200.0, 300.0));
        assert!(!arena.contains(450.0, 100.0));
    }

    #[test]
    fn test_boundary_walls_hug_the_edges() {
        let arena = Arena::new(500.0, 500.0);
        assert!(arena.contains(250.0, 2.0)); // top
        assert!(arena.contains(2.0, 250.0)); // left
        assert!(arena.contains(250.0, 498.0)); // bottom
        assert!(arena.contains(498.0, 250.0)); // right
    }

    #[test]
    fn test_internal_walls_at_fractional_positions() {
        let arena = Arena::new(500.0, 500.0);
        // Horizontal wall from the left edge at y = 0.4 * height.
        assert!(arena.contains(100.0, 202.0));
        assert!(!arena.contains(160.0, 202.0)); // ends at 0.3 * width
        // Vertical wall from the top edge at x = 0.5 * width.
        assert!(arena.contains(252.0, 300.0));
        assert!(!arena.contains(252.0, 450.0)); // ends at 0.8 * height
        // Horizontal wall to the right edge at y = 0.6 * height.
        assert!(arena.contains(400.0, 302.0));
        assert!(!arena.contains(300.0, 302.0)); // starts at 0.7 * width
    }

    #[test]
    fn test_ray_hits_wall_ahead() {
        let arena = Arena::new(500.0, 500.0);
        // Looking along +x from just left of the vertical wall at x=250.
        let hit = arena.ray_cast(230.0, 100.0, 90.0, 75.0);
        let distance = hit.unwrap();
        assert!(distance <= 22.0, "distance was {distance}");
    }

    #[test]
    fn test_ray_misses_in_open_space() {
        let arena = Arena::new(500.0, 500.0);
        assert!(arena.ray_cast(60.0, 60.0, 45.0, 50.0).is_none());
    }

    #[test]
    fn test_proximity_grows_as_obstacle_nears() {
        let arena = Arena::new(500.0, 500.0);
        // Looking straight down -y toward the top wall.
        let far = arena.proximity(160.0, 60.0, 180.0, 75.0);
        let near = arena.proximity(160.0, 25.0, 180.0, 75.0);
        assert!(near > far);
        assert!((0.0..=1.0).contains(&near));
    }
}
