//! Jacobi smoothing of power representations over a [`Connection`].

use glam::Vec2;

use crate::connection::Connection;

const VANISHING: f32 = 1e-8;

/// Per-element state of a diffusion problem.
#[derive(Debug, Clone)]
pub struct Diffusion {
    /// Current representation per element.
    pub var: Vec<Vec2>,
    /// Weight pulling each element towards its current value.
    pub attach: Vec<f32>,
    /// Elements whose value never changes.
    pub locked: Vec<bool>,
}

impl Diffusion {
    /// All elements free, starting from `var`, attached with `attach_weight`.
    pub fn new(var: Vec<Vec2>, attach_weight: f32) -> Self {
        let n = var.len();
        Self {
            var,
            attach: vec![attach_weight; n],
            locked: vec![false; n],
        }
    }

    /// Fixes element `i` to `value`.
    pub fn lock(&mut self, i: usize, value: Vec2) {
        self.var[i] = value;
        self.locked[i] = true;
    }

    /// Number of locked elements.
    pub fn num_locked(&self) -> usize {
        self.locked.iter().filter(|&&l| l).count()
    }

    /// Runs `steps` Jacobi iterations.
    ///
    /// Each free element becomes the normalized sum of its attached current
    /// value and its neighbours transported into its frame. An element whose
    /// sum vanishes keeps its previous value; elements still zero at the end
    /// become `(1, 0)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn run(&mut self, conn: &Connection, order: u32, steps: u32) {
        let n = order as f32;
        for _ in 0..steps {
            let next: Vec<Vec2> = (0..self.var.len())
                .map(|i| {
                    if self.locked[i] {
                        return self.var[i];
                    }
                    let sum = conn.links(i as u32).iter().fold(
                        self.attach[i] * self.var[i],
                        |acc, link| {
                            let z = self.var[link.target as usize];
                            acc + link.weight * Vec2::from_angle(-n * link.angle).rotate(z)
                        },
                    );
                    if sum.length_squared() > VANISHING {
                        sum.normalize()
                    } else {
                        self.var[i]
                    }
                })
                .collect();
            self.var = next;
        }
        for z in &mut self.var {
            *z = if z.length_squared() > VANISHING {
                z.normalize()
            } else {
                Vec2::X
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::flat_grid;
    use framescope_core::ElementKind;

    #[test]
    fn test_locked_values_propagate_on_flat_grid() {
        let mesh = flat_grid(3);
        let conn = Connection::new(&mesh, ElementKind::Faces, false);
        let (bx, _) = conn.frame(0);
        let target = conn.power(0, bx, 4);

        let mut problem = Diffusion::new(vec![Vec2::ZERO; conn.len()], 0.0);
        problem.lock(0, target);
        problem.run(&conn, 4, 50);

        assert_eq!(problem.num_locked(), 1);
        assert!((problem.var[0] - target).length() < 1e-6);
        for (i, z) in problem.var.iter().enumerate() {
            assert!((z.length() - 1.0).abs() < 1e-4, "element {i} is not unit");
            // same world direction everywhere on a flat grid
            let expected = conn.power(i as u32, bx, 4);
            assert!((*z - expected).length() < 1e-3, "element {i}: {z} vs {expected}");
        }
    }

    #[test]
    fn test_vanishing_sums_fall_back() {
        let mesh = flat_grid(1);
        let conn = Connection::new(&mesh, ElementKind::Faces, false);
        let mut problem = Diffusion::new(vec![Vec2::ZERO; conn.len()], 1.0);
        problem.run(&conn, 4, 3);
        assert!(problem.var.iter().all(|&z| z == Vec2::X));

        let mut untouched = Diffusion::new(vec![Vec2::new(0.0, 2.0); conn.len()], 1.0);
        untouched.run(&conn, 4, 0);
        assert!(untouched.var.iter().all(|&z| (z - Vec2::Y).length() < 1e-6));
    }
}
