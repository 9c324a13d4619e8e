use rand::Rng;

use crate::config::{SLOWNESS, WIDTH};
use crate::star::{Star, StarGenerator};

/// Stars kept sorted by ascending depth.
///
/// Drawing in this order lets nearer stars overwrite farther ones; occlusion
/// is by draw order, not blending.
#[derive(Debug, Clone, Default)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    /// Generates `count` stars and sorts them by depth.
    pub fn build<R: Rng>(count: usize, generator: &StarGenerator, rng: &mut R) -> Self {
        let mut field = Self {
            stars: (0..count).map(|_| generator.generate(rng)).collect(),
        };
        field.resort();
        field
    }

    /// Re-establishes depth order. Stable: equal depths keep their order.
    pub fn resort(&mut self) {
        self.stars.sort_by(|a, b| a.z.total_cmp(&b.z));
    }

    /// Moves every star right by `warp * z / SLOWNESS`.
    ///
    /// Stars past the right edge are recycled at the left edge. Returns how
    /// many were recycled; the field is re-sorted when that is non-zero.
    pub fn advance<R: Rng>(&mut self, warp: f64, generator: &StarGenerator, rng: &mut R) -> usize {
        let mut recycled = 0;
        for star in &mut self.stars {
            star.x += warp * star.z / SLOWNESS;
            if star.x > WIDTH as f64 {
                generator.recycle(star, rng);
                recycled += 1;
            }
        }

        if recycled > 0 {
            self.resort();
        }
        recycled
    }

    #[inline]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_stars(stars: Vec<Star>) -> Self {
        Self { stars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEPTH, HEIGHT, MIN_DEPTH, STARS, TARGET_WARP};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use starflight_engine::paint::Color;

    fn sorted(field: &StarField) -> bool {
        field.stars().windows(2).all(|w| w[0].z <= w[1].z)
    }

    fn star(x: f64, z: f64) -> Star {
        Star { x, y: 10.0, z, color: Color::WHITE }
    }

    #[test]
    fn build_makes_sorted_field_of_requested_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let field = StarField::build(STARS, &StarGenerator::default(), &mut rng);
        assert_eq!(field.len(), STARS);
        assert!(sorted(&field));
    }

    #[test]
    fn zero_warp_moves_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let generator = StarGenerator::default();
        let mut field = StarField::build(STARS, &generator, &mut rng);
        let before = field.stars().to_vec();

        assert_eq!(field.advance(0.0, &generator, &mut rng), 0);
        assert_eq!(field.stars(), before.as_slice());
    }

    #[test]
    fn step_is_proportional_to_depth() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut field = StarField::from_stars(vec![star(10.0, 9.0), star(10.0, 18.0)]);

        field.advance(5.0, &StarGenerator::default(), &mut rng);
        assert!((field.stars()[0].x - (10.0 + 5.0 * 9.0 / SLOWNESS)).abs() < 1e-12);
        assert!((field.stars()[1].x - (10.0 + 5.0 * 18.0 / SLOWNESS)).abs() < 1e-12);
    }

    #[test]
    fn star_past_the_edge_is_recycled() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut field = StarField::from_stars(vec![star(479.9, 24.0), star(100.0, 5.0)]);

        let recycled = field.advance(TARGET_WARP, &StarGenerator::default(), &mut rng);
        assert_eq!(recycled, 1);
        assert!(sorted(&field));

        let fresh = field.stars().iter().find(|s| s.x < 1.0).unwrap();
        assert!((0.0..1.0).contains(&fresh.x));
        assert!((0.0..HEIGHT as f64).contains(&fresh.y));
        assert!((MIN_DEPTH..MIN_DEPTH + DEPTH).contains(&fresh.z));
    }

    #[test]
    fn star_exactly_at_the_edge_stays() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut field = StarField::from_stars(vec![star(WIDTH as f64, 10.0)]);
        assert_eq!(field.advance(0.0, &StarGenerator::default(), &mut rng), 0);
        assert_eq!(field.stars()[0].x, WIDTH as f64);
    }

    #[test]
    fn stays_sorted_under_long_runs() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let generator = StarGenerator::default();
        let mut field = StarField::build(STARS, &generator, &mut rng);

        let mut total = 0;
        for _ in 0..5000 {
            total += field.advance(TARGET_WARP, &generator, &mut rng);
            assert!(sorted(&field));
            assert_eq!(field.len(), STARS);
            assert!(field.stars().iter().all(|s| s.x >= 0.0 && s.x <= WIDTH as f64));
        }
        assert!(total > 0);
    }

    #[test]
    fn resort_is_stable_for_equal_depths() {
        let mut a = star(1.0, 7.0);
        let mut b = star(2.0, 7.0);
        a.y = 1.0;
        b.y = 2.0;
        let mut field = StarField::from_stars(vec![star(0.0, 9.0), a, b]);
        field.resort();
        assert_eq!(field.stars()[0].y, 1.0);
        assert_eq!(field.stars()[1].y, 2.0);
    }
}
