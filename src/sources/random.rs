use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::errors::ScatterError;
use crate::point::Point;
use super::PointSource;

///
/// Uniformly distributed points in `[0,1) x [0,1)`, reproducible from a seed.
///
pub struct RandomPoints
{
    rng: StdRng,
}

impl RandomPoints
{
    pub fn new(seed: u64) -> Self
    {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn fill(&mut self, points: &mut [Point])
    {
        for point in points.iter_mut()
        {
            point.x = self.rng.gen_range(0.0..1.0);
            point.y = self.rng.gen_range(0.0..1.0);
        }
    }
}

impl PointSource for RandomPoints
{
    fn fill_batch(&mut self, _iteration: usize, points: &mut [Point]) -> Result<(), ScatterError>
    {
        self.fill(points);
        Ok(())
    }
}

#[test]
fn random_points_are_seeded_and_in_domain()
{
    let mut a = vec![Point::default(); 257];
    let mut b = vec![Point::default(); 257];
    RandomPoints::new(7).fill(&mut a);
    RandomPoints::new(7).fill(&mut b);
    assert_eq!(a, b);
    assert!(a.iter().all(Point::in_unit_domain));

    let mut source = RandomPoints::new(7);
    source.fill_batch(0, &mut b).unwrap();
    source.fill_batch(1, &mut b).unwrap();
    assert_ne!(a, b);
}
