use bytemuck::{Pod, Zeroable};

///
/// A point sample in the unit domain. The layout matches one point record of
/// the input file: two native-endian `f64` values, `x` then `y`, no padding.
///
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Point
{
    pub x: f64,
    pub y: f64,
}

impl Point
{
    #[inline]
    pub fn new(x: f64, y: f64) -> Self
    {
        Self { x, y }
    }

    /// True if the point lies in `[0,1) x [0,1)`.
    pub fn in_unit_domain(&self) -> bool
    {
        (0.0..1.0).contains(&self.x) && (0.0..1.0).contains(&self.y)
    }
}

#[test]
fn point_record_layout()
{
    assert_eq!(std::mem::size_of::<Point>(), 16);
    let points = [Point::new(0.25, 0.75)];
    let bytes: &[u8] = bytemuck::cast_slice(&points);
    assert_eq!(&bytes[..8], &0.25_f64.to_ne_bytes());
    assert_eq!(&bytes[8..], &0.75_f64.to_ne_bytes());
    assert!(points[0].in_unit_domain());
    assert!(!Point::new(1.0, 0.5).in_unit_domain());
    assert!(!Point::new(0.5, -0.1).in_unit_domain());
}
