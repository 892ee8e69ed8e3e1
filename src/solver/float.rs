use num_traits::{FromPrimitive, ToPrimitive};
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Scalar bound for the kernel fields; the host kernel is generic over it,
/// the device kernel is f32 with f64 conversions at the edges.
pub trait Float:
    num_traits::Float
    + FromPrimitive
    + ToPrimitive
    + Debug
    + Display
    + Sum
    + Copy
    + Send
    + Sync
    + 'static
{
}

impl Float for f64 {}
impl Float for f32 {}
