#[cfg(feature = "std")]
pub trait RowKey: core::hash::Hash + Ord + Clone {}
#[cfg(feature = "std")]
impl<T: core::hash::Hash + Ord + Clone> RowKey for T {}

#[cfg(not(feature = "std"))]
pub trait RowKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<T: Ord + Clone> RowKey for T {}
