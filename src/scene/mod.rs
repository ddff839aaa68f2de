pub mod cache;
pub mod cells;
pub mod ease;
pub mod surface;
pub mod visual;

#[cfg(test)]
pub mod testing;
