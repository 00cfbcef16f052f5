pub mod generator;
pub mod sync;
pub mod touch;

#[cfg(test)]
pub(crate) mod test_support;
