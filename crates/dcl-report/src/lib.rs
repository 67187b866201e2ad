pub mod json;
pub mod markdown;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;
