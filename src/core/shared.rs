/// Implemented by every configuration object in the crate so that call sites
/// can spell out `Config::default()` without importing the std trait.
pub trait ConfigType {
    fn default() -> Self;
}
