mod params;

pub use params::{FormPairs, QueryPairs};
