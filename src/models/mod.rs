pub mod market;
pub mod params;
pub mod price;
pub mod response;

pub use market::*;
pub use params::*;
pub use price::*;
pub use response::*;
