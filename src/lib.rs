// Private modules
mod tools;
mod notes {
    mod dlp;
}

// Public modules
pub mod dlp;
pub mod error;
pub mod fsipfe;
pub mod group;
pub mod ipdmcfe;
pub mod ipfe;
pub mod ipmcfe;
pub mod label;
pub mod params;
pub mod types;

pub use error::{Error, Misuse};
pub use label::Label;
pub use params::{Parameters, Scheme};
pub use types::{Matrix, Vector};
