pub mod available;
pub mod download;
pub mod options;

pub use available::available;
pub use download::download;
pub use options::options;
