pub mod text;

pub use text::write_dataset;
