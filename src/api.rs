pub mod csv_files;
pub mod entsoe;
pub mod price_source;
pub mod upload;
