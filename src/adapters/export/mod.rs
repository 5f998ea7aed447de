//! CSV rendering of the export tables.

mod csv;

pub use csv::CsvTableExporter;
