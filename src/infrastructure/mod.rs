pub mod pdf_reader;

pub use pdf_reader::{PageSource, PdfDocument, TextPages};
