pub mod csv;
pub mod io;

pub use csv::{fmt_float, fmt_opt_float, write_csv_row};
pub use io::{list_artifacts, open_writer, read_text, read_utf8, Writer};
