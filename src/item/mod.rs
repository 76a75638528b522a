#[cfg(feature = "console")]
/// This module provides an item writer printing JSON lines on standard output.
pub mod console;

/// This module provides a writer delivering every chunk to several writers.
pub mod composite;

#[cfg(feature = "csv")]
/// This module provides a delimited item reader and a CSV item writer.
pub mod csv;

#[cfg(feature = "json")]
/// This module provides a JSON lines item writer.
pub mod json;

/// Opens an output file, truncating it unless `append` is set.
#[cfg(any(feature = "csv", feature = "json"))]
pub(crate) fn open_output(
    path: &std::path::Path,
    append: bool,
) -> Result<std::fs::File, crate::BatchError> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(file)
}
