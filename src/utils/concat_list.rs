use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes an ffmpeg concat-demuxer list naming `inputs` in order.
///
/// Paths are made absolute, since the demuxer resolves relative entries
/// against the list file's own directory.
pub fn write_concat_list(inputs: &[PathBuf], list_file: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(list_file)?);
    writeln!(out, "ffconcat version 1.0")?;

    for input in inputs {
        let absolute = if input.is_absolute() {
            input.clone()
        } else {
            std::env::current_dir()?.join(input)
        };
        writeln!(out, "file {}", quote(&absolute.to_string_lossy()))?;
    }

    out.flush()?;
    Ok(())
}

/// Single-quote a path for the concat list. Embedded quotes close the
/// string, emit an escaped quote and reopen it.
fn quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}
