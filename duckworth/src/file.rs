//! JSON file plumbing for data sets, model artifacts and forecasts.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Error, ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads a JSON-encoded `D` from `path`. Malformed content surfaces as [`ErrorKind::InvalidData`],
/// naming the file.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, Error> {
    let path = path.as_ref();
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::new(ErrorKind::InvalidData, format!("{}: {err}", path.display())))
}

/// Writes `value` to `path` as pretty-printed JSON. The content is staged in a sibling file and
/// renamed into place, so readers never observe a partial write.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), Error> {
    let path = path.as_ref();
    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    {
        let mut writer = BufWriter::new(File::create(&staging)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    fs::rename(&staging, path)
}
