use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

/// Serializes an object to a pretty JSON file.
pub fn object_to_json<T, E>(output_path: &Path, object: &T) -> Result<(), E>
where
    T: Serialize,
    E: From<std::io::Error> + From<serde_json::Error>,
{
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T, E>(file_path: &Path) -> Result<T, E>
where
    T: DeserializeOwned,
    E: From<std::io::Error> + From<serde_json::Error>,
{
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}
