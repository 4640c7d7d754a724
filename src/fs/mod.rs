//! Reading & writing the settings file. It's a single JSON object whose keys are the fields of
//! [`Settings`]; any key may be left out.

use std::path::Path;

use crate::error::ConfigError;
use crate::fs::settings::Settings;

pub mod settings;

fn write_settings(mut w: impl std::io::Write, settings: &Settings) -> std::io::Result<()> {
    let mut buf = Vec::<u8>::new();
    facet_json::to_writer(settings, &mut buf)
        .map_err(|err| std::io::Error::other(format!("{:?}", err)))?;
    w.write_all(&buf)
}

fn read_settings(mut r: impl std::io::Read) -> std::io::Result<Settings> {
    let mut buf = Vec::<u8>::new();
    r.read_to_end(&mut buf)?;
    facet_json::from_slice(&buf).map_err(|err| std::io::Error::other(format!("{}", err)))
}

pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_settings(file).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

/// Loads `path` if it exists. Only the file being absent is forgiven; a file that is there but
/// broken still fails.
pub fn load_if_present(path: &Path) -> Result<Option<Settings>, ConfigError> {
    match load(path) {
        Ok(settings) => Ok(Some(settings)),
        Err(ConfigError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub fn save(path: &Path, settings: &Settings) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_settings(file, settings)
}
