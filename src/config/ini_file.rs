//! Loading [`CaptureConfig`] from an INI file.
//!
//! Only the `[femtocatch]` section is read; everything else in the file
//! belongs to other tools. Keys missing from the section keep their
//! defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use ini::Ini;

use super::types::{CaptureConfig, ConfigError};

/// Section holding capture settings.
pub const INI_SECTION: &str = "femtocatch";

impl CaptureConfig {
    /// Parse capture settings from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        parse_config("<string>", text)
    }

    /// Read and parse an INI file.
    ///
    /// `encoding` is a WHATWG label such as `latin1`; UTF-8 is used when it
    /// is `None`.
    pub fn from_ini_file(path: impl AsRef<Path>, encoding: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.as_ref().display().to_string();
        let bytes = read_file_bytes(&path)?;
        let text = decode_contents(&path, &bytes, encoding)?;
        parse_config(&path, &text)
    }
}

fn read_file_bytes(path: &str) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(path.to_owned()),
        _ => ConfigError::Io {
            path: path.to_owned(),
            source: err,
        },
    })
}

fn decode_contents(path: &str, bytes: &[u8], encoding: Option<&str>) -> Result<String, ConfigError> {
    let encoding = match encoding {
        Some(label) => {
            let normalized = label.trim().to_ascii_lowercase();
            Encoding::for_label(normalized.as_bytes())
                .ok_or_else(|| ConfigError::UnknownEncoding(label.to_owned()))?
        }
        None => UTF_8,
    };
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConfigError::Decode {
            path: path.to_owned(),
            encoding: encoding.name(),
        });
    }
    Ok(decoded.into_owned())
}

fn parse_config(path: &str, text: &str) -> Result<CaptureConfig, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;
    let mut config = CaptureConfig::default();
    let Some(section) = ini.section(Some(INI_SECTION)) else {
        return Ok(config);
    };
    if let Some(format) = section.get("log_format") {
        config.log_format = format.to_owned();
    }
    if let Some(date_format) = section.get("log_date_format") {
        let date_format = date_format.trim();
        config.log_date_format = (!date_format.is_empty()).then(|| date_format.to_owned());
    }
    if let Some(print) = section.get("log_print") {
        config.log_print = parse_bool("log_print", print)?;
    }
    if let Some(extra) = section.get("log_level_extra") {
        config.log_level_extra = extra.split_whitespace().map(str::to_owned).collect();
    }
    Ok(config)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}
