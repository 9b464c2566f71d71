//! QR/bar code decoding via `zbarimg`

use std::ffi::OsStr;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use instaframe_core::traits::CodeDecoder;

use crate::command;
use crate::error::DriverError;

/// zbarimg exit status when the image holds no symbols
const NO_SYMBOLS: i32 = 4;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Decoder program
    pub program: String,
    /// Arguments placed before the image path
    pub args: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            program: "zbarimg".into(),
            args: vec!["--raw".into(), "-q".into()],
        }
    }
}

/// Decoder that runs zbarimg on the image file
pub struct ZbarDecoder {
    config: DecoderConfig,
}

impl ZbarDecoder {
    /// Create a decoder
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }
}

impl CodeDecoder for ZbarDecoder {
    type Error = DriverError;

    fn decode_codes(&mut self, image: &Path) -> Result<Vec<String>, DriverError> {
        let mut args: Vec<&OsStr> = self.config.args.iter().map(OsStr::new).collect();
        args.push(image.as_os_str());

        let out = command::output(&self.config.program, args)?;
        if out.status.code() == Some(NO_SYMBOLS) {
            return Ok(Vec::new());
        }
        let out = command::ensure_success(&self.config.program, out)?;

        let codes: Vec<String> = String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        debug!("decoded {} codes", codes.len());
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(body: &str) -> ZbarDecoder {
        ZbarDecoder::new(DecoderConfig {
            program: "sh".into(),
            args: vec!["-c".into(), body.into()],
        })
    }

    #[test]
    fn test_each_line_is_a_code() {
        let mut decoder = script(r"printf 'WIFI:S:home;T:WPA;P:pw;;\n\nhello\n'");
        let codes = decoder.decode_codes(Path::new("capture.jpg")).unwrap();
        assert_eq!(codes, vec!["WIFI:S:home;T:WPA;P:pw;;", "hello"]);
    }

    #[test]
    fn test_no_symbols_is_empty() {
        let mut decoder = script("exit 4");
        assert!(decoder.decode_codes(Path::new("capture.jpg")).unwrap().is_empty());
    }

    #[test]
    fn test_other_failures_are_errors() {
        let mut decoder = script("exit 2");
        assert!(matches!(
            decoder.decode_codes(Path::new("capture.jpg")),
            Err(DriverError::Exit { .. })
        ));
    }
}
