//! Text encodings for rendering an output as a string.
//!
//! 将输出渲染为字符串时使用的文本编码。

use std::str::FromStr;

use crate::error::FormatError;

/// A character encoding an output can be decoded with.
///
/// 输出可用于解码的字符编码。
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
    Utf16Be,
    Utf16Le,
}

impl TextEncoding {
    /// The canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf16Le => "UTF-16LE",
        }
    }

    /// Decodes `bytes`, failing on any sequence invalid in this encoding.
    ///
    /// 解码字节；遇到该编码下无效的序列即失败。
    pub fn decode(&self, bytes: &[u8]) -> Result<String, FormatError> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|_| FormatError::InvalidText(self.name())),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| b as char).collect())
                } else {
                    Err(FormatError::InvalidText(self.name()))
                }
            }
            // Every byte maps to the code point of the same value.
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Utf16Be => self.decode_utf16(bytes, u16::from_be_bytes),
            TextEncoding::Utf16Le => self.decode_utf16(bytes, u16::from_le_bytes),
        }
    }

    fn decode_utf16(
        &self,
        bytes: &[u8],
        unit: fn([u8; 2]) -> u16,
    ) -> Result<String, FormatError> {
        if bytes.len() % 2 != 0 {
            return Err(FormatError::InvalidText(self.name()));
        }
        let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
        char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|_| FormatError::InvalidText(self.name()))
    }
}

impl FromStr for TextEncoding {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(TextEncoding::Utf8),
            "US-ASCII" | "ASCII" => Ok(TextEncoding::Ascii),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Ok(TextEncoding::Latin1),
            "UTF-16BE" => Ok(TextEncoding::Utf16Be),
            "UTF-16LE" => Ok(TextEncoding::Utf16Le),
            _ => Err(FormatError::UnsupportedEncoding(name.to_string())),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve_case_insensitively() {
        assert_eq!("utf-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("Latin1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!(
            "EBCDIC".parse::<TextEncoding>().unwrap_err(),
            FormatError::UnsupportedEncoding("EBCDIC".to_string())
        );
    }

    #[test]
    fn test_decode_variants() {
        assert_eq!(TextEncoding::Latin1.decode(&[0x63, 0x61, 0x66, 0xE9]).unwrap(), "café");
        assert!(TextEncoding::Ascii.decode(&[0xE9]).is_err());
        assert!(TextEncoding::Utf8.decode(&[0xFF, 0xFE]).is_err());
        assert_eq!(TextEncoding::Utf16Be.decode(&[0x00, 0x68, 0x00, 0x69]).unwrap(), "hi");
        assert_eq!(TextEncoding::Utf16Le.decode(&[0x68, 0x00, 0x69, 0x00]).unwrap(), "hi");
        assert!(TextEncoding::Utf16Le.decode(&[0x68]).is_err());
    }
}
