use super::encoding::TextEncoding;
use super::OutputType;
use crate::error::FormatError;

/// An output that is nothing but bytes, with a type fixed at construction.
///
/// 只包含字节的输出，其类型在构造时确定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    output_type: OutputType,
    bytes: Vec<u8>,
    default_encoding: TextEncoding,
}

impl RawOutput {
    pub fn new(bytes: impl Into<Vec<u8>>, output_type: OutputType) -> Self {
        Self {
            output_type,
            bytes: bytes.into(),
            default_encoding: TextEncoding::default(),
        }
    }

    /// A plain output carrying `bytes` as is.
    pub fn plain(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, OutputType::PLAIN)
    }

    pub(crate) fn with_default_encoding(mut self, encoding: TextEncoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    pub fn get_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn get_as_string(&self) -> Result<String, FormatError> {
        self.default_encoding.decode(&self.bytes)
    }

    pub fn get_as_string_with(&self, encoding: &str) -> Result<String, FormatError> {
        encoding.parse::<TextEncoding>()?.decode(&self.bytes)
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }
}
