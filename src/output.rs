//! Outputs produced and consumed by the security service.
//!
//! An [`Output`] is either raw bytes or a four-field [`FramedOutput`]. Both
//! expose the same surface: bytes, text and the content-type bits. The type
//! bits are not part of the wire format; a reader has to know out of band
//! whether to expect framed content.
//!
//! 安全服务产生和消费的输出。
//!
//! [`Output`] 要么是原始字节，要么是四字段的 [`FramedOutput`]。两者提供相同的接口：
//! 字节、文本以及内容类型位。类型位不属于线格式，读取方需要在带外得知是否应期待帧格式内容。

use std::borrow::Cow;

pub mod encoding;
pub mod framed;
pub mod raw;

pub use encoding::TextEncoding;
pub use framed::FramedOutput;
pub use raw::RawOutput;

use crate::error::FormatError;

/// The content-type bitmask of an output.
///
/// 输出的内容类型位掩码。
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputType(u8);

impl OutputType {
    pub const ENCRYPTED: OutputType = OutputType(1);
    pub const PLAIN: OutputType = OutputType(2);
    pub const SIGNED: OutputType = OutputType(4);
    pub const ENCRYPTED_SIGNED: OutputType = OutputType(1 | 4);

    /// Accepts only the four defined masks.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 | 2 | 4 | 5 => Some(OutputType(bits)),
            _ => None,
        }
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_encrypted(&self) -> bool {
        self.0 & Self::ENCRYPTED.0 != 0
    }

    pub fn is_signed(&self) -> bool {
        self.0 & Self::SIGNED.0 != 0
    }

    /// True only for the `PLAIN` mask; a signed-only output is not plain even
    /// though its body is plaintext.
    pub fn is_plain(&self) -> bool {
        self.0 & Self::PLAIN.0 != 0
    }

    /// PLAIN becomes ENCRYPTED; SIGNED becomes ENCRYPTED|SIGNED.
    pub(crate) fn with_encrypted(self) -> Self {
        OutputType((self.0 & !Self::PLAIN.0) | Self::ENCRYPTED.0)
    }

    /// PLAIN becomes SIGNED; ENCRYPTED becomes ENCRYPTED|SIGNED.
    pub(crate) fn with_signed(self) -> Self {
        OutputType((self.0 & !Self::PLAIN.0) | Self::SIGNED.0)
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            1 => f.write_str("ENCRYPTED"),
            2 => f.write_str("PLAIN"),
            4 => f.write_str("SIGNED"),
            5 => f.write_str("ENCRYPTED|SIGNED"),
            other => write!(f, "UNKNOWN({other})"),
        }
    }
}

/// An output of the security service.
///
/// 安全服务的输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Raw(RawOutput),
    Framed(FramedOutput),
}

impl Output {
    /// The bytes to hand to a transport. Framed outputs that are encrypted or
    /// signed are rendered in the Base64 wire format.
    ///
    /// 交给传输层的字节。已加密或已签名的帧输出以 Base64 线格式呈现。
    pub fn get_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Output::Raw(raw) => Cow::Borrowed(raw.get_bytes()),
            Output::Framed(framed) => framed.get_bytes(),
        }
    }

    /// Decodes [`get_bytes`](Self::get_bytes) with the output's default encoding.
    pub fn get_as_string(&self) -> Result<String, FormatError> {
        match self {
            Output::Raw(raw) => raw.get_as_string(),
            Output::Framed(framed) => framed.get_as_string(),
        }
    }

    /// Decodes [`get_bytes`](Self::get_bytes) with the named encoding.
    pub fn get_as_string_with(&self, encoding: &str) -> Result<String, FormatError> {
        match self {
            Output::Raw(raw) => raw.get_as_string_with(encoding),
            Output::Framed(framed) => framed.get_as_string_with(encoding),
        }
    }

    pub fn output_type(&self) -> OutputType {
        match self {
            Output::Raw(raw) => raw.output_type(),
            Output::Framed(framed) => framed.output_type(),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.output_type().is_encrypted()
    }

    pub fn is_signed(&self) -> bool {
        self.output_type().is_signed()
    }

    pub fn is_plain(&self) -> bool {
        self.output_type().is_plain()
    }

    /// Whether a signature can be attached to this output.
    ///
    /// 是否可以向该输出附加签名。
    pub fn supports_signature(&self) -> bool {
        matches!(self, Output::Framed(_))
    }

    /// Hands over the output a signature can be attached to, or returns the
    /// output unchanged when it has no room for one.
    pub(crate) fn into_signable(self) -> Result<FramedOutput, Output> {
        match self {
            Output::Framed(framed) => Ok(framed),
            other => Err(other),
        }
    }

    pub fn as_framed(&self) -> Option<&FramedOutput> {
        match self {
            Output::Framed(framed) => Some(framed),
            Output::Raw(_) => None,
        }
    }
}

impl From<RawOutput> for Output {
    fn from(raw: RawOutput) -> Self {
        Output::Raw(raw)
    }
}

impl From<FramedOutput> for Output {
    fn from(framed: FramedOutput) -> Self {
        Output::Framed(framed)
    }
}
