//! The four-field hybrid output and its length-prefixed, Base64 wire format.
//!
//! ```text
//! Buffer := Base64( LP(iv) ++ LP(wrappedSessionKey) ++ LP(body) ++ LP(signature) )
//! LP(x)  := int32_be(len(x) or 0) ++ (x's bytes, omitted if len==0)
//! ```
//!
//! 四字段混合输出及其带长度前缀的 Base64 线格式。

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{Buf, BufMut, BytesMut};

use super::encoding::TextEncoding;
use super::OutputType;
use crate::error::FormatError;

const LENGTH_PREFIX_SIZE: usize = 4;

/// The largest field the wire format can describe.
pub const MAX_FIELD_LEN: usize = i32::MAX as usize;

/// A hybrid output: IV, wrapped session key, body and signature, each
/// optional. The body holds ciphertext when the output is encrypted and
/// plaintext otherwise.
///
/// 混合输出：IV、包装后的会话密钥、正文和签名，均为可选。
/// 输出已加密时正文为密文，否则为明文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedOutput {
    output_type: OutputType,
    iv: Option<Vec<u8>>,
    wrapped_session_key: Option<Vec<u8>>,
    body: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
    default_encoding: TextEncoding,
}

impl FramedOutput {
    /// An empty, plain output.
    pub(crate) fn new(default_encoding: TextEncoding) -> Self {
        Self {
            output_type: OutputType::PLAIN,
            iv: None,
            wrapped_session_key: None,
            body: None,
            signature: None,
            default_encoding,
        }
    }

    /// Builds an output from its four fields. Empty fields are treated as
    /// absent, exactly as the wire format would read them back. The type is
    /// derived from which fields are present.
    ///
    /// 由四个字段构建输出。空字段被视为缺失，与线格式读回的结果一致。类型由存在的字段推导。
    pub fn from_parts(
        iv: Option<Vec<u8>>,
        wrapped_session_key: Option<Vec<u8>>,
        body: Option<Vec<u8>>,
        signature: Option<Vec<u8>>,
    ) -> Self {
        let non_empty = |field: Option<Vec<u8>>| field.filter(|bytes| !bytes.is_empty());
        let mut output = Self {
            output_type: OutputType::PLAIN,
            iv: non_empty(iv),
            wrapped_session_key: non_empty(wrapped_session_key),
            body: non_empty(body),
            signature: non_empty(signature),
            default_encoding: TextEncoding::default(),
        };
        output.output_type = output.derived_type();
        output
    }

    /// Parses a framed buffer: Base64-decodes it, then reads the IV, session
    /// key, body and signature fields in that order. ASCII whitespace inside
    /// the Base64 text is ignored, so line-wrapped (MIME style) input decodes.
    ///
    /// 解析帧缓冲区：先进行 Base64 解码，再依次读取 IV、会话密钥、正文和签名字段。
    /// Base64 文本中的 ASCII 空白会被忽略，因此按行折断的输入也能解码。
    pub fn split(buffer: &[u8]) -> Result<Self, FormatError> {
        let decoded = STANDARD.decode(strip_ascii_whitespace(buffer))?;
        let mut input = decoded.as_slice();

        let iv = read_field(&mut input, "iv")?;
        let wrapped_session_key = read_field(&mut input, "session key")?;
        let body = read_field(&mut input, "body")?;
        let signature = read_field(&mut input, "signature")?;
        if input.has_remaining() {
            return Err(FormatError::TrailingBytes(input.remaining()));
        }

        Ok(Self::from_parts(iv, wrapped_session_key, body, signature))
    }

    /// Writes the four fields, length-prefixed, and Base64-encodes the result.
    ///
    /// 写出带长度前缀的四个字段，并对结果进行 Base64 编码。
    pub fn format(&self) -> Vec<u8> {
        let fields = [
            self.iv.as_deref(),
            self.wrapped_session_key.as_deref(),
            self.body.as_deref(),
            self.signature.as_deref(),
        ];
        let capacity = fields
            .iter()
            .map(|field| LENGTH_PREFIX_SIZE + field.map_or(0, <[u8]>::len))
            .sum();
        let mut buf = BytesMut::with_capacity(capacity);
        for field in fields {
            write_field(&mut buf, field);
        }
        STANDARD.encode(&buf).into_bytes()
    }

    /// The framed form when encrypted or signed, the bare body otherwise.
    pub fn get_bytes(&self) -> Cow<'_, [u8]> {
        if self.output_type.is_encrypted() || self.output_type.is_signed() {
            Cow::Owned(self.format())
        } else {
            Cow::Borrowed(self.body.as_deref().unwrap_or_default())
        }
    }

    pub fn get_as_string(&self) -> Result<String, FormatError> {
        self.default_encoding.decode(&self.get_bytes())
    }

    pub fn get_as_string_with(&self, encoding: &str) -> Result<String, FormatError> {
        encoding.parse::<TextEncoding>()?.decode(&self.get_bytes())
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn wrapped_session_key(&self) -> Option<&[u8]> {
        self.wrapped_session_key.as_deref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    pub(crate) fn set_encrypted(&mut self, iv: Vec<u8>, wrapped_session_key: Vec<u8>, ciphertext: Vec<u8>) {
        self.iv = Some(iv).filter(|bytes| !bytes.is_empty());
        self.wrapped_session_key = Some(wrapped_session_key);
        self.body = Some(ciphertext);
        self.output_type = self.output_type.with_encrypted();
    }

    /// Attaches a signature. The body is replaced by the plaintext only when
    /// the output does not already carry ciphertext.
    pub(crate) fn set_signed(&mut self, signature: Vec<u8>, plaintext: &[u8]) {
        if !self.output_type.is_encrypted() {
            self.body = Some(plaintext.to_vec());
        }
        self.signature = Some(signature);
        self.output_type = self.output_type.with_signed();
    }

    fn derived_type(&self) -> OutputType {
        let mut output_type = OutputType::PLAIN;
        if self.wrapped_session_key.is_some() {
            output_type = output_type.with_encrypted();
        }
        if self.signature.is_some() {
            output_type = output_type.with_signed();
        }
        output_type
    }
}

fn read_field(input: &mut &[u8], field: &'static str) -> Result<Option<Vec<u8>>, FormatError> {
    if input.remaining() < LENGTH_PREFIX_SIZE {
        return Err(FormatError::TruncatedPrefix { field });
    }
    let declared = input.get_i32();
    if declared < 0 {
        return Err(FormatError::NegativeLength { field, declared });
    }
    let declared = declared as usize;
    if declared > input.remaining() {
        return Err(FormatError::LengthOverrun {
            field,
            declared,
            remaining: input.remaining(),
        });
    }
    // A zero length reads back as absent.
    if declared == 0 {
        return Ok(None);
    }
    let mut bytes = vec![0u8; declared];
    input.copy_to_slice(&mut bytes);
    Ok(Some(bytes))
}

fn write_field(buf: &mut BytesMut, field: Option<&[u8]>) {
    match field {
        Some(bytes) if !bytes.is_empty() => {
            debug_assert!(bytes.len() <= MAX_FIELD_LEN);
            buf.put_i32(bytes.len() as i32);
            buf.put_slice(bytes);
        }
        _ => buf.put_i32(0),
    }
}

fn strip_ascii_whitespace(buffer: &[u8]) -> Cow<'_, [u8]> {
    if buffer.iter().any(u8::is_ascii_whitespace) {
        Cow::Owned(
            buffer
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(buffer)
    }
}
