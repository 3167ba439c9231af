//! Error types shared by every layer of the crate.
//!
//! 整个 crate 共用的错误类型。

use thiserror::Error;

/// A boxed error used as the chained cause of a security error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The category of a security error, without its payload.
///
/// 安全错误的类别（不含负载）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Repository,
    Certificate,
    Encryption,
    Decryption,
    Verification,
}

/// The base security error. Every public operation fails with exactly one of
/// these variants, with the provider-level cause attached where there is one.
///
/// 基础安全错误。每个公共操作只会以其中一个变体失败，并在存在底层原因时附带该原因。
#[derive(Debug, Error)]
pub enum Error {
    #[error("key repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("certificate error: {message}")]
    Certificate {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("encryption failed: {message}")]
    Encryption {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("decryption failed: {message}")]
    Decryption {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("verification failed: {message}")]
    Verification {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

macro_rules! error_constructors {
    ($(($plain:ident, $caused:ident, $variant:ident)),* $(,)?) => {
        impl Error {
            $(
                pub fn $plain(message: impl Into<String>) -> Self {
                    Error::$variant {
                        message: message.into(),
                        source: None,
                    }
                }

                pub fn $caused(
                    message: impl Into<String>,
                    source: impl Into<BoxError>,
                ) -> Self {
                    Error::$variant {
                        message: message.into(),
                        source: Some(source.into()),
                    }
                }
            )*
        }
    };
}

error_constructors!(
    (repository, repository_caused_by, Repository),
    (certificate, certificate_caused_by, Certificate),
    (encryption, encryption_caused_by, Encryption),
    (decryption, decryption_caused_by, Decryption),
    (verification, verification_caused_by, Verification),
);

impl Error {
    /// Returns the category of this error.
    ///
    /// 返回该错误的类别。
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Repository { .. } => ErrorKind::Repository,
            Error::Certificate { .. } => ErrorKind::Certificate,
            Error::Encryption { .. } => ErrorKind::Encryption,
            Error::Decryption { .. } => ErrorKind::Decryption,
            Error::Verification { .. } => ErrorKind::Verification,
        }
    }

    /// Returns the message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Repository { message, .. }
            | Error::Certificate { message, .. }
            | Error::Encryption { message, .. }
            | Error::Decryption { message, .. }
            | Error::Verification { message, .. } => message,
        }
    }
}

/// A failure reported by a cryptographic primitive (cipher, key wrap or
/// signature scheme). Never returned on its own; it is chained as the cause of
/// an [`Error`].
///
/// 密码学原语报告的失败。不会单独返回，而是作为 [`Error`] 的原因被链接。
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no such transform: {0}")]
    NoSuchTransform(String),

    #[error("no such key-wrap algorithm: {0}")]
    NoSuchKeyWrap(String),

    #[error("no such signature algorithm: {name} (oid {oid})")]
    NoSuchSignature { name: String, oid: String },

    #[error("unsupported key length {bits} bits for {algorithm}")]
    InvalidKeyLength { algorithm: String, bits: u32 },

    #[error("invalid IV length {actual}, expected {expected}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("bad padding or corrupt ciphertext")]
    BadPadding,

    #[error("authentication tag mismatch")]
    TagMismatch,

    #[error("authenticated encryption failed")]
    SealFailed,

    #[error("key type is not usable with {0}")]
    WrongKeyType(String),

    #[error(transparent)]
    Rsa(#[from] rsa::Error),
}

/// Errors raised while framing, unframing or decoding an output buffer.
///
/// 在对输出缓冲区进行组帧、拆帧或解码时产生的错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("buffer is not valid Base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("truncated length prefix for field {field}")]
    TruncatedPrefix { field: &'static str },

    #[error("field {field} declares negative length {declared}")]
    NegativeLength { field: &'static str, declared: i32 },

    #[error("field {field} declares {declared} bytes but only {remaining} remain")]
    LengthOverrun {
        field: &'static str,
        declared: usize,
        remaining: usize,
    },

    #[error("{0} trailing bytes after the signature field")]
    TrailingBytes(usize),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("bytes are not valid {0}")]
    InvalidText(&'static str),
}

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;
