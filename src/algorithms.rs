pub mod asymmetric;
pub mod descriptor;
pub mod provider;
pub mod signature;
pub mod symmetric;

pub use asymmetric::KeyWrapAlgorithm;
pub use descriptor::AlgorithmDescriptor;
pub use provider::CryptoProvider;
pub use signature::SignatureAlgorithm;
pub use symmetric::{CipherMode, SymmetricCipher};
