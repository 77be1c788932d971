/*!
Identity registries for symmetric cipher configurations and X.509 extensions

This crate names things; it does not encrypt or sign. It provides

* an [`AlgorithmRegistry`] over the built-in catalog of symmetric cipher
  configurations ([`algo`]), searchable by OID, by display name and by
  `(algorithm, mode, padding, key strength)`,
* an [`ExtensionRegistry`] mapping X.509 extension OIDs to codecs, used by
  certificate parsers to turn raw extensions into typed values,
* the [`Extension`] codec contract with its cached DER encoding, and
* the Extended Key Usage codec ([`ExtendedKeyUsage`]).

## Example

```
use pkix_ident::{AlgorithmRegistry, ExtendedKeyUsage, Extension, KeyPurpose};

let registry = AlgorithmRegistry::builtin();
let aes = registry.lookup("AES", "CBC", "NoPadding", 128).unwrap();
assert_eq!(aes, &pkix_ident::AES_128_CBC);
assert_eq!(registry.lookup_by_oid(&aes.oid().unwrap()).unwrap(), aes);

let mut eku = Extension::new(ExtendedKeyUsage::from_purposes([KeyPurpose::ServerAuth]));
eku.set_critical(true);
let der = eku.encode().to_vec();
assert_eq!(Extension::<ExtendedKeyUsage>::from_der(&der).unwrap(), eku);
```
*/
#![forbid(unsafe_code)]
#![forbid(non_ascii_idents)]
#![deny(missing_docs)]
#![allow(clippy::complexity, clippy::style, clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use crate::eku::{ExtendedKeyUsage, ExtendedKeyUsageExtension, KeyPurpose, Oids};
pub use crate::enc_algo::algo::*;
pub use crate::enc_algo::{AlgorithmIdentity, AlgorithmRegistry};
pub use crate::error::Error;
pub use crate::ext::{
	Criticality, EncodingState, EncodingStats, Extension, ExtensionValue, Extensions,
	KnownExtension, UnrecognizedExtension,
};
pub use crate::oid_map::{ExtensionDescriptor, ExtensionKind, ExtensionRegistry, ParsedExtension};
pub use crate::registry::{DuplicatePolicy, Registration, SharedRegistry};
pub use crate::token::{Alg, Mode, Padding, Token, TokenKind, TokenTable, TokenTables};

mod eku;
mod enc_algo;
mod error;
mod ext;
pub mod oid;
mod oid_map;
mod registry;
mod token;

/// The built-in symmetric algorithm catalog
pub mod algo {
	pub use crate::enc_algo::algo::*;
}
