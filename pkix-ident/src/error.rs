use std::fmt;

use crate::token::TokenKind;

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
/// The error type of the pkix-ident crate
pub enum Error {
	/// A string did not name a known algorithm, mode or padding token
	UnrecognizedToken {
		/// Which token table was consulted
		kind: TokenKind,
		/// The name as supplied by the caller
		name: String,
	},
	/// No catalog entry matches the requested OID, name or tuple
	AlgorithmNotFound(String),
	/// An object identifier that has no DER encoding
	InvalidOid(String),
	/// A DER structure does not have the expected tag or shape
	MalformedEncoding(String),
	/// An OID or name collided with an existing registry entry
	DuplicateRegistration(String),
	/// An extension collection already holds an extension with this OID
	DuplicateExtension(String),
	/// An encoded extension carries a different OID than the codec decoding it
	UnexpectedExtension {
		/// The OID the codec handles
		expected: String,
		/// The OID found in the encoding
		found: String,
	},
	/// The given certificate couldn't be parsed
	#[cfg(feature = "x509-parser")]
	CouldNotParseCertificate,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use self::Error::*;
		match self {
			UnrecognizedToken { kind, name } => write!(f, "Unrecognized {} \"{}\"", kind, name)?,
			AlgorithmNotFound(what) => write!(f, "Algorithm not found: {}", what)?,
			InvalidOid(oid) => write!(f, "Invalid OID {}", oid)?,
			MalformedEncoding(what) => write!(f, "Malformed DER encoding: {}", what)?,
			DuplicateRegistration(what) => write!(f, "Duplicate registration of {}", what)?,
			DuplicateExtension(oid) => {
				write!(f, "Extension with OID {} present multiple times", oid)?
			},
			UnexpectedExtension { expected, found } => write!(
				f,
				"Expected extension with OID {} but found {}",
				expected, found
			)?,
			#[cfg(feature = "x509-parser")]
			CouldNotParseCertificate => write!(f, "Could not parse certificate")?,
		};
		Ok(())
	}
}

impl std::error::Error for Error {}

impl From<yasna::ASN1Error> for Error {
	fn from(err: yasna::ASN1Error) -> Self {
		Error::MalformedEncoding(err.to_string())
	}
}
