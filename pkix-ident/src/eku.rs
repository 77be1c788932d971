use std::iter::FusedIterator;

use yasna::models::ObjectIdentifier;
use yasna::{ASN1Result, BERReader, DERWriter};

use crate::ext::{Extension, ExtensionValue, KnownExtension};
use crate::oid;
use crate::oid_map::ExtensionKind;
use crate::Error;

/// A purpose for which a certified public key may be used
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum KeyPurpose {
	/// anyExtendedKeyUsage
	Any,
	/// id-kp-serverAuth
	ServerAuth,
	/// id-kp-clientAuth
	ClientAuth,
	/// id-kp-codeSigning
	CodeSigning,
	/// id-kp-emailProtection
	EmailProtection,
	/// id-kp-timeStamping
	TimeStamping,
	/// id-kp-OCSPSigning
	OcspSigning,
	/// A custom purpose not from the pre-specified list of purposes
	Other(Vec<u64>),
}

impl KeyPurpose {
	/// The OID components of the purpose
	pub fn oid(&self) -> &[u64] {
		use KeyPurpose::*;
		match self {
			Any => oid::KP_ANY,
			ServerAuth => oid::KP_SERVER_AUTH,
			ClientAuth => oid::KP_CLIENT_AUTH,
			CodeSigning => oid::KP_CODE_SIGNING,
			EmailProtection => oid::KP_EMAIL_PROTECTION,
			TimeStamping => oid::KP_TIME_STAMPING,
			OcspSigning => oid::KP_OCSP_SIGNING,
			Other(oid) => oid,
		}
	}

	/// Name the purpose identified by `components`
	pub fn from_oid(components: &[u64]) -> Self {
		use KeyPurpose::*;
		match components {
			oid::KP_ANY => Any,
			oid::KP_SERVER_AUTH => ServerAuth,
			oid::KP_CLIENT_AUTH => ClientAuth,
			oid::KP_CODE_SIGNING => CodeSigning,
			oid::KP_EMAIL_PROTECTION => EmailProtection,
			oid::KP_TIME_STAMPING => TimeStamping,
			oid::KP_OCSP_SIGNING => OcspSigning,
			other => Other(other.to_vec()),
		}
	}

	/// The purpose as an object identifier
	pub fn to_object_identifier(&self) -> ObjectIdentifier {
		ObjectIdentifier::from_slice(self.oid())
	}
}

impl From<&ObjectIdentifier> for KeyPurpose {
	fn from(oid: &ObjectIdentifier) -> Self {
		Self::from_oid(oid.components())
	}
}

/// Content of an X.509v3 extended key usage extension according to
/// [RFC 5280 4.2.1.12](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12).
///
/// The purposes keep their insertion order. Insertion through
/// [`Extension::add_oid`] skips purposes that are already present, while
/// decoding keeps whatever the encoding contains, repeats included, so that a
/// decoded extension re-encodes to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExtendedKeyUsage {
	purposes: Vec<ObjectIdentifier>,
}

/// An extended key usage extension with its cached encoding
pub type ExtendedKeyUsageExtension = Extension<ExtendedKeyUsage>;

impl ExtendedKeyUsage {
	/// Collect `purposes`, dropping repeats after their first occurrence.
	///
	/// Purposes are not checked here; encoding one without a DER form panics.
	/// [`Extension::add_oid`] checks each OID as it goes.
	pub fn new(purposes: impl IntoIterator<Item = ObjectIdentifier>) -> Self {
		let mut eku = Self::default();
		for purpose in purposes {
			eku.insert(purpose);
		}
		eku
	}

	/// Collect named purposes, dropping repeats after their first occurrence
	pub fn from_purposes(purposes: impl IntoIterator<Item = KeyPurpose>) -> Self {
		Self::new(
			purposes
				.into_iter()
				.map(|purpose| purpose.to_object_identifier()),
		)
	}

	/// Whether `oid` is one of the purposes
	pub fn contains(&self, oid: &ObjectIdentifier) -> bool {
		self.purposes.contains(oid)
	}

	/// The purposes in order
	pub fn iter(&self) -> std::slice::Iter<'_, ObjectIdentifier> {
		self.purposes.iter()
	}

	/// Number of purposes
	pub fn len(&self) -> usize {
		self.purposes.len()
	}

	/// Whether there are no purposes
	pub fn is_empty(&self) -> bool {
		self.purposes.is_empty()
	}

	fn insert(&mut self, oid: ObjectIdentifier) -> bool {
		if self.contains(&oid) {
			return false;
		}
		self.purposes.push(oid);
		true
	}

	fn clear(&mut self) -> bool {
		let had_purposes = !self.purposes.is_empty();
		self.purposes.clear();
		had_purposes
	}
}

impl ExtensionValue for ExtendedKeyUsage {
	fn oid(&self) -> ObjectIdentifier {
		ObjectIdentifier::from_slice(oid::EXT_KEY_USAGE)
	}

	fn write_value(&self, writer: DERWriter) {
		/*
		  ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
		  KeyPurposeId ::= OBJECT IDENTIFIER
		*/
		writer.write_sequence(|writer| {
			for purpose in self.purposes.iter() {
				writer.next().write_oid(purpose);
			}
		});
	}
}

impl KnownExtension for ExtendedKeyUsage {
	const OID: &'static [u64] = oid::EXT_KEY_USAGE;
	const NAME: &'static str = "ExtendedKeyUsage";
	const KIND: ExtensionKind = ExtensionKind::ExtendedKeyUsage;

	fn read_value(reader: BERReader) -> ASN1Result<Self> {
		let mut purposes = Vec::new();
		reader.read_sequence_of(|reader| {
			purposes.push(reader.read_oid()?);
			Ok(())
		})?;
		Ok(Self { purposes })
	}
}

impl Extension<ExtendedKeyUsage> {
	/// Add `oid` unless it is already present.
	///
	/// The cached encoding survives when nothing was added.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidOid`] if `oid` has no DER encoding. The
	/// extension is left unchanged.
	pub fn add_oid(&mut self, oid: ObjectIdentifier) -> Result<(), Error> {
		oid::check_encodable(&oid)?;
		self.modify(|eku| eku.insert(oid));
		Ok(())
	}

	/// Add a named purpose unless it is already present.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidOid`] for a [`KeyPurpose::Other`] that has no
	/// DER encoding.
	pub fn add_purpose(&mut self, purpose: &KeyPurpose) -> Result<(), Error> {
		self.add_oid(purpose.to_object_identifier())
	}

	/// Remove every purpose
	pub fn delete_all_oids(&mut self) {
		self.modify(ExtendedKeyUsage::clear);
	}

	/// The purposes as they are now.
	///
	/// The iterator owns a copy, so later changes to the extension do not
	/// show through it.
	pub fn oids(&self) -> Oids {
		Oids(self.value().purposes.clone().into_iter())
	}

	/// The purposes as they are now, by name where one is known
	pub fn purposes(&self) -> impl Iterator<Item = KeyPurpose> {
		self.oids().map(|oid| KeyPurpose::from(&oid))
	}
}

/// Iterator over a snapshot of an extended key usage extension's purposes
#[derive(Debug)]
pub struct Oids(std::vec::IntoIter<ObjectIdentifier>);

impl Iterator for Oids {
	type Item = ObjectIdentifier;

	fn next(&mut self) -> Option<ObjectIdentifier> {
		self.0.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

impl ExactSizeIterator for Oids {}

impl FusedIterator for Oids {}
