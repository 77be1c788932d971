use std::collections::HashMap;

#[cfg(feature = "x509-parser")]
use pki_types::CertificateDer;
use yasna::models::ObjectIdentifier;

use crate::eku::ExtendedKeyUsage;
use crate::ext::{
	Criticality, EncodingState, Extension, Extensions, KnownExtension, RawExtension,
	UnrecognizedExtension,
};
use crate::oid;
use crate::registry::{DuplicatePolicy, Registration};
use crate::Error;

/// The codec an extension OID is dispatched to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ExtensionKind {
	/// [`ExtendedKeyUsage`]
	ExtendedKeyUsage,
}

impl ExtensionKind {
	const ALL: &'static [ExtensionKind] = &[ExtensionKind::ExtendedKeyUsage];

	/// OID components the kind's codec is filed under
	pub fn oid(self) -> &'static [u64] {
		match self {
			ExtensionKind::ExtendedKeyUsage => ExtendedKeyUsage::OID,
		}
	}

	/// Display name of the kind's codec
	pub fn name(self) -> &'static str {
		match self {
			ExtensionKind::ExtendedKeyUsage => ExtendedKeyUsage::NAME,
		}
	}

	fn decode(self, critical: bool, value: &[u8]) -> Result<ParsedExtension, Error> {
		Ok(match self {
			ExtensionKind::ExtendedKeyUsage => {
				ParsedExtension::ExtendedKeyUsage(Extension::decode(critical, value)?)
			},
		})
	}
}

/// An entry of an [`ExtensionRegistry`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtensionDescriptor {
	oid: ObjectIdentifier,
	kind: ExtensionKind,
	name: String,
}

impl ExtensionDescriptor {
	/// The extension's OID
	pub fn oid(&self) -> &ObjectIdentifier {
		&self.oid
	}

	/// The codec the OID dispatches to
	pub fn kind(&self) -> ExtensionKind {
		self.kind
	}

	/// Display name of the extension
	pub fn name(&self) -> &str {
		&self.name
	}
}

/// Maps extension OIDs to the codecs that understand them.
///
/// Certificate parsers hand every extension they find to
/// [`ExtensionRegistry::decode`]; OIDs without a registered codec come back as
/// [`ParsedExtension::Unrecognized`] with their value kept verbatim.
#[derive(Clone, Debug)]
pub struct ExtensionRegistry {
	policy: DuplicatePolicy,
	entries: Vec<ExtensionDescriptor>,
	by_oid: HashMap<ObjectIdentifier, usize>,
	by_name: HashMap<String, usize>,
}

impl Default for ExtensionRegistry {
	fn default() -> Self {
		Self::builtin()
	}
}

impl ExtensionRegistry {
	/// An empty registry
	pub fn new(policy: DuplicatePolicy) -> Self {
		Self {
			policy,
			entries: Vec::new(),
			by_oid: HashMap::new(),
			by_name: HashMap::new(),
		}
	}

	/// A registry holding every codec this crate implements.
	///
	/// Duplicate registrations are ignored.
	pub fn builtin() -> Self {
		let mut registry = Self::new(DuplicatePolicy::Ignore);
		for &kind in ExtensionKind::ALL {
			let oid = ObjectIdentifier::from_slice(kind.oid());
			debug_assert!(registry.descriptor(&oid).is_none());
			registry.insert(kind, oid, kind.name());
		}
		tracing::debug!(count = registry.len(), "built extension registry");
		registry
	}

	/// File `oid` under `name`, dispatching to the codec of `kind`.
	///
	/// # Errors
	///
	/// Returns [`Error::UnexpectedExtension`] if `kind`'s codec is filed under
	/// another OID, and [`Error::DuplicateRegistration`] under
	/// [`DuplicatePolicy::Reject`] if the OID or the name is already taken.
	pub fn add_attribute(
		&mut self,
		kind: ExtensionKind,
		oid: ObjectIdentifier,
		name: &str,
	) -> Result<Registration, Error> {
		if oid.components().as_slice() != kind.oid() {
			return Err(Error::UnexpectedExtension {
				expected: ObjectIdentifier::from_slice(kind.oid()).to_string(),
				found: oid.to_string(),
			});
		}
		if let Some(&index) = self.by_oid.get(&oid) {
			let held = &self.entries[index].name;
			return self
				.policy
				.on_duplicate(format!("extension OID {} (held by {})", oid, held));
		}
		if let Some(&index) = self.by_name.get(name) {
			let held = &self.entries[index].oid;
			return self
				.policy
				.on_duplicate(format!("extension name {} (held by {})", name, held));
		}

		self.insert(kind, oid, name);
		Ok(Registration::Added)
	}

	fn insert(&mut self, kind: ExtensionKind, oid: ObjectIdentifier, name: &str) {
		let index = self.entries.len();
		self.by_oid.insert(oid.clone(), index);
		self.by_name.insert(name.to_owned(), index);
		self.entries.push(ExtensionDescriptor {
			oid,
			kind,
			name: name.to_owned(),
		});
	}

	/// Register the codec `V` under its own OID and name
	pub fn register<V: KnownExtension>(&mut self) -> Result<Registration, Error> {
		self.add_attribute(V::KIND, ObjectIdentifier::from_slice(V::OID), V::NAME)
	}

	/// The entry filed under `oid`
	pub fn descriptor(&self, oid: &ObjectIdentifier) -> Option<&ExtensionDescriptor> {
		self.by_oid.get(oid).map(|&index| &self.entries[index])
	}

	/// The entry filed under `name`
	pub fn descriptor_by_name(&self, name: &str) -> Option<&ExtensionDescriptor> {
		self.by_name.get(name).map(|&index| &self.entries[index])
	}

	/// Entries in registration order
	pub fn iter(&self) -> std::slice::Iter<'_, ExtensionDescriptor> {
		self.entries.iter()
	}

	/// Number of entries
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing is registered
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The policy applied to colliding registrations
	pub fn policy(&self) -> DuplicatePolicy {
		self.policy
	}

	/// Decode an extension from its parts.
	///
	/// `value` is the content of `extnValue`. A registered `oid` is decoded by
	/// its codec; any other `oid` yields [`ParsedExtension::Unrecognized`].
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidOid`] if `oid` has no DER encoding and
	/// [`Error::MalformedEncoding`] if a registered codec rejects `value`.
	pub fn decode(
		&self,
		oid: &ObjectIdentifier,
		critical: bool,
		value: &[u8],
	) -> Result<ParsedExtension, Error> {
		oid::check_encodable(oid)?;
		match self.descriptor(oid) {
			Some(descriptor) => descriptor.kind.decode(critical, value),
			None => {
				tracing::trace!(%oid, "no codec registered for extension");
				Ok(ParsedExtension::Unrecognized(Extension::with_criticality(
					UnrecognizedExtension::new(oid.clone(), value.to_vec()),
					critical.into(),
				)))
			},
		}
	}

	/// Decode a DER `Extension` structure
	pub fn parse_extension(&self, der: &[u8]) -> Result<ParsedExtension, Error> {
		let raw = RawExtension::from_der(der)?;
		self.decode(&raw.oid, raw.critical, &raw.value)
	}

	/// Decode a DER `Extensions` SEQUENCE; empty input gives an empty collection.
	///
	/// # Errors
	///
	/// Returns [`Error::DuplicateExtension`] if an OID appears twice and
	/// [`Error::MalformedEncoding`] on bad DER.
	pub fn parse_extensions(&self, der: &[u8]) -> Result<Extensions, Error> {
		if der.is_empty() {
			return Ok(Extensions::default());
		}
		let raws = yasna::parse_der(der, |reader| {
			let mut raws = Vec::new();
			reader.read_sequence_of(|reader| {
				raws.push(RawExtension::read(reader)?);
				Ok(())
			})?;
			Ok(raws)
		})?;

		let mut extensions = Extensions::default();
		for raw in raws {
			extensions.add_extension(self.decode(&raw.oid, raw.critical, &raw.value)?)?;
		}
		Ok(extensions)
	}

	/// Decode an extension found by x509-parser
	#[cfg(feature = "x509-parser")]
	pub fn decode_x509(
		&self,
		ext: &x509_parser::extensions::X509Extension<'_>,
	) -> Result<ParsedExtension, Error> {
		let oid = ext
			.oid
			.iter()
			.ok_or(Error::CouldNotParseCertificate)?
			.collect::<Vec<_>>();
		self.decode(&ObjectIdentifier::from_slice(&oid), ext.critical, ext.value)
	}

	/// Decode every extension of a DER certificate
	#[cfg(feature = "x509-parser")]
	pub fn decode_certificate_extensions(
		&self,
		cert: &CertificateDer<'_>,
	) -> Result<Extensions, Error> {
		let (_remainder, x509) = x509_parser::parse_x509_certificate(cert.as_ref())
			.or(Err(Error::CouldNotParseCertificate))?;

		let mut extensions = Extensions::default();
		for ext in x509.extensions() {
			extensions.add_extension(self.decode_x509(ext)?)?;
		}
		Ok(extensions)
	}
}

/// A decoded extension, typed by the codec it was dispatched to
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ParsedExtension {
	/// 2.5.29.37
	ExtendedKeyUsage(Extension<ExtendedKeyUsage>),
	/// Any OID without a registered codec
	Unrecognized(Extension<UnrecognizedExtension>),
}

macro_rules! each_extension {
	($self:expr, $ext:ident => $body:expr) => {
		match $self {
			ParsedExtension::ExtendedKeyUsage($ext) => $body,
			ParsedExtension::Unrecognized($ext) => $body,
		}
	};
}

impl ParsedExtension {
	/// The codec the extension was decoded with, `None` if unrecognized
	pub fn kind(&self) -> Option<ExtensionKind> {
		match self {
			ParsedExtension::ExtendedKeyUsage(_) => Some(ExtensionKind::ExtendedKeyUsage),
			ParsedExtension::Unrecognized(_) => None,
		}
	}

	/// Return the OID of the extension.
	pub fn oid(&self) -> ObjectIdentifier {
		each_extension!(self, ext => ext.oid())
	}

	/// Return the criticality of the extension.
	pub fn criticality(&self) -> Criticality {
		each_extension!(self, ext => ext.criticality())
	}

	/// Whether the extension is marked critical
	pub fn is_critical(&self) -> bool {
		each_extension!(self, ext => ext.is_critical())
	}

	/// See [`Extension::set_critical`]
	pub fn set_critical(&mut self, critical: bool) {
		each_extension!(self, ext => ext.set_critical(critical))
	}

	/// See [`Extension::encode`]
	pub fn encode(&mut self) -> &[u8] {
		each_extension!(self, ext => ext.encode())
	}

	/// See [`Extension::state`]
	pub fn state(&self) -> EncodingState {
		each_extension!(self, ext => ext.state())
	}
}

impl From<Extension<ExtendedKeyUsage>> for ParsedExtension {
	fn from(ext: Extension<ExtendedKeyUsage>) -> Self {
		ParsedExtension::ExtendedKeyUsage(ext)
	}
}

impl From<Extension<UnrecognizedExtension>> for ParsedExtension {
	fn from(ext: Extension<UnrecognizedExtension>) -> Self {
		ParsedExtension::Unrecognized(ext)
	}
}
