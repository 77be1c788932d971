use std::collections::HashSet;
use std::fmt::Debug;

use yasna::models::ObjectIdentifier;
use yasna::{ASN1Result, BERReader, DERWriter};

use crate::oid_map::{ExtensionKind, ParsedExtension};
use crate::Error;

/// The criticality of an extension.
///
/// This controls how a certificate-using system should handle an unrecognized or un-parsable
/// extension.
///
/// See [RFC 5280 Section 4.2] for more information.
///
/// [RFC 5280 Section 4.2]: <https://www.rfc-editor.org/rfc/rfc5280#section-4.2>
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Criticality {
	/// The extension MUST be recognized and parsed correctly.
	///
	/// A certificate-using system MUST reject the certificate if it encounters a critical
	/// extension it does not recognize or a critical extension that contains information that it
	/// cannot process.
	Critical,

	/// The extension MAY be ignored if it is not recognized or parsed correctly.
	///
	/// A non-critical extension MAY be ignored if it is not recognized, but MUST be
	/// processed if it is recognized
	#[default]
	NonCritical,
}

impl Criticality {
	/// Whether this is [`Criticality::Critical`]
	pub fn is_critical(self) -> bool {
		matches!(self, Criticality::Critical)
	}
}

impl From<bool> for Criticality {
	fn from(critical: bool) -> Self {
		match critical {
			true => Criticality::Critical,
			false => Criticality::NonCritical,
		}
	}
}

/// The content of an X.509 extension.
///
/// Every content type knows the OID it is filed under and can write its value,
/// the DER that ends up inside the `extnValue` OCTET STRING.
pub trait ExtensionValue: Debug {
	/// Return the OID of the extension.
	fn oid(&self) -> ObjectIdentifier;

	/// Write the extension's value to the DER writer.
	fn write_value(&self, writer: DERWriter);
}

/// An extension content type with a fixed OID and a decoder, eligible for
/// registration in an [`ExtensionRegistry`](crate::ExtensionRegistry).
pub trait KnownExtension: ExtensionValue + Sized {
	/// OID components of the extension
	const OID: &'static [u64];
	/// Display name used in the registry
	const NAME: &'static str;
	/// Dispatch tag used in the registry
	const KIND: ExtensionKind;

	/// Read the extension's value from the DER reader.
	fn read_value(reader: BERReader) -> ASN1Result<Self>;
}

/// Whether an [`Extension`] currently holds a valid cached encoding
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EncodingState {
	/// Only the logical content is known; the next `encode` computes the DER
	LogicalOnly,
	/// The cached DER matches the current OID, criticality and content
	Encoded,
}

/// Counters describing how [`Extension::encode`] served its callers
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EncodingStats {
	/// Number of times the DER was computed
	pub computed: u64,
	/// Number of times the cached DER was returned unchanged
	pub reused: u64,
}

/// An X.509 extension: content, criticality and a cached encoding.
///
/// The encoding is computed by the first [`Extension::encode`] and returned
/// unchanged by later calls until something invalidates it. Content changes
/// and criticality changes made through [`Extension::set_critical`]
/// invalidate the cache, but only when they actually change something.
///
/// There is no internal locking: `encode` and every mutator take `&mut self`.
#[derive(Clone, Debug)]
pub struct Extension<V> {
	value: V,
	criticality: Criticality,
	cache: Option<Vec<u8>>,
	stats: EncodingStats,
}

impl<V: PartialEq> PartialEq for Extension<V> {
	fn eq(&self, other: &Self) -> bool {
		(&self.value, self.criticality) == (&other.value, other.criticality)
	}
}

impl<V: Eq> Eq for Extension<V> {}

impl<V: ExtensionValue> Extension<V> {
	/// A non-critical extension holding `value`
	pub fn new(value: V) -> Self {
		Self::with_criticality(value, Criticality::NonCritical)
	}

	/// An extension holding `value` with the given criticality
	pub fn with_criticality(value: V, criticality: Criticality) -> Self {
		Self {
			value,
			criticality,
			cache: None,
			stats: EncodingStats::default(),
		}
	}

	/// Return the OID of the extension.
	pub fn oid(&self) -> ObjectIdentifier {
		self.value.oid()
	}

	/// Return the criticality of the extension.
	pub fn criticality(&self) -> Criticality {
		self.criticality
	}

	/// Whether the extension is marked critical
	pub fn is_critical(&self) -> bool {
		self.criticality.is_critical()
	}

	/// Sets the criticality flag of the extension.
	///
	/// Setting the value the extension already has keeps the cached encoding.
	pub fn set_critical(&mut self, critical: bool) {
		let criticality = Criticality::from(critical);
		if self.criticality != criticality {
			self.criticality = criticality;
			self.invalidate();
		}
	}

	/// The logical content
	pub fn value(&self) -> &V {
		&self.value
	}

	/// Take the logical content out of the extension
	pub fn into_value(self) -> V {
		self.value
	}

	/// Change the content through `change`, which must return whether it
	/// altered anything. The cached encoding is dropped exactly when it did.
	pub(crate) fn modify(&mut self, change: impl FnOnce(&mut V) -> bool) -> bool {
		let changed = change(&mut self.value);
		if changed {
			self.invalidate();
		}
		changed
	}

	fn invalidate(&mut self) {
		if self.cache.take().is_some() {
			tracing::trace!(oid = %self.value.oid(), "dropped cached extension encoding");
		}
	}

	/// Whether a cached encoding is available
	pub fn state(&self) -> EncodingState {
		match self.cache {
			Some(_) => EncodingState::Encoded,
			None => EncodingState::LogicalOnly,
		}
	}

	/// The cached encoding, if any
	pub fn cached(&self) -> Option<&[u8]> {
		self.cache.as_deref()
	}

	/// How often the encoding was computed and reused
	pub fn stats(&self) -> EncodingStats {
		self.stats
	}

	/// The DER encoding of the whole `Extension` structure.
	///
	/// ```text
	/// Extension ::= SEQUENCE {
	///   extnID    OBJECT IDENTIFIER,
	///   critical  BOOLEAN DEFAULT FALSE,
	///   extnValue OCTET STRING }
	/// ```
	///
	/// # Panics
	///
	/// Panics if the content carries an OID with no DER encoding, which only
	/// happens for content built directly through
	/// [`UnrecognizedExtension::new`] or [`ExtendedKeyUsage::new`](crate::ExtendedKeyUsage::new).
	pub fn encode(&mut self) -> &[u8] {
		if self.cache.is_some() {
			self.stats.reused += 1;
		} else {
			let der = yasna::construct_der(|writer| {
				write_extension(writer, &self.value, self.criticality)
			});
			self.stats.computed += 1;
			tracing::trace!(oid = %self.value.oid(), len = der.len(), "encoded extension");
			self.cache = Some(der);
		}
		self.cache.as_deref().unwrap_or_default()
	}

	/// Write the extension to the DER writer, reusing the cached encoding.
	///
	/// # Panics
	///
	/// Panics where [`Extension::encode`] does.
	pub fn write_der(&mut self, writer: DERWriter) {
		writer.write_der(self.encode());
	}
}

impl<V: KnownExtension> Extension<V> {
	/// Decode the extension from its already unwrapped `extnValue` content.
	///
	/// # Errors
	///
	/// Returns [`Error::MalformedEncoding`] if `value` is not a DER encoding of
	/// the content type.
	pub fn decode(critical: bool, value: &[u8]) -> Result<Self, Error> {
		let value = yasna::parse_der(value, V::read_value)?;
		Ok(Self::with_criticality(value, critical.into()))
	}

	/// Decode a whole `Extension` structure.
	///
	/// # Errors
	///
	/// Returns [`Error::UnexpectedExtension`] if the encoded OID is not
	/// [`KnownExtension::OID`] and [`Error::MalformedEncoding`] on bad DER.
	pub fn from_der(der: &[u8]) -> Result<Self, Error> {
		let raw = RawExtension::from_der(der)?;
		if raw.oid.components().as_slice() != V::OID {
			return Err(Error::UnexpectedExtension {
				expected: ObjectIdentifier::from_slice(V::OID).to_string(),
				found: raw.oid.to_string(),
			});
		}
		Self::decode(raw.critical, &raw.value)
	}
}

/// Writes the `Extension` SEQUENCE for `value`. FALSE criticality is omitted,
/// as DER requires for a DEFAULT value.
fn write_extension(writer: DERWriter, value: &impl ExtensionValue, criticality: Criticality) {
	writer.write_sequence(|writer| {
		writer.next().write_oid(&value.oid());
		if criticality.is_critical() {
			writer.next().write_bool(true);
		}
		writer
			.next()
			.write_bytes(&yasna::construct_der(|writer| value.write_value(writer)));
	});
}

/// An `Extension` structure with its value still undecoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawExtension {
	pub(crate) oid: ObjectIdentifier,
	pub(crate) critical: bool,
	pub(crate) value: Vec<u8>,
}

impl RawExtension {
	pub(crate) fn from_der(der: &[u8]) -> Result<Self, Error> {
		Ok(yasna::parse_der(der, Self::read)?)
	}

	pub(crate) fn read(reader: BERReader) -> ASN1Result<Self> {
		reader.read_sequence(|reader| {
			let oid = reader.next().read_oid()?;
			let critical = reader
				.read_optional(|reader| reader.read_bool())?
				.unwrap_or(false);
			let value = reader.next().read_bytes()?;
			Ok(Self {
				oid,
				critical,
				value,
			})
		})
	}
}

/// Content of an extension whose OID has no registered codec.
///
/// The value is kept as the raw bytes found in `extnValue` and written back
/// verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnrecognizedExtension {
	oid: ObjectIdentifier,
	content: Vec<u8>,
}

impl UnrecognizedExtension {
	/// Wrap `content`, the DER found inside `extnValue`.
	///
	/// `oid` is not checked; [`ExtensionRegistry::decode`](crate::ExtensionRegistry::decode)
	/// is the checked way to build one.
	pub fn new(oid: ObjectIdentifier, content: Vec<u8>) -> Self {
		Self { oid, content }
	}

	/// Obtains the content of the extension.
	pub fn content(&self) -> &[u8] {
		&self.content
	}
}

impl ExtensionValue for UnrecognizedExtension {
	fn oid(&self) -> ObjectIdentifier {
		self.oid.clone()
	}

	fn write_value(&self, writer: DERWriter) {
		writer.write_der(&self.content);
	}
}

/// A collection of X.509 extensions.
///
/// Preserves the order that extensions were added and maintains the invariant that
/// there are no duplicate extension OIDs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extensions {
	exts: Vec<ParsedExtension>,
	oids: HashSet<ObjectIdentifier>,
}

impl Extensions {
	/// Construct a set of extensions from an iterator of extensions.
	///
	/// # Errors
	///
	/// Returns [Error::DuplicateExtension] if any of the extensions have the same OID.
	pub fn new(extensions: impl IntoIterator<Item = ParsedExtension>) -> Result<Self, Error> {
		let mut result = Self::default();
		result.add_extensions(extensions)?;
		Ok(result)
	}

	/// Add an extension to the collection.
	///
	/// # Errors
	///
	/// Returns [Error::DuplicateExtension] if the extension's OID is already present in the collection.
	pub fn add_extension(&mut self, extension: ParsedExtension) -> Result<(), Error> {
		let oid = extension.oid();
		if self.oids.contains(&oid) {
			return Err(Error::DuplicateExtension(oid.to_string()));
		}

		self.oids.insert(oid);
		self.exts.push(extension);
		Ok(())
	}

	/// Add every extension of `extensions`, stopping at the first duplicate
	pub fn add_extensions(
		&mut self,
		extensions: impl IntoIterator<Item = ParsedExtension>,
	) -> Result<(), Error> {
		for ext in extensions {
			self.add_extension(ext)?
		}
		Ok(())
	}

	/// The extension filed under `oid`
	pub fn get(&self, oid: &ObjectIdentifier) -> Option<&ParsedExtension> {
		self.exts.iter().find(|ext| &ext.oid() == oid)
	}

	/// Mutable access to the extension filed under `oid`
	pub fn get_mut(&mut self, oid: &ObjectIdentifier) -> Option<&mut ParsedExtension> {
		self.exts.iter_mut().find(|ext| &ext.oid() == oid)
	}

	/// Extensions in insertion order
	pub fn iter(&self) -> std::slice::Iter<'_, ParsedExtension> {
		self.exts.iter()
	}

	/// Number of extensions
	pub fn len(&self) -> usize {
		self.exts.len()
	}

	/// Whether the collection is empty
	pub fn is_empty(&self) -> bool {
		self.exts.is_empty()
	}

	/// Write the SEQUENCE of extensions to the DER writer.
	///
	/// This will return without writing anything if there are no extensions in the collection.
	///
	/// # Panics
	///
	/// Panics where [`Extension::encode`] does.
	pub fn write_der(&mut self, writer: DERWriter) {
		debug_assert_eq!(self.exts.len(), self.oids.len());

		// Avoid writing an empty extensions sequence.
		if self.exts.is_empty() {
			return;
		}

		// Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension
		writer.write_sequence(|writer| {
			for extension in self.exts.iter_mut() {
				writer.next().write_der(extension.encode());
			}
		})
	}

	/// The DER encoding of the collection; empty if there are no extensions
	pub fn to_der(&mut self) -> Vec<u8> {
		if self.exts.is_empty() {
			return Vec::new();
		}
		yasna::construct_der(|writer| self.write_der(writer))
	}
}

impl IntoIterator for Extensions {
	type Item = ParsedExtension;
	type IntoIter = std::vec::IntoIter<ParsedExtension>;

	fn into_iter(self) -> Self::IntoIter {
		self.exts.into_iter()
	}
}

#[cfg(test)]
mod extensions_tests {
	use super::Criticality::*;
	use super::*;

	fn dummy(oid: &[u64], criticality: Criticality, der: &[u8]) -> ParsedExtension {
		ParsedExtension::Unrecognized(Extension::with_criticality(
			UnrecognizedExtension::new(ObjectIdentifier::from_slice(oid), der.to_vec()),
			criticality,
		))
	}

	#[test]
	fn test_no_duplicates() {
		let oid = ObjectIdentifier::from_slice(&[2, 5, 29, 17]);
		let ext = dummy(&[2, 5, 29, 17], NonCritical, &[]);

		// It should be an error to add two extensions with the same OID.
		let mut exts = Extensions::default();
		exts.add_extension(ext.clone()).unwrap();
		assert_eq!(
			exts.add_extension(ext.clone()),
			Err(Error::DuplicateExtension(oid.to_string())),
		);

		// Or to construct an extensions set from an iterator containing two extensions with the
		// same OID.
		assert_eq!(
			Extensions::new(vec![ext.clone(), ext.clone()]).unwrap_err(),
			Error::DuplicateExtension(oid.to_string()),
		);
	}

	#[test]
	fn test_write_der() {
		// Construct three dummy extensions.
		let ext_a = dummy(&[1, 3, 6, 1, 4, 3], Critical, b"a");
		let ext_b = dummy(&[1, 3, 6, 1, 4, 2], NonCritical, b"b");
		let ext_c = dummy(&[1, 3, 6, 1, 4, 1], Critical, b"c");

		// Items of note:
		// - We expect the extensions to be written in the order they were added.
		// - The ext_b criticality is elided because it is non-critical - it would be a mis-encoding
		//   to write a value for a FALSE BOOLEAN in DER.
		// - Each extension DER value should have been written unmodified, with no extra tags
		//   or length bytes.
		#[rustfmt::skip]
		let expected_der = vec![
			0x30, 0x2A, // exts SEQUENCE
			0x30, 0x0D, // ext_a SEQUENCE
			0x06, 0x05, 0x2B, 0x06, 0x01, 0x04, 0x03, // ext_a OID
			0x01, 0x01, 0xFF, // ext_a CRITICAL = true
			0x04, 0x01, 0x61, // ext_a OCTET STRING "a" (0x61)
			0x30, 0x0A, // ext_b SEQUENCE
			0x06, 0x05, 0x2B, 0x06, 0x01, 0x04, 0x02, // ext_b OID
			// ext_b criticality elided
			0x04, 0x01, 0x62, // ext_b OCTET STRING "b" (0x62)
			0x30, 0x0D, // ext_c SEQUENCE
			0x06, 0x05, 0x2B, 0x06, 0x01, 0x04, 0x01, // ext_c OID
			0x01, 0x01, 0xFF, // ext_c CRITICAL = true
			0x04, 0x01, 0x63, // ext_c OCTET STRING "c" (0x63)
		];

		let mut exts = Extensions::new(vec![ext_a, ext_b, ext_c]).unwrap();
		assert_eq!(exts.to_der(), expected_der);
		assert_eq!(
			yasna::construct_der(|writer| exts.write_der(writer)),
			expected_der
		);
	}

	#[test]
	fn test_get_mut_changes_go_through_the_cache() {
		let oid = ObjectIdentifier::from_slice(&[1, 3, 6, 1, 4, 2]);
		let mut exts = Extensions::new(vec![
			dummy(&[1, 3, 6, 1, 4, 3], Critical, b"a"),
			dummy(&[1, 3, 6, 1, 4, 2], NonCritical, b"b"),
		])
		.unwrap();
		let before = exts.to_der();

		let ext = exts.get_mut(&oid).unwrap();
		assert_eq!(ext.state(), EncodingState::Encoded);
		ext.set_critical(true);
		assert_eq!(ext.state(), EncodingState::LogicalOnly);

		let after = exts.to_der();
		assert_eq!(after.len(), before.len() + 3);
		assert!(exts.get(&oid).unwrap().is_critical());
		assert!(exts
			.get_mut(&ObjectIdentifier::from_slice(&[2, 5, 29, 17]))
			.is_none());
	}

	#[test]
	fn test_empty_writes_nothing() {
		let mut exts = Extensions::default();
		assert!(exts.to_der().is_empty());
	}

	#[test]
	fn test_raw_extension_defaults_to_non_critical() {
		#[rustfmt::skip]
		let der = [
			0x30, 0x0A,
			0x06, 0x05, 0x2B, 0x06, 0x01, 0x04, 0x02,
			0x04, 0x01, 0x62,
		];
		let raw = RawExtension::from_der(&der).unwrap();
		assert_eq!(raw.oid, ObjectIdentifier::from_slice(&[1, 3, 6, 1, 4, 2]));
		assert!(!raw.critical);
		assert_eq!(raw.value, b"b");
	}

	#[test]
	fn test_raw_extension_rejects_trailing_data() {
		#[rustfmt::skip]
		let der = [
			0x30, 0x0A,
			0x06, 0x05, 0x2B, 0x06, 0x01, 0x04, 0x02,
			0x04, 0x01, 0x62,
			0x00,
		];
		assert!(matches!(
			RawExtension::from_der(&der),
			Err(Error::MalformedEncoding(_))
		));
	}
}

#[cfg(test)]
mod cache_tests {
	use super::*;

	fn opaque(critical: bool) -> Extension<UnrecognizedExtension> {
		Extension::with_criticality(
			UnrecognizedExtension::new(ObjectIdentifier::from_slice(&[1, 2, 3]), vec![0x05, 0x00]),
			critical.into(),
		)
	}

	#[test]
	fn starts_logical_only() {
		let ext = opaque(false);
		assert_eq!(ext.state(), EncodingState::LogicalOnly);
		assert_eq!(ext.cached(), None);
		assert_eq!(ext.stats(), EncodingStats::default());
	}

	#[test]
	fn encode_caches_and_reuses() {
		let mut ext = opaque(true);
		let first = ext.encode().to_vec();
		assert_eq!(ext.state(), EncodingState::Encoded);
		let second = ext.encode().to_vec();
		assert_eq!(first, second);
		assert_eq!(
			ext.stats(),
			EncodingStats {
				computed: 1,
				reused: 1
			}
		);
	}

	#[test]
	fn set_critical_same_value_keeps_cache() {
		let mut ext = opaque(false);
		ext.encode();
		ext.set_critical(false);
		assert_eq!(ext.state(), EncodingState::Encoded);
		ext.encode();
		assert_eq!(ext.stats().computed, 1);
	}

	#[test]
	fn set_critical_other_value_drops_cache() {
		let mut ext = opaque(false);
		let before = ext.encode().to_vec();
		ext.set_critical(true);
		assert_eq!(ext.state(), EncodingState::LogicalOnly);
		let after = ext.encode().to_vec();
		assert_ne!(before, after);
		assert_eq!(after.len(), before.len() + 3);
		assert_eq!(ext.stats().computed, 2);
	}

	#[test]
	fn modify_invalidates_only_on_change() {
		let mut ext = opaque(false);
		ext.encode();
		assert!(!ext.modify(|_| false));
		assert_eq!(ext.state(), EncodingState::Encoded);
		assert!(ext.modify(|value| {
			value.content = vec![0x01, 0x01, 0xFF];
			true
		}));
		assert_eq!(ext.state(), EncodingState::LogicalOnly);
	}

	#[test]
	fn equality_ignores_the_cache() {
		let mut a = opaque(true);
		let b = opaque(true);
		a.encode();
		assert_eq!(a, b);
		assert_ne!(a, opaque(false));
	}

	#[test]
	fn write_der_reuses_the_cache() {
		let mut ext = opaque(true);
		let encoded = ext.encode().to_vec();
		let written = yasna::construct_der(|writer| ext.write_der(writer));
		assert_eq!(written, encoded);
		assert_eq!(
			ext.stats(),
			EncodingStats {
				computed: 1,
				reused: 1
			}
		);
	}

	#[test]
	fn into_value_returns_the_content() {
		let mut ext = opaque(true);
		ext.encode();
		let value = ext.into_value();
		assert_eq!(value.oid(), ObjectIdentifier::from_slice(&[1, 2, 3]));
		assert_eq!(value.content(), [0x05, 0x00]);
	}

	#[test]
	#[should_panic(expected = "Invalid OID")]
	fn encoding_an_unencodable_oid_panics() {
		let mut ext = Extension::new(UnrecognizedExtension::new(
			ObjectIdentifier::from_slice(&[7]),
			vec![0x05, 0x00],
		));
		ext.encode();
	}
}
