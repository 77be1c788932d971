use std::collections::HashMap;
use std::fmt;

use yasna::models::ObjectIdentifier;

use crate::registry::{DuplicatePolicy, Registration};
use crate::token::{Alg, Mode, Padding, TokenTables};
use crate::Error;

/// Identity of a symmetric encryption configuration.
///
/// An identity only names a configuration: the engine that performs the
/// operation selects it by OID or by structural lookup and never constructs
/// new ones at runtime. The built-in catalog lives in [`algo`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AlgorithmIdentity {
	label: &'static str,
	alg: Alg,
	mode: Mode,
	padding: Padding,
	block_size: usize,
	key_strength: u32,
	oid_components: Option<&'static [u64]>,
	name: &'static str,
}

impl fmt::Debug for AlgorithmIdentity {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.label)
	}
}

impl fmt::Display for AlgorithmIdentity {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl AlgorithmIdentity {
	/// Describe a configuration without an OID.
	///
	/// `label` is the constant-style identifier printed by `Debug`; `name` is
	/// the composite display name, conventionally `ALG/MODE/PADDING`.
	pub const fn new(
		label: &'static str,
		alg: Alg,
		mode: Mode,
		padding: Padding,
		block_size: usize,
		key_strength: u32,
		name: &'static str,
	) -> Self {
		Self {
			label,
			alg,
			mode,
			padding,
			block_size,
			key_strength,
			oid_components: None,
			name,
		}
	}

	/// Attach an OID to the configuration
	pub const fn with_oid(mut self, oid: &'static [u64]) -> Self {
		self.oid_components = Some(oid);
		self
	}

	/// The base algorithm, e.g. `AES` for `AES/CBC/NoPadding`
	pub fn alg(&self) -> Alg {
		self.alg
	}

	/// The mode of operation
	pub fn mode(&self) -> Mode {
		self.mode
	}

	/// The padding scheme
	pub fn padding(&self) -> Padding {
		self.padding
	}

	/// Whether the algorithm pads its input
	pub fn is_padded(&self) -> bool {
		self.padding != Padding::None
	}

	/// Block size in bytes. Stream ciphers report 1.
	pub fn block_size(&self) -> usize {
		self.block_size
	}

	/// Key strength in bits. Variable-length ciphers (RC4, RC2) report 0.
	pub fn key_strength(&self) -> u32 {
		self.key_strength
	}

	/// The OID naming this configuration, if it has one
	pub fn oid(&self) -> Option<ObjectIdentifier> {
		self.oid_components.map(ObjectIdentifier::from_slice)
	}

	/// The raw OID components, if any
	pub fn oid_components(&self) -> Option<&'static [u64]> {
		self.oid_components
	}

	/// Composite display name
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Constant-style identifier, e.g. `AES_128_CBC`
	pub fn label(&self) -> &'static str {
		self.label
	}

	/// The built-in catalog in registration order
	pub fn iter() -> std::slice::Iter<'static, &'static AlgorithmIdentity> {
		use algo::*;
		static ALGORITHMS: &[&AlgorithmIdentity] = &[
			&RC4,
			&DES_ECB,
			&DES_CBC,
			&DES_CBC_PAD,
			&DES3_ECB,
			&DES3_CBC,
			&DES3_CBC_PAD,
			&RC2_CBC,
			&RC2_CBC_PAD,
			&AES_128_ECB,
			&AES_128_CBC,
			&AES_128_CBC_PAD,
			&AES_192_ECB,
			&AES_192_CBC,
			&AES_192_CBC_PAD,
			&AES_256_ECB,
			&AES_256_CBC,
			&AES_CBC_PAD,
			&AES_256_CBC_PAD,
			&AES_128_KEY_WRAP_KWP,
			&AES_192_KEY_WRAP_KWP,
			&AES_256_KEY_WRAP_KWP,
		];
		ALGORITHMS.iter()
	}

	fn matches(&self, alg: Alg, mode: Mode, padding: Padding, key_strength: u32) -> bool {
		(self.alg, self.mode, self.padding) == (alg, mode, padding)
			&& (self.key_strength == 0 || self.key_strength == key_strength)
	}
}

/// The built-in symmetric algorithm catalog
pub mod algo {
	use super::*;
	use crate::oid;

	/// RC4 stream cipher with a variable-length key
	pub static RC4: AlgorithmIdentity =
		AlgorithmIdentity::new("RC4", Alg::Rc4, Mode::None, Padding::None, 1, 0, "RC4/NONE/NoPadding")
			.with_oid(oid::RC4);

	/// Single DES in ECB mode
	pub static DES_ECB: AlgorithmIdentity =
		AlgorithmIdentity::new("DES_ECB", Alg::Des, Mode::Ecb, Padding::None, 8, 56, "DES/ECB/NoPadding")
			.with_oid(oid::DES_ECB);

	/// Single DES in CBC mode
	pub static DES_CBC: AlgorithmIdentity =
		AlgorithmIdentity::new("DES_CBC", Alg::Des, Mode::Cbc, Padding::None, 8, 56, "DES/CBC/NoPadding")
			.with_oid(oid::DES_CBC);

	/// Single DES in CBC mode with PKCS #5 padding
	pub static DES_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"DES_CBC_PAD",
		Alg::Des,
		Mode::Cbc,
		Padding::Pkcs5,
		8,
		56,
		"DES/CBC/PKCS5Padding",
	);

	/// Triple DES in ECB mode
	pub static DES3_ECB: AlgorithmIdentity = AlgorithmIdentity::new(
		"DES3_ECB",
		Alg::DesEde,
		Mode::Ecb,
		Padding::None,
		8,
		168,
		"DESede/ECB/NoPadding",
	);

	/// Triple DES in CBC mode
	pub static DES3_CBC: AlgorithmIdentity = AlgorithmIdentity::new(
		"DES3_CBC",
		Alg::DesEde,
		Mode::Cbc,
		Padding::None,
		8,
		168,
		"DESede/CBC/NoPadding",
	)
	.with_oid(oid::DES_EDE3_CBC);

	/// Triple DES in CBC mode with PKCS #5 padding
	pub static DES3_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"DES3_CBC_PAD",
		Alg::DesEde,
		Mode::Cbc,
		Padding::Pkcs5,
		8,
		168,
		"DESede/CBC/PKCS5Padding",
	);

	/// RC2 in CBC mode with a variable-length key
	pub static RC2_CBC: AlgorithmIdentity =
		AlgorithmIdentity::new("RC2_CBC", Alg::Rc2, Mode::Cbc, Padding::None, 8, 0, "RC2/CBC/NoPadding");

	// rc2CBC names the padded cipher in PKCS #5 v2.0
	/// RC2 in CBC mode with PKCS #5 padding
	pub static RC2_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"RC2_CBC_PAD",
		Alg::Rc2,
		Mode::Cbc,
		Padding::Pkcs5,
		8,
		0,
		"RC2/CBC/PKCS5Padding",
	)
	.with_oid(oid::RC2_CBC_PAD);

	/// AES-128 in ECB mode
	pub static AES_128_ECB: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_128_ECB", Alg::Aes, Mode::Ecb, Padding::None, 16, 128, "AES/ECB/NoPadding")
			.with_oid(oid::AES_128_ECB);

	/// AES-128 in CBC mode
	pub static AES_128_CBC: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_128_CBC", Alg::Aes, Mode::Cbc, Padding::None, 16, 128, "AES/CBC/NoPadding")
			.with_oid(oid::AES_128_CBC);

	// The unpadded CBC variants hold the shared AES-CBC OIDs
	/// AES-128 in CBC mode with PKCS #5 padding
	pub static AES_128_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_128_CBC_PAD",
		Alg::Aes,
		Mode::Cbc,
		Padding::Pkcs5,
		16,
		128,
		"AES/CBC/PKCS5Padding",
	);

	/// AES-192 in ECB mode
	pub static AES_192_ECB: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_192_ECB", Alg::Aes, Mode::Ecb, Padding::None, 16, 192, "AES/ECB/NoPadding")
			.with_oid(oid::AES_192_ECB);

	/// AES-192 in CBC mode
	pub static AES_192_CBC: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_192_CBC", Alg::Aes, Mode::Cbc, Padding::None, 16, 192, "AES/CBC/NoPadding")
			.with_oid(oid::AES_192_CBC);

	/// AES-192 in CBC mode with PKCS #5 padding
	pub static AES_192_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_192_CBC_PAD",
		Alg::Aes,
		Mode::Cbc,
		Padding::Pkcs5,
		16,
		192,
		"AES/CBC/PKCS5Padding",
	);

	/// AES-256 in ECB mode
	pub static AES_256_ECB: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_256_ECB", Alg::Aes, Mode::Ecb, Padding::None, 16, 256, "AES/ECB/NoPadding")
			.with_oid(oid::AES_256_ECB);

	/// AES-256 in CBC mode
	pub static AES_256_CBC: AlgorithmIdentity =
		AlgorithmIdentity::new("AES_256_CBC", Alg::Aes, Mode::Cbc, Padding::None, 16, 256, "AES/CBC/NoPadding")
			.with_oid(oid::AES_256_CBC);

	/// AES-256 in CBC mode with PKCS #5 padding.
	///
	/// Registered ahead of [`AES_256_CBC_PAD`], so structural lookup of
	/// `AES/CBC/PKCS5Padding` at 256 bits resolves here.
	pub static AES_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_CBC_PAD",
		Alg::Aes,
		Mode::Cbc,
		Padding::Pkcs5,
		16,
		256,
		"AES/CBC/PKCS5Padding",
	);

	/// AES-256 in CBC mode with PKCS #5 padding
	pub static AES_256_CBC_PAD: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_256_CBC_PAD",
		Alg::Aes,
		Mode::Cbc,
		Padding::Pkcs5,
		16,
		256,
		"AES/CBC/PKCS5Padding",
	);

	/// AES-128 key wrap with padding as per [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649)
	pub static AES_128_KEY_WRAP_KWP: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_128_KEY_WRAP_KWP",
		Alg::Aes,
		Mode::None,
		Padding::Pkcs5,
		16,
		128,
		"AES/None/PKCS5Padding/Kwp/128",
	)
	.with_oid(oid::AES_128_WRAP_PAD);

	/// AES-192 key wrap with padding as per [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649)
	pub static AES_192_KEY_WRAP_KWP: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_192_KEY_WRAP_KWP",
		Alg::Aes,
		Mode::None,
		Padding::Pkcs5,
		16,
		192,
		"AES/None/PKCS5Padding/Kwp/192",
	)
	.with_oid(oid::AES_192_WRAP_PAD);

	/// AES-256 key wrap with padding as per [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649)
	pub static AES_256_KEY_WRAP_KWP: AlgorithmIdentity = AlgorithmIdentity::new(
		"AES_256_KEY_WRAP_KWP",
		Alg::Aes,
		Mode::None,
		Padding::Pkcs5,
		16,
		256,
		"AES/None/PKCS5Padding/Kwp/256",
	)
	.with_oid(oid::AES_256_WRAP_PAD);
}

/// Catalog of [`AlgorithmIdentity`] values with three lookup paths.
///
/// The registry is append-only. Build it once with [`AlgorithmRegistry::builtin`]
/// (optionally followed by [`AlgorithmRegistry::register`] calls) and hand out
/// shared references; use [`crate::SharedRegistry`] when registrations must
/// continue after the registry has been shared.
///
/// OIDs are unique and collisions follow the registry's [`DuplicatePolicy`].
/// Display names and `(alg, mode, padding, key strength)` tuples may repeat,
/// since composite names carry no key length. Name lookup resolves to the
/// identity registered last under a name; structural lookup resolves to the
/// first matching identity.
#[derive(Clone, Debug)]
pub struct AlgorithmRegistry {
	policy: DuplicatePolicy,
	tokens: TokenTables,
	algorithms: Vec<&'static AlgorithmIdentity>,
	by_oid: HashMap<&'static [u64], &'static AlgorithmIdentity>,
	by_name: HashMap<String, &'static AlgorithmIdentity>,
}

impl Default for AlgorithmRegistry {
	fn default() -> Self {
		Self::builtin()
	}
}

impl AlgorithmRegistry {
	/// An empty registry
	pub fn new(policy: DuplicatePolicy) -> Self {
		Self {
			policy,
			tokens: TokenTables::new(),
			algorithms: Vec::new(),
			by_oid: HashMap::new(),
			by_name: HashMap::new(),
		}
	}

	/// A registry holding the whole built-in catalog.
	///
	/// Later registrations with a colliding OID are rejected.
	pub fn builtin() -> Self {
		let mut registry = Self::new(DuplicatePolicy::Reject);
		for &identity in AlgorithmIdentity::iter() {
			debug_assert!(registry.collision(identity).is_none());
			registry.insert(identity);
		}
		tracing::debug!(count = registry.len(), "built algorithm registry");
		registry
	}

	/// Append `identity` to the catalog.
	///
	/// # Errors
	///
	/// Returns [`Error::DuplicateRegistration`] under [`DuplicatePolicy::Reject`]
	/// if the identity is already registered or its OID is taken.
	pub fn register(
		&mut self,
		identity: &'static AlgorithmIdentity,
	) -> Result<Registration, Error> {
		if let Some(what) = self.collision(identity) {
			return self.policy.on_duplicate(what);
		}
		self.insert(identity);
		Ok(Registration::Added)
	}

	fn collision(&self, identity: &AlgorithmIdentity) -> Option<String> {
		if self
			.algorithms
			.iter()
			.any(|registered| std::ptr::eq(*registered, identity))
		{
			return Some(format!("algorithm {:?}", identity));
		}
		let oid = identity.oid_components?;
		self.by_oid.get(oid).map(|existing| {
			format!(
				"OID {} by {:?} (held by {:?})",
				ObjectIdentifier::from_slice(oid),
				identity,
				existing
			)
		})
	}

	fn insert(&mut self, identity: &'static AlgorithmIdentity) {
		if let Some(shadowing) = self.algorithms.iter().find(|registered| {
			registered.matches(identity.alg, identity.mode, identity.padding, identity.key_strength)
		}) {
			tracing::trace!(?identity, ?shadowing, "structural lookup shadowed");
		}
		if let Some(oid) = identity.oid_components {
			self.by_oid.insert(oid, identity);
		}
		if let Some(shadowed) = self
			.by_name
			.insert(identity.name.to_ascii_lowercase(), identity)
		{
			tracing::trace!(?identity, ?shadowed, "name lookup now resolves to the newer identity");
		}
		self.algorithms.push(identity);
	}

	/// Find the identity carrying `oid`
	pub fn lookup_by_oid(&self, oid: &ObjectIdentifier) -> Result<&'static AlgorithmIdentity, Error> {
		self.lookup_by_oid_components(oid.components())
	}

	/// Find the identity carrying the OID with the given components
	pub fn lookup_by_oid_components(
		&self,
		oid: &[u64],
	) -> Result<&'static AlgorithmIdentity, Error> {
		self.by_oid.get(oid).copied().ok_or_else(|| {
			Error::AlgorithmNotFound(format!("OID: {}", ObjectIdentifier::from_slice(oid)))
		})
	}

	/// Find an identity by its composite display name, ignoring ASCII case.
	///
	/// Names shared by several key lengths resolve to the identity registered
	/// last, e.g. `AES/CBC/NoPadding` gives [`algo::AES_256_CBC`].
	#[deprecated(
		note = "Composite names carry no key length, so AES variants are ambiguous. Use `lookup` or `lookup_by_oid`."
	)]
	pub fn lookup_by_name(&self, name: &str) -> Result<&'static AlgorithmIdentity, Error> {
		self.by_name
			.get(&name.to_ascii_lowercase())
			.copied()
			.ok_or_else(|| Error::AlgorithmNotFound(name.to_owned()))
	}

	/// Find the first registered identity matching the given names and key strength.
	///
	/// The names are resolved case-insensitively through the token tables; an
	/// empty `padding` means `NoPadding`. Identities with a key strength of 0
	/// accept any requested strength.
	///
	/// # Errors
	///
	/// Returns [`Error::UnrecognizedToken`] if a name is not a known token and
	/// [`Error::AlgorithmNotFound`] if no identity matches.
	pub fn lookup(
		&self,
		alg: &str,
		mode: &str,
		padding: &str,
		key_strength: u32,
	) -> Result<&'static AlgorithmIdentity, Error> {
		let alg_token = self.tokens.algs.parse(alg)?;
		let mode_token = self.tokens.modes.parse(mode)?;
		let padding_token = match padding {
			"" => Padding::None,
			name => self.tokens.paddings.parse(name)?,
		};

		self.algorithms
			.iter()
			.copied()
			.find(|identity| identity.matches(alg_token, mode_token, padding_token, key_strength))
			.ok_or_else(|| {
				Error::AlgorithmNotFound(format!(
					"{}/{}/{} with key strength {}",
					alg, mode, padding, key_strength
				))
			})
	}

	/// Registered identities in registration order
	pub fn iter(&self) -> impl Iterator<Item = &'static AlgorithmIdentity> + '_ {
		self.algorithms.iter().copied()
	}

	/// Number of registered identities
	pub fn len(&self) -> usize {
		self.algorithms.len()
	}

	/// Whether nothing is registered
	pub fn is_empty(&self) -> bool {
		self.algorithms.is_empty()
	}

	/// The token tables used by [`AlgorithmRegistry::lookup`]
	pub fn tokens(&self) -> &TokenTables {
		&self.tokens
	}

	/// The policy applied to colliding registrations
	pub fn policy(&self) -> DuplicatePolicy {
		self.policy
	}
}

#[cfg(test)]
mod tests {
	use super::algo::*;
	use super::*;
	use crate::token::Token;

	#[test]
	fn builtin_names_are_composite() {
		for identity in AlgorithmIdentity::iter() {
			let composite = format!(
				"{}/{}/{}",
				identity.alg().name(),
				identity.mode().name(),
				identity.padding().name()
			);
			if identity.label().ends_with("_KWP") {
				let suffix = format!("/Kwp/{}", identity.key_strength());
				assert!(identity.name().ends_with(&suffix), "{:?}", identity);
			} else {
				assert_eq!(identity.name(), composite, "{:?}", identity);
			}
		}
	}

	#[test]
	fn builtin_oids_are_unique() {
		let mut registry = AlgorithmRegistry::new(DuplicatePolicy::Reject);
		for &identity in AlgorithmIdentity::iter() {
			assert_eq!(registry.register(identity), Ok(Registration::Added));
		}
		assert_eq!(registry.len(), AlgorithmIdentity::iter().len());
	}

	#[test]
	fn debug_prints_label() {
		assert_eq!(format!("{:?}", AES_128_CBC), "AES_128_CBC");
		assert_eq!(AES_128_CBC.to_string(), "AES/CBC/NoPadding");
	}

	#[test]
	fn same_fields_different_label_are_distinct() {
		assert_ne!(AES_CBC_PAD, AES_256_CBC_PAD);
		assert_eq!(AES_CBC_PAD.name(), AES_256_CBC_PAD.name());
	}

	#[test]
	fn oid_collision_follows_policy() {
		static SHADOW: AlgorithmIdentity = AlgorithmIdentity::new(
			"SHADOW",
			Alg::Aes,
			Mode::Cbc,
			Padding::Pkcs5,
			16,
			128,
			"AES/CBC/PKCS5Padding",
		)
		.with_oid(crate::oid::AES_128_CBC);

		let mut strict = AlgorithmRegistry::builtin();
		assert!(matches!(
			strict.register(&SHADOW),
			Err(Error::DuplicateRegistration(_))
		));
		assert_eq!(strict.len(), AlgorithmIdentity::iter().len());

		let mut lenient = AlgorithmRegistry::new(DuplicatePolicy::Ignore);
		assert_eq!(lenient.register(&AES_128_CBC), Ok(Registration::Added));
		assert_eq!(lenient.register(&SHADOW), Ok(Registration::IgnoredDuplicate));
		assert_eq!(lenient.len(), 1);
		let found = lenient.lookup_by_oid_components(crate::oid::AES_128_CBC).unwrap();
		assert!(std::ptr::eq(found, &AES_128_CBC));
	}

	#[test]
	fn registering_the_same_identity_twice_is_a_duplicate() {
		let mut registry = AlgorithmRegistry::new(DuplicatePolicy::Ignore);
		assert_eq!(registry.register(&DES3_ECB), Ok(Registration::Added));
		assert_eq!(registry.register(&DES3_ECB), Ok(Registration::IgnoredDuplicate));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn tokens_resolve_what_lookup_accepts() {
		let registry = AlgorithmRegistry::builtin();
		let tokens = registry.tokens();
		assert_eq!(tokens.algs.parse("desede"), Ok(Alg::DesEde));
		assert_eq!(tokens.modes.parse("ecb"), Ok(Mode::Ecb));
		assert_eq!(tokens.paddings.parse("pkcs5padding"), Ok(Padding::Pkcs5));
		assert_eq!(tokens.algs.len(), Alg::ALL.len());
	}

	#[test]
	#[allow(deprecated)]
	fn later_identity_takes_over_a_shared_name() {
		let mut registry = AlgorithmRegistry::new(DuplicatePolicy::Reject);
		assert_eq!(registry.register(&AES_192_CBC), Ok(Registration::Added));
		assert_eq!(registry.register(&AES_128_CBC), Ok(Registration::Added));
		let found = registry.lookup_by_name("AES/CBC/NoPadding").unwrap();
		assert!(std::ptr::eq(found, &AES_128_CBC));
		let found = registry.lookup("AES", "CBC", "", 192).unwrap();
		assert!(std::ptr::eq(found, &AES_192_CBC));
	}

	#[test]
	fn padded_aes_cbc_has_no_oid() {
		assert_eq!(AES_128_CBC_PAD.oid(), None);
		assert_eq!(
			AES_128_CBC.oid(),
			Some(ObjectIdentifier::from_slice(&[2, 16, 840, 1, 101, 3, 4, 1, 2]))
		);
	}
}
