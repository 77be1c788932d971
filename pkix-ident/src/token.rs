use std::collections::HashMap;
use std::fmt;

use crate::Error;

/// The table a token belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// Base cipher algorithm
	Algorithm,
	/// Block cipher mode of operation
	Mode,
	/// Padding scheme
	Padding,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			TokenKind::Algorithm => "algorithm",
			TokenKind::Mode => "mode",
			TokenKind::Padding => "padding type",
		})
	}
}

/// A closed set of symbolic constants with canonical names.
pub trait Token: Copy + Eq + fmt::Debug + 'static {
	/// The table this token type populates
	const KIND: TokenKind;
	/// Every variant, in declaration order
	const ALL: &'static [Self];

	/// Canonical spelling of the token
	fn name(self) -> &'static str;
}

/// Base algorithm of a symmetric cipher configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Alg {
	Rc4,
	Des,
	DesEde,
	Aes,
	Rc2,
}

impl Token for Alg {
	const KIND: TokenKind = TokenKind::Algorithm;
	const ALL: &'static [Self] = &[Alg::Rc4, Alg::Des, Alg::DesEde, Alg::Aes, Alg::Rc2];

	fn name(self) -> &'static str {
		match self {
			Alg::Rc4 => "RC4",
			Alg::Des => "DES",
			Alg::DesEde => "DESede",
			Alg::Aes => "AES",
			Alg::Rc2 => "RC2",
		}
	}
}

/// Mode of operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
	/// Stream ciphers and key wrapping
	None,
	/// Electronic codebook
	Ecb,
	/// Cipher block chaining
	Cbc,
}

impl Token for Mode {
	const KIND: TokenKind = TokenKind::Mode;
	const ALL: &'static [Self] = &[Mode::None, Mode::Ecb, Mode::Cbc];

	fn name(self) -> &'static str {
		match self {
			Mode::None => "NONE",
			Mode::Ecb => "ECB",
			Mode::Cbc => "CBC",
		}
	}
}

/// Padding scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Padding {
	/// No padding; input must be a multiple of the block size
	None,
	/// PKCS #5 padding
	Pkcs5,
}

impl Token for Padding {
	const KIND: TokenKind = TokenKind::Padding;
	const ALL: &'static [Self] = &[Padding::None, Padding::Pkcs5];

	fn name(self) -> &'static str {
		match self {
			Padding::None => "NoPadding",
			Padding::Pkcs5 => "PKCS5Padding",
		}
	}
}

macro_rules! display_token {
	($($ty:ty),*) => {$(
		impl fmt::Display for $ty {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str(self.name())
			}
		}
	)*};
}

display_token!(Alg, Mode, Padding);

/// Case-insensitive name index over one token type.
///
/// The index is built in a single pass over [`Token::ALL`]; variants never
/// register themselves.
#[derive(Clone, Debug)]
pub struct TokenTable<T> {
	by_name: HashMap<String, T>,
}

impl<T: Token> TokenTable<T> {
	/// Build the index for `T`
	pub fn new() -> Self {
		let by_name = T::ALL
			.iter()
			.map(|token| (token.name().to_ascii_lowercase(), *token))
			.collect();
		Self { by_name }
	}

	/// Resolve `name`, ignoring ASCII case
	pub fn parse(&self, name: &str) -> Result<T, Error> {
		self.by_name
			.get(&name.to_ascii_lowercase())
			.copied()
			.ok_or_else(|| Error::UnrecognizedToken {
				kind: T::KIND,
				name: name.to_owned(),
			})
	}

	/// Number of names in the table
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// Whether the table holds no names
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}

impl<T: Token> Default for TokenTable<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// The three token tables consulted by structural algorithm lookup
#[derive(Clone, Debug, Default)]
pub struct TokenTables {
	/// Algorithm names
	pub algs: TokenTable<Alg>,
	/// Mode names
	pub modes: TokenTable<Mode>,
	/// Padding names
	pub paddings: TokenTable<Padding>,
}

impl TokenTables {
	/// Build all three tables
	pub fn new() -> Self {
		Self::default()
	}
}
