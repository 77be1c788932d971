//! Object identifier components used by the algorithm catalog and the extension codecs.

use yasna::models::ObjectIdentifier;

use crate::Error;

/// rc2CBC in [RFC 8018](https://www.rfc-editor.org/rfc/rfc8018#appendix-B.2.3)
pub const RC2_CBC_PAD: &[u64] = &[1, 2, 840, 113549, 3, 2];
/// rc4 under the RSADSI encryptionAlgorithm arc
pub const RC4: &[u64] = &[1, 2, 840, 113549, 3, 4];
/// des-EDE3-CBC in [RFC 8018](https://www.rfc-editor.org/rfc/rfc8018#appendix-B.2.2)
pub const DES_EDE3_CBC: &[u64] = &[1, 2, 840, 113549, 3, 7];

/// desECB in the OIW SECSIG algorithm arc
pub const DES_ECB: &[u64] = &[1, 3, 14, 3, 2, 6];
/// desCBC in [RFC 8018](https://www.rfc-editor.org/rfc/rfc8018#appendix-B.2.1)
pub const DES_CBC: &[u64] = &[1, 3, 14, 3, 2, 7];

/// aes in the NIST algorithm arc; every AES identifier below is a child of it
pub const AES: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1];

/// id-aes128-ECB in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_128_ECB: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 1];
/// id-aes128-CBC in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_128_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 2];
/// id-aes128-wrap-pad in [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649#section-6)
pub const AES_128_WRAP_PAD: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 8];
/// id-aes192-ECB in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_192_ECB: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 21];
/// id-aes192-CBC in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_192_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 22];
/// id-aes192-wrap-pad in [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649#section-6)
pub const AES_192_WRAP_PAD: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 28];
/// id-aes256-ECB in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_256_ECB: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 41];
/// id-aes256-CBC in [RFC 3565](https://www.rfc-editor.org/rfc/rfc3565#section-4.1)
pub const AES_256_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 42];
/// id-aes256-wrap-pad in [RFC 5649](https://www.rfc-editor.org/rfc/rfc5649#section-6)
pub const AES_256_WRAP_PAD: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 48];

/// id-ce-extKeyUsage in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const EXT_KEY_USAGE: &[u64] = &[2, 5, 29, 37];

/// anyExtendedKeyUsage in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_ANY: &[u64] = &[2, 5, 29, 37, 0];
/// id-kp-serverAuth in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_SERVER_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 1];
/// id-kp-clientAuth in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_CLIENT_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 2];
/// id-kp-codeSigning in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_CODE_SIGNING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 3];
/// id-kp-emailProtection in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_EMAIL_PROTECTION: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 4];
/// id-kp-timeStamping in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_TIME_STAMPING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 8];
/// id-kp-OCSPSigning in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#section-4.2.1.12)
pub const KP_OCSP_SIGNING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 9];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aes_identifiers_live_under_the_aes_arc() {
		for oid in [
			AES_128_ECB,
			AES_128_CBC,
			AES_128_WRAP_PAD,
			AES_192_ECB,
			AES_192_CBC,
			AES_192_WRAP_PAD,
			AES_256_ECB,
			AES_256_CBC,
			AES_256_WRAP_PAD,
		] {
			assert_eq!(&oid[..AES.len()], AES);
			assert_eq!(oid.len(), AES.len() + 1);
		}
	}

	#[test]
	fn key_purposes_live_under_the_eku_or_pkix_arc() {
		assert_eq!(&KP_ANY[..EXT_KEY_USAGE.len()], EXT_KEY_USAGE);
		for oid in [
			KP_SERVER_AUTH,
			KP_CLIENT_AUTH,
			KP_CODE_SIGNING,
			KP_EMAIL_PROTECTION,
			KP_TIME_STAMPING,
			KP_OCSP_SIGNING,
		] {
			assert_eq!(&oid[..8], &[1, 3, 6, 1, 5, 5, 7, 3]);
		}
	}
}

/// Check that `oid` can be written as DER: at least two arcs, a first arc of
/// 0, 1 or 2, and a second arc below 40 under the first two roots.
pub(crate) fn check_encodable(oid: &ObjectIdentifier) -> Result<(), Error> {
	let encodable = match oid.components().as_slice() {
		[first, second, ..] => {
			*first < 3 && *second < u64::MAX - 80 && (*first == 2 || *second < 40)
		},
		_ => false,
	};
	if !encodable {
		return Err(Error::InvalidOid(oid.to_string()));
	}
	Ok(())
}

#[cfg(test)]
mod encodable_tests {
	use super::*;

	#[test]
	fn encodable_oids() {
		for components in [&[2, 5, 29, 37][..], &[0, 39], &[1, 2, 3], &[2, 999, 3]] {
			let oid = ObjectIdentifier::from_slice(components);
			assert_eq!(check_encodable(&oid), Ok(()), "{}", oid);
			yasna::construct_der(|writer| writer.write_oid(&oid));
		}
	}

	#[test]
	fn unencodable_oids() {
		for components in [&[][..], &[7], &[3, 1], &[1, 40], &[0, 40, 1]] {
			let oid = ObjectIdentifier::from_slice(components);
			assert_eq!(
				check_encodable(&oid),
				Err(Error::InvalidOid(oid.to_string()))
			);
		}
	}
}
