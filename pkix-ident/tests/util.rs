#![allow(dead_code)]

use pkix_ident::{ExtendedKeyUsage, Extension, KeyPurpose};

/// A critical extended key usage extension carrying OCSPSigning then codeSigning
#[rustfmt::skip]
pub const EKU_CRITICAL_OCSP_CODE_SIGNING: &[u8] = &[
	0x30, 0x20,
	0x06, 0x03, 0x55, 0x1D, 0x25,
	0x01, 0x01, 0xFF,
	0x04, 0x16,
	0x30, 0x14,
	0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x09,
	0x06, 0x08, 0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x03,
];

/// The `extnValue` content of [`EKU_CRITICAL_OCSP_CODE_SIGNING`]
pub fn eku_value() -> &'static [u8] {
	&EKU_CRITICAL_OCSP_CODE_SIGNING[12..]
}

/// A subject key identifier extension, for which no codec is registered
#[rustfmt::skip]
pub const SUBJECT_KEY_IDENTIFIER: &[u8] = &[
	0x30, 0x0F,
	0x06, 0x03, 0x55, 0x1D, 0x0E,
	0x04, 0x08,
	0x04, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
];

pub fn server_client_eku() -> Extension<ExtendedKeyUsage> {
	Extension::new(ExtendedKeyUsage::from_purposes([
		KeyPurpose::ServerAuth,
		KeyPurpose::ClientAuth,
	]))
}

/// Wrap `members` in a DER SEQUENCE
pub fn sequence_of(members: &[&[u8]]) -> Vec<u8> {
	yasna::construct_der(|writer| {
		writer.write_sequence(|writer| {
			for member in members {
				writer.next().write_der(member);
			}
		})
	})
}
