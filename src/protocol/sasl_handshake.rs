//! SaslHandshake API (key 17, version 0), plus the PLAIN mechanism's
//! post-handshake authentication frame, which is not itself an
//! api-keyed request: after a successful handshake the client writes one
//! raw length-prefixed frame directly to the socket and reads the
//! (possibly empty) length-prefixed reply.
//!
//! ```text
//! SaslHandshakeRequest => Mechanism
//! SaslHandshakeResponse => ErrorCode [EnabledMechanism]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, Reader, Writer};
use errors::Result;

pub const MECHANISM_PLAIN: &'static str = "PLAIN";

#[derive(Clone, Debug, PartialEq)]
pub struct SaslHandshakeRequest {
    pub mechanism: String,
}

impl Encodable for SaslHandshakeRequest {
    fn encode(&self, _api_version: ApiVersion, writer: &mut Writer) {
        writer.write_string(Some(&self.mechanism));
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SaslHandshakeResponse {
    pub error_code: ErrorCode,
    pub enabled_mechanisms: Vec<String>,
}

impl Decodable for SaslHandshakeResponse {
    fn decode(_api_version: ApiVersion, reader: &mut Reader) -> Result<SaslHandshakeResponse> {
        let error_code = reader.read_i16()?;
        let enabled_mechanisms = reader.read_array(|r| Ok(r.read_string()?.unwrap_or_default()))?;
        Ok(SaslHandshakeResponse {
               error_code: error_code,
               enabled_mechanisms: enabled_mechanisms,
           })
    }
}

/// Builds the raw PLAIN authentication frame's payload (without the int32
/// length prefix, which the IO endpoint's `send` adds like any other
/// frame): `"\0" username "\0" password`.
pub fn plain_auth_bytes(username: &str, password: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + username.len() + password.len());
    out.push(0u8);
    out.extend_from_slice(username.as_bytes());
    out.push(0u8);
    out.extend_from_slice(password.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_auth_bytes_layout() {
        let bytes = plain_auth_bytes("alice", "secret");
        assert_eq!(bytes, b"\0alice\0secret");
    }

    #[test]
    fn test_decode_handshake_response() {
        let mut w = Writer::with_capacity(32);
        w.write_i16(0);
        w.write_array(&["PLAIN".to_owned()], |w, m| w.write_string(Some(m)));
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = SaslHandshakeResponse::decode(0, &mut r).unwrap();
        assert_eq!(resp.enabled_mechanisms, vec!["PLAIN".to_owned()]);
    }
}
