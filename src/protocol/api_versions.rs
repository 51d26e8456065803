//! ApiVersions API (key 18, version 0). Lets the client learn, per api_key,
//! the range of wire versions the broker accepts, so the dispatcher can
//! negotiate the highest version both sides support.
//!
//! ```text
//! ApiVersionsRequest => (empty)
//! ApiVersionsResponse => ErrorCode [ApiKey MinVersion MaxVersion]
//! ```
//!
//! A Kafka <= 0.9 broker does not know this api_key at all; the request
//! fails outright. That failure is handled by the caller (the negotiation
//! step in `client::client`), not here: this module only encodes/decodes
//! the frame when a response is actually received.

use protocol::{ApiKey, ApiVersion, Decodable, Encodable, ErrorCode, Reader, Writer};
use errors::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ApiVersionsRequest;

impl Encodable for ApiVersionsRequest {
    fn encode(&self, _api_version: ApiVersion, _writer: &mut Writer) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportedApiVersion {
    pub api_key: ApiKey,
    pub min_version: ApiVersion,
    pub max_version: ApiVersion,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ApiVersionsResponse {
    pub error_code: ErrorCode,
    pub api_versions: Vec<SupportedApiVersion>,
}

impl Decodable for ApiVersionsResponse {
    fn decode(_api_version: ApiVersion, reader: &mut Reader) -> Result<ApiVersionsResponse> {
        let error_code = reader.read_i16()?;
        let api_versions = reader.read_array(|r| {
                Ok(SupportedApiVersion {
                       api_key: r.read_i16()?,
                       min_version: r.read_i16()?,
                       max_version: r.read_i16()?,
                   })
            })?;
        Ok(ApiVersionsResponse {
               error_code: error_code,
               api_versions: api_versions,
           })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_request_has_no_body() {
        let req = ApiVersionsRequest::default();
        let mut w = Writer::with_capacity(0);
        req.encode(0, &mut w);
        assert_eq!(w.len(), 0);
    }

    #[test]
    fn test_decode_response() {
        let mut w = Writer::with_capacity(32);
        w.write_i16(0);
        w.write_array(&[(0i16, 0i16, 2i16)], |w, &(k, lo, hi)| {
            w.write_i16(k);
            w.write_i16(lo);
            w.write_i16(hi);
        });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = ApiVersionsResponse::decode(0, &mut r).unwrap();

        assert_eq!(resp.error_code, 0);
        assert_eq!(resp.api_versions.len(), 1);
        assert_eq!(resp.api_versions[0].max_version, 2);
    }
}
