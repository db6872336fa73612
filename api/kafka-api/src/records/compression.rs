// Copyright 2024 tison <wander4096@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::codec::err_codec_message;
use crate::records::CompressionType;
use crate::IoResult;

/// Compress a record-list payload per the codec selected by `ty`.
///
/// `CompressionType::None` returns the input unchanged (cloned) so callers can
/// always treat the result as the bytes to stamp into the batch's `records`
/// section.
pub fn compress(ty: CompressionType, records: &[u8]) -> IoResult<Vec<u8>> {
    match ty {
        CompressionType::None => Ok(records.to_vec()),
        CompressionType::Gzip => compress_gzip(records),
        CompressionType::Snappy => compress_snappy(records),
        CompressionType::Lz4 => compress_lz4(records),
        CompressionType::Zstd => compress_zstd(records),
    }
}

/// Decompress a record-list payload per the codec carried in the batch's
/// `attributes` field.
pub fn decompress(ty: CompressionType, records: &[u8]) -> IoResult<Vec<u8>> {
    match ty {
        CompressionType::None => Ok(records.to_vec()),
        CompressionType::Gzip => decompress_gzip(records),
        CompressionType::Snappy => decompress_snappy(records),
        CompressionType::Lz4 => decompress_lz4(records),
        CompressionType::Zstd => decompress_zstd(records),
    }
}

fn err_unsupported_codec(name: &str) -> io::Error {
    err_codec_message(format!(
        "{name} compression requested but the crate was built without the corresponding feature"
    ))
}

#[cfg(feature = "compression-gzip")]
fn compress_gzip(records: &[u8]) -> IoResult<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(records)?;
    encoder.finish()
}

#[cfg(not(feature = "compression-gzip"))]
fn compress_gzip(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("gzip"))
}

#[cfg(feature = "compression-gzip")]
fn decompress_gzip(records: &[u8]) -> IoResult<Vec<u8>> {
    use flate2::read::GzDecoder;
    let mut out = Vec::new();
    GzDecoder::new(records).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "compression-gzip"))]
fn decompress_gzip(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("gzip"))
}

#[cfg(feature = "compression-snappy")]
fn compress_snappy(records: &[u8]) -> IoResult<Vec<u8>> {
    let mut encoder = snap::raw::Encoder::new();
    encoder
        .compress_vec(records)
        .map_err(|err| err_codec_message(format!("snappy compression failed: {err}")))
}

#[cfg(not(feature = "compression-snappy"))]
fn compress_snappy(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("snappy"))
}

#[cfg(feature = "compression-snappy")]
fn decompress_snappy(records: &[u8]) -> IoResult<Vec<u8>> {
    let mut decoder = snap::raw::Decoder::new();
    decoder
        .decompress_vec(records)
        .map_err(|err| err_codec_message(format!("snappy decompression failed: {err}")))
}

#[cfg(not(feature = "compression-snappy"))]
fn decompress_snappy(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("snappy"))
}

#[cfg(feature = "compression-lz4")]
fn compress_lz4(records: &[u8]) -> IoResult<Vec<u8>> {
    let mut encoder = lz4::EncoderBuilder::new().build(Vec::new())?;
    encoder.write_all(records)?;
    let (buf, result) = encoder.finish();
    result.map(|_| buf)
}

#[cfg(not(feature = "compression-lz4"))]
fn compress_lz4(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("lz4"))
}

#[cfg(feature = "compression-lz4")]
fn decompress_lz4(records: &[u8]) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    lz4::Decoder::new(records)?.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "compression-lz4"))]
fn decompress_lz4(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("lz4"))
}

#[cfg(feature = "compression-zstd")]
fn compress_zstd(records: &[u8]) -> IoResult<Vec<u8>> {
    zstd::stream::encode_all(records, 0)
}

#[cfg(not(feature = "compression-zstd"))]
fn compress_zstd(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("zstd"))
}

#[cfg(feature = "compression-zstd")]
fn decompress_zstd(records: &[u8]) -> IoResult<Vec<u8>> {
    zstd::stream::decode_all(records)
}

#[cfg(not(feature = "compression-zstd"))]
fn decompress_zstd(_records: &[u8]) -> IoResult<Vec<u8>> {
    Err(err_unsupported_codec("zstd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_roundtrip() {
        let payload = b"hello record batch".to_vec();
        let compressed = compress(CompressionType::None, &payload).unwrap();
        assert_eq!(compressed, payload);
        let decompressed = decompress(CompressionType::None, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_gzip_roundtrip() {
        let payload = b"hello record batch, compressed with gzip".to_vec();
        let compressed = compress(CompressionType::Gzip, &payload).unwrap();
        assert_ne!(compressed, payload);
        let decompressed = decompress(CompressionType::Gzip, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_zstd_roundtrip() {
        let payload = b"hello record batch, compressed with zstd".to_vec();
        let compressed = compress(CompressionType::Zstd, &payload).unwrap();
        let decompressed = decompress(CompressionType::Zstd, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_lz4_roundtrip() {
        let payload = b"hello record batch, compressed with lz4".to_vec();
        let compressed = compress(CompressionType::Lz4, &payload).unwrap();
        let decompressed = decompress(CompressionType::Lz4, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn test_snappy_roundtrip() {
        let payload = b"hello record batch, compressed with snappy".to_vec();
        let compressed = compress(CompressionType::Snappy, &payload).unwrap();
        let decompressed = decompress(CompressionType::Snappy, &compressed).unwrap();
        assert_eq!(decompressed, payload);
    }
}
