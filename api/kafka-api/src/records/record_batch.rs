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

use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::fmt::Debug;
use std::fmt::Formatter;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

use crate::codec::err_codec_message;
use crate::codec::Decoder;
use crate::codec::Encoder;
use crate::codec::FixedSizeEncoder;
use crate::codec::Int32;
use crate::codec::RecordList;
use crate::records::compression;
use crate::records::*;
use crate::IoResult;

fn check_and_fetch_batch_size(bytes: &[u8], remaining: usize) -> IoResult<usize> {
    if remaining < RECORD_BATCH_OVERHEAD {
        return Err(err_codec_message(format!(
            "no enough bytes when decode records (remaining: {}, required header: {})",
            remaining, RECORD_BATCH_OVERHEAD
        )));
    }

    let record_size = (&bytes[LENGTH_OFFSET..])
        .read_i32::<BigEndian>()
        .map_err(|err| err_codec_message(format!("failed to read record size: {err}")))?;
    let batch_size = record_size as usize + LOG_OVERHEAD;
    if remaining < batch_size {
        return Err(err_codec_message(format!(
            "no enough bytes when decode records (remaining: {}, required batch: {})",
            remaining, batch_size
        )));
    }

    let magic = (&bytes[MAGIC_OFFSET..])
        .read_i8()
        .map_err(|err| err_codec_message(format!("failed to read version: {err}")))?;
    if magic != 2 {
        return Err(err_codec_message(format!(
            "unsupported record batch version: {}",
            magic
        )));
    }

    Ok(batch_size)
}

#[derive(Default)]
pub struct RecordBatches {
    bytes: RefCell<Vec<u8>>,
}

impl Debug for RecordBatches {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut de = f.debug_struct("RecordBatches");
        de.field("batches", &self.batches());
        de.finish()
    }
}

impl RecordBatches {
    pub fn new(bytes: Vec<u8>) -> Self {
        RecordBatches {
            bytes: RefCell::new(bytes),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_inner()
    }

    pub fn mut_batches(&mut self) -> IoResult<Vec<MutableRecordBatch>> {
        let mut batches = vec![];
        let mut bytes = RefMut::map(self.bytes.borrow_mut(), |bs| bs.as_mut_slice());
        let mut remaining = bytes.len();
        while remaining > 0 {
            let batch_size = check_and_fetch_batch_size(&bytes, remaining)?;
            let (left, right) = RefMut::map_split(bytes, |b| b.split_at_mut(batch_size));
            batches.push(MutableRecordBatch { bytes: left });
            bytes = right;
            remaining -= batch_size;
        }
        Ok(batches)
    }

    pub fn batches(&self) -> IoResult<Vec<RecordBatch>> {
        let mut batches = vec![];
        let mut bytes = Ref::map(self.bytes.borrow(), |bs| bs.as_slice());
        let mut remaining = bytes.len();
        while remaining > 0 {
            let batch_size = check_and_fetch_batch_size(&bytes, remaining)?;
            let (left, right) = Ref::map_split(bytes, |b| b.split_at(batch_size));
            batches.push(RecordBatch { bytes: left });
            bytes = right;
            remaining -= batch_size;
        }
        Ok(batches)
    }
}

pub struct MutableRecordBatch<'a> {
    bytes: RefMut<'a, [u8]>,
}

// SAFETY: record's length are validated on construction; so all slices are valid.
impl MutableRecordBatch<'_> {
    pub fn view(&self) -> RecordBatchView {
        RecordBatchView { bytes: &self.bytes }
    }

    pub fn set_last_offset(&mut self, offset: i64) {
        let base_offset = offset - self.view().last_offset_delta() as i64;
        (&mut self.bytes[BASE_OFFSET_OFFSET..])
            .write_i64::<BigEndian>(base_offset)
            .expect("write base offset");
    }

    pub fn set_partition_leader_epoch(&mut self, epoch: i32) {
        (&mut self.bytes[PARTITION_LEADER_EPOCH_OFFSET..])
            .write_i32::<BigEndian>(epoch)
            .expect("write partition leader epoch");
    }
}

impl Debug for MutableRecordBatch<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        RecordBatchView::fmt(&self.view(), f)
    }
}

pub struct RecordBatch<'a> {
    bytes: Ref<'a, [u8]>,
}

impl RecordBatch<'_> {
    pub fn view(&self) -> RecordBatchView {
        RecordBatchView { bytes: &self.bytes }
    }
}

impl Debug for RecordBatch<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        RecordBatchView::fmt(&self.view(), f)
    }
}

pub struct RecordBatchView<'a> {
    bytes: &'a [u8],
}

impl Debug for RecordBatchView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut de = f.debug_struct("RecordBatch");
        de.field("magic", &self.magic());
        de.field("offset", &(self.base_offset()..=self.last_offset()));
        de.field("sequence", &(self.base_sequence()..=self.last_sequence()));
        de.field("is_transactional", &self.is_transactional());
        de.field("is_control_batch", &self.is_control_batch());
        de.field("compression_type", &self.attributes() & COMPRESSION_CODEC_MASK);
        de.field("timestamp_type", &self.timestamp_type());
        de.field("crc", &self.checksum());
        de.field("records_count", &self.records_count());
        de.field("records", &self.records());
        de.finish()
    }
}

/// Similar to [i32::wrapping_add], but wrap to `0` instead of [i32::MIN].
pub fn increment_sequence(sequence: i32, increment: i32) -> i32 {
    if sequence > i32::MAX - increment {
        increment - (i32::MAX - sequence) - 1
    } else {
        sequence + increment
    }
}

/// Similar to [i32::wrapping_add], but wrap at `0` instead of [i32::MIN].
pub fn decrement_sequence(sequence: i32, decrement: i32) -> i32 {
    if sequence < decrement {
        i32::MAX - (decrement - sequence) + 1
    } else {
        sequence - decrement
    }
}

/// Parameters that vary per produced batch; everything else (magic, CRC,
/// framing) is derived by [`encode_record_batch`].
#[derive(Debug, Clone)]
pub struct RecordBatchEncodeOpts {
    pub base_offset: i64,
    pub partition_leader_epoch: i32,
    pub base_timestamp: i64,
    pub max_timestamp: i64,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub base_sequence: i32,
    pub is_transactional: bool,
    pub is_control_batch: bool,
    pub timestamp_type: TimestampType,
    pub compression_type: CompressionType,
}

impl Default for RecordBatchEncodeOpts {
    fn default() -> Self {
        RecordBatchEncodeOpts {
            base_offset: 0,
            partition_leader_epoch: -1,
            base_timestamp: 0,
            max_timestamp: 0,
            producer_id: -1,
            producer_epoch: -1,
            base_sequence: NO_SEQUENCE,
            is_transactional: false,
            is_control_batch: false,
            timestamp_type: TimestampType::CreateTime,
            compression_type: CompressionType::None,
        }
    }
}

/// Build a v2 record batch: encode the records, compress the payload per
/// `opts.compression_type`, then stamp length and CRC-32C over the resulting
/// buffer. The inverse of [`RecordBatchView`]'s accessors.
pub fn encode_record_batch(opts: &RecordBatchEncodeOpts, records: &[Record]) -> IoResult<Vec<u8>> {
    let mut records_buf = vec![];
    RecordList.encode(&mut records_buf, records)?;
    let (count_bytes, payload) = records_buf.split_at(Int32::SIZE);
    let compressed_payload = compression::compress(opts.compression_type, payload)?;

    let last_offset_delta = records.iter().map(|r| r.offset_delta).max().unwrap_or(0);

    let mut attributes: u16 = u8::from(opts.compression_type) as u16;
    if matches!(opts.timestamp_type, TimestampType::LogAppendTime) {
        attributes |= TIMESTAMP_TYPE_MASK as u16;
    }
    if opts.is_transactional {
        attributes |= TRANSACTIONAL_FLAG_MASK as u16;
    }
    if opts.is_control_batch {
        attributes |= CONTROL_FLAG_MASK as u16;
    }

    let mut buf = Vec::with_capacity(RECORD_BATCH_OVERHEAD + compressed_payload.len());
    buf.write_i64::<BigEndian>(opts.base_offset)?;
    buf.write_i32::<BigEndian>(0)?; // length, patched below
    buf.write_i32::<BigEndian>(opts.partition_leader_epoch)?;
    buf.write_i8(2)?; // magic
    buf.write_u32::<BigEndian>(0)?; // crc, patched below
    buf.write_u16::<BigEndian>(attributes)?;
    buf.write_i32::<BigEndian>(last_offset_delta)?;
    buf.write_i64::<BigEndian>(opts.base_timestamp)?;
    buf.write_i64::<BigEndian>(opts.max_timestamp)?;
    buf.write_i64::<BigEndian>(opts.producer_id)?;
    buf.write_i16::<BigEndian>(opts.producer_epoch)?;
    buf.write_i32::<BigEndian>(opts.base_sequence)?;
    buf.write_all(count_bytes)?;
    buf.write_all(&compressed_payload)?;

    let record_size = (buf.len() - LOG_OVERHEAD) as i32;
    (&mut buf[LENGTH_OFFSET..]).write_i32::<BigEndian>(record_size)?;

    let crc = crc32c::crc32c(&buf[ATTRIBUTES_OFFSET..]);
    (&mut buf[CRC_OFFSET..]).write_u32::<BigEndian>(crc)?;

    Ok(buf)
}

// SAFETY: record's length are validated on construction; so all slices are valid.
impl RecordBatchView<'_> {
    pub fn magic(&self) -> i8 {
        (&self.bytes[MAGIC_OFFSET..]).read_i8().expect("read magic")
    }

    pub fn base_offset(&self) -> i64 {
        (&self.bytes[BASE_OFFSET_OFFSET..])
            .read_i64::<BigEndian>()
            .expect("read base offset")
    }

    pub fn last_offset(&self) -> i64 {
        self.base_offset() + self.last_offset_delta() as i64
    }

    pub fn base_sequence(&self) -> i32 {
        (&self.bytes[BASE_SEQUENCE_OFFSET..])
            .read_i32::<BigEndian>()
            .expect("read base sequence")
    }

    pub fn last_sequence(&self) -> i32 {
        match self.base_sequence() {
            NO_SEQUENCE => NO_SEQUENCE,
            seq => increment_sequence(seq, self.last_offset_delta()),
        }
    }

    fn last_offset_delta(&self) -> i32 {
        (&self.bytes[LAST_OFFSET_DELTA_OFFSET..])
            .read_i32::<BigEndian>()
            .expect("read last offset delta")
    }

    pub fn max_timestamp(&self) -> i64 {
        (&self.bytes[MAX_TIMESTAMP_OFFSET..])
            .read_i64::<BigEndian>()
            .expect("read max timestamp")
    }

    pub fn records_count(&self) -> i32 {
        (&self.bytes[RECORDS_COUNT_OFFSET..])
            .read_i32::<BigEndian>()
            .expect("read records count")
    }

    /// Decode this batch's records, decompressing the records section first if the batch was
    /// written with a non-`None` [`CompressionType`]. Callers that read batches off the wire
    /// should call [`Self::verify_checksum`] first; this only reports decode/decompress
    /// failures, not a tampered-but-still-well-formed payload.
    pub fn records(&self) -> IoResult<Vec<Record>> {
        let raw = &self.bytes[RECORDS_COUNT_OFFSET..];
        match self.compression_type()? {
            CompressionType::None => {
                let mut buf = raw;
                RecordList
                    .decode(&mut buf)
                    .map_err(|err| err_codec_message(format!("malformed records: {err}")))
            }
            ty => {
                let count = (&raw[..RECORDS_OFFSET - RECORDS_COUNT_OFFSET])
                    .read_i32::<BigEndian>()
                    .map_err(|err| err_codec_message(format!("read records count: {err}")))?;
                let compressed = &raw[RECORDS_OFFSET - RECORDS_COUNT_OFFSET..];
                let decompressed = compression::decompress(ty, compressed)?;
                let mut full = Vec::with_capacity(Int32::SIZE + decompressed.len());
                full.extend_from_slice(&count.to_be_bytes());
                full.extend_from_slice(&decompressed);
                let mut buf = full.as_slice();
                RecordList
                    .decode(&mut buf)
                    .map_err(|err| err_codec_message(format!("malformed records: {err}")))
            }
        }
    }

    pub fn checksum(&self) -> u32 {
        (&self.bytes[CRC_OFFSET..])
            .read_u32::<BigEndian>()
            .expect("read checksum")
    }

    /// Recompute the CRC-32C over `attributes..end` and compare against the
    /// checksum stamped in the batch header.
    pub fn verify_checksum(&self) -> bool {
        crc32c::crc32c(&self.bytes[ATTRIBUTES_OFFSET..]) == self.checksum()
    }

    pub fn is_transactional(&self) -> bool {
        self.attributes() & TRANSACTIONAL_FLAG_MASK > 0
    }

    pub fn is_control_batch(&self) -> bool {
        self.attributes() & CONTROL_FLAG_MASK > 0
    }

    pub fn timestamp_type(&self) -> TimestampType {
        if self.attributes() & TIMESTAMP_TYPE_MASK != 0 {
            TimestampType::LogAppendTime
        } else {
            TimestampType::CreateTime
        }
    }

    pub fn compression_type(&self) -> IoResult<CompressionType> {
        CompressionType::try_from(self.attributes() & COMPRESSION_CODEC_MASK)
    }

    pub fn delete_horizon_ms(&self) -> Option<i64> {
        if self.has_delete_horizon_ms() {
            Some(
                (&self.bytes[BASE_TIMESTAMP_OFFSET..])
                    .read_i64::<BigEndian>()
                    .expect("read base timestamp offset"),
            )
        } else {
            None
        }
    }

    fn has_delete_horizon_ms(&self) -> bool {
        self.attributes() & DELETE_HORIZON_FLAG_MASK > 0
    }

    // note we're not using the second byte of attributes
    fn attributes(&self) -> u8 {
        (&self.bytes[ATTRIBUTES_OFFSET..])
            .read_u16::<BigEndian>()
            .expect("read attributes") as u8
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::records::record_batch::RecordBatches;

    const RECORD: &[u8] = &[
        // batch 1
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, // first offset
        0x0, 0x0, 0x0, 0x52, // record batch size
        0xFF, 0xFF, 0xFF, 0xFF, // partition leader epoch
        0x2,  // magic byte
        0xE2, 0x3F, 0xC9, 0x74, // crc
        0x0, 0x0, // attributes
        0x0, 0x0, 0x0, 0x0, // last offset delta
        0x0, 0x0, 0x1, 0x89, 0xAF, 0x78, 0x40, 0x72, // base timestamp
        0x0, 0x0, 0x1, 0x89, 0xAF, 0x78, 0x40, 0x72, // max timestamp
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x1, // producer ID
        0x0, 0x0, // producer epoch
        0x0, 0x0, 0x0, 0x0, // base sequence
        0x0, 0x0, 0x0, 0x1,  // record counts
        0x40, // first record size
        0x0,  // attribute
        0x0,  // timestamp delta
        0x0,  // offset delta
        0x1,  // key length (zigzag : -1)
        // empty key payload
        0x34, // value length (zigzag : 26)
        0x54, 0x68, 0x69, 0x73, 0x20, 0x69, 0x73, 0x20, 0x74, 0x68, 0x65, 0x20, 0x66, 0x69, 0x72,
        0x73, 0x74, 0x20, 0x6D, 0x65, 0x73, 0x73, 0x61, 0x67, 0x65, 0x2E, // value payload
        0x0,  // header counts
        // batch 2
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, // first offset
        0x0, 0x0, 0x0, 0x52, // record batch size
        0xFF, 0xFF, 0xFF, 0xFF, // partition leader epoch
        0x2,  // magic byte
        0xE2, 0x3F, 0xC9, 0x74, // crc
        0x0, 0x0, // attributes
        0x0, 0x0, 0x0, 0x0, // last offset delta
        0x0, 0x0, 0x1, 0x89, 0xAF, 0x78, 0x40, 0x72, // base timestamp
        0x0, 0x0, 0x1, 0x89, 0xAF, 0x78, 0x40, 0x72, // max timestamp
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x1, // producer ID
        0x0, 0x0, // producer epoch
        0x0, 0x0, 0x0, 0x0, // base sequence
        0x0, 0x0, 0x0, 0x1,  // record counts
        0x40, // first record size
        0x0,  // attribute
        0x0,  // timestamp delta
        0x0,  // offset delta
        0x1,  // key length (zigzag : -1)
        // empty key payload
        0x34, // value length (zigzag : 26)
        0x54, 0x68, 0x69, 0x73, 0x20, 0x69, 0x73, 0x20, 0x74, 0x68, 0x65, 0x20, 0x66, 0x69, 0x72,
        0x73, 0x74, 0x20, 0x6D, 0x65, 0x73, 0x73, 0x61, 0x67, 0x65, 0x2E, // value payload
        0x0,  // header counts
    ];

    #[test]
    fn test_codec_records() -> io::Result<()> {
        let records = RecordBatches::new(RECORD.to_vec());
        let record_batches = records.batches().unwrap();
        assert_eq!(record_batches.len(), 2);
        let record_batch = record_batches[0].view();
        assert_eq!(record_batch.records_count(), 1);
        let record_vec = record_batch.records().unwrap();
        assert_eq!(record_vec.len(), 1);
        let record = &record_vec[0];
        assert_eq!(record.key_len, -1);
        assert_eq!(record.key, None);
        assert_eq!(record.value_len, 26);
        assert_eq!(
            record.value.as_deref().map(String::from_utf8_lossy),
            Some("This is the first message.".into())
        );
        Ok(())
    }

    #[test]
    fn test_encode_record_batch_roundtrip() {
        let records = vec![Record {
            attributes: 0,
            timestamp_delta: 0,
            offset_delta: 0,
            key: None,
            key_len: -1,
            value: Some(b"hello".to_vec()),
            value_len: 5,
            headers: vec![],
        }];
        let opts = RecordBatchEncodeOpts {
            base_offset: 7,
            producer_id: 42,
            base_sequence: 3,
            ..Default::default()
        };
        let bytes = encode_record_batch(&opts, &records).unwrap();
        let batches = RecordBatches::new(bytes);
        let views = batches.batches().unwrap();
        assert_eq!(views.len(), 1);
        let view = views[0].view();
        assert_eq!(view.base_offset(), 7);
        assert_eq!(view.base_sequence(), 3);
        assert!(view.verify_checksum());
        let decoded = view.records().unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].value.as_deref(), Some(b"hello".as_slice()));
    }

    #[test]
    fn test_encode_record_batch_with_compression() {
        let records = vec![Record {
            attributes: 0,
            timestamp_delta: 0,
            offset_delta: 0,
            key: None,
            key_len: -1,
            value: Some(b"a value worth compressing, repeated, repeated".to_vec()),
            value_len: 46,
            headers: vec![],
        }];
        let opts = RecordBatchEncodeOpts {
            compression_type: CompressionType::Gzip,
            ..Default::default()
        };
        let bytes = encode_record_batch(&opts, &records).unwrap();
        let batches = RecordBatches::new(bytes);
        let views = batches.batches().unwrap();
        let view = views[0].view();
        assert!(view.verify_checksum());
        assert!(matches!(view.compression_type().unwrap(), CompressionType::Gzip));
        let decoded = view.records().unwrap();
        assert_eq!(
            decoded[0].value.as_deref(),
            Some(b"a value worth compressing, repeated, repeated".as_slice())
        );
    }

    #[test]
    fn test_verify_checksum_detects_mutation() {
        let records = vec![Record {
            attributes: 0,
            timestamp_delta: 0,
            offset_delta: 0,
            key: None,
            key_len: -1,
            value: Some(b"hello".to_vec()),
            value_len: 5,
            headers: vec![],
        }];
        let mut bytes = encode_record_batch(&RecordBatchEncodeOpts::default(), &records).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let batches = RecordBatches::new(bytes);
        let views = batches.batches().unwrap();
        assert!(!views[0].view().verify_checksum());
    }

    #[test]
    fn test_compression_type_rejects_unknown_codec() {
        assert!(CompressionType::try_from(5u8).is_err());
        assert!(CompressionType::try_from(6u8).is_err());
        assert!(CompressionType::try_from(7u8).is_err());
    }
}
