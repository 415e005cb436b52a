use thiserror::Error;

use crate::decoder::{Decode, decode};

/// Every message occupies a fixed slot of status, data1, data2. Running status is not supported.
pub const MESSAGE_SIZE: usize = 3;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet of {0} bytes is not a whole number of 3-byte messages")]
    Misaligned(usize),
    #[error("packet of {0} messages exceeds the 65535 messages a packet can declare")]
    TooManyMessages(usize),
}

/// A timestamped batch of chained messages, borrowed from the host's buffer.
///
/// `num_messages` is the count declared by the host. Decoding never reads past `data`, so a declared count larger
/// than the buffer is truncated to the complete slots it actually holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawPacket<'a> {
    timestamp: u64,
    num_messages: u16,
    data: &'a [u8],
}

impl<'a> RawPacket<'a> {
    #[must_use]
    pub const fn new(timestamp: u64, num_messages: u16, data: &'a [u8]) -> Self {
        Self { timestamp, num_messages, data }
    }

    /// Declares as many messages as `data` holds.
    pub fn from_messages(timestamp: u64, data: &'a [u8]) -> Result<Self, PacketError> {
        Ok(Self::new(timestamp, message_count(data)?, data))
    }

    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    #[must_use]
    pub const fn num_messages(&self) -> u16 {
        self.num_messages
    }

    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of slots that will actually be visited by the decoder.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        usize::from(self.num_messages).min(self.data.len() / MESSAGE_SIZE)
    }

    #[must_use]
    pub fn events(&self) -> Decode<'a> {
        decode(*self)
    }
}

fn message_count(data: &[u8]) -> Result<u16, PacketError> {
    if data.len() % MESSAGE_SIZE != 0 {
        return Err(PacketError::Misaligned(data.len()));
    }
    let count = data.len() / MESSAGE_SIZE;
    u16::try_from(count).map_err(|_| PacketError::TooManyMessages(count))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PacketHeader {
    timestamp: u64,
    offset: usize,
    num_messages: u16,
}

/// Many packets stored back to back in one buffer.
///
/// Packets are addressed by offset into the shared buffer, so iterating never aliases or copies a packet. `clear`
/// keeps the allocations, a list can be refilled without allocating once it has grown to its working size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketList {
    buffer: Vec<u8>,
    headers: Vec<PacketHeader>,
}

impl PacketList {
    #[must_use]
    pub fn with_capacity(packets: usize, messages: usize) -> Self {
        Self { buffer: Vec::with_capacity(messages * MESSAGE_SIZE), headers: Vec::with_capacity(packets) }
    }

    pub fn push(&mut self, timestamp: u64, data: &[u8]) -> Result<(), PacketError> {
        let num_messages = message_count(data)?;
        self.headers.push(PacketHeader { timestamp, offset: self.buffer.len(), num_messages });
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.headers.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<RawPacket<'_>> {
        self.headers.get(index).map(|header| self.packet(header))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = RawPacket<'_>> + ExactSizeIterator + Clone {
        self.headers.iter().map(|header| self.packet(header))
    }

    fn packet(&self, header: &PacketHeader) -> RawPacket<'_> {
        let end = header.offset + usize::from(header.num_messages) * MESSAGE_SIZE;
        RawPacket::new(header.timestamp, header.num_messages, &self.buffer[header.offset..end])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_messages_counts_slots() {
        let packet = RawPacket::from_messages(42, &[0x90, 60, 100, 0x80, 60, 0]).unwrap();
        assert_eq!(packet.num_messages(), 2);
        assert_eq!(packet.timestamp(), 42);
        assert_eq!(packet.slot_count(), 2);
    }

    #[test]
    fn from_messages_rejects_partial_slots() {
        assert_eq!(RawPacket::from_messages(0, &[0x90, 60]), Err(PacketError::Misaligned(2)));
    }

    #[test]
    fn slot_count_never_exceeds_the_buffer() {
        let packet = RawPacket::new(0, 5, &[0x90, 60, 100, 0x90, 61]);
        assert_eq!(packet.slot_count(), 1);
        assert_eq!(RawPacket::new(0, 0, &[0x90, 60, 100]).slot_count(), 0);
    }

    #[test]
    fn list_keeps_packets_in_order() {
        let mut list = PacketList::with_capacity(2, 3);
        list.push(1, &[0x90, 60, 100, 0x90, 64, 100]).unwrap();
        list.push(2, &[0x80, 60, 0]).unwrap();

        assert_eq!(list.len(), 2);
        let timestamps = list.iter().map(|packet| packet.timestamp()).collect::<Vec<_>>();
        assert_eq!(timestamps, vec![1, 2]);
        assert_eq!(list.get(0).unwrap().data(), &[0x90, 60, 100, 0x90, 64, 100]);
        assert_eq!(list.get(1).unwrap().data(), &[0x80, 60, 0]);
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn misaligned_push_leaves_the_list_untouched() {
        let mut list = PacketList::default();
        list.push(1, &[0xB0, 7, 100]).unwrap();
        assert_eq!(list.push(2, &[0xB0, 7, 100, 0xB0]), Err(PacketError::Misaligned(4)));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().data().len(), MESSAGE_SIZE);
    }

    #[test]
    fn oversized_push_leaves_the_list_untouched() {
        let mut list = PacketList::default();
        list.push(1, &[0x90, 60, 100]).unwrap();

        let data = vec![0xB0; (usize::from(u16::MAX) + 1) * MESSAGE_SIZE];
        assert_eq!(list.push(2, &data), Err(PacketError::TooManyMessages(65536)));
        assert_eq!(RawPacket::from_messages(0, &data), Err(PacketError::TooManyMessages(65536)));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().data(), &[0x90, 60, 100]);

        let data = vec![0xB0; usize::from(u16::MAX) * MESSAGE_SIZE];
        list.push(3, &data).unwrap();
        assert_eq!(list.get(1).unwrap().num_messages(), u16::MAX);
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = PacketList::default();
        list.push(1, &[]).unwrap();
        assert!(!list.is_empty());
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }
}
