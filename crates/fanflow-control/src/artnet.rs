//! Art-Net output encoding (Art-Net 4)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.
//! A fan frame rarely fits a single DMX universe, so the encoder splits
//! the pixel buffer into 512-byte chunks addressed to consecutive
//! universes; the controller maps universe `u` back to byte offset
//! `u * 512` of its frame buffer, so chunk order is part of the contract.

/// Default Art-Net UDP port.
pub const ART_NET_PORT: u16 = 6454;

/// DMX channels per universe.
const UNIVERSE_SIZE: usize = 512;

/// ArtDmx header bytes before the channel data.
const HEADER_SIZE: usize = 18;

/// Logical output address: the 15-bit Art-Net Port-Address split into
/// net (7 bit), sub-net (4 bit) and universe (4 bit). Fixed per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAddress {
    /// Art-Net net.
    pub net: u8,
    /// Art-Net sub-net.
    pub subnet: u8,
    /// First universe of the output.
    pub universe: u8,
}

impl DeviceAddress {
    /// Create an address from its three components.
    pub fn new(net: u8, subnet: u8, universe: u8) -> Self {
        Self {
            net,
            subnet,
            universe,
        }
    }

    /// The 15-bit Port-Address this output starts at.
    pub fn port_address(&self) -> u16 {
        ((self.net as u16) << 8) | ((self.subnet as u16) << 4) | self.universe as u16
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.net, self.subnet, self.universe)
    }
}

/// One encoded frame: the ArtDmx packets for every universe chunk, in
/// universe order, plus the sequence counter value after encoding.
///
/// `sequence == 0` marks the batch on which the counter has just wrapped;
/// the transmit loop uses that for its periodic throughput diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBatch {
    /// Wire-ready datagrams, one per universe, in universe order.
    pub packets: Vec<Vec<u8>>,
    /// Encoder counter value after this batch, wrapping mod 256.
    pub sequence: u8,
}

impl PacketBatch {
    /// Total wire bytes in the batch.
    pub fn wire_len(&self) -> usize {
        self.packets.iter().map(Vec::len).sum()
    }
}

/// Stateful ArtDmx encoder for one output device.
pub struct ArtNetEncoder {
    address: DeviceAddress,
    sequence: u8,
}

impl ArtNetEncoder {
    /// Create an encoder addressing `address`.
    pub fn new(address: DeviceAddress) -> Self {
        Self {
            address,
            sequence: 0,
        }
    }

    /// Current wrapping per-batch counter (diagnostics only).
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Encode one pixel frame into ArtDmx packets, one per 512-byte
    /// universe chunk. The counter increments once per call, not per
    /// packet.
    pub fn encode(&mut self, frame: &[u8]) -> PacketBatch {
        let packets = frame
            .chunks(UNIVERSE_SIZE)
            .enumerate()
            .map(|(i, chunk)| self.build_packet(i as u16, chunk))
            .collect();

        self.sequence = self.sequence.wrapping_add(1);
        PacketBatch {
            packets,
            sequence: self.sequence,
        }
    }

    /// Build an ArtDmx packet (OpDmx) for the chunk at universe offset
    /// `offset`.
    fn build_packet(&self, offset: u16, data: &[u8]) -> Vec<u8> {
        // DMX data length must be even
        let length = data.len() + data.len() % 2;
        let mut packet = vec![0u8; HEADER_SIZE + length];

        // Header: "Art-Net\0"
        packet[0..8].copy_from_slice(b"Art-Net\0");

        // OpCode: OpDmx (0x5000)
        packet[8..10].copy_from_slice(&0x5000u16.to_le_bytes());

        // Protocol version (14)
        packet[10..12].copy_from_slice(&14u16.to_be_bytes());

        // Sequence
        packet[12] = self.sequence;

        // Physical (0)
        packet[13] = 0;

        // Port-Address of this chunk's universe
        let port_address = self.address.port_address() + offset;
        packet[14..16].copy_from_slice(&port_address.to_le_bytes());

        // Length (big-endian)
        packet[16..18].copy_from_slice(&(length as u16).to_be_bytes());

        // DMX data
        packet[HEADER_SIZE..HEADER_SIZE + data.len()].copy_from_slice(data);

        packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_artdmx_packet_structure() {
        let mut encoder = ArtNetEncoder::new(DeviceAddress::new(1, 0, 0));
        let batch = encoder.encode(&[0u8; 12]);

        assert_eq!(batch.packets.len(), 1);
        let packet = &batch.packets[0];

        // Header
        assert_eq!(&packet[0..8], b"Art-Net\0");

        // OpCode (little-endian)
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x50);

        // Protocol version (big-endian)
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);

        // Sequence of the first batch
        assert_eq!(packet[12], 0);

        // Port-Address: net 1 -> 0x0100
        assert_eq!(u16::from_le_bytes([packet[14], packet[15]]), 0x0100);

        // Length (big-endian)
        assert_eq!(u16::from_be_bytes([packet[16], packet[17]]), 12);

        assert_eq!(packet.len(), 18 + 12);
    }

    #[test]
    fn test_universe_increments_per_chunk() {
        let mut encoder = ArtNetEncoder::new(DeviceAddress::new(2, 0, 0));
        let batch = encoder.encode(&vec![7u8; 512 + 512 + 30]);

        assert_eq!(batch.packets.len(), 3);
        let addresses: Vec<u16> = batch
            .packets
            .iter()
            .map(|p| u16::from_le_bytes([p[14], p[15]]))
            .collect();
        assert_eq!(addresses, vec![0x0200, 0x0201, 0x0202]);

        // Full universes carry 512 channels, the tail is padded to even
        assert_eq!(batch.packets[0].len(), 18 + 512);
        assert_eq!(batch.packets[2].len(), 18 + 30);
    }

    #[test]
    fn test_odd_tail_is_padded() {
        let mut encoder = ArtNetEncoder::new(DeviceAddress::new(0, 0, 0));
        let batch = encoder.encode(&[1u8; 3]);

        let packet = &batch.packets[0];
        assert_eq!(u16::from_be_bytes([packet[16], packet[17]]), 4);
        assert_eq!(&packet[18..], &[1, 1, 1, 0]);
    }

    #[test]
    fn test_sequence_increments_per_batch() {
        let mut encoder = ArtNetEncoder::new(DeviceAddress::new(0, 0, 0));
        let frame = vec![0u8; 600];

        let first = encoder.encode(&frame);
        let second = encoder.encode(&frame);

        // Both packets of a batch carry the same sequence byte
        assert_eq!(first.packets[0][12], first.packets[1][12]);
        assert_eq!(second.packets[0][12], first.packets[0][12].wrapping_add(1));
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_sequence_wraps_after_256_batches() {
        let mut encoder = ArtNetEncoder::new(DeviceAddress::new(0, 0, 0));

        let mut last = PacketBatch {
            packets: Vec::new(),
            sequence: 0,
        };
        for _ in 0..256 {
            last = encoder.encode(&[0u8; 6]);
        }

        assert_eq!(last.sequence, 0);
        assert_eq!(encoder.sequence(), 0);
    }

    #[test]
    fn test_encoding_is_deterministic_at_fixed_sequence() {
        let frame = vec![42u8; 700];

        let batch_a = ArtNetEncoder::new(DeviceAddress::new(3, 1, 0)).encode(&frame);
        let batch_b = ArtNetEncoder::new(DeviceAddress::new(3, 1, 0)).encode(&frame);

        assert_eq!(batch_a, batch_b);
    }

    proptest! {
        #[test]
        fn wire_len_is_a_function_of_frame_len(len in 0usize..2048) {
            let mut encoder = ArtNetEncoder::new(DeviceAddress::new(0, 0, 0));
            let batch = encoder.encode(&vec![0u8; len]);

            let universes = len.div_ceil(512);
            let padded = len + len % 2;
            prop_assert_eq!(batch.packets.len(), universes);
            prop_assert_eq!(batch.wire_len(), universes * 18 + padded);
        }
    }
}
