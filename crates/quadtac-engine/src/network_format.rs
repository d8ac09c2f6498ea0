//! Binary layout of a [`Network`], little-endian:
//!
//! ```text
//! u32 layer count
//! per layer:  u32 neuron count
//!   per neuron: u32 weight count, then that many f64 weights
//! ```

use std::io;

use thiserror::Error;

use crate::network::{Layer, Network, NetworkError};

/// Upper bound on any single count, so a corrupt header cannot request a
/// multi-gigabyte allocation.
pub(crate) const MAX_COUNT: u32 = 1 << 16;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid magic bytes (expected {expected:?})")]
    InvalidMagic { expected: [u8; 4] },
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("insufficient data: need {needed} bytes at offset {offset}, have {available}")]
    InsufficientData {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("count {count} at offset {offset} exceeds limit")]
    CountTooLarge { offset: usize, count: u32 },
    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),
    #[error("{expected} members expected, file holds {found}")]
    MemberCount { expected: usize, found: usize },
    #[error("invalid network: {0}")]
    Network(#[from] NetworkError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub fn network_to_bytes(network: &Network) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + network.weight_count() * 8);
    write_network(&mut buf, network);
    buf
}

pub fn network_from_bytes(data: &[u8]) -> Result<Network, FormatError> {
    let mut reader = ByteReader::new(data);
    let network = reader.read_network()?;
    reader.finish()?;
    Ok(network)
}

pub(crate) fn write_network(buf: &mut Vec<u8>, network: &Network) {
    write_u32(buf, network.layers().len() as u32);
    for layer in network.layers() {
        write_u32(buf, layer.len() as u32);
        for weights in layer.neurons() {
            write_u32(buf, weights.len() as u32);
            for weight in weights {
                buf.extend_from_slice(&weight.to_le_bytes());
            }
        }
    }
}

pub(crate) fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let available = self.data.len() - self.offset;
        if available < N {
            return Err(FormatError::InsufficientData {
                offset: self.offset,
                needed: N,
                available,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        Ok(bytes)
    }

    pub(crate) fn read_magic(&mut self, expected: &[u8; 4]) -> Result<(), FormatError> {
        let magic = self.take::<4>()?;
        if &magic != expected {
            return Err(FormatError::InvalidMagic {
                expected: *expected,
            });
        }
        Ok(())
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64, FormatError> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    fn read_f64(&mut self) -> Result<f64, FormatError> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    pub(crate) fn read_count(&mut self) -> Result<usize, FormatError> {
        let offset = self.offset;
        let count = self.read_u32()?;
        if count > MAX_COUNT {
            return Err(FormatError::CountTooLarge { offset, count });
        }
        Ok(count as usize)
    }

    pub(crate) fn read_network(&mut self) -> Result<Network, FormatError> {
        let layer_count = self.read_count()?;
        let mut layers = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            let neuron_count = self.read_count()?;
            let mut neurons = Vec::with_capacity(neuron_count);
            for _ in 0..neuron_count {
                let weight_count = self.read_count()?;
                let weights = (0..weight_count)
                    .map(|_| self.read_f64())
                    .collect::<Result<Vec<_>, _>>()?;
                neurons.push(weights);
            }
            layers.push(Layer::new(neurons));
        }
        Ok(Network::from_layers(layers)?)
    }

    pub(crate) fn finish(&self) -> Result<(), FormatError> {
        match self.data.len() - self.offset {
            0 => Ok(()),
            rest => Err(FormatError::TrailingBytes(rest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> Network {
        let mut rng = StdRng::seed_from_u64(42);
        Network::random(&[16, 8, 1], &mut rng).unwrap()
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let original = sample();
        let restored = network_from_bytes(&network_to_bytes(&original)).unwrap();
        assert_eq!(original, restored);
        for (a, b) in original.layers().iter().zip(restored.layers()) {
            for (na, nb) in a.neurons().iter().zip(b.neurons()) {
                for (wa, wb) in na.iter().zip(nb) {
                    assert_eq!(wa.to_bits(), wb.to_bits());
                }
            }
        }
    }

    #[test]
    fn header_counts_are_little_endian() {
        let bytes = network_to_bytes(&sample());
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &8u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &17u32.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 4 + 8 * (4 + 17 * 8) + 4 + (4 + 9 * 8));
    }

    #[test]
    fn truncated_data_is_rejected() {
        let bytes = network_to_bytes(&sample());
        let result = network_from_bytes(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(FormatError::InsufficientData { .. })));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = network_to_bytes(&sample());
        bytes.push(0);
        assert!(matches!(
            network_from_bytes(&bytes),
            Err(FormatError::TrailingBytes(1))
        ));
    }

    #[test]
    fn inconsistent_dimensions_are_rejected() {
        let mut bytes = Vec::new();
        write_u32(&mut bytes, 2);
        write_u32(&mut bytes, 1);
        write_u32(&mut bytes, 2);
        bytes.extend_from_slice(&0.5f64.to_le_bytes());
        bytes.extend_from_slice(&0.5f64.to_le_bytes());
        write_u32(&mut bytes, 1);
        write_u32(&mut bytes, 3);
        for _ in 0..3 {
            bytes.extend_from_slice(&0.0f64.to_le_bytes());
        }
        assert!(matches!(
            network_from_bytes(&bytes),
            Err(FormatError::Network(NetworkError::WeightCount { .. }))
        ));
    }

    #[test]
    fn absurd_counts_are_rejected() {
        let mut bytes = Vec::new();
        write_u32(&mut bytes, u32::MAX);
        assert!(matches!(
            network_from_bytes(&bytes),
            Err(FormatError::CountTooLarge { offset: 0, .. })
        ));
    }
}
