//! Saved population, little-endian:
//!
//! ```text
//! b"QTPP"  u32 version  u32 generations done  u32 member count
//! per member: network (see `network_format`), i64 fitness, u32 games played
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::evolution::Member;
use crate::network_format::{write_network, write_u32, ByteReader, FormatError};

const MAGIC: &[u8; 4] = b"QTPP";
const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSnapshot {
    pub generation: u32,
    pub members: Vec<Member>,
}

impl PopulationSnapshot {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        write_u32(&mut buf, VERSION);
        write_u32(&mut buf, self.generation);
        write_u32(&mut buf, self.members.len() as u32);
        for member in &self.members {
            write_network(&mut buf, &member.network);
            buf.extend_from_slice(&member.fitness.to_le_bytes());
            write_u32(&mut buf, member.games_played);
        }
        buf
    }

    /// All-or-nothing: any malformed member fails the whole load.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let mut reader = ByteReader::new(data);
        reader.read_magic(MAGIC)?;
        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let generation = reader.read_u32()?;
        let count = reader.read_count()?;
        let mut members = Vec::with_capacity(count);
        for _ in 0..count {
            let network = reader.read_network()?;
            let fitness = reader.read_i64()?;
            let games_played = reader.read_u32()?;
            members.push(Member {
                network: Arc::new(network),
                fitness,
                games_played,
            });
        }
        reader.finish()?;
        Ok(Self {
            generation,
            members,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }
}
