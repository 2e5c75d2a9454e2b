//! Typed extension chains.
//!
//! The native protocol lets most records be followed by additional, typed
//! extension records. Instead of exposing raw successor references, callers
//! build an [`ExtensionChain`] of tagged blocks; the chain is serialized
//! into the boundary buffer as a count followed by `(tag, length, bytes)`
//! entries. Block order is preserved.

use super::{DecodeError, Reader, StructureType, Writer};

/// A single typed extension block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionBlock {
    tag: StructureType,
    payload: Vec<u8>,
}

impl ExtensionBlock {
    /// The block's structure tag.
    pub fn tag(&self) -> StructureType {
        self.tag
    }

    /// The block's encoded payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// An ordered list of typed extension blocks appended to a base record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionChain {
    blocks: Vec<ExtensionBlock>,
}

impl ExtensionChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a typed block. Returns `self` for fluent construction.
    pub fn push(mut self, tag: StructureType, payload: Vec<u8>) -> Self {
        self.blocks.push(ExtensionBlock { tag, payload });
        self
    }

    /// `true` if the chain has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks in the chain.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate the blocks in order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionBlock> {
        self.blocks.iter()
    }

    /// First block with the given tag, if any.
    pub fn find(&self, tag: StructureType) -> Option<&ExtensionBlock> {
        self.blocks.iter().find(|b| b.tag == tag)
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.put_u32(self.blocks.len() as u32);
        for block in &self.blocks {
            w.put_tag(block.tag);
            w.put_u32(block.payload.len() as u32);
            w.put_bytes(&block.payload);
        }
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let count = r.get_u32()?;
        let mut blocks = Vec::with_capacity(count.min(16) as usize);
        for _ in 0..count {
            let tag = StructureType::try_from(r.get_i32()?)?;
            let len = r.get_u32()? as usize;
            let payload = r.get_bytes(len)?;
            blocks.push(ExtensionBlock { tag, payload });
        }
        Ok(Self { blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_roundtrip() {
        let mut w = Writer::new();
        ExtensionChain::new().encode(&mut w);
        let buf = w.into_vec();
        assert_eq!(buf, [0, 0, 0, 0]);

        let chain = ExtensionChain::decode(&mut Reader::new(&buf)).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_chain_preserves_block_order() {
        let chain = ExtensionChain::new()
            .push(StructureType::FutureCompletion, vec![1, 2, 3])
            .push(StructureType::FuturePollResult, vec![4]);

        let mut w = Writer::new();
        chain.encode(&mut w);
        let buf = w.into_vec();

        let decoded = ExtensionChain::decode(&mut Reader::new(&buf)).unwrap();
        assert_eq!(decoded.len(), 2);
        let tags: Vec<_> = decoded.iter().map(|b| b.tag()).collect();
        assert_eq!(
            tags,
            [StructureType::FutureCompletion, StructureType::FuturePollResult]
        );
        assert_eq!(decoded.iter().next().unwrap().payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_find_by_tag() {
        let chain = ExtensionChain::new().push(StructureType::FutureCompletion, vec![9]);
        assert!(chain.find(StructureType::FutureCompletion).is_some());
        assert!(chain.find(StructureType::FuturePollInfo).is_none());
    }

    #[test]
    fn test_truncated_block_rejected() {
        let mut w = Writer::new();
        w.put_u32(1);
        w.put_tag(StructureType::FutureCompletion);
        w.put_u32(10); // Claims 10 payload bytes, provides none.
        let buf = w.into_vec();

        assert!(matches!(
            ExtensionChain::decode(&mut Reader::new(&buf)),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
