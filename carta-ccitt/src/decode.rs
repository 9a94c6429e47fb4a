use crate::bit_reader::BitReader;
use crate::tables::{BLACK_TREE, LEAF, MODE_TREE, MODES, Mode, NONE, Tree, WHITE_TREE};
use crate::{DecodeError, Result};

impl BitReader<'_> {
    /// Walk `tree` bit by bit until a leaf is reached and return its value.
    #[inline]
    fn decode_code<const N: usize>(&mut self, tree: &Tree<N>) -> Result<u16> {
        let mut node = 0;

        loop {
            let edge = tree.nodes[node].edges[self.read_bit()? as usize];

            if edge == NONE {
                return Err(DecodeError::InvalidCode);
            } else if edge & LEAF != 0 {
                return Ok(edge & !LEAF);
            }

            node = edge as usize;
        }
    }

    /// Decode a complete run: any number of make-up codes followed by one terminating code.
    pub(crate) fn decode_run(&mut self, white: bool) -> Result<usize> {
        let tree = if white { &WHITE_TREE } else { &BLACK_TREE };
        let mut total = 0_usize;

        loop {
            let len = self.decode_code(tree)?;
            total = total
                .checked_add(usize::from(len))
                .ok_or(DecodeError::Overflow)?;

            if len < 64 {
                return Ok(total);
            }
        }
    }

    pub(crate) fn decode_mode(&mut self) -> Result<Mode> {
        let idx = self.decode_code(&MODE_TREE)?;

        MODES
            .get(usize::from(idx))
            .copied()
            .ok_or(DecodeError::InvalidCode)
    }
}
