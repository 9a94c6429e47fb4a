//! Code tables from ITU-T T.4/T.6 and the binary decoding trees built from them.
//!
//! Every code is stored as `(bit length, code)`. Terminating codes are indexed by the run
//! length they encode, make-up codes by `run_length / 64 - 1` and the common make-up codes
//! by `(run_length - 1792) / 64`.

/// A 2D coding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Pass,
    Horizontal,
    Vertical(i8),
}

/// Two consecutive EOL codes, which end a Group 4 image.
pub(crate) const EOFB: u32 = 0x001001;
/// Minimum number of zero bits that precede the final `1` of an EOL code.
pub(crate) const EOL_ZEROS: usize = 11;

pub(crate) const WHITE_TERMINATING: [(u8, u16); 64] = [
    (8, 0b00110101),
    (6, 0b000111),
    (4, 0b0111),
    (4, 0b1000),
    (4, 0b1011),
    (4, 0b1100),
    (4, 0b1110),
    (4, 0b1111),
    (5, 0b10011),
    (5, 0b10100),
    (5, 0b00111),
    (5, 0b01000),
    (6, 0b001000),
    (6, 0b000011),
    (6, 0b110100),
    (6, 0b110101),
    (6, 0b101010),
    (6, 0b101011),
    (7, 0b0100111),
    (7, 0b0001100),
    (7, 0b0001000),
    (7, 0b0010111),
    (7, 0b0000011),
    (7, 0b0000100),
    (7, 0b0101000),
    (7, 0b0101011),
    (7, 0b0010011),
    (7, 0b0100100),
    (7, 0b0011000),
    (8, 0b00000010),
    (8, 0b00000011),
    (8, 0b00011010),
    (8, 0b00011011),
    (8, 0b00010010),
    (8, 0b00010011),
    (8, 0b00010100),
    (8, 0b00010101),
    (8, 0b00010110),
    (8, 0b00010111),
    (8, 0b00101000),
    (8, 0b00101001),
    (8, 0b00101010),
    (8, 0b00101011),
    (8, 0b00101100),
    (8, 0b00101101),
    (8, 0b00000100),
    (8, 0b00000101),
    (8, 0b00001010),
    (8, 0b00001011),
    (8, 0b01010010),
    (8, 0b01010011),
    (8, 0b01010100),
    (8, 0b01010101),
    (8, 0b00100100),
    (8, 0b00100101),
    (8, 0b01011000),
    (8, 0b01011001),
    (8, 0b01011010),
    (8, 0b01011011),
    (8, 0b01001010),
    (8, 0b01001011),
    (8, 0b00110010),
    (8, 0b00110011),
    (8, 0b00110100),
];

pub(crate) const BLACK_TERMINATING: [(u8, u16); 64] = [
    (10, 0b0000110111),
    (3, 0b010),
    (2, 0b11),
    (2, 0b10),
    (3, 0b011),
    (4, 0b0011),
    (4, 0b0010),
    (5, 0b00011),
    (6, 0b000101),
    (6, 0b000100),
    (7, 0b0000100),
    (7, 0b0000101),
    (7, 0b0000111),
    (8, 0b00000100),
    (8, 0b00000111),
    (9, 0b000011000),
    (10, 0b0000010111),
    (10, 0b0000011000),
    (10, 0b0000001000),
    (11, 0b00001100111),
    (11, 0b00001101000),
    (11, 0b00001101100),
    (11, 0b00000110111),
    (11, 0b00000101000),
    (11, 0b00000010111),
    (11, 0b00000011000),
    (12, 0b000011001010),
    (12, 0b000011001011),
    (12, 0b000011001100),
    (12, 0b000011001101),
    (12, 0b000001101000),
    (12, 0b000001101001),
    (12, 0b000001101010),
    (12, 0b000001101011),
    (12, 0b000011010010),
    (12, 0b000011010011),
    (12, 0b000011010100),
    (12, 0b000011010101),
    (12, 0b000011010110),
    (12, 0b000011010111),
    (12, 0b000001101100),
    (12, 0b000001101101),
    (12, 0b000011011010),
    (12, 0b000011011011),
    (12, 0b000001010100),
    (12, 0b000001010101),
    (12, 0b000001010110),
    (12, 0b000001010111),
    (12, 0b000001100100),
    (12, 0b000001100101),
    (12, 0b000001010010),
    (12, 0b000001010011),
    (12, 0b000000100100),
    (12, 0b000000110111),
    (12, 0b000000111000),
    (12, 0b000000100111),
    (12, 0b000000101000),
    (12, 0b000001011000),
    (12, 0b000001011001),
    (12, 0b000000101011),
    (12, 0b000000101100),
    (12, 0b000001011010),
    (12, 0b000001100110),
    (12, 0b000001100111),
];

/// Make-up codes for 64 to 1728.
pub(crate) const WHITE_MAKEUP: [(u8, u16); 27] = [
    (5, 0b11011),
    (5, 0b10010),
    (6, 0b010111),
    (7, 0b0110111),
    (8, 0b00110110),
    (8, 0b00110111),
    (8, 0b01100100),
    (8, 0b01100101),
    (8, 0b01101000),
    (8, 0b01100111),
    (9, 0b011001100),
    (9, 0b011001101),
    (9, 0b011010010),
    (9, 0b011010011),
    (9, 0b011010100),
    (9, 0b011010101),
    (9, 0b011010110),
    (9, 0b011010111),
    (9, 0b011011000),
    (9, 0b011011001),
    (9, 0b011011010),
    (9, 0b011011011),
    (9, 0b010011000),
    (9, 0b010011001),
    (9, 0b010011010),
    (6, 0b011000),
    (9, 0b010011011),
];

/// Make-up codes for 64 to 1728.
pub(crate) const BLACK_MAKEUP: [(u8, u16); 27] = [
    (10, 0b0000001111),
    (12, 0b000011001000),
    (12, 0b000011001001),
    (12, 0b000001011011),
    (12, 0b000000110011),
    (12, 0b000000110100),
    (12, 0b000000110101),
    (13, 0b0000001101100),
    (13, 0b0000001101101),
    (13, 0b0000001001010),
    (13, 0b0000001001011),
    (13, 0b0000001001100),
    (13, 0b0000001001101),
    (13, 0b0000001110010),
    (13, 0b0000001110011),
    (13, 0b0000001110100),
    (13, 0b0000001110101),
    (13, 0b0000001110110),
    (13, 0b0000001110111),
    (13, 0b0000001010010),
    (13, 0b0000001010011),
    (13, 0b0000001010100),
    (13, 0b0000001010101),
    (13, 0b0000001011010),
    (13, 0b0000001011011),
    (13, 0b0000001100100),
    (13, 0b0000001100101),
];

/// Make-up codes for 1792 to 2560, shared by both colors.
pub(crate) const COMMON_MAKEUP: [(u8, u16); 13] = [
    (11, 0b00000001000),
    (11, 0b00000001100),
    (11, 0b00000001101),
    (12, 0b000000010010),
    (12, 0b000000010011),
    (12, 0b000000010100),
    (12, 0b000000010101),
    (12, 0b000000010110),
    (12, 0b000000010111),
    (12, 0b000000011100),
    (12, 0b000000011101),
    (12, 0b000000011110),
    (12, 0b000000011111),
];

/// Mode codes, in the order Pass, Horizontal, V0, VR1, VR2, VR3, VL1, VL2, VL3.
pub(crate) const MODE_CODES: [(u8, u16); 9] = [
    (4, 0b0001),
    (3, 0b001),
    (1, 0b1),
    (3, 0b011),
    (6, 0b000011),
    (7, 0b0000011),
    (3, 0b010),
    (6, 0b000010),
    (7, 0b0000010),
];

pub(crate) const MODES: [Mode; 9] = [
    Mode::Pass,
    Mode::Horizontal,
    Mode::Vertical(0),
    Mode::Vertical(1),
    Mode::Vertical(2),
    Mode::Vertical(3),
    Mode::Vertical(-1),
    Mode::Vertical(-2),
    Mode::Vertical(-3),
];

// A node stores one edge per bit value. An edge is either the index of the next node, a
// leaf carrying a value (`LEAF | value`), or `NONE`.
pub(crate) const LEAF: u16 = 0x8000;
pub(crate) const NONE: u16 = 0xFFFF;

#[derive(Clone, Copy)]
pub(crate) struct Node {
    pub(crate) edges: [u16; 2],
}

/// A binary decoding tree with `N` nodes. Node 0 is the root.
pub(crate) struct Tree<const N: usize> {
    pub(crate) nodes: [Node; N],
    len: usize,
}

impl<const N: usize> Tree<N> {
    const fn new() -> Self {
        Self {
            nodes: [Node { edges: [NONE; 2] }; N],
            len: 1,
        }
    }

    const fn insert(mut self, len: u8, code: u16, value: u16) -> Self {
        let mut node = 0;
        let mut depth = 0;

        while depth < len {
            let bit = ((code >> (len - 1 - depth)) & 1) as usize;

            if depth == len - 1 {
                self.nodes[node].edges[bit] = LEAF | value;
            } else {
                let edge = self.nodes[node].edges[bit];

                if edge == NONE {
                    self.nodes[node].edges[bit] = self.len as u16;
                    node = self.len;
                    self.len += 1;
                } else {
                    node = edge as usize;
                }
            }

            depth += 1;
        }

        self
    }

    const fn insert_all<const M: usize>(
        mut self,
        codes: &[(u8, u16); M],
        first: u16,
        step: u16,
    ) -> Self {
        let mut i = 0;

        while i < M {
            let (len, code) = codes[i];
            self = self.insert(len, code, first + i as u16 * step);
            i += 1;
        }

        self
    }
}

const fn run_tree(terminating: &[(u8, u16); 64], makeup: &[(u8, u16); 27]) -> Tree<104> {
    Tree::new()
        .insert_all(terminating, 0, 1)
        .insert_all(makeup, 64, 64)
        .insert_all(&COMMON_MAKEUP, 1792, 64)
}

pub(crate) static WHITE_TREE: Tree<104> = run_tree(&WHITE_TERMINATING, &WHITE_MAKEUP);
pub(crate) static BLACK_TREE: Tree<104> = run_tree(&BLACK_TERMINATING, &BLACK_MAKEUP);
pub(crate) static MODE_TREE: Tree<9> = Tree::new().insert_all(&MODE_CODES, 0, 1);

#[cfg(test)]
mod tests {
    use super::*;

    fn count_leaves<const N: usize>(tree: &Tree<N>) -> usize {
        tree.nodes[..tree.len]
            .iter()
            .flat_map(|n| n.edges)
            .filter(|e| *e != NONE && e & LEAF != 0)
            .count()
    }

    #[test]
    fn every_code_becomes_a_leaf() {
        assert_eq!(count_leaves(&WHITE_TREE), 64 + 27 + 13);
        assert_eq!(count_leaves(&BLACK_TREE), 64 + 27 + 13);
        assert_eq!(count_leaves(&MODE_TREE), 9);
    }

    #[test]
    fn trees_fit_their_storage() {
        assert!(WHITE_TREE.len <= 104);
        assert!(BLACK_TREE.len <= 104);
        assert_eq!(MODE_TREE.len, 9);
    }
}
