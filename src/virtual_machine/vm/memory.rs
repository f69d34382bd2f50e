use crate::virtual_machine::{Address, Word};
use std::collections::HashMap;

/// Addresses below this bound (or below the image length, if larger) live in the
/// dense region.
const DEFAULT_DENSE_LIMIT: usize = 1 << 20;

/// Unbounded word-addressed memory. Unwritten cells read as zero.
///
/// Memory layout: `[dense region][sparse region]`
/// - **Dense region**: a vector seeded with the program image that grows on demand
///   when a write lands past its end, up to `dense_limit`.
/// - **Sparse region**: a hash map for every address at or above `dense_limit`, so a
///   stray write far past the image does not allocate the gap.
///
/// Each address belongs to exactly one region, decided by `dense_limit` alone.
#[derive(Clone, Debug)]
pub struct Memory {
    dense: Vec<Word>,
    sparse: HashMap<Address, Word>,
    dense_limit: usize,
}

impl Memory {
    /// Creates memory holding `image` at addresses `0..image.len()`.
    pub fn from_image(image: &[Word]) -> Self {
        Self {
            dense: image.to_vec(),
            sparse: HashMap::new(),
            dense_limit: DEFAULT_DENSE_LIMIT.max(image.len()),
        }
    }

    /// Reads the word at `address`.
    pub fn get(&self, address: Address) -> Word {
        match self.dense_index(address) {
            Some(index) => self.dense.get(index).copied().unwrap_or(0),
            None => self.sparse.get(&address).copied().unwrap_or(0),
        }
    }

    /// Writes `value` at `address`, growing the backing storage as needed.
    pub fn set(&mut self, address: Address, value: Word) {
        match self.dense_index(address) {
            Some(index) => {
                if index >= self.dense.len() {
                    self.dense.resize(index + 1, 0);
                }
                self.dense[index] = value;
            }
            None => {
                self.sparse.insert(address, value);
            }
        }
    }

    /// Copies up to `len` consecutive words starting at `start`, stopping at the top of
    /// the address space.
    pub fn slice(&self, start: Address, len: usize) -> Vec<Word> {
        (0..len as Address)
            .map_while(|offset| start.checked_add(offset))
            .map(|address| self.get(address))
            .collect()
    }

    /// Length of the dense region currently backed by storage.
    pub fn dense_len(&self) -> usize {
        self.dense.len()
    }

    /// Number of cells written in the sparse region.
    pub fn sparse_len(&self) -> usize {
        self.sparse.len()
    }

    fn dense_index(&self, address: Address) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|index| *index < self.dense_limit)
    }
}

impl PartialEq for Memory {
    /// Two memories are equal when every address reads the same value, regardless of
    /// how much zero padding either one has allocated.
    fn eq(&self, other: &Self) -> bool {
        let len = self.dense.len().max(other.dense.len());
        let dense_equal = (0..len).all(|i| {
            self.dense.get(i).copied().unwrap_or(0) == other.dense.get(i).copied().unwrap_or(0)
        });
        let sparse_equal = self
            .sparse
            .iter()
            .all(|(address, value)| other.get(*address) == *value)
            && other
                .sparse
                .iter()
                .all(|(address, value)| self.get(*address) == *value);
        dense_equal && sparse_equal
    }
}

impl Eq for Memory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_is_loaded_from_zero() {
        let mem = Memory::from_image(&[1, 2, 3]);
        assert_eq!(mem.get(0), 1);
        assert_eq!(mem.get(2), 3);
        assert_eq!(mem.dense_len(), 3);
    }

    #[test]
    fn unwritten_cells_read_zero() {
        let mem = Memory::from_image(&[7]);
        assert_eq!(mem.get(1), 0);
        assert_eq!(mem.get(10_000), 0);
        assert_eq!(mem.get(u64::MAX), 0);
    }

    #[test]
    fn writes_past_image_grow_dense_region() {
        let mut mem = Memory::from_image(&[0; 4]);
        mem.set(100, 5);
        assert_eq!(mem.get(100), 5);
        assert_eq!(mem.dense_len(), 101);
        assert_eq!(mem.sparse_len(), 0);
    }

    #[test]
    fn far_writes_go_to_sparse_region() {
        let mut mem = Memory::from_image(&[0; 4]);
        let far = (DEFAULT_DENSE_LIMIT as Address) * 1000;
        mem.set(far, -9);
        assert_eq!(mem.get(far), -9);
        assert_eq!(mem.dense_len(), 4);
        assert_eq!(mem.sparse_len(), 1);
    }

    #[test]
    fn equality_ignores_zero_padding() {
        let a = Memory::from_image(&[1, 2]);
        let mut b = Memory::from_image(&[1, 2]);
        b.set(50, 0);
        assert_eq!(a, b);
        b.set(51, 3);
        assert_ne!(a, b);
    }

    #[test]
    fn slice_reads_across_unwritten_cells() {
        let mut mem = Memory::from_image(&[4, 5]);
        mem.set(3, 6);
        assert_eq!(mem.slice(0, 5), vec![4, 5, 0, 6, 0]);
    }

    #[test]
    fn slice_stops_at_top_of_address_space() {
        let mut mem = Memory::from_image(&[]);
        mem.set(Address::MAX, 9);
        assert_eq!(mem.slice(Address::MAX - 1, 4), vec![0, 9]);
    }
}
