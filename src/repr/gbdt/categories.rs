//! Categorical split storage for tree nodes.
//!
//! LightGBM stores categorical splits as bitsets of the categories that go
//! LEFT. Categories not in the set go right.

// =============================================================================
// CategoriesStorage
// =============================================================================

/// Storage for categorical split bitsets in a tree.
///
/// # Format
///
/// - `categories`: flat array of u32 bitset words for all nodes
/// - `segments`: per-node `(start_index, size)` into the categories array
///
/// # Decision Rule
///
/// For a categorical split on a node with category `c`:
/// - bit `c` SET → go LEFT
/// - bit `c` NOT set, or `c` beyond the stored words → go RIGHT
#[derive(Debug, Clone, Default)]
pub struct CategoriesStorage {
    categories: Box<[u32]>,
    /// Indexed by node. Nodes without categorical splits have `(0, 0)`.
    segments: Box<[(u32, u32)]>,
}

impl CategoriesStorage {
    /// Create empty categories storage.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create categories storage from raw data.
    ///
    /// `segments` must have one entry per tree node.
    pub fn new(categories: Vec<u32>, segments: Vec<(u32, u32)>) -> Self {
        Self {
            categories: categories.into_boxed_slice(),
            segments: segments.into_boxed_slice(),
        }
    }

    /// Check if a category is in the "left" set for a given node.
    #[inline]
    pub fn category_goes_left(&self, node_idx: u32, category: u32) -> bool {
        let Some(&(start, size)) = self.segments.get(node_idx as usize) else {
            return false;
        };

        let word_idx = category >> 5;
        let bit_idx = category & 31;
        if word_idx >= size {
            return false;
        }

        let word = self.categories[(start + word_idx) as usize];
        (word >> bit_idx) & 1 != 0
    }

    /// Per-node segments.
    #[inline]
    pub fn segments(&self) -> &[(u32, u32)] {
        &self.segments
    }
}

/// Build a packed u32 bitset from a list of category values.
///
/// Within each word, bit `i` represents category `word_index * 32 + i`:
/// ```text
/// Word 0: [cat 31] [cat 30] ... [cat 1] [cat 0]   (LSB = cat 0)
/// Word 1: [cat 63] [cat 62] ... [cat 33] [cat 32]
/// ```
pub fn categories_to_bitset(categories: &[u32]) -> Vec<u32> {
    let Some(max_cat) = categories.iter().copied().max() else {
        return Vec::new();
    };

    let mut bitset = vec![0u32; ((max_cat >> 5) + 1) as usize];
    for &cat in categories {
        bitset[(cat >> 5) as usize] |= 1u32 << (cat & 31);
    }
    bitset
}
