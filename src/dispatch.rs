//! Parallel block-processing dispatcher.
//!
//! `for_each_block` runs a handler over every block of an already
//! loaded file concurrently, then aggregates the resulting per-block
//! statuses as a minimum. This is the "fork, then join" half of the
//! dispatch story; the "produce-then-spawn" interleave used while
//! reading a file lives in [`crate::file::File::load`].

use log::debug;
use rayon::prelude::*;

use crate::block::Block;

/// Runs `handler` over every block in `blocks` concurrently and returns
/// the minimum (most negative) resulting status. Handlers for distinct
/// blocks never observe or mutate another block: each gets its own
/// `&mut Block` from a disjoint slice position via `par_iter_mut`.
pub fn for_each_block<H>(blocks: &mut [Block], handler: H) -> i32
where
    H: Fn(usize, &mut Block) + Sync,
{
    blocks
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, block)| {
            debug!("Processing block: {index}");
            handler(index, block);
        });
    blocks.iter().map(|b| b.status).min().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    fn block_with_status(status: i32) -> Block {
        let mut b = Block::new_empty();
        b.header.id = BlockType::DataType1.id();
        b.status = status;
        b
    }

    #[test]
    fn aggregates_the_minimum_status() {
        let mut blocks = vec![
            block_with_status(0),
            block_with_status(-3),
            block_with_status(-1),
        ];
        let result = for_each_block(&mut blocks, |_, _| {});
        assert_eq!(result, -3);
    }

    #[test]
    fn handler_can_set_status_per_block() {
        let mut blocks = vec![block_with_status(0), block_with_status(0)];
        let result = for_each_block(&mut blocks, |index, block| {
            if index == 1 {
                block.status = -5;
            }
        });
        assert_eq!(result, -5);
    }

    #[test]
    fn empty_block_list_aggregates_to_zero() {
        let mut blocks: Vec<Block> = Vec::new();
        assert_eq!(for_each_block(&mut blocks, |_, _| {}), 0);
    }
}
