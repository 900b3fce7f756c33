//! Binary min-heap of cell indices keyed by F-cost
//!
//! Keeps the heap slot of every queued cell so a cell whose F-cost dropped
//! can be moved up in place instead of being pushed a second time.

/// Open list for the A* search
#[derive(Debug, Clone, Default)]
pub struct OpenList {
    heap: Vec<u32>,
    slot: Vec<u32>,
}

impl OpenList {
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            heap: Vec::with_capacity(cells),
            slot: vec![0; cells],
        }
    }

    /// Resize for a grid with `cells` cells and empty the heap
    pub fn resize(&mut self, cells: usize) {
        self.heap.clear();
        self.heap.reserve(cells);
        self.slot.clear();
        self.slot.resize(cells, 0);
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, cell: usize, f_cost: &[u32]) {
        let slot = self.heap.len();
        self.heap.push(cell as u32);
        self.slot[cell] = slot as u32;
        self.sift_up(slot, f_cost);
    }

    /// Remove and return the cell with the lowest F-cost
    pub fn pop(&mut self, f_cost: &[u32]) -> Option<usize> {
        let last = self.heap.pop()?;
        if self.heap.is_empty() {
            return Some(last as usize);
        }

        let top = self.heap[0];
        self.heap[0] = last;
        self.slot[last as usize] = 0;
        self.sift_down(0, f_cost);
        Some(top as usize)
    }

    /// Restore heap order after the F-cost of a queued cell decreased
    pub fn decrease(&mut self, cell: usize, f_cost: &[u32]) {
        let slot = self.slot[cell] as usize;
        debug_assert_eq!(self.heap.get(slot), Some(&(cell as u32)));
        self.sift_up(slot, f_cost);
    }

    fn sift_up(&mut self, mut slot: usize, f_cost: &[u32]) {
        let cell = self.heap[slot];
        let key = f_cost[cell as usize];

        while slot > 0 {
            let parent = (slot - 1) / 2;
            let parent_cell = self.heap[parent];
            if f_cost[parent_cell as usize] <= key {
                break;
            }
            self.heap[slot] = parent_cell;
            self.slot[parent_cell as usize] = slot as u32;
            slot = parent;
        }

        self.heap[slot] = cell;
        self.slot[cell as usize] = slot as u32;
    }

    fn sift_down(&mut self, mut slot: usize, f_cost: &[u32]) {
        let len = self.heap.len();
        let cell = self.heap[slot];
        let key = f_cost[cell as usize];

        loop {
            let left = slot * 2 + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && f_cost[self.heap[right] as usize] < f_cost[self.heap[left] as usize]
            {
                right
            } else {
                left
            };

            let child_cell = self.heap[child];
            if f_cost[child_cell as usize] >= key {
                break;
            }
            self.heap[slot] = child_cell;
            self.slot[child_cell as usize] = slot as u32;
            slot = child;
        }

        self.heap[slot] = cell;
        self.slot[cell as usize] = slot as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_cost_order() {
        let f_cost = vec![50, 10, 40, 20, 30];
        let mut open = OpenList::with_capacity(f_cost.len());
        for cell in 0..f_cost.len() {
            open.push(cell, &f_cost);
        }

        let order: Vec<usize> = std::iter::from_fn(|| open.pop(&f_cost)).collect();
        assert_eq!(order, vec![1, 3, 4, 2, 0]);
        assert!(open.is_empty());
    }

    #[test]
    fn test_decrease_moves_cell_up() {
        let mut f_cost = vec![50, 10, 40, 20, 30];
        let mut open = OpenList::with_capacity(f_cost.len());
        for cell in 0..f_cost.len() {
            open.push(cell, &f_cost);
        }

        f_cost[0] = 5;
        open.decrease(0, &f_cost);
        assert_eq!(open.pop(&f_cost), Some(0));
        assert_eq!(open.pop(&f_cost), Some(1));
        assert_eq!(open.len(), 3);
    }

    #[test]
    fn test_resize_empties() {
        let f_cost = vec![1, 2];
        let mut open = OpenList::with_capacity(2);
        open.push(0, &f_cost);
        open.resize(8);
        assert!(open.is_empty());
        assert_eq!(open.pop(&f_cost), None);
    }
}
