//! OAM DMA transfer state.
//!
//! A write to `$4014` suspends the CPU and copies one 256-byte page into
//! OAM. The engine idles until it reaches an odd CPU cycle, then runs
//! read/write pairs for 512 cycles: a transfer whose first stalled cycle
//! is odd aligns right away for 513 total, one starting on an even cycle
//! burns that cycle too and stalls 514.

#[derive(Debug, Default)]
pub struct OamDma {
    page: u8,
    cursor: u8,
    data: u8,
    waiting: bool,
    active: bool,
}

impl OamDma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a transfer from CPU page `page`.
    pub fn begin(&mut self, page: u8) {
        self.page = page;
        self.cursor = 0;
        self.waiting = true;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn waiting_for_alignment(&self) -> bool {
        self.waiting
    }

    pub(crate) fn align(&mut self) {
        self.waiting = false;
    }

    pub(crate) fn page(&self) -> u8 {
        self.page
    }

    pub(crate) fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Holds the byte fetched on a read cycle until the write cycle.
    pub(crate) fn stage(&mut self, data: u8) {
        self.data = data;
    }

    /// Finishes a write cycle, returning the OAM offset and byte to store.
    /// The transfer completes when the cursor wraps back to zero.
    pub(crate) fn commit(&mut self) -> (u8, u8) {
        let pair = (self.cursor, self.data);
        self.cursor = self.cursor.wrapping_add(1);
        if self.cursor == 0 {
            self.active = false;
        }
        pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_completes_after_full_page() {
        let mut dma = OamDma::new();
        dma.begin(0x02);
        assert!(dma.is_active());
        assert!(dma.waiting_for_alignment());
        dma.align();

        for i in 0..=255u8 {
            dma.stage(i);
            assert_eq!(dma.commit(), (i, i));
        }
        assert!(!dma.is_active());
    }
}
