use tracing::debug;

use crate::error::PclmError;

/// Partition of a page's rows into contiguous strips.
///
/// Every strip has the preferred height except the last, which takes the
/// remainder. Strip heights always sum to the page height.
#[derive(Debug, Clone)]
pub struct StripPlan {
    preferred: u32,
    heights: Vec<u32>,
}

impl StripPlan {
    pub fn new(page_height: u32, preferred: u32) -> Self {
        assert!(preferred > 0, "strip height must be positive");
        let mut heights = Vec::with_capacity(page_height.div_ceil(preferred) as usize);
        let mut remaining = page_height;
        while remaining > 0 {
            let h = preferred.min(remaining);
            heights.push(h);
            remaining -= h;
        }
        StripPlan { preferred, heights }
    }

    pub fn strip_count(&self) -> usize {
        self.heights.len()
    }

    pub fn heights(&self) -> &[u32] {
        &self.heights
    }
}

/// One strip's rows, owned until encode time.
#[derive(Debug)]
pub struct Strip {
    pub start_row: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// All strip buffers for the page currently being ingested.
///
/// Buffers are zero-filled at allocation, so a page that is closed before
/// every row arrived encodes as blank rows rather than garbage.
#[derive(Debug)]
pub struct PageStrips {
    strips: Vec<Strip>,
    preferred: u32,
    page_height: u32,
    line_bytes: usize,
}

impl PageStrips {
    /// Allocate buffers for every strip in the plan. The total allocation is
    /// checked up front; an arithmetic overflow means the page cannot be
    /// represented and is fatal.
    pub fn allocate(plan: &StripPlan, line_bytes: usize) -> crate::error::Result<Self> {
        let page_height: u32 = plan.heights().iter().sum();
        (page_height as usize)
            .checked_mul(line_bytes)
            .ok_or_else(|| {
                PclmError::page_too_big(format!(
                    "{page_height} rows of {line_bytes} bytes overflow"
                ))
            })?;

        let mut strips = Vec::with_capacity(plan.strip_count());
        let mut start_row = 0;
        for &height in plan.heights() {
            strips.push(Strip {
                start_row,
                height,
                data: vec![0; height as usize * line_bytes],
            });
            start_row += height;
        }

        Ok(PageStrips {
            strips,
            preferred: plan.preferred,
            page_height,
            line_bytes,
        })
    }

    /// Copy one normalized row into its owning strip.
    ///
    /// Rows at or beyond the page height are dropped; the transport already
    /// failed hard if it could not deliver what the header promised.
    pub fn write_row(&mut self, row: u32, data: &[u8]) {
        if row >= self.page_height {
            debug!(row, page_height = self.page_height, "dropping out-of-range row");
            return;
        }
        let strip = &mut self.strips[(row / self.preferred) as usize];
        let offset = (row - strip.start_row) as usize * self.line_bytes;
        strip.data[offset..offset + self.line_bytes].copy_from_slice(&data[..self.line_bytes]);
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    /// Release every strip buffer, returning them for encoding.
    pub fn into_strips(self) -> Vec<Strip> {
        self.strips
    }
}
