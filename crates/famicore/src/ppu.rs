//! Picture processing unit.
//!
//! The PPU advances one dot per [`Ppu::clock`] call over a 341x262 grid.
//! Scanline -1 is the pre-render line, 0..=239 are visible, 240 is idle and
//! 241..=260 are vertical blank. Background fetches, scroll updates, sprite
//! evaluation and pixel composition all key off the (scanline, dot) pair.

pub mod buffer;
mod palette;
mod pattern_bus;
pub mod registers;
pub mod sprite;

use tracing::trace;

use crate::cartridge::Mirroring;
use crate::mem_block::ppu::{Ciram, OamRam, PaletteRam, PatternTable, SecondaryOamRam};
use crate::memory::ppu as ppu_mem;

pub use buffer::FrameBuffer;
pub use pattern_bus::PatternBus;
pub use registers::VramAddr;
pub use sprite::Sprite;

use palette::MASTER_PALETTE;
use registers::{Control, Mask, Status};
use sprite::BYTES_PER_SPRITE;

/// Dots per scanline.
pub const DOTS_PER_LINE: u16 = 341;
/// Side of the square tile sheet produced by [`Ppu::pattern_table`].
pub const PATTERN_SHEET_DIM: usize = 128;
/// Last scanline before the counters wrap back to the pre-render line.
pub const LAST_SCANLINE: i16 = 260;
/// Maximum sprites rendered on one scanline.
const MAX_LINE_SPRITES: usize = 8;

#[derive(Debug)]
pub struct Ppu {
    control: Control,
    mask: Mask,
    status: Status,

    // Scroll state: current address, temporary address, fine X and the
    // shared first/second write latch for $2005/$2006.
    vram_addr: VramAddr,
    tram_addr: VramAddr,
    fine_x: u8,
    addr_latch: bool,
    data_buffer: u8,

    scanline: i16,
    dot: u16,

    nametables: Ciram,
    palette_ram: PaletteRam,
    // Backs pattern-table space when the cartridge declines an access.
    pattern_tables: [PatternTable; 2],

    oam: OamRam,
    oam_addr: u8,
    secondary_oam: SecondaryOamRam,
    sprite_count: u8,
    line_sprites: [Sprite; MAX_LINE_SPRITES],
    sprite_shifter_lo: [u8; MAX_LINE_SPRITES],
    sprite_shifter_hi: [u8; MAX_LINE_SPRITES],
    sprite_zero_hit_possible: bool,

    bg_next_tile_id: u8,
    bg_next_tile_attrib: u8,
    bg_next_tile_lsb: u8,
    bg_next_tile_msb: u8,
    bg_shifter_pattern_lo: u16,
    bg_shifter_pattern_hi: u16,
    bg_shifter_attrib_lo: u16,
    bg_shifter_attrib_hi: u16,

    mirroring: Mirroring,
    nmi_pending: bool,
    frame_complete: bool,
    frame_count: u64,
    frame: FrameBuffer,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            vram_addr: VramAddr::default(),
            tram_addr: VramAddr::default(),
            fine_x: 0,
            addr_latch: false,
            data_buffer: 0,
            scanline: -1,
            dot: 0,
            nametables: Ciram::new(),
            palette_ram: PaletteRam::new(),
            pattern_tables: [PatternTable::new(), PatternTable::new()],
            oam: OamRam::new(),
            oam_addr: 0,
            secondary_oam: SecondaryOamRam::new(),
            sprite_count: 0,
            line_sprites: [Sprite::default(); MAX_LINE_SPRITES],
            sprite_shifter_lo: [0; MAX_LINE_SPRITES],
            sprite_shifter_hi: [0; MAX_LINE_SPRITES],
            sprite_zero_hit_possible: false,
            bg_next_tile_id: 0,
            bg_next_tile_attrib: 0,
            bg_next_tile_lsb: 0,
            bg_next_tile_msb: 0,
            bg_shifter_pattern_lo: 0,
            bg_shifter_pattern_hi: 0,
            bg_shifter_attrib_lo: 0,
            bg_shifter_attrib_hi: 0,
            mirroring: Mirroring::Horizontal,
            nmi_pending: false,
            frame_complete: false,
            frame_count: 0,
            frame: FrameBuffer::new(),
        }
    }

    /// Returns registers, latches and timing counters to their power-up
    /// state. Memory contents are left alone, as on the real console.
    pub fn reset(&mut self) {
        self.control = Control::default();
        self.mask = Mask::default();
        self.status = Status::default();
        self.vram_addr = VramAddr::default();
        self.tram_addr = VramAddr::default();
        self.fine_x = 0;
        self.addr_latch = false;
        self.data_buffer = 0;
        self.scanline = -1;
        self.dot = 0;
        self.oam_addr = 0;
        self.sprite_count = 0;
        self.bg_next_tile_id = 0;
        self.bg_next_tile_attrib = 0;
        self.bg_next_tile_lsb = 0;
        self.bg_next_tile_msb = 0;
        self.bg_shifter_pattern_lo = 0;
        self.bg_shifter_pattern_hi = 0;
        self.bg_shifter_attrib_lo = 0;
        self.bg_shifter_attrib_hi = 0;
        self.nmi_pending = false;
        self.frame_complete = false;
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Takes the pending NMI request, clearing it.
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.nmi_pending)
    }

    /// Takes the frame-complete signal, clearing it.
    pub fn take_frame_complete(&mut self) -> bool {
        core::mem::take(&mut self.frame_complete)
    }

    /// CPU read from the `$2000-$2007` register window (mirror-decoded by
    /// the bus). Reads have side effects on status, latch and buffer state.
    pub fn cpu_read(&mut self, addr: u16, pattern: &PatternBus<'_>) -> u8 {
        match addr & ppu_mem::REGISTER_SELECT_MASK {
            ppu_mem::REG_STATUS => {
                // Stale bus contents fill the undriven low five bits.
                let data = (self.status.bits() & 0xE0) | (self.data_buffer & 0x1F);
                self.status.remove(Status::VERTICAL_BLANK);
                self.addr_latch = false;
                data
            }
            ppu_mem::REG_OAM_DATA => self.oam.read(usize::from(self.oam_addr)),
            ppu_mem::REG_DATA => {
                let vram = self.vram_addr.raw() & ppu_mem::VRAM_MIRROR_MASK;
                // Reads below the palette go through a one-access delay
                // buffer; palette reads bypass it but still refresh it from
                // the nametable underneath.
                let mut data = self.data_buffer;
                self.data_buffer = self.vram_read(vram, pattern);
                if vram >= ppu_mem::PALETTE_BASE {
                    data = self.data_buffer;
                }
                self.vram_addr.increment(self.control.vram_increment());
                data
            }
            // Control, mask, OAMADDR, scroll and address are write-only.
            _ => 0,
        }
    }

    /// CPU write to the `$2000-$2007` register window.
    pub fn cpu_write(&mut self, addr: u16, data: u8, pattern: &mut PatternBus<'_>) {
        match addr & ppu_mem::REGISTER_SELECT_MASK {
            ppu_mem::REG_CONTROL => {
                self.control = Control::from_bits_retain(data);
                self.tram_addr
                    .set_nametable_x(u8::from(self.control.contains(Control::NAMETABLE_X)));
                self.tram_addr
                    .set_nametable_y(u8::from(self.control.contains(Control::NAMETABLE_Y)));
            }
            ppu_mem::REG_MASK => {
                self.mask = Mask::from_bits_retain(data);
            }
            ppu_mem::REG_OAM_ADDR => {
                self.oam_addr = data;
            }
            ppu_mem::REG_OAM_DATA => {
                self.oam.write(usize::from(self.oam_addr), data);
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            ppu_mem::REG_SCROLL => {
                if self.addr_latch {
                    self.tram_addr.set_fine_y(data & 0x07);
                    self.tram_addr.set_coarse_y(data >> 3);
                } else {
                    self.fine_x = data & 0x07;
                    self.tram_addr.set_coarse_x(data >> 3);
                }
                self.addr_latch = !self.addr_latch;
            }
            ppu_mem::REG_ADDR => {
                if self.addr_latch {
                    let hi = self.tram_addr.raw() & 0xFF00;
                    self.tram_addr.set_raw(hi | u16::from(data));
                    self.vram_addr = self.tram_addr;
                } else {
                    let lo = self.tram_addr.raw() & 0x00FF;
                    self.tram_addr
                        .set_raw((u16::from(data & 0x3F) << 8) | lo);
                }
                self.addr_latch = !self.addr_latch;
            }
            ppu_mem::REG_DATA => {
                let vram = self.vram_addr.raw() & ppu_mem::VRAM_MIRROR_MASK;
                self.vram_write(vram, data, pattern);
                self.vram_addr.increment(self.control.vram_increment());
            }
            // Status is read-only.
            _ => {}
        }
    }

    /// DMA byte delivered by the bus; lands at `offset` in OAM directly.
    pub fn oam_dma_write(&mut self, offset: u8, data: u8) {
        self.oam.write(usize::from(offset), data);
    }

    /// Resolves a nametable address to an index into internal CIRAM using
    /// the cartridge's mirroring mode.
    fn nametable_index(&self, addr: u16) -> usize {
        let addr = addr & 0x0FFF;
        let table = addr / ppu_mem::NAMETABLE_SIZE;
        let offset = addr & (ppu_mem::NAMETABLE_SIZE - 1);
        let physical = match self.mirroring {
            Mirroring::Vertical => table & 1,
            Mirroring::Horizontal => (table >> 1) & 1,
            Mirroring::OneScreenLo => 0,
            Mirroring::OneScreenHi => 1,
        };
        usize::from(physical * ppu_mem::NAMETABLE_SIZE + offset)
    }

    /// Palette RAM index after the backdrop mirror (`$3F10/$14/$18/$1C`
    /// alias `$3F00/$04/$08/$0C`).
    fn palette_index(addr: u16) -> usize {
        let mut index = addr & (ppu_mem::PALETTE_RAM_SIZE as u16 - 1);
        if matches!(index, 0x10 | 0x14 | 0x18 | 0x1C) {
            index &= !0x10;
        }
        usize::from(index)
    }

    fn palette_read(&self, addr: u16) -> u8 {
        let value = self.palette_ram.read(Self::palette_index(addr));
        if self.mask.contains(Mask::GRAYSCALE) {
            value & 0x30
        } else {
            value & 0x3F
        }
    }

    /// Read from PPU address space (`$0000-$3FFF`).
    pub fn vram_read(&self, addr: u16, pattern: &PatternBus<'_>) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr <= ppu_mem::PATTERN_TABLE_END {
            match pattern.read(addr) {
                Some(data) => data,
                None => {
                    let table = usize::from(addr >> 12) & 1;
                    self.pattern_tables[table]
                        .read(usize::from(addr) & (ppu_mem::PATTERN_TABLE_SIZE - 1))
                }
            }
        } else if addr < ppu_mem::PALETTE_BASE {
            self.nametables.read(self.nametable_index(addr))
        } else {
            self.palette_read(addr)
        }
    }

    /// Write to PPU address space (`$0000-$3FFF`).
    pub fn vram_write(&mut self, addr: u16, data: u8, pattern: &mut PatternBus<'_>) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr <= ppu_mem::PATTERN_TABLE_END {
            if !pattern.write(addr, data) {
                let table = usize::from(addr >> 12) & 1;
                self.pattern_tables[table]
                    .write(usize::from(addr) & (ppu_mem::PATTERN_TABLE_SIZE - 1), data);
            }
        } else if addr < ppu_mem::PALETTE_BASE {
            let index = self.nametable_index(addr);
            self.nametables.write(index, data);
        } else {
            self.palette_ram.write(Self::palette_index(addr), data);
        }
    }

    /// Rasterizes one pattern table as a 16x16 tile sheet through the
    /// chosen palette. Debug/test aid, not part of the render pipeline.
    pub fn pattern_table(&self, index: u8, palette: u8, pattern: &PatternBus<'_>) -> Vec<u32> {
        let mut sheet = vec![0u32; PATTERN_SHEET_DIM * PATTERN_SHEET_DIM];
        let base = u16::from(index & 1) << 12;
        for tile_y in 0..16u16 {
            for tile_x in 0..16u16 {
                let offset = tile_y * 256 + tile_x * 16;
                for row in 0..8u16 {
                    let mut lsb = self.vram_read(base + offset + row, pattern);
                    let mut msb = self.vram_read(base + offset + row + 8, pattern);
                    for col in 0..8u16 {
                        let pixel = ((msb & 0x01) << 1) | (lsb & 0x01);
                        lsb >>= 1;
                        msb >>= 1;
                        let color_index = self.palette_read(
                            ppu_mem::PALETTE_BASE
                                + u16::from(palette << 2)
                                + u16::from(pixel),
                        );
                        let x = usize::from(tile_x * 8 + (7 - col));
                        let y = usize::from(tile_y * 8 + row);
                        sheet[y * PATTERN_SHEET_DIM + x] =
                            MASTER_PALETTE[usize::from(color_index & 0x3F)];
                    }
                }
            }
        }
        sheet
    }

    fn increment_scroll_x(&mut self) {
        if !self.mask.rendering_enabled() {
            return;
        }
        if self.vram_addr.coarse_x() == 31 {
            self.vram_addr.set_coarse_x(0);
            self.vram_addr
                .set_nametable_x(self.vram_addr.nametable_x() ^ 1);
        } else {
            self.vram_addr.set_coarse_x(self.vram_addr.coarse_x() + 1);
        }
    }

    fn increment_scroll_y(&mut self) {
        if !self.mask.rendering_enabled() {
            return;
        }
        if self.vram_addr.fine_y() < 7 {
            self.vram_addr.set_fine_y(self.vram_addr.fine_y() + 1);
            return;
        }
        self.vram_addr.set_fine_y(0);
        match self.vram_addr.coarse_y() {
            // Row 29 is the last row of tiles; wrapping past it flips the
            // vertical nametable. Rows 30/31 hold attribute data and wrap
            // without the flip.
            29 => {
                self.vram_addr.set_coarse_y(0);
                self.vram_addr
                    .set_nametable_y(self.vram_addr.nametable_y() ^ 1);
            }
            31 => self.vram_addr.set_coarse_y(0),
            cy => self.vram_addr.set_coarse_y(cy + 1),
        }
    }

    fn transfer_address_x(&mut self) {
        if !self.mask.rendering_enabled() {
            return;
        }
        self.vram_addr.set_nametable_x(self.tram_addr.nametable_x());
        self.vram_addr.set_coarse_x(self.tram_addr.coarse_x());
    }

    fn transfer_address_y(&mut self) {
        if !self.mask.rendering_enabled() {
            return;
        }
        self.vram_addr.set_fine_y(self.tram_addr.fine_y());
        self.vram_addr.set_nametable_y(self.tram_addr.nametable_y());
        self.vram_addr.set_coarse_y(self.tram_addr.coarse_y());
    }

    fn load_background_shifters(&mut self) {
        self.bg_shifter_pattern_lo =
            (self.bg_shifter_pattern_lo & 0xFF00) | u16::from(self.bg_next_tile_lsb);
        self.bg_shifter_pattern_hi =
            (self.bg_shifter_pattern_hi & 0xFF00) | u16::from(self.bg_next_tile_msb);
        // Attribute bits are expanded to full-byte planes so the same
        // fine-X mux serves pattern and palette bits.
        self.bg_shifter_attrib_lo = (self.bg_shifter_attrib_lo & 0xFF00)
            | if self.bg_next_tile_attrib & 0b01 != 0 { 0xFF } else { 0x00 };
        self.bg_shifter_attrib_hi = (self.bg_shifter_attrib_hi & 0xFF00)
            | if self.bg_next_tile_attrib & 0b10 != 0 { 0xFF } else { 0x00 };
    }

    fn update_shifters(&mut self) {
        if self.mask.contains(Mask::SHOW_BACKGROUND) {
            self.bg_shifter_pattern_lo <<= 1;
            self.bg_shifter_pattern_hi <<= 1;
            self.bg_shifter_attrib_lo <<= 1;
            self.bg_shifter_attrib_hi <<= 1;
        }
        if self.mask.contains(Mask::SHOW_SPRITES) && self.dot >= 1 && self.dot < 258 {
            for i in 0..usize::from(self.sprite_count) {
                if self.line_sprites[i].x > 0 {
                    self.line_sprites[i].x -= 1;
                } else {
                    self.sprite_shifter_lo[i] <<= 1;
                    self.sprite_shifter_hi[i] <<= 1;
                }
            }
        }
    }

    /// Scans all 64 OAM entries for sprites intersecting the next scanline
    /// and copies up to eight of them into secondary OAM. A ninth match
    /// sets the overflow flag.
    fn evaluate_sprites(&mut self) {
        self.secondary_oam.as_mut_slice().fill(0xFF);
        self.sprite_shifter_lo = [0; MAX_LINE_SPRITES];
        self.sprite_shifter_hi = [0; MAX_LINE_SPRITES];
        self.sprite_zero_hit_possible = false;

        let height = i16::from(self.control.sprite_height());
        let mut count: usize = 0;
        for entry in 0..ppu_mem::OAM_RAM_SIZE / BYTES_PER_SPRITE {
            if count == MAX_LINE_SPRITES + 1 {
                break;
            }
            let sprite = Sprite::read(self.oam.as_slice(), entry);
            let row = self.scanline - i16::from(sprite.y);
            if row >= 0 && row < height {
                if count < MAX_LINE_SPRITES {
                    if entry == 0 {
                        self.sprite_zero_hit_possible = true;
                    }
                    sprite.write(self.secondary_oam.as_mut_slice(), count);
                }
                count += 1;
            }
        }
        if count > MAX_LINE_SPRITES {
            self.status.insert(Status::SPRITE_OVERFLOW);
            count = MAX_LINE_SPRITES;
        }
        self.sprite_count = count as u8;
        for i in 0..count {
            self.line_sprites[i] = Sprite::read(self.secondary_oam.as_slice(), i);
        }
        if count > 0 {
            trace!(
                scanline = self.scanline,
                sprites = count,
                "sprite evaluation"
            );
        }
    }

    /// Pattern-table address of the low bit plane for one line sprite on
    /// the current scanline, honoring size mode and vertical flip.
    fn sprite_pattern_addr(&self, sprite: Sprite) -> u16 {
        let row = (self.scanline - i16::from(sprite.y)) as u16;
        let tile = u16::from(sprite.tile);
        if self.control.contains(Control::SPRITE_SIZE_16) {
            // 8x16: bit 0 of the tile id selects the pattern table, the
            // row selects the top or bottom half-tile.
            let table = (tile & 0x01) << 12;
            let row = if sprite.flip_v() { 15 - row } else { row };
            let half = if row < 8 { 0 } else { 1 };
            table | (((tile & 0xFE) + half) << 4) | (row & 0x07)
        } else {
            let row = if sprite.flip_v() { 7 - row } else { row };
            self.control.sprite_pattern_table() | (tile << 4) | row
        }
    }

    /// Loads the pattern shifters for every sprite found by evaluation.
    fn fetch_sprite_patterns(&mut self, pattern: &PatternBus<'_>) {
        for i in 0..usize::from(self.sprite_count) {
            let sprite = self.line_sprites[i];
            let addr_lo = self.sprite_pattern_addr(sprite);
            let mut bits_lo = self.vram_read(addr_lo, pattern);
            let mut bits_hi = self.vram_read(addr_lo + 8, pattern);
            if sprite.flip_h() {
                bits_lo = bits_lo.reverse_bits();
                bits_hi = bits_hi.reverse_bits();
            }
            self.sprite_shifter_lo[i] = bits_lo;
            self.sprite_shifter_hi[i] = bits_hi;
        }
    }

    /// Current background pixel and palette from the shifters, or (0, 0)
    /// when the background layer is disabled or clipped.
    fn background_pixel(&self) -> (u8, u8) {
        if !self.mask.contains(Mask::SHOW_BACKGROUND) {
            return (0, 0);
        }
        if !self.mask.contains(Mask::SHOW_BACKGROUND_LEFT) && self.dot < 9 {
            return (0, 0);
        }
        let bit_mux = 0x8000_u16 >> self.fine_x;
        let p0 = u8::from(self.bg_shifter_pattern_lo & bit_mux != 0);
        let p1 = u8::from(self.bg_shifter_pattern_hi & bit_mux != 0);
        let a0 = u8::from(self.bg_shifter_attrib_lo & bit_mux != 0);
        let a1 = u8::from(self.bg_shifter_attrib_hi & bit_mux != 0);
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }

    /// First opaque sprite pixel in priority order, with its palette, its
    /// front-of-background flag and whether it came from sprite zero.
    fn sprite_pixel(&self) -> (u8, u8, bool, bool) {
        if !self.mask.contains(Mask::SHOW_SPRITES) {
            return (0, 0, false, false);
        }
        if !self.mask.contains(Mask::SHOW_SPRITES_LEFT) && self.dot < 9 {
            return (0, 0, false, false);
        }
        for i in 0..usize::from(self.sprite_count) {
            let sprite = self.line_sprites[i];
            if sprite.x != 0 {
                continue;
            }
            let p0 = u8::from(self.sprite_shifter_lo[i] & 0x80 != 0);
            let p1 = u8::from(self.sprite_shifter_hi[i] & 0x80 != 0);
            let pixel = (p1 << 1) | p0;
            if pixel != 0 {
                return (pixel, sprite.palette(), !sprite.behind_background(), i == 0);
            }
        }
        (0, 0, false, false)
    }

    fn sprite_zero_hit_window(&self) -> bool {
        let start = if self.mask.left_edge_enabled() { 1 } else { 9 };
        self.dot >= start && self.dot < 258
    }

    fn compose_pixel(&mut self) {
        if self.dot < 1 || self.dot > 256 || self.scanline < 0 || self.scanline >= 240 {
            return;
        }
        let (bg_pixel, bg_palette) = self.background_pixel();
        let (fg_pixel, fg_palette, fg_in_front, from_sprite_zero) = self.sprite_pixel();

        let (pixel, palette) = match (bg_pixel, fg_pixel) {
            (0, 0) => (0, 0),
            (0, _) => (fg_pixel, fg_palette),
            (_, 0) => (bg_pixel, bg_palette),
            _ => {
                if self.sprite_zero_hit_possible
                    && from_sprite_zero
                    && self.mask.contains(Mask::SHOW_BACKGROUND)
                    && self.mask.contains(Mask::SHOW_SPRITES)
                    && self.sprite_zero_hit_window()
                {
                    self.status.insert(Status::SPRITE_ZERO_HIT);
                }
                if fg_in_front {
                    (fg_pixel, fg_palette)
                } else {
                    (bg_pixel, bg_palette)
                }
            }
        };

        let color_index =
            self.palette_read(ppu_mem::PALETTE_BASE + u16::from(palette << 2) + u16::from(pixel));
        let color = MASTER_PALETTE[usize::from(color_index & 0x3F)];
        self.frame
            .set_pixel(usize::from(self.dot - 1), self.scanline as usize, color);
    }

    /// Advances the PPU by one dot.
    pub fn clock(&mut self, pattern: &mut PatternBus<'_>) {
        if self.scanline < 240 {
            // Pre-render and visible scanlines share the fetch pipeline.
            if self.scanline == 0
                && self.dot == 0
                && self.frame_count & 1 == 1
                && self.mask.rendering_enabled()
            {
                // Odd frames drop the idle dot of the first visible line.
                self.dot = 1;
            }
            if self.scanline == -1 && self.dot == 1 {
                self.status.remove(
                    Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
                );
                self.sprite_shifter_lo = [0; MAX_LINE_SPRITES];
                self.sprite_shifter_hi = [0; MAX_LINE_SPRITES];
            }

            if (self.dot >= 2 && self.dot < 258) || (self.dot >= 321 && self.dot < 338) {
                self.update_shifters();
                match (self.dot - 1) % 8 {
                    0 => {
                        self.load_background_shifters();
                        self.bg_next_tile_id = self.vram_read(
                            ppu_mem::NAMETABLE_BASE | (self.vram_addr.raw() & 0x0FFF),
                            pattern,
                        );
                    }
                    2 => {
                        let v = self.vram_addr;
                        let attr_addr = 0x23C0
                            | (u16::from(v.nametable_y()) << 11)
                            | (u16::from(v.nametable_x()) << 10)
                            | (u16::from(v.coarse_y() >> 2) << 3)
                            | u16::from(v.coarse_x() >> 2);
                        let mut attrib = self.vram_read(attr_addr, pattern);
                        if v.coarse_y() & 0x02 != 0 {
                            attrib >>= 4;
                        }
                        if v.coarse_x() & 0x02 != 0 {
                            attrib >>= 2;
                        }
                        self.bg_next_tile_attrib = attrib & 0x03;
                    }
                    4 => {
                        let addr = self.control.background_pattern_table()
                            + (u16::from(self.bg_next_tile_id) << 4)
                            + u16::from(self.vram_addr.fine_y());
                        self.bg_next_tile_lsb = self.vram_read(addr, pattern);
                    }
                    6 => {
                        let addr = self.control.background_pattern_table()
                            + (u16::from(self.bg_next_tile_id) << 4)
                            + u16::from(self.vram_addr.fine_y())
                            + 8;
                        self.bg_next_tile_msb = self.vram_read(addr, pattern);
                    }
                    7 => self.increment_scroll_x(),
                    _ => {}
                }
            }

            if self.dot == 256 {
                self.increment_scroll_y();
            }
            if self.dot == 257 {
                self.load_background_shifters();
                self.transfer_address_x();
                if self.scanline >= 0 {
                    self.evaluate_sprites();
                }
            }
            if self.dot == 338 || self.dot == 340 {
                // Unused nametable fetches at the end of the line.
                self.bg_next_tile_id = self.vram_read(
                    ppu_mem::NAMETABLE_BASE | (self.vram_addr.raw() & 0x0FFF),
                    pattern,
                );
            }
            if self.dot == 340 {
                self.fetch_sprite_patterns(pattern);
            }
            if self.scanline == -1 && self.dot >= 280 && self.dot < 305 {
                self.transfer_address_y();
            }
        }

        if self.scanline == 241 && self.dot == 1 {
            self.status.insert(Status::VERTICAL_BLANK);
            if self.control.nmi_enabled() {
                self.nmi_pending = true;
            }
        }

        self.compose_pixel();

        self.dot += 1;
        if self.dot >= DOTS_PER_LINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = -1;
                self.frame_complete = true;
                self.frame_count += 1;
                trace!(frame = self.frame_count, "frame complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_oam_entry(ppu: &mut Ppu, entry: usize, y: u8) {
        Sprite {
            y,
            tile: 0,
            attr: 0,
            x: 0,
        }
        .write(ppu.oam.as_mut_slice(), entry);
    }

    #[test]
    fn timing_counters_start_at_pre_render_line() {
        let ppu = Ppu::new();
        assert_eq!(ppu.scanline(), -1);
        assert_eq!(ppu.dot(), 0);

        let mut ppu = Ppu::new();
        ppu.scanline = 100;
        ppu.dot = 17;
        ppu.reset();
        assert_eq!(ppu.scanline(), -1);
        assert_eq!(ppu.dot(), 0);
    }

    #[test]
    fn status_read_clears_vblank_and_write_latch() {
        let mut ppu = Ppu::new();
        let pattern = PatternBus::new(None);
        ppu.status.insert(Status::VERTICAL_BLANK);
        ppu.data_buffer = 0xAB;
        ppu.addr_latch = true;

        let value = ppu.cpu_read(0x2002, &pattern);
        assert_eq!(value, 0x80 | (0xAB & 0x1F));
        assert!(!ppu.status.contains(Status::VERTICAL_BLANK));
        assert!(!ppu.addr_latch);
    }

    #[test]
    fn data_reads_are_buffered_except_palette() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);
        ppu.set_mirroring(Mirroring::Vertical);
        ppu.vram_write(0x2005, 0x42, &mut pattern);
        ppu.palette_ram.write(0x01, 0x17);

        // Nametable read returns the stale buffer first.
        ppu.cpu_write(0x2006, 0x20, &mut pattern);
        ppu.cpu_write(0x2006, 0x05, &mut pattern);
        assert_eq!(ppu.cpu_read(0x2007, &pattern), 0x00);
        ppu.cpu_write(0x2006, 0x20, &mut pattern);
        ppu.cpu_write(0x2006, 0x05, &mut pattern);
        assert_eq!(ppu.cpu_read(0x2007, &pattern), 0x42);

        // Palette reads bypass the buffer.
        ppu.cpu_write(0x2006, 0x3F, &mut pattern);
        ppu.cpu_write(0x2006, 0x01, &mut pattern);
        assert_eq!(ppu.cpu_read(0x2007, &pattern), 0x17);
    }

    #[test]
    fn scroll_and_addr_share_the_write_latch() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);

        ppu.cpu_write(0x2005, 0b0101_1110, &mut pattern);
        assert_eq!(ppu.fine_x, 0b110);
        assert_eq!(ppu.tram_addr.coarse_x(), 0b01011);

        ppu.cpu_write(0x2005, 0b1001_0011, &mut pattern);
        assert_eq!(ppu.tram_addr.fine_y(), 0b011);
        assert_eq!(ppu.tram_addr.coarse_y(), 0b10010);

        // Second $2006 write copies t into v.
        ppu.cpu_write(0x2006, 0x21, &mut pattern);
        assert_ne!(ppu.vram_addr.raw(), ppu.tram_addr.raw());
        ppu.cpu_write(0x2006, 0x08, &mut pattern);
        assert_eq!(ppu.vram_addr.raw(), 0x2108);
        assert_eq!(ppu.tram_addr.raw(), 0x2108);
    }

    #[test]
    fn nametable_mirroring_selects_ciram_half() {
        let mut ppu = Ppu::new();

        ppu.set_mirroring(Mirroring::Vertical);
        assert_eq!(ppu.nametable_index(0x2000), 0x0000);
        assert_eq!(ppu.nametable_index(0x2400), 0x0400);
        assert_eq!(ppu.nametable_index(0x2800), 0x0000);
        assert_eq!(ppu.nametable_index(0x2C00), 0x0400);

        ppu.set_mirroring(Mirroring::Horizontal);
        assert_eq!(ppu.nametable_index(0x2000), 0x0000);
        assert_eq!(ppu.nametable_index(0x2400), 0x0000);
        assert_eq!(ppu.nametable_index(0x2800), 0x0400);
        assert_eq!(ppu.nametable_index(0x2C00), 0x0400);

        ppu.set_mirroring(Mirroring::OneScreenHi);
        assert_eq!(ppu.nametable_index(0x2000), 0x0400);
    }

    #[test]
    fn palette_backdrop_mirrors() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);
        ppu.vram_write(0x3F10, 0x21, &mut pattern);
        assert_eq!(ppu.vram_read(0x3F00, &pattern), 0x21);
        ppu.vram_write(0x3F04, 0x15, &mut pattern);
        assert_eq!(ppu.vram_read(0x3F14, &pattern), 0x15);
    }

    #[test]
    fn ninth_matching_sprite_sets_overflow() {
        let mut ppu = Ppu::new();
        ppu.scanline = 50;
        for entry in 0..9 {
            write_oam_entry(&mut ppu, entry, 48);
        }
        // Park the rest of OAM off-screen.
        for entry in 9..64 {
            write_oam_entry(&mut ppu, entry, 0xF0);
        }

        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 8);
        assert!(ppu.status.contains(Status::SPRITE_OVERFLOW));
        assert!(ppu.sprite_zero_hit_possible);
    }

    #[test]
    fn eight_matching_sprites_do_not_overflow() {
        let mut ppu = Ppu::new();
        ppu.scanline = 50;
        for entry in 0..8 {
            write_oam_entry(&mut ppu, entry, 48);
        }
        for entry in 8..64 {
            write_oam_entry(&mut ppu, entry, 0xF0);
        }

        ppu.evaluate_sprites();
        assert_eq!(ppu.sprite_count, 8);
        assert!(!ppu.status.contains(Status::SPRITE_OVERFLOW));
    }

    /// Puts an opaque sprite-zero pixel over an opaque background pixel at
    /// `dot`, as the pipeline would have them after the dot-340 fetches.
    fn stage_sprite_zero_overlap(ppu: &mut Ppu, dot: u16) {
        ppu.scanline = 100;
        ppu.dot = dot;
        ppu.fine_x = 0;
        ppu.bg_shifter_pattern_lo = 0xFFFF;
        ppu.sprite_count = 1;
        ppu.line_sprites[0] = Sprite {
            y: 100,
            tile: 0,
            attr: 0,
            x: 0,
        };
        ppu.sprite_shifter_lo[0] = 0xFF;
        ppu.sprite_zero_hit_possible = true;
    }

    #[test]
    fn sprite_zero_hit_on_opaque_overlap() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND
            | Mask::SHOW_SPRITES
            | Mask::SHOW_BACKGROUND_LEFT
            | Mask::SHOW_SPRITES_LEFT;

        stage_sprite_zero_overlap(&mut ppu, 1);
        ppu.compose_pixel();
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn sprite_zero_hit_skips_the_clipped_left_edge() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES;

        // With left-edge clipping on, the hit window opens at dot 9.
        stage_sprite_zero_overlap(&mut ppu, 8);
        ppu.compose_pixel();
        assert!(!ppu.status.contains(Status::SPRITE_ZERO_HIT));

        stage_sprite_zero_overlap(&mut ppu, 9);
        ppu.compose_pixel();
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn sprite_zero_hit_needs_both_layers() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_SPRITES | Mask::SHOW_SPRITES_LEFT;

        stage_sprite_zero_overlap(&mut ppu, 20);
        ppu.compose_pixel();
        assert!(!ppu.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn pattern_sheet_decodes_planar_tiles() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);
        // Tile 1 of table 0: low plane solid, high plane empty (pixel 1).
        for row in 0..8 {
            ppu.vram_write(0x0010 + row, 0xFF, &mut pattern);
        }
        ppu.palette_ram.write(0x00, 0x0F);
        ppu.palette_ram.write(0x01, 0x16);

        let sheet = ppu.pattern_table(0, 0, &pattern);
        let solid = MASTER_PALETTE[0x16];
        let backdrop = MASTER_PALETTE[0x0F];
        // Tile 1 occupies x 8..16 of the top tile row.
        for y in 0..8 {
            for x in 8..16 {
                assert_eq!(sheet[y * PATTERN_SHEET_DIM + x], solid);
            }
        }
        assert_eq!(sheet[0], backdrop);
    }

    #[test]
    fn vblank_raises_flag_and_nmi_when_enabled() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);
        ppu.cpu_write(0x2000, 0x80, &mut pattern);
        ppu.scanline = 241;
        ppu.dot = 1;
        ppu.clock(&mut pattern);
        assert!(ppu.status.contains(Status::VERTICAL_BLANK));
        assert!(ppu.take_nmi());
        assert!(!ppu.take_nmi());
    }

    #[test]
    fn frame_completes_after_full_grid() {
        let mut ppu = Ppu::new();
        let mut pattern = PatternBus::new(None);
        let dots = u64::from(DOTS_PER_LINE) * 262;
        for _ in 0..dots {
            ppu.clock(&mut pattern);
        }
        assert!(ppu.take_frame_complete());
        assert_eq!(ppu.scanline(), -1);
        assert_eq!(ppu.dot(), 0);
        assert_eq!(ppu.frame_count(), 1);
    }
}
