//! Dual-channel pheromone field for stigmergic trail building

use crate::config::PheromoneConfig;
use formica_data::{PheromoneChannel, Position};
use serde::{Deserialize, Serialize};

/// Pheromone intensities of a single cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PheromoneCell {
    pub food: f32, // 0.0 - max_intensity
    pub home: f32, // 0.0 - max_intensity
}

impl PheromoneCell {
    #[inline]
    pub fn get(&self, channel: PheromoneChannel) -> f32 {
        match channel {
            PheromoneChannel::Food => self.food,
            PheromoneChannel::Home => self.home,
        }
    }

    fn slot(&mut self, channel: PheromoneChannel) -> &mut f32 {
        match channel {
            PheromoneChannel::Food => &mut self.food,
            PheromoneChannel::Home => &mut self.home,
        }
    }

    pub fn deposit(&mut self, channel: PheromoneChannel, amount: f32, max: f32) {
        let slot = self.slot(channel);
        *slot = (*slot + amount.max(0.0)).clamp(0.0, max);
    }

    pub fn evaporate(&mut self, keep: f32, threshold: f32) {
        self.food *= keep;
        self.home *= keep;

        // Clean up very small values
        if self.food < threshold {
            self.food = 0.0;
        }
        if self.home < threshold {
            self.home = 0.0;
        }
    }
}

/// Grid-shaped pheromone map.
///
/// Diffusion reads exclusively from `back_buffer`, a copy of the field taken
/// before the pass starts, so the result does not depend on scan order.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PheromoneField {
    cells: Vec<PheromoneCell>,
    #[serde(skip)]
    back_buffer: Vec<PheromoneCell>,
    width: u16,
    height: u16,
    params: PheromoneConfig,
}

impl PheromoneField {
    pub fn new(width: u16, height: u16, params: PheromoneConfig) -> Self {
        let cells = vec![PheromoneCell::default(); width as usize * height as usize];
        let back_buffer = cells.clone();
        Self {
            cells,
            back_buffer,
            width,
            height,
            params,
        }
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn params(&self) -> &PheromoneConfig {
        &self.params
    }

    /// Adds `amount` to `channel` at `pos`, clamped to the maximum intensity.
    /// Returns `false` when `pos` is outside the field.
    pub fn deposit(&mut self, pos: Position, channel: PheromoneChannel, amount: f32) -> bool {
        let max = self.params.max_intensity;
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx].deposit(channel, amount, max);
                true
            }
            None => false,
        }
    }

    /// Multiplicative decay of both channels in every cell.
    pub fn evaporate(&mut self) {
        let keep = 1.0 - self.params.evaporation_rate;
        let threshold = self.params.min_threshold;
        for cell in &mut self.cells {
            cell.evaporate(keep, threshold);
        }
    }

    /// Blends every cell with the mean of its in-bounds neighbours.
    pub fn diffuse(&mut self) {
        if self.back_buffer.len() != self.cells.len() {
            self.back_buffer = self.cells.clone();
        } else {
            self.back_buffer.copy_from_slice(&self.cells);
        }

        let rate = self.params.diffusion_rate;
        let max = self.params.max_intensity;
        let w = self.width as i32;
        let h = self.height as i32;

        for y in 0..h {
            for x in 0..w {
                let mut food_sum = 0.0f32;
                let mut home_sum = 0.0f32;
                let mut count = 0u32;

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx >= 0 && nx < w && ny >= 0 && ny < h {
                            let n = &self.back_buffer[ny as usize * w as usize + nx as usize];
                            food_sum += n.food;
                            home_sum += n.home;
                            count += 1;
                        }
                    }
                }

                let idx = y as usize * w as usize + x as usize;
                let own = self.back_buffer[idx];
                if count > 0 {
                    let cell = &mut self.cells[idx];
                    cell.food = (own.food * (1.0 - rate) + food_sum * rate / count as f32)
                        .clamp(0.0, max);
                    cell.home = (own.home * (1.0 - rate) + home_sum * rate / count as f32)
                        .clamp(0.0, max);
                }
            }
        }
    }

    /// Intensity at `pos`, or 0 outside the field.
    pub fn intensity(&self, pos: Position, channel: PheromoneChannel) -> f32 {
        self.index(pos)
            .map(|idx| self.cells[idx].get(channel))
            .unwrap_or(0.0)
    }

    /// Strongest value among the up to eight neighbours of `pos`.
    pub fn max_neighbor_intensity(&self, pos: Position, channel: PheromoneChannel) -> f32 {
        if self.index(pos).is_none() {
            return 0.0;
        }
        formica_data::Direction::ALL
            .iter()
            .map(|d| self.intensity(pos.step(*d), channel))
            .fold(0.0f32, f32::max)
    }

    pub fn get_cell(&self, pos: Position) -> Option<&PheromoneCell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Overwrites both channels at `pos`, clamped into range.
    pub fn set(&mut self, pos: Position, food: f32, home: f32) -> bool {
        let max = self.params.max_intensity;
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = PheromoneCell {
                    food: food.clamp(0.0, max),
                    home: home.clamp(0.0, max),
                };
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, pos: Position) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = PheromoneCell::default();
        }
    }

    pub fn reset(&mut self) {
        self.cells.fill(PheromoneCell::default());
        tracing::debug!("Pheromone field reset");
    }

    /// Reallocates both buffers for new dimensions. Same-size calls are no-ops.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        let len = width as usize * height as usize;
        self.cells = vec![PheromoneCell::default(); len];
        self.back_buffer = vec![PheromoneCell::default(); len];
        self.width = width;
        self.height = height;
    }

    pub fn total(&self, channel: PheromoneChannel) -> f32 {
        self.cells.iter().map(|c| c.get(channel)).sum()
    }

    pub fn cells(&self) -> &[PheromoneCell] {
        &self.cells
    }
}
