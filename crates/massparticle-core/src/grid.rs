use glam::{IVec3, UVec3, Vec3};

use crate::config::{lattice_cells, KernelParameters};
use crate::particle::Particle;

/// Regular 3-D cell lattice over the world volume, rebuilt every step.
///
/// Uses counting sort for O(N) construction: count particles per cell -> prefix sum -> scatter.
/// Cell contents are indices into the particle array and are only valid until
/// the particle store is next mutated.
pub struct SpatialHashGrid {
    world_min: Vec3,
    scaler: Vec3,
    div: UVec3,
    cell_size: Vec3,
    /// Count array (reused): cell_count[cell] = number of particles in cell
    cell_count: Vec<u32>,
    /// Prefix sum: cell_start[cell] = index where particles for this cell begin in sorted_indices
    cell_start: Vec<u32>,
    /// Particle indices sorted by cell
    sorted_indices: Vec<u32>,
}

impl SpatialHashGrid {
    pub fn new(params: &KernelParameters) -> Self {
        let mut grid = Self {
            world_min: Vec3::ZERO,
            scaler: Vec3::ONE,
            div: UVec3::ONE,
            cell_size: Vec3::ONE,
            cell_count: Vec::new(),
            cell_start: Vec::new(),
            sorted_indices: Vec::new(),
        };
        grid.configure(params);
        grid
    }

    /// Adopt a new lattice. Contents are discarded.
    pub fn configure(&mut self, params: &KernelParameters) {
        self.world_min = params.world_min();
        self.scaler = params.scaler;
        self.div = params.world_div;
        self.cell_size = params.cell_size();
        let cells = self.cell_total();
        self.cell_count.clear();
        self.cell_count.resize(cells, 0);
        self.cell_start.clear();
        self.cell_start.resize(cells, 0);
        self.sorted_indices.clear();
    }

    #[inline]
    pub fn div(&self) -> UVec3 {
        self.div
    }

    #[inline]
    pub fn cell_total(&self) -> usize {
        lattice_cells(self.div).map_or(0, |cells| cells as usize)
    }

    #[inline]
    pub fn min_cell_size(&self) -> f32 {
        self.cell_size.min_element()
    }

    /// Build the grid from current positions and write each particle's `hash`.
    /// O(N) using counting sort.
    pub fn build(&mut self, particles: &mut [Particle]) {
        self.cell_count.fill(0);

        for p in particles.iter_mut() {
            let h = self.cell_index(p.position);
            p.hash = h;
            self.cell_count[h as usize] += 1;
        }

        let mut running = 0u32;
        for (start, count) in self.cell_start.iter_mut().zip(self.cell_count.iter_mut()) {
            *start = running;
            running += *count;
            *count = 0;
        }

        self.sorted_indices.clear();
        self.sorted_indices.resize(particles.len(), 0);
        for (i, p) in particles.iter().enumerate() {
            let h = p.hash as usize;
            let idx = self.cell_start[h] + self.cell_count[h];
            self.sorted_indices[idx as usize] = i as u32;
            self.cell_count[h] += 1;
        }
    }

    /// Integer cell coordinates for a position, clamped into the lattice.
    /// Positions outside the world land in the boundary cell.
    #[inline]
    pub fn cell_coords(&self, pos: Vec3) -> IVec3 {
        let c = ((pos - self.world_min) * self.scaler).floor();
        let max = self.div.as_ivec3() - IVec3::ONE;
        // NaN maps to 0 through the saturating float->int cast.
        IVec3::new(c.x as i32, c.y as i32, c.z as i32).clamp(IVec3::ZERO, max)
    }

    /// Fits in `u32` because accepted lattices hold at most
    /// [`MAX_GRID_CELLS`](crate::config::MAX_GRID_CELLS) cells.
    #[inline]
    pub fn linearize(&self, c: IVec3) -> u32 {
        c.x as u32 + c.y as u32 * self.div.x + c.z as u32 * self.div.x * self.div.y
    }

    #[inline]
    pub fn cell_index(&self, pos: Vec3) -> u32 {
        self.linearize(self.cell_coords(pos))
    }

    /// Inverse of [`linearize`](Self::linearize).
    #[inline]
    pub fn delinearize(&self, cell: u32) -> IVec3 {
        let plane = self.div.x * self.div.y;
        IVec3::new(
            (cell % self.div.x) as i32,
            ((cell % plane) / self.div.x) as i32,
            (cell / plane) as i32,
        )
    }

    /// Inclusive cell-coordinate range covering an axis-aligned box.
    pub fn cell_range(&self, aabb_min: Vec3, aabb_max: Vec3) -> CellRange {
        CellRange {
            min: self.cell_coords(aabb_min),
            max: self.cell_coords(aabb_max),
        }
    }

    /// Particle indices stored in one cell.
    pub fn cell_particles(&self, cell: u32) -> &[u32] {
        let h = cell as usize;
        let start = self.cell_start[h] as usize;
        let end = start + self.cell_count[h] as usize;
        &self.sorted_indices[start..end]
    }

    /// Visit every particle in the cell containing `pos` and its 26 neighbors (3x3x3),
    /// clipped at the lattice boundary.
    /// Calls `callback(particle_index)` for each particle found in those cells.
    /// The caller is responsible for distance checks.
    pub fn query_neighbors<F: FnMut(u32)>(&self, pos: Vec3, callback: F) {
        self.query_cell_neighbors(self.cell_coords(pos), callback);
    }

    pub fn query_cell_neighbors<F: FnMut(u32)>(&self, center: IVec3, mut callback: F) {
        let max = self.div.as_ivec3() - IVec3::ONE;
        let lo = (center - IVec3::ONE).max(IVec3::ZERO);
        let hi = (center + IVec3::ONE).min(max);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    for &idx in self.cell_particles(self.linearize(IVec3::new(x, y, z))) {
                        callback(idx);
                    }
                }
            }
        }
    }
}

/// Inclusive range of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub min: IVec3,
    pub max: IVec3,
}

impl CellRange {
    /// Range that admits every cell.
    pub const ALL: Self = Self {
        min: IVec3::MIN,
        max: IVec3::MAX,
    };

    #[inline]
    pub fn contains(&self, c: IVec3) -> bool {
        c.cmpge(self.min).all() && c.cmple(self.max).all()
    }
}
