//! Connected-component extraction for binary images.
//!
//! Components stand in for external contours: each carries area, first
//! moments for the centroid, and a bounding box for shape filters.

use image::GrayImage;

use crate::trajectory::PixelPos;

/// A connected component of set pixels.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    /// Pixel count (zeroth moment).
    pub area: u32,
    sum_x: u64,
    sum_y: u64,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Region {
    /// Centroid via first-moment ratio. `None` for a degenerate zero-area
    /// region.
    pub fn centroid(&self) -> Option<PixelPos> {
        if self.area == 0 {
            return None;
        }
        Some(PixelPos::new(
            (self.sum_x / self.area as u64) as i32,
            (self.sum_y / self.area as u64) as i32,
        ))
    }

    /// Bounding-box width in pixels.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Bounding-box height in pixels.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Long side over short side of the bounding box (short side padded by
    /// one to avoid dividing by zero on single-pixel rows).
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width().max(self.height()) as f64;
        let short = self.width().min(self.height()) as f64;
        long / (short + 1.0)
    }
}

/// Extract connected components (8-connectivity) of nonzero pixels.
pub fn find_regions(binary: &GrayImage) -> Vec<Region> {
    let (w, h) = (binary.width() as i32, binary.height() as i32);
    let mut visited = vec![false; (w * h) as usize];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start_y in 0..h {
        for start_x in 0..w {
            let start = (start_y * w + start_x) as usize;
            if visited[start] || binary.get_pixel(start_x as u32, start_y as u32).0[0] == 0 {
                continue;
            }

            let mut region = Region {
                area: 0,
                sum_x: 0,
                sum_y: 0,
                min_x: start_x as u32,
                min_y: start_y as u32,
                max_x: start_x as u32,
                max_y: start_y as u32,
            };

            visited[start] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                region.area += 1;
                region.sum_x += x as u64;
                region.sum_y += y as u64;
                region.min_x = region.min_x.min(x as u32);
                region.min_y = region.min_y.min(y as u32);
                region.max_x = region.max_x.max(x as u32);
                region.max_y = region.max_y.max(y as u32);

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (x + dx, y + dy);
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let n = (ny * w + nx) as usize;
                        if !visited[n] && binary.get_pixel(nx as u32, ny as u32).0[0] > 0 {
                            visited[n] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            regions.push(region);
        }
    }

    regions
}
