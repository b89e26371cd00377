use crate::grid::Grid;

/// Mark cells whose 4-neighborhood touches a different plate.
/// The outermost ring of cells is never marked.
pub fn boundary_mask(plate_id: &Grid<u32>) -> Grid<bool> {
    let w = plate_id.w;
    let h = plate_id.h;
    let mut mask = Grid::<bool>::new(w, h);
    if w < 3 || h < 3 {
        return mask;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let pid = plate_id.get(x, y);
            let is_boundary = plate_id.get(x - 1, y) != pid
                || plate_id.get(x + 1, y) != pid
                || plate_id.get(x, y - 1) != pid
                || plate_id.get(x, y + 1) != pid;
            if is_boundary {
                mask.set(x, y, true);
            }
        }
    }
    mask
}
