use crate::DVec3;

/// Build an orthonormal basis `(u, v, w)` with `w` equal to the given normal.
///
/// `normal` must be unit length. The helper axis is picked away from the
/// dominant component of `normal` so the cross product never degenerates.
pub fn orthonormal_basis(normal: DVec3) -> (DVec3, DVec3, DVec3) {
    let w = normal;
    let helper = if w.x.abs() > 0.1 { DVec3::Y } else { DVec3::X };
    let u = helper.cross(w).normalize();
    let v = w.cross(u);
    (u, v, w)
}
